//! Token types for SG16 program lines.
//!
//! A line is split on whitespace; each piece is either a bare 1–2 digit
//! hex byte or a word (a mnemonic, or garbage the compiler reports).

/// Classification of a single whitespace-delimited token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `^[0-9A-Fa-f]{1,2}$`, already decoded.
    HexByte(u8),
    /// Anything else.
    Word,
}

/// A token borrowed from the source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub text: &'src str,
    pub kind: TokenKind,
}

impl<'src> Token<'src> {
    pub fn new(text: &'src str) -> Self {
        let kind = match parse_hex_byte(text) {
            Some(byte) => TokenKind::HexByte(byte),
            None => TokenKind::Word,
        };
        Self { text, kind }
    }

    pub fn is_hex_byte(&self) -> bool {
        matches!(self.kind, TokenKind::HexByte(_))
    }

    pub fn hex_byte(&self) -> Option<u8> {
        match self.kind {
            TokenKind::HexByte(b) => Some(b),
            TokenKind::Word => None,
        }
    }
}

/// Decode a bare 1–2 digit hex byte. No prefix, no sign.
pub fn parse_hex_byte(text: &str) -> Option<u8> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(text, 16).ok()
}

/// Strip the `;` comment and split what remains on whitespace.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    strip_comment(line).split_whitespace().map(Token::new).collect()
}

/// Everything before the first `;`, trimmed.
pub fn strip_comment(line: &str) -> &str {
    line.split(';').next().unwrap_or("").trim()
}
