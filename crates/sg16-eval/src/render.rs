//! Render collaborator seam.

use sg16_types::Memory;

/// Receives the full memory after every mutating entry point and frame.
///
/// Mapping cells to a presentation (hex, packed RGB, ASCII, icons) is the
/// implementor's business; the engine only hands over the memory.
pub trait RenderSink {
    fn render(&mut self, memory: &Memory);
}

impl<F> RenderSink for F
where
    F: FnMut(&Memory),
{
    fn render(&mut self, memory: &Memory) {
        self(memory)
    }
}
