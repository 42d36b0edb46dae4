//! The 256-cell SG16 memory and its reserved addresses.

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of addressable cells.
pub const MEMORY_SIZE: usize = 256;

/// Grid cells `0x00..=0x0F`, addressable by click index.
pub const GRID_START: u8 = 0x00;
pub const GRID_END: u8 = 0x0F;
pub const GRID_CELLS: usize = 16;

/// General variables `0x10..=0x1F`.
pub const VARIABLES_START: u8 = 0x10;
pub const VARIABLES_END: u8 = 0x1F;

/// Device cells. Written by the engine's event handlers only.
pub const DISPLAY_MODE: u8 = 0xE0;
pub const CLICK_DEVICE: u8 = 0xE2;
pub const KEY_CODE: u8 = 0xE3;

/// Flat byte memory, zeroed on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Memory {
    cells: [u8; MEMORY_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        Self {
            cells: [0; MEMORY_SIZE],
        }
    }

    pub fn read(&self, addr: u8) -> u8 {
        self.cells[addr as usize]
    }

    pub fn write(&mut self, addr: u8, value: u8) {
        self.cells[addr as usize] = value;
    }

    /// Zero every cell.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    pub fn grid(&self) -> &[u8] {
        &self.cells[GRID_START as usize..=GRID_END as usize]
    }

    pub fn variables(&self) -> &[u8] {
        &self.cells[VARIABLES_START as usize..=VARIABLES_END as usize]
    }

    /// The cells an external renderer and debug view consume.
    pub fn snapshot(&self) -> MemorySnapshot {
        let mut grid = [0; GRID_CELLS];
        grid.copy_from_slice(self.grid());
        let mut variables = [0; GRID_CELLS];
        variables.copy_from_slice(self.variables());
        MemorySnapshot {
            display_mode: self.read(DISPLAY_MODE),
            click_device: self.read(CLICK_DEVICE),
            key_code: self.read(KEY_CODE),
            grid,
            variables,
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<u8> for Memory {
    type Output = u8;

    fn index(&self, addr: u8) -> &u8 {
        &self.cells[addr as usize]
    }
}

/// Render payload: grid, variables and device cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub display_mode: u8,
    pub click_device: u8,
    pub key_code: u8,
    pub grid: [u8; GRID_CELLS],
    pub variables: [u8; GRID_CELLS],
}
