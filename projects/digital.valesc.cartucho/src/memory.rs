// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Memory sinks the cartridge banks are copied into.

use log::trace;
use rand::Rng;

use crate::rom::Mirroring;
use crate::BYTES_ON_A_KIBIBYTE;

/// The size of the CPU address space.
pub const PROGRAM_MEMORY_SIZE: usize = 64 * BYTES_ON_A_KIBIBYTE;

/// The size of the pattern tables on the PPU video memory.
pub const PATTERN_MEMORY_SIZE: usize = 8 * BYTES_ON_A_KIBIBYTE;

/// The address of the low byte of the reset vector.
pub const RESET_VECTOR_ADDRESS: u16 = 0xFFFC;

#[cfg_attr(test, mockall::automock)]
/// Memory addressed by the CPU, receives the program banks.
pub trait ProgramMemory {
    /// Write a byte to an address of the CPU address space.
    fn write(&mut self, address: u16, value: u8);
}

#[cfg_attr(test, mockall::automock)]
/// Video memory owned by the PPU, receives the pattern banks and the mirroring mode.
pub trait VideoMemory {
    /// Set the nametable mirroring mode.
    fn set_mirroring(&mut self, mirroring: Mirroring);

    /// Write a byte to a slot of the pattern tables.
    fn write_pattern(&mut self, address: u16, value: u8);
}

/// Flat CPU address space backed by plain memory.
pub struct Ram {
    /// Every byte of the address space.
    memory: Vec<u8>,
}

impl Ram {
    /// Create a new zeroed [Ram].
    pub fn new() -> Ram {
        Ram {
            memory: vec![0; PROGRAM_MEMORY_SIZE],
        }
    }

    /// Create a new [Ram] filled with random values, emulating the undefined state of the
    /// bits on startup some games use as a pseudo RNG.
    pub fn randomized() -> Ram {
        let mut memory = vec![0; PROGRAM_MEMORY_SIZE];
        rand::rng().fill(&mut memory[..]);

        Ram { memory }
    }

    /// Read a byte of the address space.
    pub fn read(&self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    /// Read a little endian word, as the CPU does with its vectors.
    pub fn read_word(&self, address: u16) -> u16 {
        let lower_byte = self.read(address);
        let upper_byte = self.read(address.wrapping_add(1));

        (lower_byte as u16) | ((upper_byte as u16) << 8)
    }
}

impl Default for Ram {
    fn default() -> Self {
        Ram::new()
    }
}

impl ProgramMemory for Ram {
    fn write(&mut self, address: u16, value: u8) {
        trace!("Ram: Write {value:#02X} @ {address:#02X}");

        self.memory[address as usize] = value;
    }
}

/// Pattern tables of the PPU plus the mirroring mode reported by the cartridge.
pub struct Vram {
    /// Pattern table slots.
    patterns: Vec<u8>,

    /// The last mirroring mode reported, if any.
    mirroring: Option<Mirroring>,
}

impl Vram {
    /// Create a new zeroed [Vram] without mirroring mode.
    pub fn new() -> Vram {
        Vram {
            patterns: vec![0; PATTERN_MEMORY_SIZE],
            mirroring: None,
        }
    }

    /// Read a pattern table slot.
    pub fn read_pattern(&self, address: u16) -> u8 {
        self.patterns[address as usize]
    }

    /// The mirroring mode reported by the cartridge, if any.
    pub fn mirroring(&self) -> Option<Mirroring> {
        self.mirroring
    }
}

impl Default for Vram {
    fn default() -> Self {
        Vram::new()
    }
}

impl VideoMemory for Vram {
    fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = Some(mirroring);
    }

    fn write_pattern(&mut self, address: u16, value: u8) {
        trace!("Vram: Write {value:#02X} @ {address:#02X}");

        self.patterns[address as usize] = value;
    }
}
