// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Cartridge boards and their memory mappers.

use std::io::Read;

use log::{info, trace};
use thiserror::Error;

use crate::memory::{ProgramMemory, VideoMemory, PATTERN_MEMORY_SIZE, PROGRAM_MEMORY_SIZE};
use crate::rom::ines::{InesError, InesFile};
use crate::rom::{Mirroring, RomImage};

pub mod mmc1;
pub mod nrom;

use mmc1::Mmc1;
use nrom::Nrom;

/// The CPU address where the lower program bank is mapped.
pub(crate) const PRG_LOWER_BANK_ADDRESS: u16 = 0x8000;

/// The CPU address where the upper program bank is mapped.
pub(crate) const PRG_UPPER_BANK_ADDRESS: u16 = 0xC000;

/// The video memory address where the pattern tables start.
pub(crate) const PATTERN_TABLES_ADDRESS: u16 = 0x0000;

#[derive(Error, Debug)]
/// Errors that may happen when loading a cartridge.
pub enum CartridgeError {
    #[error(transparent)]
    /// The cartridge image is not a valid iNES file.
    InvalidRom(#[from] InesError),

    #[error("The cartridge requires the unsupported memory mapper {0}")]
    /// No mapper is implemented for the number requested by the header.
    UnsupportedMapper(u8),

    #[error("Copying {length:#X} bytes from the payload offset {offset:#X} to {start:#06X} exceeds the {data_len:#X} bytes payload")]
    /// A bank copy would read past the end of the payload.
    BankOutOfBounds {
        /// Destination address of the bank.
        start: u16,

        /// Number of bytes of the bank.
        length: usize,

        /// Payload offset of the bank.
        offset: usize,

        /// Size of the payload.
        data_len: usize,
    },

    #[error("Copying {length:#X} bytes to {start:#06X} exceeds the {window:#X} bytes destination memory")]
    /// A bank copy would write past the end of its destination memory.
    DestinationOutOfBounds {
        /// Destination address of the bank.
        start: u16,

        /// Number of bytes of the bank.
        length: usize,

        /// Size of the destination memory.
        window: usize,
    },
}

/// The memory a bank is copied into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BankTarget {
    /// The CPU address space.
    Program,

    /// The PPU pattern tables.
    Pattern,
}

/// A copy of a slice of the payload into one of the memory sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BankCopy {
    /// Destination memory.
    target: BankTarget,

    /// First destination address.
    start: u16,

    /// Number of bytes to copy.
    length: usize,

    /// First payload byte to copy.
    offset: usize,
}

impl BankCopy {
    /// Create a copy into the CPU address space.
    pub(crate) fn program(start: u16, length: usize, offset: usize) -> BankCopy {
        BankCopy {
            target: BankTarget::Program,
            start,
            length,
            offset,
        }
    }

    /// Create a copy into the pattern tables.
    pub(crate) fn pattern(start: u16, length: usize, offset: usize) -> BankCopy {
        BankCopy {
            target: BankTarget::Pattern,
            start,
            length,
            offset,
        }
    }

    /// Check that both the payload slice and the destination window are in bounds.
    pub(crate) fn check(&self, data: &[u8]) -> Result<(), CartridgeError> {
        let source_in_bounds = self
            .offset
            .checked_add(self.length)
            .is_some_and(|end| end <= data.len());

        if !source_in_bounds {
            return Err(CartridgeError::BankOutOfBounds {
                start: self.start,
                length: self.length,
                offset: self.offset,
                data_len: data.len(),
            });
        }

        let window = match self.target {
            BankTarget::Program => PROGRAM_MEMORY_SIZE,
            BankTarget::Pattern => PATTERN_MEMORY_SIZE,
        };

        if self.start as usize + self.length > window {
            return Err(CartridgeError::DestinationOutOfBounds {
                start: self.start,
                length: self.length,
                window,
            });
        }

        Ok(())
    }

    /// The payload slice to copy, must be [checked](BankCopy::check) first.
    fn source<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.offset..self.offset + self.length]
    }

    /// Destination addresses paired with the bytes to write on them.
    fn writes<'a>(&self, data: &'a [u8]) -> impl Iterator<Item = (u16, u8)> + 'a {
        let start = self.start as usize;

        self.source(data)
            .iter()
            .enumerate()
            .map(move |(index, value)| ((start + index) as u16, *value))
    }

    /// Copy the bank into the CPU address space, must be [checked](BankCopy::check) first.
    fn write_program(&self, data: &[u8], program_memory: &mut dyn ProgramMemory) {
        trace!("Copying PRG {:#X}..{:#X} @ {:#06X}", self.offset, self.offset + self.length, self.start);

        for (address, value) in self.writes(data) {
            program_memory.write(address, value);
        }
    }

    /// Copy the bank into the pattern tables, must be [checked](BankCopy::check) first.
    fn write_pattern(&self, data: &[u8], video_memory: &mut dyn VideoMemory) {
        trace!("Copying CHR {:#X}..{:#X} @ {:#06X}", self.offset, self.offset + self.length, self.start);

        for (address, value) in self.writes(data) {
            video_memory.write_pattern(address, value);
        }
    }
}

/// Check every bank of a load sequence, so a failing sequence leaves the sinks untouched.
pub(crate) fn check_banks(rom: &RomImage, banks: &[BankCopy]) -> Result<(), CartridgeError> {
    banks.iter().try_for_each(|bank| bank.check(rom.data()))
}

/// Copy every bank of an already [checked](check_banks) load sequence, in order.
pub(crate) fn write_banks(
    rom: &RomImage,
    banks: &[BankCopy],
    program_memory: &mut dyn ProgramMemory,
    video_memory: &mut dyn VideoMemory,
) {
    for bank in banks {
        match bank.target {
            BankTarget::Program => bank.write_program(rom.data(), program_memory),
            BankTarget::Pattern => bank.write_pattern(rom.data(), video_memory),
        }
    }
}

/// Behavior shared by every memory mapper.
pub trait Mapper {
    /// The cartridge image held by the mapper.
    fn rom(&self) -> &RomImage;

    /// The mirroring mode of the cartridge.
    fn mirroring(&self) -> Mirroring {
        self.rom().mirroring()
    }

    /// Copy `length` payload bytes starting at `offset` to the CPU address space at `start`.
    fn write_program_bank(
        &self,
        start: u16,
        length: usize,
        offset: usize,
        program_memory: &mut dyn ProgramMemory,
    ) -> Result<(), CartridgeError> {
        let bank = BankCopy::program(start, length, offset);
        bank.check(self.rom().data())?;
        bank.write_program(self.rom().data(), program_memory);

        Ok(())
    }

    /// Copy `length` payload bytes starting at `offset` to the pattern tables at `start`.
    fn write_pattern_bank(
        &self,
        start: u16,
        length: usize,
        offset: usize,
        video_memory: &mut dyn VideoMemory,
    ) -> Result<(), CartridgeError> {
        let bank = BankCopy::pattern(start, length, offset);
        bank.check(self.rom().data())?;
        bank.write_pattern(self.rom().data(), video_memory);

        Ok(())
    }

    /// Run the startup load sequence of the mapper.
    fn init(
        &self,
        program_memory: &mut dyn ProgramMemory,
        video_memory: &mut dyn VideoMemory,
    ) -> Result<(), CartridgeError>;
}

/// A loaded cartridge, tagged by its memory mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cartridge {
    /// Mapper 0, see [Nrom].
    Nrom(Nrom),

    /// Mapper 1, see [Mmc1].
    Mmc1(Mmc1),
}

impl Cartridge {
    /// Parse an iNES image, build its mapper and copy the startup banks into the sinks.
    pub fn load(
        raw: &[u8],
        program_memory: &mut dyn ProgramMemory,
        video_memory: &mut dyn VideoMemory,
    ) -> Result<Cartridge, CartridgeError> {
        let ines = InesFile::from_bytes(raw)?;

        Cartridge::from_ines(ines, program_memory, video_memory)
    }

    /// Same as [Cartridge::load], reading the image from a reader.
    pub fn from_read<R: Read>(
        reader: &mut R,
        program_memory: &mut dyn ProgramMemory,
        video_memory: &mut dyn VideoMemory,
    ) -> Result<Cartridge, CartridgeError> {
        let ines = InesFile::from_read(reader)?;

        Cartridge::from_ines(ines, program_memory, video_memory)
    }

    /// Build the mapper requested by an already parsed image and initialize it.
    fn from_ines(
        ines: InesFile,
        program_memory: &mut dyn ProgramMemory,
        video_memory: &mut dyn VideoMemory,
    ) -> Result<Cartridge, CartridgeError> {
        let cartridge = match ines.mapper_number {
            nrom::NROM_MAPPER_NUMBER => Cartridge::Nrom(Nrom::new(ines.rom)),
            mmc1::MMC1_MAPPER_NUMBER => Cartridge::Mmc1(Mmc1::new(ines.rom)),
            mapper_number => return Err(CartridgeError::UnsupportedMapper(mapper_number)),
        };

        info!("Loading cartridge with mapper {}", cartridge.name());
        cartridge.init(program_memory, video_memory)?;

        Ok(cartridge)
    }

    /// The iNES mapper number of the cartridge.
    pub fn mapper_number(&self) -> u8 {
        match self {
            Cartridge::Nrom(_) => nrom::NROM_MAPPER_NUMBER,
            Cartridge::Mmc1(_) => mmc1::MMC1_MAPPER_NUMBER,
        }
    }

    /// The common name of the mapper board.
    pub fn name(&self) -> &'static str {
        match self {
            Cartridge::Nrom(_) => "NROM",
            Cartridge::Mmc1(_) => "MMC1",
        }
    }
}

impl Mapper for Cartridge {
    fn rom(&self) -> &RomImage {
        match self {
            Cartridge::Nrom(nrom) => nrom.rom(),
            Cartridge::Mmc1(mmc1) => mmc1.rom(),
        }
    }

    fn init(
        &self,
        program_memory: &mut dyn ProgramMemory,
        video_memory: &mut dyn VideoMemory,
    ) -> Result<(), CartridgeError> {
        match self {
            Cartridge::Nrom(nrom) => nrom.init(program_memory, video_memory),
            Cartridge::Mmc1(mmc1) => mmc1.init(program_memory, video_memory),
        }
    }
}

/// Load a cartridge from its raw iNES image, see [Cartridge::load].
pub fn load_cartridge(
    raw: &[u8],
    program_memory: &mut dyn ProgramMemory,
    video_memory: &mut dyn VideoMemory,
) -> Result<Cartridge, CartridgeError> {
    Cartridge::load(raw, program_memory, video_memory)
}
