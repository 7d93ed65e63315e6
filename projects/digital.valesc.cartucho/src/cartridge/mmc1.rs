// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! MMC1 board, loaded with its first and last program banks.
//! See also: [MMC1 in the NESDev wiki](https://www.nesdev.org/wiki/MMC1)

use log::debug;

use crate::cartridge::{
    check_banks, write_banks, BankCopy, CartridgeError, Mapper, PRG_LOWER_BANK_ADDRESS,
    PRG_UPPER_BANK_ADDRESS,
};
use crate::memory::{ProgramMemory, VideoMemory};
use crate::rom::ines::PRG_BANK_SIZE;
use crate::rom::RomImage;

/// The iNES mapper number of the MMC1 board.
pub const MMC1_MAPPER_NUMBER: u8 = 0x01;

/// MMC1 cartridge. Only the startup layout is emulated: the bank switching registers are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mmc1 {
    /// The cartridge image.
    rom: RomImage,
}

impl Mmc1 {
    /// Create a new [Mmc1].
    pub(crate) fn new(rom: RomImage) -> Mmc1 {
        Mmc1 { rom }
    }

    /// The first bank at the lower address and the last bank at the upper address.
    fn startup_banks(&self) -> [BankCopy; 2] {
        // Clamped to zero so a payload shorter than a bank fails the bounds check
        let last_bank_offset = self.rom.data().len().saturating_sub(PRG_BANK_SIZE);

        [
            BankCopy::program(PRG_LOWER_BANK_ADDRESS, PRG_BANK_SIZE, 0x0),
            BankCopy::program(PRG_UPPER_BANK_ADDRESS, PRG_BANK_SIZE, last_bank_offset),
        ]
    }
}

impl Mapper for Mmc1 {
    fn rom(&self) -> &RomImage {
        &self.rom
    }

    fn init(
        &self,
        program_memory: &mut dyn ProgramMemory,
        video_memory: &mut dyn VideoMemory,
    ) -> Result<(), CartridgeError> {
        let banks = self.startup_banks();
        check_banks(&self.rom, &banks)?;

        debug!("MMC1: mirroring and CHR banks are left to the switching registers");
        write_banks(&self.rom, &banks, program_memory, video_memory);

        Ok(())
    }
}
