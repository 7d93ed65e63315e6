// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! NROM board, fixed banks without any switching.
//! See also: [NROM in the NESDev wiki](https://www.nesdev.org/wiki/NROM)

use log::{info, warn};

use crate::cartridge::{
    check_banks, write_banks, BankCopy, CartridgeError, Mapper, PATTERN_TABLES_ADDRESS,
    PRG_LOWER_BANK_ADDRESS, PRG_UPPER_BANK_ADDRESS,
};
use crate::memory::{ProgramMemory, VideoMemory};
use crate::rom::ines::{CHR_BANK_SIZE, PRG_BANK_SIZE};
use crate::rom::RomImage;

/// The iNES mapper number of the NROM board.
pub const NROM_MAPPER_NUMBER: u8 = 0x00;

/// NROM cartridge, with 16 KiB (mirrored) or 32 KiB of program data and 8 KiB of pattern data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nrom {
    /// The cartridge image.
    rom: RomImage,
}

impl Nrom {
    /// Create a new [Nrom].
    pub(crate) fn new(rom: RomImage) -> Nrom {
        Nrom { rom }
    }

    /// The banks copied on startup, depending on the program size.
    fn startup_banks(&self) -> Vec<BankCopy> {
        let mut banks = vec![BankCopy::program(PRG_LOWER_BANK_ADDRESS, PRG_BANK_SIZE, 0x0)];

        match self.rom.prg_banks() {
            // 16 KiB of program data, mirrored on the upper bank
            1 => {
                banks.push(BankCopy::program(PRG_UPPER_BANK_ADDRESS, PRG_BANK_SIZE, 0x0));
                banks.push(BankCopy::pattern(PATTERN_TABLES_ADDRESS, CHR_BANK_SIZE, PRG_BANK_SIZE));
            }

            2 => {
                banks.push(BankCopy::program(PRG_UPPER_BANK_ADDRESS, PRG_BANK_SIZE, PRG_BANK_SIZE));
                banks.push(BankCopy::pattern(PATTERN_TABLES_ADDRESS, CHR_BANK_SIZE, 2 * PRG_BANK_SIZE));
            }

            prg_banks => {
                warn!("NROM: {prg_banks} PRG banks are not supported, only the lower bank is mapped");
            }
        }

        banks
    }
}

impl Mapper for Nrom {
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

        let mirroring = self.rom.mirroring();
        info!("NROM: {mirroring:?} mirroring");
        video_memory.set_mirroring(mirroring);

        write_banks(&self.rom, &banks, program_memory, video_memory);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use mockall::Sequence;

    use super::*;
    use crate::cartridge::tests::*;
    use crate::cartridge::{load_cartridge, Cartridge};
    use crate::memory::{MockProgramMemory, MockVideoMemory, Ram, Vram};
    use crate::rom::Mirroring;

    #[test]
    fn test_16_kibibytes_program_is_mirrored() {
        let payload = payload(PRG_BANK_SIZE + CHR_BANK_SIZE);
        let rom = build_rom(1, 1, 0x00, 0x00, &payload);

        let (result, program_memory, video_memory) = load_recorded(&rom);
        assert!(matches!(result, Ok(Cartridge::Nrom(_))));

        let mut expected = expected_writes(0x8000, 0x4000, 0x0, &payload);
        expected.extend(expected_writes(0xC000, 0x4000, 0x0, &payload));
        assert_eq!(program_memory.writes, expected);

        assert_eq!(video_memory.writes, expected_writes(0x0000, 0x2000, 0x4000, &payload));
        assert_eq!(video_memory.mirroring, vec![Mirroring::Horizontal]);
    }

    #[test]
    fn test_32_kibibytes_program() {
        let payload = payload(2 * PRG_BANK_SIZE + CHR_BANK_SIZE);
        let rom = build_rom(2, 1, 0x01, 0x00, &payload);

        let (result, program_memory, video_memory) = load_recorded(&rom);
        assert!(matches!(result, Ok(Cartridge::Nrom(_))));

        let mut expected = expected_writes(0x8000, 0x4000, 0x0, &payload);
        expected.extend(expected_writes(0xC000, 0x4000, 0x4000, &payload));
        assert_eq!(program_memory.writes, expected);

        assert_eq!(video_memory.writes, expected_writes(0x0000, 0x2000, 0x8000, &payload));
        assert_eq!(video_memory.mirroring, vec![Mirroring::Vertical]);
    }

    #[test]
    fn test_32_kibibytes_program_into_memory() {
        let payload = payload(2 * PRG_BANK_SIZE + CHR_BANK_SIZE);
        let rom = build_rom(2, 1, 0x00, 0x00, &payload);

        let mut ram = Ram::new();
        let mut vram = Vram::new();
        load_cartridge(&rom, &mut ram, &mut vram).unwrap();

        assert_eq!(ram.read(0x8000), payload[0x0]);
        assert_eq!(ram.read(0xBFFF), payload[0x3FFF]);
        assert_eq!(ram.read(0xC000), payload[0x4000]);
        assert_eq!(ram.read(0xFFFF), payload[0x7FFF]);
        assert_eq!(vram.read_pattern(0x0000), payload[0x8000]);
        assert_eq!(vram.read_pattern(0x1FFF), payload[0x9FFF]);
        assert_eq!(vram.mirroring(), Some(Mirroring::Horizontal));
    }

    #[test]
    fn test_mirroring_is_reported_before_patterns() {
        let payload = payload(PRG_BANK_SIZE + CHR_BANK_SIZE);
        let rom = build_rom(1, 1, 0x01, 0x00, &payload);
        let mut sequence = Sequence::new();

        let mut program_memory = MockProgramMemory::new();
        program_memory.expect_write().return_const(());

        let mut video_memory = MockVideoMemory::new();
        video_memory
            .expect_set_mirroring()
            .with(eq(Mirroring::Vertical))
            .times(1)
            .in_sequence(&mut sequence)
            .return_const(());
        video_memory
            .expect_write_pattern()
            .times(CHR_BANK_SIZE)
            .in_sequence(&mut sequence)
            .return_const(());

        load_cartridge(&rom, &mut program_memory, &mut video_memory).unwrap();
    }

    #[test]
    fn test_unsupported_program_size_maps_lower_bank_only() {
        let payload = payload(3 * PRG_BANK_SIZE);
        let rom = build_rom(3, 0, 0x00, 0x00, &payload);

        let (result, program_memory, video_memory) = load_recorded(&rom);
        assert!(result.is_ok());

        assert_eq!(program_memory.writes, expected_writes(0x8000, 0x4000, 0x0, &payload));
        assert!(video_memory.writes.is_empty());
    }

    #[test]
    fn test_missing_pattern_bank_fails_without_writes() {
        // No CHR ROM, the header does not require the 8 KiB read after the program bank
        let payload = payload(PRG_BANK_SIZE);
        let rom = build_rom(1, 0, 0x00, 0x00, &payload);

        let (result, program_memory, video_memory) = load_recorded(&rom);

        assert!(matches!(
            result,
            Err(CartridgeError::BankOutOfBounds {
                start: 0x0000,
                length: 0x2000,
                offset: 0x4000,
                data_len: 0x4000,
            })
        ));
        assert!(program_memory.writes.is_empty());
        assert!(video_memory.writes.is_empty());
        assert!(video_memory.mirroring.is_empty());
    }
}
