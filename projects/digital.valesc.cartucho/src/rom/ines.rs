// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Parser for the iNES cartridge container.
//! See also: [iNES in the NESDev wiki](https://www.nesdev.org/wiki/INES)

use std::io;
use std::io::Read;

use bitflags::bitflags;
use log::debug;
use thiserror::Error;

use crate::rom::{Mirroring, RomImage};
use crate::BYTES_ON_A_KIBIBYTE;

/// The size of the fixed iNES header.
pub const HEADER_SIZE: usize = 16;

/// The size of a program (PRG ROM) bank.
pub const PRG_BANK_SIZE: usize = 16 * BYTES_ON_A_KIBIBYTE;

/// The size of a pattern (CHR ROM) bank.
pub const CHR_BANK_SIZE: usize = 8 * BYTES_ON_A_KIBIBYTE;

/// Magic bytes present at the start of every iNES file, `0x1A` is the `SUB` (substitute) character.
const MAGIC_BYTES: [u8; 4] = *b"NES\x1A";

/// Header offset of the program bank count.
const PRG_BANKS_OFFSET: usize = 4;

/// Header offset of the pattern bank count.
const CHR_BANKS_OFFSET: usize = 5;

/// Header offset of the flags 6 byte.
const FLAGS_6_OFFSET: usize = 6;

/// Header offset of the flags 7 byte.
const FLAGS_7_OFFSET: usize = 7;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Bits of the header byte 6 read by the loader.
    pub struct Flags6: u8 {
        /// Set for vertical mirroring, clear for horizontal mirroring.
        const VerticalMirroring = 1 << 0;

        /// Lower nibble of the mapper number.
        const MapperLowerNibble = 0xF0;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Bits of the header byte 7 read by the loader.
    pub struct Flags7: u8 {
        /// Upper nibble of the mapper number.
        const MapperUpperNibble = 0xF0;
    }
}

/// A parsed iNES file.
#[derive(Debug)]
pub struct InesFile {
    /// The decoded cartridge image.
    pub rom: RomImage,

    /// Number identifying the memory mapper of the cartridge board.
    pub mapper_number: u8,
}

#[derive(Debug, Error)]
/// Errors that may happen when parsing an iNES file.
pub enum InesError {
    #[error("The iNES ROM is missing the magic bytes NES<SUB> at its start")]
    /// The first four bytes are not `NES<SUB>`.
    InvalidSignature,

    #[error("The iNES ROM is {0} bytes long, shorter than its 16 bytes header")]
    /// The image is shorter than the fixed header.
    TruncatedHeader(usize),

    #[error("The iNES ROM payload is {actual} bytes long but its header declares {expected} bytes")]
    /// The payload is shorter than the banks declared on the header.
    TruncatedPayload {
        /// Payload size declared by the header.
        expected: usize,

        /// Payload size present on the image.
        actual: usize,
    },

    #[error("Unable to read the iNES ROM: {0}")]
    /// Reading the image from its source failed.
    ReadingRomFailed(#[from] io::Error),
}

impl InesFile {
    /// Read and parse a whole iNES image from a reader.
    pub fn from_read<R: Read>(reader: &mut R) -> Result<InesFile, InesError> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;

        InesFile::from_bytes(&raw)
    }

    /// Parse an iNES image held in memory.
    pub fn from_bytes(raw: &[u8]) -> Result<InesFile, InesError> {
        debug!("Parsing iNES ROM");

        if raw.len() < HEADER_SIZE {
            return Err(InesError::TruncatedHeader(raw.len()));
        }

        if raw[..MAGIC_BYTES.len()] != MAGIC_BYTES {
            return Err(InesError::InvalidSignature);
        }

        debug!("iNES magic characters are present");

        let prg_banks = raw[PRG_BANKS_OFFSET];
        let chr_banks = raw[CHR_BANKS_OFFSET];
        debug!("PRG banks: {prg_banks}, CHR banks: {chr_banks}");

        let flags_6 = Flags6::from_bits_truncate(raw[FLAGS_6_OFFSET]);
        let flags_7 = Flags7::from_bits_truncate(raw[FLAGS_7_OFFSET]);

        let mirroring = if flags_6.contains(Flags6::VerticalMirroring) {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        debug!("Mirroring: {mirroring:?}");

        let mapper_number = ((flags_6 & Flags6::MapperLowerNibble).bits() >> 4)
            | (flags_7 & Flags7::MapperUpperNibble).bits();
        debug!("Mapper number: {mapper_number}");

        let data = &raw[HEADER_SIZE..];
        let expected = prg_banks as usize * PRG_BANK_SIZE + chr_banks as usize * CHR_BANK_SIZE;

        if data.len() < expected {
            return Err(InesError::TruncatedPayload {
                expected,
                actual: data.len(),
            });
        }

        Ok(InesFile {
            rom: RomImage::new(prg_banks, chr_banks, mirroring, data.to_vec()),
            mapper_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a header followed by a zeroed payload sized after the bank counts.
    fn build_image(prg_banks: u8, chr_banks: u8, flags_6: u8, flags_7: u8) -> Vec<u8> {
        let mut image = vec![0x4E, 0x45, 0x53, 0x1A, prg_banks, chr_banks, flags_6, flags_7];
        image.resize(HEADER_SIZE, 0);
        image.resize(
            HEADER_SIZE + prg_banks as usize * PRG_BANK_SIZE + chr_banks as usize * CHR_BANK_SIZE,
            0,
        );

        image
    }

    #[test]
    fn test_parse_valid_header() {
        let ines = InesFile::from_bytes(&build_image(2, 1, 0x00, 0x00)).unwrap();

        assert_eq!(ines.rom.prg_banks(), 2);
        assert_eq!(ines.rom.chr_banks(), 1);
        assert_eq!(ines.rom.mirroring(), Mirroring::Horizontal);
        assert_eq!(ines.rom.data().len(), 2 * PRG_BANK_SIZE + CHR_BANK_SIZE);
        assert_eq!(ines.mapper_number, 0);
    }

    #[test]
    fn test_parse_vertical_mirroring() {
        let ines = InesFile::from_bytes(&build_image(1, 1, 0x01, 0x00)).unwrap();
        assert_eq!(ines.rom.mirroring(), Mirroring::Vertical);

        // Other flag 6 bits do not affect the mirroring
        let ines = InesFile::from_bytes(&build_image(1, 1, 0x0E, 0x00)).unwrap();
        assert_eq!(ines.rom.mirroring(), Mirroring::Horizontal);
    }

    #[test]
    fn test_parse_mapper_number() {
        let ines = InesFile::from_bytes(&build_image(1, 1, 0x10, 0x00)).unwrap();
        assert_eq!(ines.mapper_number, 0x01);

        let ines = InesFile::from_bytes(&build_image(1, 1, 0x41, 0x00)).unwrap();
        assert_eq!(ines.mapper_number, 0x04);

        // Lower nibble of byte 7 is ignored
        let ines = InesFile::from_bytes(&build_image(1, 1, 0xB0, 0x4F)).unwrap();
        assert_eq!(ines.mapper_number, 0x4B);
    }

    #[test]
    fn test_parse_payload_starts_after_header() {
        let mut image = build_image(1, 0, 0x00, 0x00);
        image[HEADER_SIZE] = 0xAB;
        image[HEADER_SIZE + 1] = 0xCD;

        let ines = InesFile::from_bytes(&image).unwrap();

        assert_eq!(&ines.rom.data()[..2], &[0xAB, 0xCD]);
    }

    #[test]
    fn test_corrupted_signature() {
        for index in 0..MAGIC_BYTES.len() {
            let mut image = build_image(1, 1, 0x00, 0x00);
            image[index] ^= 0xFF;

            assert!(matches!(
                InesFile::from_bytes(&image),
                Err(InesError::InvalidSignature)
            ));
        }
    }

    #[test]
    fn test_truncated_header() {
        let image = build_image(0, 0, 0x00, 0x00);

        for length in 0..HEADER_SIZE {
            assert!(matches!(
                InesFile::from_bytes(&image[..length]),
                Err(InesError::TruncatedHeader(len)) if len == length
            ));
        }
    }

    #[test]
    fn test_truncated_payload() {
        let image = build_image(2, 1, 0x00, 0x00);

        let result = InesFile::from_bytes(&image[..image.len() - 1]);

        assert!(matches!(
            result,
            Err(InesError::TruncatedPayload { expected, actual })
                if expected == 2 * PRG_BANK_SIZE + CHR_BANK_SIZE && actual == expected - 1
        ));
    }

    #[test]
    fn test_from_read() {
        let image = build_image(1, 1, 0x01, 0x00);

        let ines = InesFile::from_read(&mut image.as_slice()).unwrap();

        assert_eq!(ines.rom.prg_banks(), 1);
        assert_eq!(ines.rom.mirroring(), Mirroring::Vertical);
    }
}
