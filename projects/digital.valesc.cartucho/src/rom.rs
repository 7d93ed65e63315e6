// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Decoded cartridge images.

pub mod ines;

/// Nametable layout replication mode declared by the cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// Nametables are mirrored horizontally (vertical arrangement).
    Horizontal,

    /// Nametables are mirrored vertically (horizontal arrangement).
    Vertical,
}

/// A decoded cartridge: the header counts plus the payload that follows the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomImage {
    /// Number of 16 KiB program banks.
    prg_banks: u8,

    /// Number of 8 KiB pattern banks.
    chr_banks: u8,

    /// Mirroring mode declared on the header.
    mirroring: Mirroring,

    /// Program and pattern banks, concatenated.
    data: Vec<u8>,
}

impl RomImage {
    /// Create a new [RomImage].
    pub(crate) fn new(prg_banks: u8, chr_banks: u8, mirroring: Mirroring, data: Vec<u8>) -> RomImage {
        RomImage {
            prg_banks,
            chr_banks,
            mirroring,
            data,
        }
    }

    /// Number of 16 KiB program banks declared on the header.
    pub fn prg_banks(&self) -> u8 {
        self.prg_banks
    }

    /// Number of 8 KiB pattern banks declared on the header.
    pub fn chr_banks(&self) -> u8 {
        self.chr_banks
    }

    /// Mirroring mode declared on the header.
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    /// The payload located right after the header.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
