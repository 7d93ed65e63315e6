// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! NES cartridge loading: iNES parsing and memory mappers.

pub mod cartridge;
pub mod memory;
pub mod rom;

pub use cartridge::{load_cartridge, Cartridge, CartridgeError, Mapper};

/// The number of bytes in a kibibyte (1 KiB).
pub(crate) const BYTES_ON_A_KIBIBYTE: usize = 1024;
