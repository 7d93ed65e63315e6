// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Load an iNES cartridge into memory and report its layout.

use std::env;
use std::fs::File;
use std::process::ExitCode;

use cartucho::memory::{Ram, Vram, RESET_VECTOR_ADDRESS};
use cartucho::{Cartridge, Mapper};
use log::{error, info};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = env::args().nth(1) else {
        error!("Usage: cartucho <ROM>");
        return ExitCode::FAILURE;
    };

    let mut file = match File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            error!("Unable to open '{path}': {err}");
            return ExitCode::FAILURE;
        }
    };

    // The CPU RAM starts with undefined values on real hardware
    let mut ram = Ram::randomized();
    let mut vram = Vram::new();

    let cartridge = match Cartridge::from_read(&mut file, &mut ram, &mut vram) {
        Ok(cartridge) => cartridge,
        Err(err) => {
            error!("Unable to load '{path}': {err}");
            return ExitCode::FAILURE;
        }
    };

    let rom = cartridge.rom();
    info!(
        "{path}: mapper {} ({}), {} PRG banks, {} CHR banks, {:?} mirroring",
        cartridge.mapper_number(),
        cartridge.name(),
        rom.prg_banks(),
        rom.chr_banks(),
        cartridge.mirroring(),
    );
    info!("Reset vector: {:#06X}", ram.read_word(RESET_VECTOR_ADDRESS));

    ExitCode::SUCCESS
}
