// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! PSRX headless entry point
//!
//! Loads a BIOS image and runs the core's fetch-decode-execute loop with
//! no windowing or presentation layer attached.

use clap::Parser;
use psrx::core::system::System;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "psrx", version, about = "Headless PlayStation 1 core")]
struct Args {
    /// Path to a 512 KiB BIOS ROM image
    #[arg(long)]
    bios: PathBuf,

    /// Maximum number of instructions to trace to trace.log (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    trace_limit: usize,

    /// Increase log verbosity (-v, -vv, -vvv); repeatable
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("psrx: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> psrx::Result<()> {
    let mut system = System::new();

    let bios_path = args.bios.to_string_lossy();
    system.load_bios(&bios_path)?;
    log::info!("BIOS loaded: {}", bios_path);

    if args.trace_limit > 0 {
        system.enable_tracing("trace.log", args.trace_limit)?;
    }

    system.reset();
    system.run()
}
