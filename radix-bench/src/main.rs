/*
 * Created on Mon Mar 18 2024
 *
 * This file is a part of Radixmap
 * Radixmap is a free and open-source concurrent radix tree toolkit written by
 * Sayan Nandan ("the Author") with the vision to provide a race-safe integer
 * index without compromising on performance or predictability.
 *
 * Copyright (c) 2024, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/
use {
    crate::cli::Cli,
    clap::{error::ErrorKind, Parser},
    env_logger::Builder,
    std::{env, process},
};

#[macro_use]
extern crate log;

mod bench;
mod cli;
mod error;
mod report;

fn main() {
    Builder::new()
        .parse_filters(&env::var("RADIX_LOG").unwrap_or_else(|_| "info".to_owned()))
        .init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => -1,
            });
        }
    };
    if let Err(e) = run(&cli) {
        error!("radix-bench exited with error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> error::BResult<()> {
    // Parse args into a validated run config
    let config = bench::BenchConfig::new(cli)?;

    // Race the lookups
    let report = bench::run_bench(&config)?;

    // stdout carries the result alone; everything else went to stderr
    if cli.json {
        println!("{}", report.into_json());
    } else {
        println!("{:.6}", report.elapsed_secs());
    }
    Ok(())
}
