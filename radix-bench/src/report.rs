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

use {crate::bench::BenchConfig, serde::Serialize};

#[derive(Serialize)]
pub struct RunReport {
    variant: &'static str,
    bits: u32,
    radix: u32,
    keys: usize,
    lookups: usize,
    threads: usize,
    runs: usize,
    elapsed_secs: f64,
}

impl RunReport {
    pub fn new(config: &BenchConfig, elapsed_secs: f64) -> Self {
        Self {
            variant: config.variant.name(),
            bits: config.bits,
            radix: config.radix,
            keys: config.keys,
            lookups: config.lookups,
            threads: config.threads,
            runs: config.runs,
            elapsed_secs,
        }
    }
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }
    pub fn into_json(self) -> String {
        serde_json::to_string(&self).unwrap()
    }
}
