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

use {libradix::RadixError, std::fmt::Display};

pub type BResult<T> = Result<T, Error>;

/// Benchmark tool errors
#[derive(Debug)]
pub enum Error {
    /// An error in the benchmark configuration
    Config(String),
    /// An error reported by the tree (bad shape parameters, unknown variant)
    Tree(RadixError),
    /// A returned reference disagreed with the shadow oracle. Kind 1 is a find_or_create
    /// mismatch during prefill, kind 2 a find mismatch during the race
    Correctness(u8),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Correctness(kind) => *kind as i32,
            Error::Config(_) | Error::Tree(_) => -1,
        }
    }
}

impl From<RadixError> for Error {
    fn from(e: RadixError) -> Self {
        Self::Tree(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config error: {}", e),
            Error::Tree(e) => write!(f, "tree error: {}", e),
            Error::Correctness(kind) => write!(f, "error number {} detected", kind),
        }
    }
}
