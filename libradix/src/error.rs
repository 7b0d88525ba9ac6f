/*
 * Created on Tue Mar 12 2024
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

use core::fmt;

pub type RadixResult<T> = Result<T, RadixError>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
/// Tree initialization and registry errors.
///
/// Allocation failure is deliberately absent: no caller of the tree is positioned to
/// recover from OOM and the lockless variant needs allocation to succeed to make progress,
/// so the process-wide abort-on-OOM default stands.
pub enum RadixError {
    /// `bits` or `radix` out of range for a constructible tree
    InvalidParameter,
    /// no variant registered under the given name
    UnknownVariant,
}

impl fmt::Display for RadixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid tree parameter"),
            Self::UnknownVariant => write!(f, "unknown tree variant"),
        }
    }
}

impl std::error::Error for RadixError {}
