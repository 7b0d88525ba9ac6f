/*
 * Created on Wed Mar 13 2024
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

use super::ValueFactory;

/// walk mode flag
pub type WriteFlag = u8;
/// read; a miss is reported, nothing is installed
pub const WRITEMODE_READNX: WriteFlag = 0b01;
/// read, installing on miss
pub const WRITEMODE_ENSURE: WriteFlag = 0b10;

/// A [`Probe`] folds the lookup and find-or-create walks of one variant into a single
/// routine: the mode flag is a compile-time constant, so the pure-read path pays nothing
/// for the install branches. This replaces the classical nullable `create` callback.
pub trait Probe<T> {
    const WMODE: WriteFlag;
    type Ret<'a>
    where
        T: 'a;
    /// Produce the value for a leaf miss. Ensure mode only
    fn nx_value(&self, key: u64) -> T;
    /// Return shape for a miss
    fn nx_ret<'a>() -> Self::Ret<'a>
    where
        T: 'a;
    /// Return shape for an occupied (or freshly installed) slot
    fn ex_ret<'a>(v: &'a T) -> Self::Ret<'a>
    where
        T: 'a;
}

/// pure lookup
pub struct Lookup;

impl<T> Probe<T> for Lookup {
    const WMODE: WriteFlag = WRITEMODE_READNX;
    type Ret<'a> = Option<&'a T> where T: 'a;
    fn nx_value(&self, _: u64) -> T {
        unreachable!("logic, nx_value in read mode")
    }
    fn nx_ret<'a>() -> Self::Ret<'a>
    where
        T: 'a,
    {
        None
    }
    fn ex_ret<'a>(v: &'a T) -> Self::Ret<'a>
    where
        T: 'a,
    {
        Some(v)
    }
}

/// find-or-create
pub struct Ensure<'f, T> {
    with: &'f ValueFactory<'f, T>,
}

impl<'f, T> Ensure<'f, T> {
    pub fn new(with: &'f ValueFactory<'f, T>) -> Self {
        Self { with }
    }
}

impl<'f, T> Probe<T> for Ensure<'f, T> {
    const WMODE: WriteFlag = WRITEMODE_ENSURE;
    type Ret<'a> = &'a T where T: 'a;
    fn nx_value(&self, key: u64) -> T {
        (self.with)(key)
    }
    fn nx_ret<'a>() -> Self::Ret<'a>
    where
        T: 'a,
    {
        unreachable!("logic, miss returned in ensure mode")
    }
    fn ex_ret<'a>(v: &'a T) -> Self::Ret<'a>
    where
        T: 'a,
    {
        v
    }
}
