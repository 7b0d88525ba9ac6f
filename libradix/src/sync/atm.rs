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

use {
    core::{fmt, ops::Deref, sync::atomic::Ordering},
    crossbeam_epoch::{Atomic as CBAtomic, Pointable, Pointer},
};
// re-export for the tree walks
pub use crossbeam_epoch::{unprotected as upin, CompareExchangeError, Guard, Owned, Shared};

pub(crate) const ORD_RLX: Ordering = Ordering::Relaxed;
pub(crate) const ORD_ACQ: Ordering = Ordering::Acquire;
pub(crate) const ORD_REL: Ordering = Ordering::Release;

type CxResult<'g, T, P> = Result<Shared<'g, T>, CompareExchangeError<'g, T, P>>;

/// A typed atomic slot cell. Since every slot in a radix node is monotonic (installed at
/// most once, cleared only by whole-tree teardown), readers never need more than the
/// acquire load these helpers hand out.
pub struct Atomic<T> {
    a: CBAtomic<T>,
}

// the derive is stupid, it will enforce a debug constraint on T
impl<T> fmt::Debug for Atomic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.a)
    }
}

impl<T: Pointable> Atomic<T> {
    #[inline(always)]
    pub(crate) const fn null() -> Self {
        Self {
            a: CBAtomic::null(),
        }
    }
    /// Install-or-lose: release on success so the pointee publishes with the pointer,
    /// relaxed on failure since losers re-read with [`Self::ld_acq`] anyway
    #[inline(always)]
    pub(crate) fn cx_rel<'g, P>(&self, o: Shared<'g, T>, n: P, g: &'g Guard) -> CxResult<'g, T, P>
    where
        P: Pointer<T>,
    {
        self.a.compare_exchange(o, n, ORD_REL, ORD_RLX, g)
    }
    #[inline(always)]
    pub(crate) fn st_rel<P>(&self, n: P)
    where
        P: Pointer<T>,
    {
        self.a.store(n, ORD_REL)
    }
    #[inline(always)]
    pub(crate) fn ld<'g>(&self, o: Ordering, g: &'g Guard) -> Shared<'g, T> {
        self.a.load(o, g)
    }
    #[inline(always)]
    pub(crate) fn ld_acq<'g>(&self, g: &'g Guard) -> Shared<'g, T> {
        self.ld(ORD_ACQ, g)
    }
}

impl<T> Deref for Atomic<T> {
    type Target = CBAtomic<T>;
    fn deref(&self) -> &Self::Target {
        &self.a
    }
}
