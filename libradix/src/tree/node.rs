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

use {
    crate::sync::atm::{upin, Atomic},
    parking_lot::{Mutex, MutexGuard},
};

/// A single tree node: a mutex plus a fixed buffer of slot cells. One record serves every
/// variant (the lock is a single byte; variants that never touch it lose nothing), the same
/// way the original flexible-array node carried its lock everywhere.
///
/// The slot buffer is sized exactly to the tree fanout at creation and never grows. Interior
/// nodes hold child pointers; the bottom level holds value pointers. Both are strictly
/// monotonic: empty, then installed, then untouched until teardown.
#[derive(Debug)]
pub(crate) struct Node<T> {
    lck: Mutex<()>,
    slots: Slots<T>,
}

#[derive(Debug)]
pub(crate) enum Slots<T> {
    Branch(Box<[Atomic<Node<T>>]>),
    Leaf(Box<[Atomic<T>]>),
}

impl<T> Node<T> {
    /// New node for the level that is `levels_left` levels above the bottom of the tree
    /// (`levels_left == 1` is the leaf level, whose slots store values)
    pub(crate) fn new_for(levels_left: u32, fanout: usize) -> Self {
        debug_assert!(levels_left >= 1, "logic, node below the leaf level");
        let slots = if levels_left == 1 {
            Slots::Leaf((0..fanout).map(|_| Atomic::null()).collect())
        } else {
            Slots::Branch((0..fanout).map(|_| Atomic::null()).collect())
        };
        Self {
            lck: Mutex::new(()),
            slots,
        }
    }
    #[inline(always)]
    pub(crate) fn branch(&self) -> &[Atomic<Node<T>>] {
        match &self.slots {
            Slots::Branch(children) => children,
            Slots::Leaf(_) => unreachable!("logic, branch access on a leaf node"),
        }
    }
    #[inline(always)]
    pub(crate) fn leaf(&self) -> &[Atomic<T>] {
        match &self.slots {
            Slots::Leaf(values) => values,
            Slots::Branch(_) => unreachable!("logic, leaf access on a branch node"),
        }
    }
    #[inline(always)]
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        self.lck.lock()
    }
    /// Post-order release of everything reachable from this node's slots. The node itself
    /// is dropped by whoever owns it.
    ///
    /// ## Safety
    /// Caller must have exclusive access to the tree (no readers, no writers)
    pub(crate) unsafe fn release_slots(&self) {
        let g = upin();
        match &self.slots {
            Slots::Branch(children) => {
                for slot in children.iter() {
                    let child = slot.ld_acq(g);
                    if !child.is_null() {
                        child.deref().release_slots();
                        drop(child.into_owned());
                    }
                }
            }
            Slots::Leaf(values) => {
                for slot in values.iter() {
                    let value = slot.ld_acq(g);
                    if !value.is_null() {
                        drop(value.into_owned());
                    }
                }
            }
        }
    }
}
