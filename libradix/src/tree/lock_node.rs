/*
 * Created on Fri Mar 15 2024
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
    super::{
        node::Node,
        probe::{Ensure, Lookup, Probe, WRITEMODE_READNX},
        TreeBase, TreeShape, TreeSpec, ValueFactory,
    },
    crate::{
        error::RadixResult,
        sync::atm::{upin, Owned},
    },
};

/// Hand-over-hand locking on each node's own mutex. A thread holds a node's lock while it
/// reads or installs one of its slots, releases it once the child is observed, and only
/// then takes the child's lock. Locks are acquired strictly root-to-leaf, so no deadlock.
/// A freshly installed child's mutex is part of the node value published by the release
/// store, so it is always initialized before any other thread can see it
#[derive(Debug)]
pub struct LockNodeTree<T> {
    base: TreeBase<T>,
}

impl<T> LockNodeTree<T> {
    fn probe<'t, P: Probe<T>>(&'t self, key: u64, p: P) -> P::Ret<'t> {
        let shape = self.base.shape();
        let g = unsafe {
            // UNSAFE(@ohsayan): slots are monotonic; nothing is ever reclaimed while shared
            upin()
        };
        let mut cur = self.base.root();
        let mut levels_left = shape.max_height();
        while levels_left > 1 {
            let held = cur.lock();
            let slot = &cur.branch()[shape.slot_of(key, levels_left)];
            let node = slot.ld_acq(g);
            let next = if node.is_null() {
                if P::WMODE == WRITEMODE_READNX {
                    return P::nx_ret();
                }
                let new = Owned::new(Node::new_for(levels_left - 1, shape.fanout()))
                    .into_shared(g);
                slot.st_rel(new);
                unsafe {
                    // UNSAFE(@ohsayan): we just installed it under this node's lock
                    new.deref()
                }
            } else {
                unsafe {
                    // UNSAFE(@ohsayan): nullck above; published with release
                    node.deref()
                }
            };
            // child observed, let go of the parent
            drop(held);
            cur = next;
            levels_left -= 1;
        }
        let _held = cur.lock();
        let slot = &cur.leaf()[shape.slot_of(key, 1)];
        let value = slot.ld_acq(g);
        if !value.is_null() {
            return P::ex_ret(unsafe {
                // UNSAFE(@ohsayan): nullck above; values live until teardown
                value.deref()
            });
        }
        if P::WMODE == WRITEMODE_READNX {
            return P::nx_ret();
        }
        let new = Owned::new(p.nx_value(key)).into_shared(g);
        slot.st_rel(new);
        self.base.incr_len();
        P::ex_ret(unsafe {
            // UNSAFE(@ohsayan): we just installed it under the leaf node's lock
            new.deref()
        })
    }
}

impl<T> TreeSpec<T> for LockNodeTree<T> {
    const NAME: &'static str = "lock_node";
    const MT_WRITE_SAFE: bool = true;
    fn tr_init(bits: u32, radix: u32) -> RadixResult<Self> {
        Ok(Self {
            base: TreeBase::new(bits, radix)?,
        })
    }
    fn tr_find_or_create<'t>(&'t self, key: u64, with: &ValueFactory<'_, T>) -> &'t T {
        self.probe(key, Ensure::new(with))
    }
    fn tr_find(&self, key: u64) -> Option<&T> {
        self.probe(key, Lookup)
    }
    fn tr_len(&self) -> usize {
        self.base.len()
    }
    fn tr_shape(&self) -> &TreeShape {
        self.base.shape()
    }
}
