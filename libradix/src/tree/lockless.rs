/*
 * Created on Sat Mar 16 2024
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
        sync::atm::{upin, CompareExchangeError, Owned},
    },
};

/// No locks anywhere. Writers install interior nodes (and leaf values) by CAS-ing the
/// empty slot; whoever loses the race drops its speculative allocation on the spot and
/// re-reads the winner's. Readers are wait-free: acquire-load and follow, nothing else.
/// The cost of the bargain is that the value factory can run more than once for one key
/// under contention, with every non-retained result freed before the losing call returns
#[derive(Debug)]
pub struct LocklessTree<T> {
    base: TreeBase<T>,
}

impl<T> LocklessTree<T> {
    fn probe<'t, P: Probe<T>>(&'t self, key: u64, p: P) -> P::Ret<'t> {
        let shape = self.base.shape();
        let g = unsafe {
            // UNSAFE(@ohsayan): slots are monotonic; nothing is ever reclaimed while shared
            upin()
        };
        let mut cur = self.base.root();
        let mut levels_left = shape.max_height();
        while levels_left > 1 {
            let slot = &cur.branch()[shape.slot_of(key, levels_left)];
            let node = loop {
                let node = slot.ld_acq(g);
                if !node.is_null() {
                    break node;
                }
                if P::WMODE == WRITEMODE_READNX {
                    return P::nx_ret();
                }
                let new = Owned::new(Node::new_for(levels_left - 1, shape.fanout()));
                match slot.cx_rel(node, new, g) {
                    Ok(installed) => break installed,
                    Err(CompareExchangeError { new, .. }) => {
                        // lost the race: reclaim our speculative node, then re-read the
                        // winner's
                        drop(new)
                    }
                }
            };
            cur = unsafe {
                // UNSAFE(@ohsayan): non-null; either ours or acquired from the winner's
                // release
                node.deref()
            };
            levels_left -= 1;
        }
        let slot = &cur.leaf()[shape.slot_of(key, 1)];
        let value = loop {
            let value = slot.ld_acq(g);
            if !value.is_null() {
                break value;
            }
            if P::WMODE == WRITEMODE_READNX {
                return P::nx_ret();
            }
            let new = Owned::new(p.nx_value(key));
            match slot.cx_rel(value, new, g) {
                Ok(installed) => {
                    self.base.incr_len();
                    break installed;
                }
                Err(CompareExchangeError { new, .. }) => {
                    // the factory ran for nothing; free the loser before anyone can see it
                    drop(new)
                }
            }
        };
        P::ex_ret(unsafe {
            // UNSAFE(@ohsayan): non-null; values live until teardown
            value.deref()
        })
    }
}

impl<T> TreeSpec<T> for LocklessTree<T> {
    const NAME: &'static str = "lockless";
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
