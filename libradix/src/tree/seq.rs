/*
 * Created on Thu Mar 14 2024
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

/// The unsynchronized baseline. Writers must be exclusive: racing `tr_find_or_create`
/// calls stay memory-safe (slots are atomic cells) but may install duplicate values for
/// one key, leaking every one the last store displaced. Read-only lookups may be shared
/// freely once the writer is done
#[derive(Debug)]
pub struct SeqTree<T> {
    base: TreeBase<T>,
}

impl<T> SeqTree<T> {
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
            let node = slot.ld_acq(g);
            cur = if node.is_null() {
                if P::WMODE == WRITEMODE_READNX {
                    return P::nx_ret();
                }
                let new = Owned::new(Node::new_for(levels_left - 1, shape.fanout()))
                    .into_shared(g);
                slot.st_rel(new);
                unsafe {
                    // UNSAFE(@ohsayan): we just installed it
                    new.deref()
                }
            } else {
                unsafe {
                    // UNSAFE(@ohsayan): nullck above; published with release
                    node.deref()
                }
            };
            levels_left -= 1;
        }
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
            // UNSAFE(@ohsayan): we just installed it
            new.deref()
        })
    }
}

impl<T> TreeSpec<T> for SeqTree<T> {
    const NAME: &'static str = "sequential";
    const MT_WRITE_SAFE: bool = false;
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
