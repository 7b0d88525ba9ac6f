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

//! # libradix
//!
//! An in-memory radix tree keyed by unsigned integers, in five renditions that share one
//! operational contract and differ only in how racing writers are serialized:
//!
//! - [`tree::SeqTree`]: no synchronization (exclusive-writer baseline)
//! - [`tree::LockLevelTree`]: one mutex per tree depth
//! - [`tree::LockNodeTree`]: one mutex per node, hand-over-hand
//! - [`tree::LockSubtreeTree`]: one mutex per top-level subtree
//! - [`tree::LocklessTree`]: CAS installation, wait-free readers
//!
//! Every variant maps a `u64` key to a value allocated on first reference by a
//! caller-supplied factory. Slots are strictly monotonic (empty to installed, never back),
//! which is what lets readers follow a published pointer with nothing more than an acquire
//! load. Values live until the tree itself is dropped; there is no per-key removal.

#![deny(unreachable_patterns)]

mod error;
pub mod sync;
pub mod tree;

pub use {
    error::{RadixError, RadixResult},
    tree::{DynTree, TreeShape, TreeSpec, ValueFactory, VariantId},
};
