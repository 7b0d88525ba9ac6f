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

mod lock_level;
mod lock_node;
mod lock_subtree;
mod lockless;
mod node;
mod probe;
mod seq;
#[cfg(test)]
mod tests;

use {
    crate::{
        error::{RadixError, RadixResult},
        sync::atm::ORD_RLX,
    },
    core::{fmt, str::FromStr, sync::atomic::AtomicUsize},
    log::trace,
    node::Node,
};

// re-exports
pub use {
    lock_level::LockLevelTree, lock_node::LockNodeTree, lock_subtree::LockSubtreeTree,
    lockless::LocklessTree, seq::SeqTree,
};

/// Produces the value stored at a key's leaf slot on first miss. The tree owns the result;
/// callers get `&T`s that stay valid until the tree is dropped
pub type ValueFactory<'a, T> = dyn Fn(u64) -> T + 'a;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Immutable shape parameters of a tree: bits consumed per level and the resulting height.
/// Computed once at init, read-only for the tree's lifetime
pub struct TreeShape {
    radix: u32,
    max_height: u32,
}

impl TreeShape {
    /// width of the key type; higher bits of `bits` are not trackable and are dropped
    pub const KEY_BITS: u32 = u64::BITS;
    /// a single level cannot consume the entire key width (the fanout would overflow the
    /// address space before the allocator ever saw it)
    pub const RADIX_MAX: u32 = Self::KEY_BITS - 1;
    pub fn try_new(bits: u32, radix: u32) -> RadixResult<Self> {
        if bits == 0 || radix == 0 || radix > Self::RADIX_MAX {
            return Err(RadixError::InvalidParameter);
        }
        // key bits beyond the key width are silently untracked
        let bits = bits.min(Self::KEY_BITS);
        Ok(Self {
            radix,
            max_height: (bits + radix - 1) / radix,
        })
    }
    #[inline(always)]
    pub const fn radix(&self) -> u32 {
        self.radix
    }
    #[inline(always)]
    pub const fn max_height(&self) -> u32 {
        self.max_height
    }
    #[inline(always)]
    pub const fn fanout(&self) -> usize {
        1 << self.radix
    }
    #[inline(always)]
    const fn mask(&self) -> u64 {
        (self.fanout() - 1) as u64
    }
    /// Slot index steering `key` at the node sitting `levels_left` levels above the bottom
    /// of the tree. `levels_left == max_height` is the root, `levels_left == 1` the leaf
    /// level (shift 0)
    #[inline(always)]
    pub fn slot_of(&self, key: u64, levels_left: u32) -> usize {
        debug_assert!(
            levels_left >= 1 && levels_left <= self.max_height,
            "logic, level off the tree"
        );
        ((key >> ((levels_left - 1) * self.radix)) & self.mask()) as usize
    }
}

/// Shape + root + live entry count. Every variant wraps one of these and adds its own
/// serialization state (or nothing at all)
#[derive(Debug)]
pub(crate) struct TreeBase<T> {
    shape: TreeShape,
    root: Node<T>,
    l: AtomicUsize,
}

impl<T> TreeBase<T> {
    pub(crate) fn new(bits: u32, radix: u32) -> RadixResult<Self> {
        let shape = TreeShape::try_new(bits, radix)?;
        trace!(
            "new tree: radix={}, height={}, fanout={}",
            shape.radix(),
            shape.max_height(),
            shape.fanout()
        );
        Ok(Self {
            root: Node::new_for(shape.max_height(), shape.fanout()),
            shape,
            l: AtomicUsize::new(0),
        })
    }
    #[inline(always)]
    pub(crate) fn shape(&self) -> &TreeShape {
        &self.shape
    }
    #[inline(always)]
    pub(crate) fn root(&self) -> &Node<T> {
        &self.root
    }
    #[inline(always)]
    pub(crate) fn incr_len(&self) {
        self.l.fetch_add(1, ORD_RLX);
    }
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.l.load(ORD_RLX)
    }
}

impl<T> Drop for TreeBase<T> {
    fn drop(&mut self) {
        unsafe {
            // UNSAFE(@ohsayan): we're exclusive (&mut), so every publisher happened-before us
            self.root.release_slots()
        }
    }
}

/// The contract every tree variant implements. Teardown is not a method: dropping the tree
/// releases all nodes and stored values post-order
pub trait TreeSpec<T>: Sized {
    /// canonical name, used by the registry
    const NAME: &'static str;
    /// can lookups race in-flight writers on this variant?
    const MT_WRITE_SAFE: bool;
    /// Initialize a tree tracking `bits`-bit keys, consuming `radix` bits per level
    fn tr_init(bits: u32, radix: u32) -> RadixResult<Self>;
    /// Return the value stored for `key`, installing `with(key)` at the leaf slot on first
    /// miss. The returned reference is the one actually installed, never a transient
    fn tr_find_or_create<'t>(&'t self, key: u64, with: &ValueFactory<'_, T>) -> &'t T;
    /// Pure lookup; no factory, nothing is installed
    fn tr_find(&self, key: u64) -> Option<&T>;
    /// Number of values installed so far
    fn tr_len(&self) -> usize;
    fn tr_shape(&self) -> &TreeShape;
}

/// Object-safe facade over the variant set, for by-name dispatch in drivers that pick the
/// implementation at runtime
pub trait DynTree<T>: Send + Sync {
    fn find_or_create<'t>(&'t self, key: u64, with: &ValueFactory<'_, T>) -> &'t T;
    fn find(&self, key: u64) -> Option<&T>;
    fn len(&self) -> usize;
    fn shape(&self) -> &TreeShape;
    fn variant(&self) -> &'static str;
    fn mt_write_safe(&self) -> bool;
}

impl<T, S> DynTree<T> for S
where
    S: TreeSpec<T> + Send + Sync,
{
    fn find_or_create<'t>(&'t self, key: u64, with: &ValueFactory<'_, T>) -> &'t T {
        self.tr_find_or_create(key, with)
    }
    fn find(&self, key: u64) -> Option<&T> {
        self.tr_find(key)
    }
    fn len(&self) -> usize {
        self.tr_len()
    }
    fn shape(&self) -> &TreeShape {
        self.tr_shape()
    }
    fn variant(&self) -> &'static str {
        S::NAME
    }
    fn mt_write_safe(&self) -> bool {
        S::MT_WRITE_SAFE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
/// The variant registry. One entry per synchronization discipline
pub enum VariantId {
    Sequential,
    LockLevel,
    LockNode,
    LockSubtree,
    Lockless,
}

impl VariantId {
    pub const ALL: [Self; 5] = [
        Self::Sequential,
        Self::LockLevel,
        Self::LockNode,
        Self::LockSubtree,
        Self::Lockless,
    ];
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential => <SeqTree<()> as TreeSpec<()>>::NAME,
            Self::LockLevel => <LockLevelTree<()> as TreeSpec<()>>::NAME,
            Self::LockNode => <LockNodeTree<()> as TreeSpec<()>>::NAME,
            Self::LockSubtree => <LockSubtreeTree<()> as TreeSpec<()>>::NAME,
            Self::Lockless => <LocklessTree<()> as TreeSpec<()>>::NAME,
        }
    }
    pub fn try_from_name(name: &str) -> RadixResult<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == name)
            .ok_or(RadixError::UnknownVariant)
    }
    /// Construct a boxed tree of this variant
    pub fn open<T: Send + Sync + 'static>(
        self,
        bits: u32,
        radix: u32,
    ) -> RadixResult<Box<dyn DynTree<T>>> {
        Ok(match self {
            Self::Sequential => Box::new(SeqTree::tr_init(bits, radix)?),
            Self::LockLevel => Box::new(LockLevelTree::tr_init(bits, radix)?),
            Self::LockNode => Box::new(LockNodeTree::tr_init(bits, radix)?),
            Self::LockSubtree => Box::new(LockSubtreeTree::tr_init(bits, radix)?),
            Self::Lockless => Box::new(LocklessTree::tr_init(bits, radix)?),
        })
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VariantId {
    type Err = RadixError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_name(s)
    }
}
