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
        LockLevelTree, LockNodeTree, LockSubtreeTree, LocklessTree, SeqTree, TreeShape,
        TreeSpec, VariantId,
    },
    crate::error::RadixError,
    rand::{rngs::StdRng, Rng, SeedableRng},
    std::{
        collections::{HashMap, HashSet},
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, RwLock,
        },
        thread,
    },
};

fn addr<T>(r: &T) -> usize {
    r as *const T as usize
}

/// A value that reports its own death, for teardown and loser-reclaim accounting
struct Token {
    key: u64,
    drops: Arc<AtomicUsize>,
}

impl Drop for Token {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::Relaxed);
    }
}

// single-threaded behavior, common to all variants

fn miss_then_hit<S: TreeSpec<u64>>() {
    let t = S::tr_init(6, 2).unwrap();
    assert!(t.tr_find(39).is_none());
    let p = addr(t.tr_find_or_create(39, &|k| k));
    assert_eq!(addr(t.tr_find(39).unwrap()), p);
    assert_eq!(*t.tr_find(39).unwrap(), 39);
}

fn dense_keys_distinct_values<S: TreeSpec<u64>>() {
    let t = S::tr_init(8, 4).unwrap();
    assert_eq!(t.tr_len(), 0);
    let refs: Vec<usize> = (0..255).map(|k| addr(t.tr_find_or_create(k, &|k| k))).collect();
    assert_eq!(t.tr_len(), 255);
    assert_eq!(refs.iter().collect::<HashSet<_>>().len(), 255);
    for (k, r) in refs.iter().enumerate() {
        assert_eq!(addr(t.tr_find(k as u64).unwrap()), *r);
        assert_eq!(*t.tr_find(k as u64).unwrap(), k as u64);
    }
}

fn boundary_shapes<S: TreeSpec<u64>>() {
    // (bits, radix): single-bit tree, one-level tree, partially used top level,
    // radix == bits single node
    for (bits, radix) in [(1, 1), (4, 4), (7, 4), (3, 2), (16, 16)] {
        let t = S::tr_init(bits, radix).unwrap();
        assert_eq!(t.tr_shape().max_height(), (bits + radix - 1) / radix);
        let key_max = (1u64 << bits) - 1;
        let keys: HashSet<u64> = [0, key_max / 2, key_max].into_iter().collect();
        for &k in &keys {
            assert!(t.tr_find(k).is_none());
            let p = addr(t.tr_find_or_create(k, &|k| k));
            assert_eq!(addr(t.tr_find(k).unwrap()), p);
        }
        assert_ne!(
            addr(t.tr_find(0).unwrap()),
            addr(t.tr_find(key_max).unwrap())
        );
    }
}

fn wide_keys<S: TreeSpec<u64>>() {
    let t = S::tr_init(64, 8).unwrap();
    assert_eq!(t.tr_shape().max_height(), 8);
    let k = 0xABCDEF1234ABCDEF;
    let p = addr(t.tr_find_or_create(k, &|k| k));
    assert_eq!(addr(t.tr_find(k).unwrap()), p);
    // differs only in the topmost byte, so the paths split at the root
    let k2 = 0x01CDEF1234ABCDEF;
    let p2 = addr(t.tr_find_or_create(k2, &|k| k));
    assert_ne!(p, p2);
}

fn high_bits_ignored<S: TreeSpec<u64>>() {
    // 6 tracked bits; bit 6 and above fall off the top of the root shift
    let t = S::tr_init(6, 2).unwrap();
    let p = addr(t.tr_find_or_create(39, &|k| k));
    assert_eq!(addr(t.tr_find(39 + (1 << 6)).unwrap()), p);
    assert_eq!(addr(t.tr_find_or_create(39 + (1 << 20), &|k| k)), p);
}

fn teardown_releases_everything<S: TreeSpec<Token>>() {
    const KEYS: u64 = 512;
    let created = Arc::new(AtomicUsize::new(0));
    let dropped = Arc::new(AtomicUsize::new(0));
    let t = S::tr_init(10, 3).unwrap();
    {
        let created = created.clone();
        let dropped = dropped.clone();
        let with = move |key| {
            created.fetch_add(1, Ordering::Relaxed);
            Token {
                key,
                drops: dropped.clone(),
            }
        };
        for k in 0..KEYS {
            assert_eq!(t.tr_find_or_create(k, &with).key, k);
        }
    }
    assert_eq!(created.load(Ordering::Relaxed), KEYS as usize);
    assert_eq!(dropped.load(Ordering::Relaxed), 0);
    drop(t);
    assert_eq!(dropped.load(Ordering::Relaxed), KEYS as usize);
}

fn bad_params<S: TreeSpec<u64> + std::fmt::Debug>() {
    assert_eq!(S::tr_init(0, 4).unwrap_err(), RadixError::InvalidParameter);
    assert_eq!(S::tr_init(4, 0).unwrap_err(), RadixError::InvalidParameter);
    assert_eq!(S::tr_init(16, 64).unwrap_err(), RadixError::InvalidParameter);
}

fn randomized_shape_churn<S: TreeSpec<u64>>() {
    let mut rng = StdRng::seed_from_u64(0);
    for _ in 0..8 {
        let bits = rng.gen_range(1..=12);
        let radix = rng.gen_range(1..=12);
        let t = S::tr_init(bits, radix).unwrap();
        let key_space = 1u64 << bits;
        let mut shadow: HashMap<u64, usize> = HashMap::new();
        for _ in 0..2048 {
            let k = rng.gen_range(0..key_space);
            let a = addr(t.tr_find_or_create(k, &|k| k));
            match shadow.get(&k) {
                Some(&prev) => assert_eq!(prev, a),
                None => {
                    shadow.insert(k, a);
                }
            }
        }
        for (k, a) in shadow {
            assert_eq!(addr(t.tr_find(k).unwrap()), a);
        }
    }
}

macro_rules! variant_suite {
    ($modname:ident, $u64tree:ty, $toktree:ty) => {
        mod $modname {
            use super::*;
            #[test]
            fn miss_then_hit() {
                super::miss_then_hit::<$u64tree>()
            }
            #[test]
            fn dense_keys_distinct_values() {
                super::dense_keys_distinct_values::<$u64tree>()
            }
            #[test]
            fn boundary_shapes() {
                super::boundary_shapes::<$u64tree>()
            }
            #[test]
            fn wide_keys() {
                super::wide_keys::<$u64tree>()
            }
            #[test]
            fn high_bits_ignored() {
                super::high_bits_ignored::<$u64tree>()
            }
            #[test]
            fn teardown_releases_everything() {
                super::teardown_releases_everything::<$toktree>()
            }
            #[test]
            fn bad_params() {
                super::bad_params::<$u64tree>()
            }
            #[test]
            fn randomized_shape_churn() {
                super::randomized_shape_churn::<$u64tree>()
            }
        }
    };
}

variant_suite!(seq, SeqTree<u64>, SeqTree<Token>);
variant_suite!(lock_level, LockLevelTree<u64>, LockLevelTree<Token>);
variant_suite!(lock_node, LockNodeTree<u64>, LockNodeTree<Token>);
variant_suite!(lock_subtree, LockSubtreeTree<u64>, LockSubtreeTree<Token>);
variant_suite!(lockless, LocklessTree<u64>, LocklessTree<Token>);

// multi-threaded behavior, synchronized variants only

const STORM_THREADS: usize = 16;
const STORM_KEYS: u64 = 4096;

fn spawn_storm<R: Send>(run: impl Fn(usize) -> R + Sync) -> Vec<R> {
    let token = RwLock::new(());
    let hold = token.write().unwrap();
    let mut results = Vec::with_capacity(STORM_THREADS);
    thread::scope(|s| {
        let threads: Vec<_> = (0..STORM_THREADS)
            .map(|tid| {
                let run = &run;
                let token = &token;
                thread::Builder::new()
                    .name(tid.to_string())
                    .spawn_scoped(s, move || {
                        let _token = token.read().unwrap();
                        run(tid)
                    })
                    .unwrap()
            })
            .collect();
        // rush everyone in at once; superb intercore traffic
        drop(hold);
        results = threads.into_iter().map(|t| t.join().unwrap()).collect();
    });
    results
}

fn concurrent_disjoint_inserts<S: TreeSpec<u64> + Send + Sync>() {
    let tree = S::tr_init(16, 4).unwrap();
    let per_thread = STORM_KEYS / STORM_THREADS as u64;
    let seen: Vec<(u64, usize)> = spawn_storm(|tid| {
        let start = tid as u64 * per_thread;
        (start..start + per_thread)
            .map(|k| (k, addr(tree.tr_find_or_create(k, &|k| k))))
            .collect::<Vec<_>>()
    })
    .into_iter()
    .flatten()
    .collect();
    let uniq: HashSet<usize> = seen.iter().map(|(_, a)| *a).collect();
    assert_eq!(uniq.len(), STORM_KEYS as usize);
    assert_eq!(tree.tr_len(), STORM_KEYS as usize);
    for (k, a) in seen {
        assert_eq!(addr(tree.tr_find(k).unwrap()), a);
        assert_eq!(*tree.tr_find(k).unwrap(), k);
    }
}

fn concurrent_overlapping_inserts<S: TreeSpec<u64> + Send + Sync>() {
    const KEYS: u64 = 1024;
    let tree = S::tr_init(16, 4).unwrap();
    let views: Vec<Vec<usize>> = spawn_storm(|tid| {
        // every thread covers the full range, each starting elsewhere to keep the
        // collision pressure up
        let off = tid as u64 * (KEYS / STORM_THREADS as u64);
        let mut view = vec![0; KEYS as usize];
        for i in 0..KEYS {
            let k = (off + i) % KEYS;
            view[k as usize] = addr(tree.tr_find_or_create(k, &|k| k));
        }
        view
    });
    assert_eq!(tree.tr_len(), KEYS as usize);
    for k in 0..KEYS as usize {
        let agreed = views[0][k];
        assert!(views.iter().all(|v| v[k] == agreed));
        assert_eq!(addr(tree.tr_find(k as u64).unwrap()), agreed);
    }
}

fn same_key_storm<S: TreeSpec<Token> + Send + Sync>(exactly_once: bool) {
    const KEY: u64 = 7;
    let created = AtomicUsize::new(0);
    let dropped = Arc::new(AtomicUsize::new(0));
    let tree = S::tr_init(16, 4).unwrap();
    let refs: Vec<usize> = spawn_storm(|_| {
        let with = |key| {
            created.fetch_add(1, Ordering::Relaxed);
            Token {
                key,
                drops: dropped.clone(),
            }
        };
        let r = tree.tr_find_or_create(KEY, &with);
        assert_eq!(r.key, KEY);
        addr(r)
    });
    assert!(refs.iter().all(|r| *r == refs[0]));
    assert_eq!(tree.tr_len(), 1);
    let c = created.load(Ordering::Relaxed);
    let d = dropped.load(Ordering::Relaxed);
    if exactly_once {
        assert_eq!(c, 1);
        assert_eq!(d, 0);
    } else {
        // the lockless rendition may run the factory once per loser, but every loser is
        // reclaimed before its call returns
        assert!(c >= 1 && c <= STORM_THREADS);
        assert_eq!(d, c - 1);
    }
    drop(tree);
    assert_eq!(
        dropped.load(Ordering::Relaxed),
        created.load(Ordering::Relaxed)
    );
}

macro_rules! mt_suite {
    ($modname:ident, $u64tree:ty, $toktree:ty, $exactly_once:expr) => {
        mod $modname {
            use super::*;
            #[test]
            fn concurrent_disjoint_inserts() {
                super::concurrent_disjoint_inserts::<$u64tree>()
            }
            #[test]
            fn concurrent_overlapping_inserts() {
                super::concurrent_overlapping_inserts::<$u64tree>()
            }
            #[test]
            fn same_key_storm() {
                super::same_key_storm::<$toktree>($exactly_once)
            }
        }
    };
}

mt_suite!(lock_level_mt, LockLevelTree<u64>, LockLevelTree<Token>, true);
mt_suite!(lock_node_mt, LockNodeTree<u64>, LockNodeTree<Token>, true);
mt_suite!(lock_subtree_mt, LockSubtreeTree<u64>, LockSubtreeTree<Token>, true);
mt_suite!(lockless_mt, LocklessTree<u64>, LocklessTree<Token>, false);

// shape and registry

#[test]
fn shape_heights() {
    for (bits, radix, height) in [
        (6, 2, 3),
        (7, 4, 2),
        (8, 4, 2),
        (16, 4, 4),
        (64, 8, 8),
        (1, 1, 1),
        (4, 4, 1),
    ] {
        assert_eq!(
            TreeShape::try_new(bits, radix).unwrap().max_height(),
            height
        );
    }
    // untrackable high bits are dropped, not rejected
    assert_eq!(
        TreeShape::try_new(80, 8).unwrap(),
        TreeShape::try_new(64, 8).unwrap()
    );
}

#[test]
fn shape_slot_walk() {
    // 39 = 0b100111 under radix 2: 10, 01, 11 from root to leaf
    let shape = TreeShape::try_new(6, 2).unwrap();
    assert_eq!(shape.slot_of(39, 3), 0b10);
    assert_eq!(shape.slot_of(39, 2), 0b01);
    assert_eq!(shape.slot_of(39, 1), 0b11);
}

#[test]
fn shape_rejects_nonsense() {
    assert!(TreeShape::try_new(0, 1).is_err());
    assert!(TreeShape::try_new(1, 0).is_err());
    assert!(TreeShape::try_new(64, 64).is_err());
}

#[test]
fn write_safety_metadata() {
    assert!(!SeqTree::<u64>::MT_WRITE_SAFE);
    assert!(LockLevelTree::<u64>::MT_WRITE_SAFE);
    assert!(LockNodeTree::<u64>::MT_WRITE_SAFE);
    assert!(LockSubtreeTree::<u64>::MT_WRITE_SAFE);
    assert!(LocklessTree::<u64>::MT_WRITE_SAFE);
}

#[test]
fn registry_roundtrip() {
    for v in VariantId::ALL {
        assert_eq!(VariantId::try_from_name(v.name()).unwrap(), v);
        assert_eq!(v.name().parse::<VariantId>().unwrap(), v);
    }
    assert_eq!(
        VariantId::try_from_name("lock_galaxy").unwrap_err(),
        RadixError::UnknownVariant
    );
}

#[test]
fn registry_open_dispatches() {
    for v in VariantId::ALL {
        let t = v.open::<u64>(8, 4).unwrap();
        assert_eq!(t.variant(), v.name());
        assert!(t.find(77).is_none());
        let p = addr(t.find_or_create(77, &|k| k));
        assert_eq!(addr(t.find(77).unwrap()), p);
        assert_eq!(t.len(), 1);
    }
}
