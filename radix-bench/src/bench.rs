/*
 * Created on Mon Mar 18 2024
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
    crate::{
        cli::Cli,
        error::{BResult, Error},
        report::RunReport,
    },
    devtimer::SimpleTimer,
    libradix::{sync::Backoff, DynTree, VariantId},
    rand::{rngs::StdRng, Rng, SeedableRng},
    std::{
        sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering},
        thread,
    },
};

/// key generation always starts here, so two invocations race over the same key streams
const KEY_SEED: u64 = 0;

/// What the tool is asked to do. Built from the CLI, validated here
#[derive(Debug)]
pub struct BenchConfig {
    pub variant: VariantId,
    pub bits: u32,
    pub radix: u32,
    pub keys: usize,
    pub lookups: usize,
    pub threads: usize,
    pub runs: usize,
}

impl BenchConfig {
    pub fn new(cli: &Cli) -> BResult<Self> {
        if cli.threads == 0 {
            return Err(Error::Config(
                "at least one worker thread is required".into(),
            ));
        }
        if cli.runs == 0 {
            return Err(Error::Config("at least one run is required".into()));
        }
        Ok(Self {
            variant: VariantId::try_from_name(&cli.variant)?,
            bits: cli.bits,
            radix: cli.radix,
            keys: cli.keys,
            lookups: cli.lookups,
            threads: cli.threads,
            runs: cli.runs,
        })
    }
    /// Number of keys actually inserted; the key space caps the request. This also bounds
    /// the random lookup range, so the race only asks for keys the oracle knows about
    fn insert_range(&self) -> usize {
        let key_max = if self.bits >= u64::BITS {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        };
        self.keys.min(key_max as usize)
    }
}

#[inline(always)]
fn addr(r: &u64) -> usize {
    r as *const u64 as usize
}

/// Run the whole test the configured number of times, each round on a fresh tree, and
/// report the summed lookup time
pub fn run_bench(config: &BenchConfig) -> BResult<RunReport> {
    let mut rng = StdRng::seed_from_u64(KEY_SEED);
    let mut elapsed = 0.0;
    for run in 0..config.runs {
        info!("run {}/{}", run + 1, config.runs);
        elapsed += run_round(config, &mut rng)?;
    }
    Ok(RunReport::new(config, elapsed))
}

/// Prefill a fresh tree single-threaded against a shadow oracle, then race the configured
/// number of worker threads over pure lookups and time that window alone.
///
/// Two kinds of violation can surface: a find_or_create that disagrees with the oracle
/// during prefill (kind 1) and a find that disagrees during the race (kind 2). Workers
/// bail out at the first mismatch
fn run_round(config: &BenchConfig, rng: &mut StdRng) -> BResult<f64> {
    let tree: Box<dyn DynTree<u64>> = config.variant.open(config.bits, config.radix)?;
    info!(
        "testing tree: variant={}, bits={}, radix={}, height={}",
        config.variant,
        config.bits,
        config.radix,
        tree.shape().max_height()
    );
    if !tree.mt_write_safe() {
        debug!(
            "`{}` writers are unsynchronized; only the exclusive prefill writes",
            config.variant
        );
    }

    // shadow oracle: value address per key, 0 = absent
    let range = config.insert_range();
    let mut shadow: Vec<usize> = vec![0; range];
    for k in 0..range {
        let r = addr(tree.find_or_create(k as u64, &|key| key));
        if shadow[k] != 0 && shadow[k] != r {
            return Err(Error::Correctness(1));
        }
        shadow[k] = r;
    }
    if tree.len() != range {
        return Err(Error::Correctness(1));
    }
    info!("prefilled {} keys", range);

    // keygen runs off the shared stream, so every round races different keys; with
    // nothing inserted there is nothing worth asking for
    let lookups = if range == 0 { 0 } else { config.lookups };
    let thread_keys: Vec<Vec<u64>> = (0..config.threads)
        .map(|_| (0..lookups).map(|_| rng.gen_range(0..range as u64)).collect())
        .collect();

    // every worker checks in on the ready counter and spins on the start flag, so the
    // timed window covers the lookups alone, not thread spawn
    let n_ready = AtomicUsize::new(0);
    let start = AtomicBool::new(false);
    let err_flag = AtomicU8::new(0);
    let mut dt = SimpleTimer::new();
    info!(
        "racing {} threads x {} lookups on `{}`",
        config.threads, lookups, config.variant
    );
    thread::scope(|s| {
        let tree = &tree;
        let shadow = &shadow;
        let n_ready = &n_ready;
        let start = &start;
        let err_flag = &err_flag;
        let workers: Vec<_> = thread_keys
            .iter()
            .map(|chunk| {
                s.spawn(move || {
                    n_ready.fetch_add(1, Ordering::AcqRel);
                    let backoff = Backoff::new();
                    while !start.load(Ordering::Acquire) {
                        backoff.snooze();
                    }
                    for &key in chunk {
                        let found = tree.find(key).map(addr).unwrap_or(0);
                        if found != shadow[key as usize] {
                            err_flag.store(2, Ordering::Relaxed);
                            break;
                        }
                    }
                })
            })
            .collect();
        let backoff = Backoff::new();
        while n_ready.load(Ordering::Acquire) != config.threads {
            backoff.snooze();
        }
        dt.start();
        start.store(true, Ordering::Release);
        for worker in workers {
            worker.join().unwrap();
        }
        dt.stop();
    });
    let flag = err_flag.load(Ordering::Relaxed);
    if flag != 0 {
        return Err(Error::Correctness(flag));
    }
    let elapsed = dt.time_in_nanos().unwrap() as f64 / 1_000_000_000.0;
    info!("lookup race done in {:.6}s", elapsed);
    Ok(elapsed)
}

#[cfg(test)]
mod tests {
    use {
        super::{run_bench, BenchConfig},
        crate::{cli::Cli, error::Error},
        libradix::{RadixError, VariantId},
    };

    fn cli(variant: &str) -> Cli {
        Cli {
            bits: 12,
            radix: 3,
            keys: 500,
            lookups: 300,
            threads: 4,
            runs: 1,
            variant: variant.to_owned(),
            json: false,
            help: None,
        }
    }

    #[test]
    fn race_stays_clean_on_every_variant() {
        for v in VariantId::ALL {
            let config = BenchConfig::new(&cli(v.name())).unwrap();
            let report = run_bench(&config).unwrap();
            assert!(report.elapsed_secs() > 0.0);
        }
    }

    #[test]
    fn empty_work_is_still_a_run() {
        for (keys, lookups) in [(0, 300), (500, 0), (0, 0)] {
            let mut c = cli("lockless");
            c.keys = keys;
            c.lookups = lookups;
            let config = BenchConfig::new(&c).unwrap();
            run_bench(&config).unwrap();
        }
    }

    #[test]
    fn unknown_variant_is_a_tree_error() {
        let e = BenchConfig::new(&cli("lock_galaxy")).unwrap_err();
        assert!(matches!(e, Error::Tree(RadixError::UnknownVariant)));
        assert_eq!(e.exit_code(), -1);
    }

    #[test]
    fn zero_threads_rejected() {
        let mut c = cli("sequential");
        c.threads = 0;
        assert_eq!(BenchConfig::new(&c).unwrap_err().exit_code(), -1);
    }

    #[test]
    fn zero_runs_rejected() {
        let mut c = cli("sequential");
        c.runs = 0;
        assert_eq!(BenchConfig::new(&c).unwrap_err().exit_code(), -1);
    }

    #[test]
    fn default_workload_stays_clean() {
        // the tool's stock workload: 30k prefill, then 4 threads x 60k lookups
        for v in ["sequential", "lockless"] {
            let mut c = cli(v);
            c.bits = 16;
            c.radix = 4;
            c.keys = 30_000;
            c.lookups = 60_000;
            let config = BenchConfig::new(&c).unwrap();
            let report = run_bench(&config).unwrap();
            assert!(report.elapsed_secs() > 0.0);
        }
    }

    #[test]
    fn summed_runs() {
        let mut c = cli("lock_node");
        c.runs = 3;
        let config = BenchConfig::new(&c).unwrap();
        let report = run_bench(&config).unwrap();
        assert!(report.elapsed_secs() > 0.0);
    }
}
