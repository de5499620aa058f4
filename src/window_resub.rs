//! Windowed resubstitution.
//!
//! A variant of [refactoring][crate::refactor] that lets the engine reuse
//! gates already present in the network. Around every root it builds a
//! *window*: a reconvergence-driven cut, the cone between the cut and the
//! root, and the gates hanging off that cone whose fan-ins all lie inside the
//! window (the root's transitive fan-out never qualifies). Window gates outside
//! the root's fanout-free cone become *divisors*, next to the cut leaves, and
//! the engine may build the root's function on top of them.
//!
//! # Examples
//!
//! ```
//! use mig_rs::mig::Mig;
//! use mig_rs::network::{Network, NetworkMut};
//! use mig_rs::window_resub::{window_mig_enumerative_resub, WindowResubParams};
//!
//! let mut mig = Mig::new();
//! let a = mig.create_pi();
//! let b = mig.create_pi();
//! let c = mig.create_pi();
//! let x = mig.create_and(a, b);
//! let t = mig.create_and(a, c);
//! let r = mig.create_and(t, b);
//! mig.create_po(x);
//! mig.create_po(r);
//! assert_eq!(mig.num_gates(), 3);
//!
//! // r = x & c reuses the existing gate x.
//! let stats = window_mig_enumerative_resub(&mut mig, &WindowResubParams::default());
//! assert_eq!(mig.num_gates(), 2);
//! assert_eq!(stats.num_replacements, 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::cut::CutManager;
use crate::mffc::mffc_nodes;
use crate::network::{FanoutNetwork, NetworkMut};
use crate::refactor::{commit, timed};
use crate::resyn::{EnumerativeResynStats, MigEnumerativeResyn};
use crate::signal::Signal;
use crate::simulation::simulate_window;
use crate::truth_table::TruthTable;
use crate::types::Node;

#[derive(Debug, Clone)]
pub struct WindowResubParams {
    /// Maximum number of cut leaves. Must not exceed [`TruthTable::MAX_VARS`].
    pub max_pis: usize,
    /// Maximum number of window gates, the cone included.
    pub max_divisors: usize,
    /// Maximum number of gates a replacement may insert.
    pub max_inserts: usize,
    /// Gates with a larger fan-out are not used as roots.
    pub skip_fanout_limit_for_roots: u32,
    /// Gates with a larger fan-out are not added to windows.
    pub skip_fanout_limit_for_divisors: u32,
    /// Complement divisors and targets whose value under the all-zero
    /// assignment is 1.
    pub normalize: bool,
    /// Log every processed node.
    pub progress: bool,
    /// Log the statistics when done.
    pub verbose: bool,
}

impl Default for WindowResubParams {
    fn default() -> Self {
        Self {
            max_pis: 8,
            max_divisors: 150,
            max_inserts: 2,
            skip_fanout_limit_for_roots: 1000,
            skip_fanout_limit_for_divisors: 100,
            normalize: false,
            progress: false,
            verbose: false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct WindowResubStats {
    pub time_total: Duration,
    pub time_cuts: Duration,
    pub time_divs: Duration,
    pub time_mffc: Duration,
    pub time_sim: Duration,
    pub time_resyn: Duration,
    pub time_commit: Duration,
    /// Number of windows handed to the engine.
    pub num_windows: u64,
    /// Sum of cut sizes over all windows.
    pub num_leaves: u64,
    /// Sum of divisor counts (leaves included) over all windows.
    pub num_divisors: u64,
    pub sum_mffc_size: u64,
    /// Sum of `mffc - inserted` over all replacements.
    pub estimated_gain: u64,
    pub num_replacements: u64,
    /// Gates skipped because they were dead or had too many fan-outs.
    pub num_skipped: u64,
    pub resyn: EnumerativeResynStats,
}

impl WindowResubStats {
    pub fn report(&self) {
        let windows = self.num_windows.max(1) as f64;
        info!("[i] total time      ({:>5.2} secs)", self.time_total.as_secs_f64());
        info!("[i]   cut time      ({:>5.2} secs)", self.time_cuts.as_secs_f64());
        info!("[i]   divs time     ({:>5.2} secs)", self.time_divs.as_secs_f64());
        info!("[i]   mffc time     ({:>5.2} secs)", self.time_mffc.as_secs_f64());
        info!("[i]   sim time      ({:>5.2} secs)", self.time_sim.as_secs_f64());
        info!("[i]   resyn time    ({:>5.2} secs)", self.time_resyn.as_secs_f64());
        info!("[i]   commit time   ({:>5.2} secs)", self.time_commit.as_secs_f64());
        info!(
            "[i] windows = {}, avg. leaves = {:.2}, avg. divisors = {:.2}, avg. mffc = {:.2}",
            self.num_windows,
            self.num_leaves as f64 / windows,
            self.num_divisors as f64 / windows,
            self.sum_mffc_size as f64 / windows
        );
        info!(
            "[i] replacements = {}, skipped = {}, est. gain = {}",
            self.num_replacements, self.num_skipped, self.estimated_gain
        );
        self.resyn.report();
    }
}

/// Collects the gates of a window: the cone between the leaves and the root,
/// then gates whose fan-ins are all constants, leaves or already collected.
pub struct DivisorCollector {
    max_divisors: usize,
    skip_fanout_limit: u32,
    visited: HashSet<Node>,
    in_window: HashSet<Node>,
}

impl DivisorCollector {
    pub fn new(max_divisors: usize, skip_fanout_limit: u32) -> Self {
        Self {
            max_divisors,
            skip_fanout_limit,
            visited: HashSet::new(),
            in_window: HashSet::new(),
        }
    }

    /// Window gates of `root` over `leaves`, each after its fan-ins. The root
    /// itself is not included. The cone is always collected in full; further
    /// gates are added while the total stays below `max_divisors`.
    pub fn collect<N: FanoutNetwork>(&mut self, ntk: &N, root: Node, leaves: &[Node]) -> Vec<Node> {
        self.visited.clear();
        self.in_window.clear();
        self.in_window.extend(leaves.iter().copied());

        let mut gates = Vec::new();
        let mut stack = vec![(root, false)];
        while let Some((n, expanded)) = stack.pop() {
            if expanded {
                if n != root {
                    self.in_window.insert(n);
                    gates.push(n);
                }
                continue;
            }
            if self.in_window.contains(&n) || !ntk.is_gate(n) || !self.visited.insert(n) {
                continue;
            }
            stack.push((n, true));
            for f in ntk.fanins(n) {
                stack.push((f.node(), false));
            }
        }

        // The root never joins the window, so neither does its fan-out.
        let mut frontier: Vec<Node> = leaves.iter().chain(&gates).copied().collect();
        let mut i = 0;
        while i < frontier.len() && gates.len() < self.max_divisors {
            let n = frontier[i];
            i += 1;
            for &p in ntk.fanouts(n) {
                if gates.len() >= self.max_divisors {
                    break;
                }
                if p == root || ntk.is_dead(p) || self.in_window.contains(&p) {
                    continue;
                }
                if ntk.fanout_size(p) > self.skip_fanout_limit {
                    continue;
                }
                let supported = ntk
                    .fanins(p)
                    .iter()
                    .all(|f| ntk.is_constant(f.node()) || self.in_window.contains(&f.node()));
                if supported {
                    self.in_window.insert(p);
                    gates.push(p);
                    frontier.push(p);
                }
            }
        }

        gates
    }
}

/// Resubstitute `ntk` in place with the enumerative engine and return the
/// statistics.
pub fn window_mig_enumerative_resub<N>(ntk: &mut N, params: &WindowResubParams) -> WindowResubStats
where
    N: NetworkMut + FanoutNetwork,
{
    assert!(
        params.max_pis <= TruthTable::MAX_VARS as usize,
        "max_pis = {} exceeds the truth table limit of {} variables",
        params.max_pis,
        TruthTable::MAX_VARS
    );

    let mut imp = WindowResubImpl {
        ntk,
        params,
        stats: WindowResubStats::default(),
        cuts: CutManager::new(params.max_pis),
        divisors: DivisorCollector::new(params.max_divisors, params.skip_fanout_limit_for_divisors),
        engine: MigEnumerativeResyn::new(),
        tts: HashMap::new(),
        refs: HashMap::new(),
    };
    let start = Instant::now();
    imp.run();
    imp.stats.time_total = start.elapsed();
    imp.stats.resyn = imp.engine.stats().clone();

    if params.verbose {
        imp.stats.report();
    }
    imp.stats
}

struct WindowResubImpl<'a, N> {
    ntk: &'a mut N,
    params: &'a WindowResubParams,
    stats: WindowResubStats,
    cuts: CutManager,
    divisors: DivisorCollector,
    engine: MigEnumerativeResyn,
    tts: HashMap<Node, TruthTable>,
    refs: HashMap<Node, u32>,
}

impl<N: NetworkMut + FanoutNetwork> WindowResubImpl<'_, N> {
    fn run(&mut self) {
        // Gates created by replacements are not revisited.
        let size = self.ntk.size();

        for index in 0..size {
            let n = self.ntk.index_to_node(index);
            if !self.ntk.is_gate(n) {
                continue;
            }
            if self.ntk.is_dead(n) {
                self.stats.num_skipped += 1;
                continue;
            }
            if self.params.progress {
                info!(
                    "resub |{}/{}| node = {:>4}   windows = {:>4}   est. gain = {:>5}",
                    index, size, n, self.stats.num_windows, self.stats.estimated_gain
                );
            }
            if self.ntk.fanout_size(n) > self.params.skip_fanout_limit_for_roots {
                debug!("resub: skip {} (fan-out {})", n, self.ntk.fanout_size(n));
                self.stats.num_skipped += 1;
                continue;
            }

            let leaves = timed(&mut self.stats.time_cuts, || self.cuts.compute(&*self.ntk, n));
            self.node_resub(n, &leaves);
        }
    }

    fn node_resub(&mut self, root: Node, leaves: &[Node]) {
        let ntk = &*self.ntk;
        let divisors = &mut self.divisors;
        let gates = timed(&mut self.stats.time_divs, || divisors.collect(ntk, root, leaves));

        let refs = &mut self.refs;
        let mffc: HashSet<Node> = timed(&mut self.stats.time_mffc, || {
            mffc_nodes(ntk, root, leaves, refs).into_iter().collect()
        });

        let tts = &mut self.tts;
        let normalize = self.params.normalize;
        let (mut divs, mut values, mut target) = timed(&mut self.stats.time_sim, || {
            let mut nodes = gates.clone();
            nodes.push(root);
            simulate_window(ntk, leaves, &nodes, tts);

            let members = leaves.iter().chain(gates.iter().filter(|g| !mffc.contains(*g)));
            let divs: Vec<Signal> = members.clone().map(|&n| ntk.make_signal(n)).collect();
            let values: Vec<TruthTable> = members.map(|n| tts[n].clone()).collect();
            (divs, values, tts[&root].clone())
        });

        let mut complement = false;
        if normalize {
            for (d, tt) in divs.iter_mut().zip(values.iter_mut()) {
                if tt.get_bit(0) {
                    *tt = !&*tt;
                    *d = !*d;
                }
            }
            if target.get_bit(0) {
                target = !target;
                complement = true;
            }
        }

        self.stats.num_windows += 1;
        self.stats.num_leaves += leaves.len() as u64;
        self.stats.num_divisors += divs.len() as u64;
        self.stats.sum_mffc_size += mffc.len() as u64;

        let engine = &mut self.engine;
        let max_size = (mffc.len() - 1).min(self.params.max_inserts);
        let resynthesized = timed(&mut self.stats.time_resyn, || {
            let candidates: Vec<usize> = (0..values.len()).collect();
            let care = TruthTable::constant(target.num_vars(), true);
            engine.resynthesize(&target, &care, &candidates, &values, max_size)
        });

        let Some(list) = resynthesized else {
            debug!("resub: no replacement for {}", root);
            return;
        };
        if list.num_gates() >= mffc.len() {
            debug!(
                "resub: {} gates do not improve on MFFC {} of {}",
                list.num_gates(),
                mffc.len(),
                root
            );
            return;
        }

        let ntk = &mut *self.ntk;
        let committed = timed(&mut self.stats.time_commit, || commit(ntk, root, &list, &divs, complement));

        if committed {
            let gain = (mffc.len() - list.num_gates()) as u64;
            debug!("resub: replace {} by {} (gain {})", root, list, gain);
            self.stats.estimated_gain += gain;
            self.stats.num_replacements += 1;
        }
    }
}
