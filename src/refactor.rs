//! Refactoring: node-local resynthesis over reconvergence-driven cuts.
//!
//! The driver makes one greedy sweep over the gates that exist when it
//! starts. For every gate it computes a cut, simulates the gate over the cut
//! leaves, and asks the [enumerative engine][crate::resyn] for a circuit over
//! the leaves that is smaller than the gate's fanout-free cone. An improving
//! circuit is spliced in immediately; everything else is left untouched.
//!
//! # Examples
//!
//! ```
//! use mig_rs::mig::Mig;
//! use mig_rs::network::{Network, NetworkMut};
//! use mig_rs::refactor::{refactor, RefactorParams};
//!
//! let mut mig = Mig::new();
//! let a = mig.create_pi();
//! let b = mig.create_pi();
//! let g = mig.create_and(b, a);
//! let f = mig.create_and(a, g);
//! mig.create_po(f);
//! assert_eq!(mig.num_gates(), 2);
//!
//! let stats = refactor(&mut mig, &RefactorParams::default());
//! assert_eq!(mig.num_gates(), 1);
//! assert_eq!(stats.estimated_gain, 1);
//! ```

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::cut::CutManager;
use crate::index_list::IndexList;
use crate::mffc::mffc_size;
use crate::network::NetworkMut;
use crate::resyn::{EnumerativeResynStats, MigEnumerativeResyn};
use crate::signal::Signal;
use crate::simulation::simulate_cut;
use crate::truth_table::TruthTable;
use crate::types::Node;

#[derive(Debug, Clone)]
pub struct RefactorParams {
    /// Maximum number of leaves of reconvergence-driven cuts. Must not exceed
    /// [`TruthTable::MAX_VARS`].
    pub max_pis: usize,
    /// Gates with a larger fan-out are not used as roots.
    pub skip_fanout_limit_for_roots: u32,
    /// Maximum number of gates a replacement may insert.
    pub max_inserts: usize,
    /// Log every processed node.
    pub progress: bool,
    /// Log the statistics when done.
    pub verbose: bool,
}

impl Default for RefactorParams {
    fn default() -> Self {
        Self {
            max_pis: 8,
            skip_fanout_limit_for_roots: 1000,
            max_inserts: 1,
            progress: false,
            verbose: false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct RefactorStats {
    pub time_total: Duration,
    pub time_cuts: Duration,
    pub time_resyn: Duration,
    pub time_commit: Duration,
    /// Sum of `mffc - inserted` over all replacements.
    pub estimated_gain: u64,
    /// Number of engine invocations.
    pub num_candidates: u64,
    pub num_replacements: u64,
    /// Gates skipped because they were dead or had too many fan-outs.
    pub num_skipped: u64,
    pub resyn: EnumerativeResynStats,
}

impl RefactorStats {
    pub fn report(&self) {
        info!("[i] total time      ({:>5.2} secs)", self.time_total.as_secs_f64());
        info!("[i]   cut time      ({:>5.2} secs)", self.time_cuts.as_secs_f64());
        info!("[i]   resyn time    ({:>5.2} secs)", self.time_resyn.as_secs_f64());
        info!("[i]   commit time   ({:>5.2} secs)", self.time_commit.as_secs_f64());
        info!(
            "[i] candidates = {}, replacements = {}, skipped = {}, est. gain = {}",
            self.num_candidates, self.num_replacements, self.num_skipped, self.estimated_gain
        );
        self.resyn.report();
    }
}

/// Observer invoked once per processed gate with its index, the gate, the
/// number of candidates tried so far, and the cumulative estimated gain.
pub trait Progress {
    fn update(&mut self, index: usize, node: Node, candidates: u64, estimated_gain: u64);
}

impl Progress for () {
    fn update(&mut self, _index: usize, _node: Node, _candidates: u64, _estimated_gain: u64) {}
}

impl<F> Progress for F
where
    F: FnMut(usize, Node, u64, u64),
{
    fn update(&mut self, index: usize, node: Node, candidates: u64, estimated_gain: u64) {
        self(index, node, candidates, estimated_gain)
    }
}

pub(crate) fn timed<T>(acc: &mut Duration, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    *acc += start.elapsed();
    result
}

/// Refactor `ntk` in place and return the statistics.
pub fn refactor<N: NetworkMut>(ntk: &mut N, params: &RefactorParams) -> RefactorStats {
    refactor_with_progress(ntk, params, &mut ())
}

/// Like [`refactor`], reporting every processed gate to `progress`.
pub fn refactor_with_progress<N, P>(ntk: &mut N, params: &RefactorParams, progress: &mut P) -> RefactorStats
where
    N: NetworkMut,
    P: Progress,
{
    let mut imp = RefactorImpl::new(ntk, params, progress);
    let start = Instant::now();
    imp.run();
    imp.stats.time_total = start.elapsed();
    imp.stats.resyn = imp.engine.stats().clone();

    if params.verbose {
        imp.stats.report();
    }
    imp.stats
}

/// Replay `list` over `inputs` and substitute `root` by its output
/// (complemented if asked). Fresh gates left without fan-out are taken out
/// again. Returns `false` when the output is `root` itself.
pub(crate) fn commit<N: NetworkMut>(
    ntk: &mut N,
    root: Node,
    list: &IndexList,
    inputs: &[Signal],
    complement: bool,
) -> bool {
    let first_new = ntk.size();
    let out = list.insert(ntk, inputs)[0] ^ complement;

    let committed = out.node() != root;
    if committed {
        ntk.substitute_node(root, out);
    }
    for index in first_new..ntk.size() {
        let n = ntk.index_to_node(index);
        if ntk.fanout_size(n) == 0 {
            ntk.take_out_node(n);
        }
    }
    committed
}

struct RefactorImpl<'a, N: NetworkMut, P: Progress> {
    ntk: &'a mut N,
    params: &'a RefactorParams,
    progress: &'a mut P,
    stats: RefactorStats,
    cuts: CutManager,
    engine: MigEnumerativeResyn,
    tts: HashMap<Node, TruthTable>,
    refs: HashMap<Node, u32>,
}

impl<'a, N: NetworkMut, P: Progress> RefactorImpl<'a, N, P> {
    fn new(ntk: &'a mut N, params: &'a RefactorParams, progress: &'a mut P) -> Self {
        assert!(
            params.max_pis <= TruthTable::MAX_VARS as usize,
            "max_pis = {} exceeds the truth table limit of {} variables",
            params.max_pis,
            TruthTable::MAX_VARS
        );
        Self {
            ntk,
            params,
            progress,
            stats: RefactorStats::default(),
            cuts: CutManager::new(params.max_pis),
            engine: MigEnumerativeResyn::new(),
            tts: HashMap::new(),
            refs: HashMap::new(),
        }
    }

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

            self.progress
                .update(index, n, self.stats.num_candidates, self.stats.estimated_gain);
            if self.params.progress {
                info!(
                    "refactor |{}/{}| node = {:>4}   cand = {:>4}   est. gain = {:>5}",
                    index, size, n, self.stats.num_candidates, self.stats.estimated_gain
                );
            }

            if self.ntk.fanout_size(n) > self.params.skip_fanout_limit_for_roots {
                debug!("refactor: skip {} (fan-out {})", n, self.ntk.fanout_size(n));
                self.stats.num_skipped += 1;
                continue;
            }

            let leaves = timed(&mut self.stats.time_cuts, || self.cuts.compute(&*self.ntk, n));
            self.node_refactor(n, &leaves);
        }
    }

    fn node_refactor(&mut self, root: Node, leaves: &[Node]) {
        let ntk = &*self.ntk;
        let tts = &mut self.tts;
        let refs = &mut self.refs;
        let engine = &mut self.engine;
        let max_inserts = self.params.max_inserts;

        let resynthesized = timed(&mut self.stats.time_resyn, || {
            let target = simulate_cut(ntk, leaves, root, tts);
            let mffc = mffc_size(ntk, root, leaves, refs);

            let num_vars = leaves.len() as u32;
            let inputs: Vec<TruthTable> = (0..num_vars).map(|i| TruthTable::nth_var(num_vars, i)).collect();
            let candidates: Vec<usize> = (0..inputs.len()).collect();
            let care = TruthTable::constant(num_vars, true);
            let max_size = (mffc - 1).min(max_inserts);

            engine
                .resynthesize(&target, &care, &candidates, &inputs, max_size)
                .map(|list| (list, mffc))
        });
        self.stats.num_candidates += 1;

        let Some((list, mffc)) = resynthesized else {
            debug!("refactor: no replacement for {}", root);
            return;
        };
        if list.num_gates() >= mffc {
            debug!("refactor: {} gates do not improve on MFFC {} of {}", list.num_gates(), mffc, root);
            return;
        }

        let ntk = &mut *self.ntk;
        let committed = timed(&mut self.stats.time_commit, || {
            let inputs: Vec<_> = leaves.iter().map(|&l| ntk.make_signal(l)).collect();
            commit(ntk, root, &list, &inputs, false)
        });

        if committed {
            let gain = (mffc - list.num_gates()) as u64;
            debug!("refactor: replace {} by {} (gain {})", root, list, gain);
            self.stats.estimated_gain += gain;
            self.stats.num_replacements += 1;
        }
    }
}
