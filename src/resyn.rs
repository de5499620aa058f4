//! Enumerative resynthesis with majority gates.
//!
//! Given a target function and a list of candidate functions, the engine looks
//! for the smallest majority circuit over the candidates that realizes the
//! target. The search is exact for up to one gate and runs in a fixed order:
//!
//! 1. **Constant:** the target is constant 0 or 1.
//! 2. **Direct:** a candidate equals the target or its complement.
//! 3. **Relations:** for every candidate pair `(a, b)`, in sign order
//!    `(+,+)`, `(-,+)`, `(+,-)`, `(-,-)`, record the pair when
//!    `<a b t> = t`; for every single candidate, record it together with the
//!    constant 1 when it implies the target, and together with the constant 0
//!    when the target implies it.
//! 4. **One gate:** combine two recorded relations into one majority gate.
//!
//! Candidate `i` is addressed by literal `2 * (i + 1)` in the resulting
//! [`IndexList`], and its complement by the next odd literal.

use log::{debug, info, trace};

use crate::index_list::{make_lit, IndexList};
use crate::truth_table::TruthTable;

/// Literal of the `i`-th candidate.
fn candidate_lit(i: usize, complemented: bool) -> u32 {
    make_lit(i as u32 + 1, complemented)
}

/// Second literal of a relation is either a candidate literal or a constant (0 or 1).
fn is_constant_lit(lit: u32) -> bool {
    lit < 2
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnumerativeResynStats {
    /// Number of engine invocations.
    pub num_calls: u64,
    /// Solved by a constant.
    pub num_constant: u64,
    /// Solved by a (possibly complemented) candidate.
    pub num_direct: u64,
    /// Solved by one majority gate.
    pub num_one_gate: u64,
    /// No solution within the size limit.
    pub num_failures: u64,
    /// Relations recorded by the pairwise filter.
    pub num_relations: u64,
}

impl EnumerativeResynStats {
    pub fn report(&self) {
        info!(
            "resyn: {} calls, {} constant, {} direct, {} one-gate, {} failed, {} relations",
            self.num_calls,
            self.num_constant,
            self.num_direct,
            self.num_one_gate,
            self.num_failures,
            self.num_relations
        );
    }
}

/// Candidate truth tables and their complements, addressed by literal.
struct Literals {
    values: Vec<TruthTable>,
}

impl Literals {
    fn new(candidates: &[usize], tts: &[TruthTable]) -> Self {
        let mut values = Vec::with_capacity(2 * candidates.len());
        for &c in candidates {
            values.push(tts[c].clone());
            values.push(!&tts[c]);
        }
        Self { values }
    }

    fn get(&self, lit: u32) -> &TruthTable {
        assert!(!is_constant_lit(lit), "Constant literal {} has no candidate", lit);
        &self.values[lit as usize - 2]
    }
}

#[derive(Debug, Default)]
pub struct MigEnumerativeResyn {
    stats: EnumerativeResynStats,
}

impl MigEnumerativeResyn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &EnumerativeResynStats {
        &self.stats
    }

    /// Find a majority circuit with at most `max_size` gates that realizes
    /// `target` over the candidates `tts[candidates[0]], tts[candidates[1]], ...`.
    ///
    /// The care set must be all-true.
    pub fn resynthesize(
        &mut self,
        target: &TruthTable,
        care: &TruthTable,
        candidates: &[usize],
        tts: &[TruthTable],
        max_size: usize,
    ) -> Option<IndexList> {
        assert!(care.is_const1(), "Enumerative resynthesis does not support don't cares");
        self.stats.num_calls += 1;

        let mut list = IndexList::new(candidates.len() as u32);

        if target.is_const0() {
            trace!("resyn: constant 0");
            self.stats.num_constant += 1;
            list.add_output(0);
            return Some(list);
        }
        if target.is_const1() {
            trace!("resyn: constant 1");
            self.stats.num_constant += 1;
            list.add_output(1);
            return Some(list);
        }

        let ntarget = !target;
        for (i, &c) in candidates.iter().enumerate() {
            if tts[c] == *target {
                trace!("resyn: candidate {} matches", i);
                self.stats.num_direct += 1;
                list.add_output(candidate_lit(i, false));
                return Some(list);
            }
            if tts[c] == ntarget {
                trace!("resyn: complement of candidate {} matches", i);
                self.stats.num_direct += 1;
                list.add_output(candidate_lit(i, true));
                return Some(list);
            }
        }

        if max_size == 0 {
            self.stats.num_failures += 1;
            return None;
        }

        let lits = Literals::new(candidates, tts);
        let relations = self.relations(target, &lits, candidates.len());
        debug!("resyn: {} relations over {} candidates", relations.len(), candidates.len());

        match Self::one_gate(target, &lits, &relations) {
            Some((a, b, c)) => {
                trace!("resyn: one gate <{} {} {}>", a, b, c);
                self.stats.num_one_gate += 1;
                let f = list.add_maj(a, b, c);
                list.add_output(f);
                Some(list)
            }
            None => {
                self.stats.num_failures += 1;
                None
            }
        }
    }

    /// Literal pairs `(a, b)` with `<a b t> = t`, the second slot possibly a constant.
    fn relations(&mut self, target: &TruthTable, lits: &Literals, n: usize) -> Vec<(u32, u32)> {
        const SIGNS: [(bool, bool); 4] = [(false, false), (true, false), (false, true), (true, true)];

        let mut relations = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                for (ci, cj) in SIGNS {
                    let a = candidate_lit(i, ci);
                    let b = candidate_lit(j, cj);
                    if TruthTable::maj(lits.get(a), lits.get(b), target) == *target {
                        relations.push((a, b));
                    }
                }
            }

            let pos = candidate_lit(i, false);
            let neg = candidate_lit(i, true);
            if lits.get(pos).implies(target) {
                relations.push((pos, 1));
            }
            if lits.get(neg).implies(target) {
                relations.push((neg, 1));
            }
            if target.implies(lits.get(pos)) {
                relations.push((pos, 0));
            }
            if target.implies(lits.get(neg)) {
                relations.push((neg, 0));
            }
        }

        self.stats.num_relations += relations.len() as u64;
        relations
    }

    /// First pair of relations, in enumeration order, that yields the target
    /// with a single majority gate.
    fn one_gate(target: &TruthTable, lits: &Literals, relations: &[(u32, u32)]) -> Option<(u32, u32, u32)> {
        for (i, &(p, q)) in relations.iter().enumerate() {
            let x = lits.get(p);
            let rest = &relations[i + 1..];

            if is_constant_lit(q) {
                // <x q y> is x & y for q = 0, and x | y for q = 1.
                let combine = |y: &TruthTable| if q == 0 { x & y } else { x | y };
                for &(r, s) in rest {
                    if combine(lits.get(r)) == *target {
                        return Some((p, q, r));
                    }
                    if is_constant_lit(s) {
                        continue;
                    }
                    if combine(lits.get(s)) == *target {
                        return Some((p, q, s));
                    }
                }
            } else {
                let y = lits.get(q);
                for &(r, s) in rest {
                    if TruthTable::maj(x, y, lits.get(r)) == *target {
                        return Some((p, q, r));
                    }
                    if is_constant_lit(s) {
                        let xy = if s == 0 { x & y } else { x | y };
                        if xy == *target {
                            return Some((p, q, s));
                        }
                    } else if TruthTable::maj(x, y, lits.get(s)) == *target {
                        return Some((p, q, s));
                    }
                }
            }
        }
        None
    }
}
