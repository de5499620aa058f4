//! Index lists: a compact, network-independent encoding of small circuits.
//!
//! An [`IndexList`] records a majority circuit as a sequence of gates over
//! *literals*. A literal is `index << 1 | complement`, where index 0 is the
//! constant 0, indices `1..=num_inputs` are the inputs by position, and the
//! following indices are the gates in the order they were added. Every gate
//! may only reference literals with a smaller index, so the list is always in
//! topological order.
//!
//! The raw form is a flat `Vec<u32>`:
//!
//! ```text
//! [num_inputs, num_outputs, num_gates, (a b c)*num_gates, out*num_outputs]
//! ```
//!
//! # Examples
//!
//! ```
//! use mig_rs::index_list::IndexList;
//!
//! let mut list = IndexList::new(2);
//! let f = list.add_and(2, 4); // x0 & x1
//! list.add_output(f);
//! assert_eq!(f, 6);
//! assert_eq!(list.raw(), vec![2, 1, 1, 0, 2, 4, 6]);
//! assert_eq!(IndexList::from_raw(&list.raw()), Ok(list));
//! ```

use std::fmt;

use crate::network::NetworkMut;
use crate::signal::Signal;
use crate::truth_table::TruthTable;

/// Make a literal from an entry index and a complement flag.
pub const fn make_lit(index: u32, complemented: bool) -> u32 {
    (index << 1) | complemented as u32
}

pub const fn lit_index(lit: u32) -> u32 {
    lit >> 1
}

pub const fn lit_is_complemented(lit: u32) -> bool {
    lit & 1 != 0
}

/// Entries addressable by a 32-bit literal.
const MAX_ENTRIES: u64 = 1 << 31;

/// Errors produced when decoding a raw index list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexListError {
    /// The buffer ends before the declared contents.
    Truncated { expected: usize, actual: usize },
    /// The buffer continues past the declared contents.
    TrailingData { expected: usize, actual: usize },
    /// A literal references an entry that is not defined yet. For outputs,
    /// `entry` is the number of gates.
    ForwardReference { entry: usize, literal: u32 },
    /// The constant, inputs and gates together do not fit the literal space.
    TooManyEntries { entries: u64 },
}

impl fmt::Display for IndexListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexListError::Truncated { expected, actual } => {
                write!(f, "Truncated index list: expected {} words, got {}", expected, actual)
            }
            IndexListError::TrailingData { expected, actual } => {
                write!(f, "Trailing data in index list: expected {} words, got {}", expected, actual)
            }
            IndexListError::ForwardReference { entry, literal } => {
                write!(f, "Literal {} in entry {} references a later entry", literal, entry)
            }
            IndexListError::TooManyEntries { entries } => {
                write!(
                    f,
                    "Index list declares {} entries, at most {} are addressable",
                    entries, MAX_ENTRIES
                )
            }
        }
    }
}

impl std::error::Error for IndexListError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IndexList {
    num_inputs: u32,
    gates: Vec<[u32; 3]>,
    outputs: Vec<u32>,
}

impl IndexList {
    pub fn new(num_inputs: u32) -> Self {
        assert!(
            1 + num_inputs as u64 <= MAX_ENTRIES,
            "Index list cannot address {} inputs",
            num_inputs
        );
        Self {
            num_inputs,
            gates: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn num_inputs(&self) -> u32 {
        self.num_inputs
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn gates(&self) -> &[[u32; 3]] {
        &self.gates
    }

    pub fn outputs(&self) -> &[u32] {
        &self.outputs
    }

    /// Positive literal of the `k`-th gate (0-based).
    pub fn literal_of_gate(&self, k: usize) -> u32 {
        let index = 1 + self.num_inputs as u64 + k as u64;
        assert!(index < MAX_ENTRIES, "Gate {} is outside the literal range", k);
        make_lit(index as u32, false)
    }

    /// Number of entries a literal may currently reference (constant, inputs, gates).
    fn num_entries(&self) -> u64 {
        1 + self.num_inputs as u64 + self.gates.len() as u64
    }

    /// Append a majority gate and return its positive literal.
    pub fn add_maj(&mut self, a: u32, b: u32, c: u32) -> u32 {
        for lit in [a, b, c] {
            assert!(
                (lit_index(lit) as u64) < self.num_entries(),
                "Literal {} references a later entry",
                lit
            );
        }
        self.gates.push([a, b, c]);
        self.literal_of_gate(self.gates.len() - 1)
    }

    pub fn add_and(&mut self, a: u32, b: u32) -> u32 {
        self.add_maj(0, a, b)
    }

    pub fn add_or(&mut self, a: u32, b: u32) -> u32 {
        self.add_maj(1, a, b)
    }

    pub fn add_output(&mut self, lit: u32) {
        assert!(
            (lit_index(lit) as u64) < self.num_entries(),
            "Output literal {} references an undefined entry",
            lit
        );
        self.outputs.push(lit);
    }

    /// Check that every literal only references earlier entries.
    pub fn is_well_formed(&self) -> bool {
        self.first_forward_reference().is_none()
    }

    fn first_forward_reference(&self) -> Option<(usize, u32)> {
        for (k, gate) in self.gates.iter().enumerate() {
            let limit = 1 + self.num_inputs as u64 + k as u64;
            if let Some(&lit) = gate.iter().find(|&&lit| lit_index(lit) as u64 >= limit) {
                return Some((k, lit));
            }
        }
        let limit = self.num_entries();
        self.outputs
            .iter()
            .find(|&&lit| lit_index(lit) as u64 >= limit)
            .map(|&lit| (self.gates.len(), lit))
    }

    pub fn raw(&self) -> Vec<u32> {
        let mut raw = Vec::with_capacity(3 + 3 * self.gates.len() + self.outputs.len());
        raw.push(self.num_inputs);
        raw.push(self.outputs.len() as u32);
        raw.push(self.gates.len() as u32);
        for gate in &self.gates {
            raw.extend_from_slice(gate);
        }
        raw.extend_from_slice(&self.outputs);
        raw
    }

    pub fn from_raw(raw: &[u32]) -> Result<Self, IndexListError> {
        if raw.len() < 3 {
            return Err(IndexListError::Truncated {
                expected: 3,
                actual: raw.len(),
            });
        }
        let num_inputs = raw[0];
        let num_outputs = raw[1] as usize;
        let num_gates = raw[2] as usize;

        let expected = 3usize
            .saturating_add(num_gates.saturating_mul(3))
            .saturating_add(num_outputs);
        if raw.len() < expected {
            return Err(IndexListError::Truncated {
                expected,
                actual: raw.len(),
            });
        }
        if raw.len() > expected {
            return Err(IndexListError::TrailingData {
                expected,
                actual: raw.len(),
            });
        }

        let entries = 1 + num_inputs as u64 + num_gates as u64;
        if entries > MAX_ENTRIES {
            return Err(IndexListError::TooManyEntries { entries });
        }

        let body = &raw[3..];
        let list = Self {
            num_inputs,
            gates: body[..3 * num_gates]
                .chunks_exact(3)
                .map(|g| [g[0], g[1], g[2]])
                .collect(),
            outputs: body[3 * num_gates..].to_vec(),
        };
        if let Some((entry, literal)) = list.first_forward_reference() {
            return Err(IndexListError::ForwardReference { entry, literal });
        }
        Ok(list)
    }

    /// Truth tables of the outputs, given the truth tables of the inputs.
    pub fn simulate(&self, inputs: &[TruthTable]) -> Vec<TruthTable> {
        assert_eq!(
            inputs.len(),
            self.num_inputs as usize,
            "Index list expects {} inputs",
            self.num_inputs
        );
        let num_vars = inputs.first().map_or(0, |tt| tt.num_vars());

        let mut values = Vec::with_capacity(self.num_entries() as usize);
        values.push(TruthTable::constant(num_vars, false));
        values.extend_from_slice(inputs);

        let value = |values: &[TruthTable], lit: u32| {
            let tt = &values[lit_index(lit) as usize];
            if lit_is_complemented(lit) {
                !tt
            } else {
                tt.clone()
            }
        };

        for &[a, b, c] in &self.gates {
            let tt = TruthTable::maj(&value(&values, a), &value(&values, b), &value(&values, c));
            values.push(tt);
        }
        self.outputs.iter().map(|&lit| value(&values, lit)).collect()
    }

    /// Replay the gates into `ntk` on top of the given input signals and
    /// return the output signals.
    pub fn insert<N: NetworkMut>(&self, ntk: &mut N, inputs: &[Signal]) -> Vec<Signal> {
        assert_eq!(
            inputs.len(),
            self.num_inputs as usize,
            "Index list expects {} inputs",
            self.num_inputs
        );

        let mut signals = Vec::with_capacity(self.num_entries() as usize);
        signals.push(ntk.get_constant(false));
        signals.extend_from_slice(inputs);

        let signal = |ntk: &N, signals: &[Signal], lit: u32| {
            let index = lit_index(lit) as usize;
            assert!(index < signals.len(), "Literal {} references a later entry", lit);
            match (index, lit_is_complemented(lit)) {
                (0, complemented) => ntk.get_constant(complemented),
                (_, complemented) => signals[index] ^ complemented,
            }
        };

        for &[a, b, c] in &self.gates {
            let a = signal(ntk, &signals, a);
            let b = signal(ntk, &signals, b);
            let c = signal(ntk, &signals, c);
            let f = ntk.create_maj(a, b, c);
            signals.push(f);
        }
        self.outputs.iter().map(|&lit| signal(ntk, &signals, lit)).collect()
    }
}

impl fmt::Display for IndexList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} inputs", self.num_inputs)?;
        for (k, [a, b, c]) in self.gates.iter().enumerate() {
            write!(f, "; {} = <{} {} {}>", self.literal_of_gate(k), a, b, c)?;
        }
        write!(f, "; outputs")?;
        for lit in &self.outputs {
            write!(f, " {}", lit)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mig::Mig;
    use crate::network::Network;

    #[test]
    fn test_literals() {
        assert_eq!(make_lit(0, false), 0);
        assert_eq!(make_lit(0, true), 1);
        assert_eq!(make_lit(3, true), 7);
        assert_eq!(lit_index(7), 3);
        assert!(lit_is_complemented(7));
        assert!(!lit_is_complemented(6));
    }

    #[test]
    fn test_gate_numbering() {
        let mut list = IndexList::new(3);
        assert_eq!(list.literal_of_gate(0), 8);
        let g0 = list.add_maj(2, 4, 6);
        let g1 = list.add_or(g0, 3);
        assert_eq!(g0, 8);
        assert_eq!(g1, 10);
        assert_eq!(list.gates(), &[[2, 4, 6], [1, 8, 3]]);
        list.add_output(g1 ^ 1);
        assert_eq!(list.outputs(), &[11]);
        assert!(list.is_well_formed());
    }

    #[test]
    #[should_panic(expected = "references a later entry")]
    fn test_add_forward_reference() {
        let mut list = IndexList::new(1);
        list.add_maj(0, 2, 4);
    }

    #[test]
    fn test_raw_layout() {
        let mut list = IndexList::new(2);
        let f = list.add_and(2, 5);
        list.add_output(f);
        list.add_output(1);
        assert_eq!(list.raw(), vec![2, 2, 1, 0, 2, 5, 6, 1]);
        assert_eq!(IndexList::from_raw(&list.raw()).unwrap(), list);
    }

    #[test]
    fn test_from_raw_errors() {
        assert_eq!(
            IndexList::from_raw(&[1, 0]),
            Err(IndexListError::Truncated { expected: 3, actual: 2 })
        );
        assert_eq!(
            IndexList::from_raw(&[2, 1, 1, 0, 2, 4]),
            Err(IndexListError::Truncated { expected: 7, actual: 6 })
        );
        assert_eq!(
            IndexList::from_raw(&[2, 1, 0, 4, 9]),
            Err(IndexListError::TrailingData { expected: 4, actual: 5 })
        );
        // Gate 0 of a 2-input list may reference indices 0..=2 only.
        assert_eq!(
            IndexList::from_raw(&[2, 1, 1, 0, 2, 6, 6]),
            Err(IndexListError::ForwardReference { entry: 0, literal: 6 })
        );
        // The output references a gate that does not exist.
        assert_eq!(
            IndexList::from_raw(&[2, 1, 1, 0, 2, 4, 8]),
            Err(IndexListError::ForwardReference { entry: 1, literal: 8 })
        );
        // Enormous declared sizes do not overflow.
        assert!(matches!(
            IndexList::from_raw(&[0, u32::MAX, u32::MAX]),
            Err(IndexListError::Truncated { .. })
        ));
        assert_eq!(
            IndexList::from_raw(&[u32::MAX, 0, 1, 0, 0, 0]),
            Err(IndexListError::TooManyEntries { entries: 1 << 32 | 1 })
        );
        assert_eq!(
            IndexList::from_raw(&[u32::MAX, 1, 0, 0]),
            Err(IndexListError::TooManyEntries { entries: 1 << 32 })
        );
    }

    #[test]
    fn test_error_display() {
        let e = IndexListError::ForwardReference { entry: 2, literal: 12 };
        assert_eq!(e.to_string(), "Literal 12 in entry 2 references a later entry");
        let e = IndexListError::TooManyEntries { entries: 1 << 32 };
        assert_eq!(
            e.to_string(),
            "Index list declares 4294967296 entries, at most 2147483648 are addressable"
        );
    }

    #[test]
    fn test_simulate() {
        let x0 = TruthTable::nth_var(3, 0);
        let x1 = TruthTable::nth_var(3, 1);
        let x2 = TruthTable::nth_var(3, 2);

        let mut list = IndexList::new(3);
        let m = list.add_maj(2, 4, 7);
        let a = list.add_and(m, 2);
        list.add_output(m);
        list.add_output(a ^ 1);
        list.add_output(1);

        let out = list.simulate(&[x0.clone(), x1.clone(), x2.clone()]);
        let expected_m = TruthTable::maj(&x0, &x1, &!&x2);
        assert_eq!(out[0], expected_m);
        assert_eq!(out[1], !(&expected_m & &x0));
        assert!(out[2].is_const1());
    }

    #[test]
    fn test_insert_into_mig() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();

        let mut list = IndexList::new(2);
        let f = list.add_and(2, 4);
        let g = list.add_or(f, 3);
        list.add_output(g);
        list.add_output(0);

        let outs = list.insert(&mut mig, &[a, b]);
        assert_eq!(mig.num_gates(), 2);
        assert_eq!(outs[1], Signal::zero());

        // Hash-consing makes a second replay free.
        let again = list.insert(&mut mig, &[a, b]);
        assert_eq!(again, outs);
        assert_eq!(mig.num_gates(), 2);
    }

    #[test]
    fn test_insert_complemented_inputs() {
        let mut mig = Mig::new();
        let a = mig.create_pi();
        let b = mig.create_pi();
        let mut list = IndexList::new(2);
        let f = list.add_and(3, 4);
        list.add_output(f);
        let outs = list.insert(&mut mig, &[!a, b]);
        // !(!a) & b
        assert_eq!(outs[0], mig.create_and(a, b));
    }

    #[test]
    fn test_display() {
        let mut list = IndexList::new(2);
        let f = list.add_and(2, 4);
        list.add_output(f);
        assert_eq!(list.to_string(), "{2 inputs; 6 = <0 2 4>; outputs 6}");
    }
}
