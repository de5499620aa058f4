//! Bit-parallel truth tables.
//!
//! A [`TruthTable`] over `n` variables stores `2^n` function values in a
//! [`BitVec`] backed by `u64` words, least significant bit first: bit `m` is the
//! value of the function under the assignment whose binary encoding is `m`
//! (variable 0 is the least significant bit of `m`). Tables over fewer than six
//! variables occupy the low bits of a single word; the unused high bits of that
//! word are kept zero so that [`TruthTable::words`] can be compared directly.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use bitvec::prelude::*;

/// Projection patterns of the first six variables within one word.
const PROJECTIONS: [u64; 6] = [
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

/// A Boolean function over a fixed number of variables.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct TruthTable {
    /// Function values, one bit per assignment
    bits: BitVec<u64, Lsb0>,
    num_vars: u32,
}

impl TruthTable {
    /// Largest supported number of variables.
    pub const MAX_VARS: u32 = 24;

    /// Creates the constant-0 function over `num_vars` variables.
    pub fn new(num_vars: u32) -> Self {
        assert!(
            num_vars <= Self::MAX_VARS,
            "Truth tables support at most {} variables, got {}",
            Self::MAX_VARS,
            num_vars
        );
        Self {
            bits: bitvec![u64, Lsb0; 0; 1 << num_vars],
            num_vars,
        }
    }

    /// Creates a table from storage words, dropping the bits past `2^num_vars`.
    fn from_words(words: Vec<u64>, num_vars: u32) -> Self {
        let mut bits = BitVec::from_vec(words);
        bits.truncate(1 << num_vars);
        let mut tt = Self { bits, num_vars };
        tt.mask();
        tt
    }

    /// Creates the constant function with the given value.
    pub fn constant(num_vars: u32, value: bool) -> Self {
        let mut tt = Self::new(num_vars);
        if value {
            tt.bits.fill(true);
            tt.mask();
        }
        tt
    }

    /// Creates the projection function of variable `var`.
    pub fn nth_var(num_vars: u32, var: u32) -> Self {
        assert!(var < num_vars, "Variable {} is out of range for {} variables", var, num_vars);
        let mut tt = Self::new(num_vars);
        if var < 6 {
            tt.bits.as_raw_mut_slice().fill(PROJECTIONS[var as usize]);
        } else {
            let block = 1usize << (var - 6);
            for (i, word) in tt.bits.as_raw_mut_slice().iter_mut().enumerate() {
                if (i / block) % 2 == 1 {
                    *word = u64::MAX;
                }
            }
        }
        tt.mask();
        tt
    }

    /// Returns the number of variables.
    #[inline]
    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// Returns the number of function values (`2^num_vars`).
    #[inline]
    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    /// Returns the storage words.
    pub fn words(&self) -> &[u64] {
        self.bits.as_raw_slice()
    }

    /// Returns the function values as a bit slice.
    pub fn as_bits(&self) -> &BitSlice<u64, Lsb0> {
        &self.bits
    }

    /// Returns the function value under assignment `index`.
    #[inline]
    pub fn get_bit(&self, index: usize) -> bool {
        assert!(index < self.num_bits(), "Bit {} is out of range", index);
        self.bits[index]
    }

    /// Sets the function value under assignment `index`.
    #[inline]
    pub fn set_bit(&mut self, index: usize, value: bool) {
        assert!(index < self.num_bits(), "Bit {} is out of range", index);
        self.bits.set(index, value);
    }

    /// Returns the number of satisfying assignments.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Checks whether the function is constant 0.
    pub fn is_const0(&self) -> bool {
        self.bits.not_any()
    }

    /// Checks whether the function is constant 1.
    pub fn is_const1(&self) -> bool {
        self.bits.all()
    }

    /// Ternary majority `<a b c>`: true when at least two arguments are true.
    pub fn maj(a: &TruthTable, b: &TruthTable, c: &TruthTable) -> TruthTable {
        assert_eq!(a.num_vars, b.num_vars);
        assert_eq!(a.num_vars, c.num_vars);
        let words = a
            .words()
            .iter()
            .zip(b.words())
            .zip(c.words())
            .map(|((&x, &y), &z)| (x & y) | (x & z) | (y & z))
            .collect();
        TruthTable::from_words(words, a.num_vars)
    }

    /// Checks whether `self` implies `other`, i.e. `self & !other` is constant 0.
    pub fn implies(&self, other: &TruthTable) -> bool {
        assert_eq!(self.num_vars, other.num_vars);
        self.words().iter().zip(other.words()).all(|(&x, &y)| x & !y == 0)
    }

    fn check_width(&self, other: &TruthTable) {
        assert_eq!(
            self.num_vars, other.num_vars,
            "Truth tables have different numbers of variables"
        );
    }

    /// Clears the storage bits above `2^num_vars` in a single-word table.
    fn mask(&mut self) {
        if self.num_vars < 6 {
            let live = (1u64 << (1 << self.num_vars)) - 1;
            if let Some(word) = self.bits.as_raw_mut_slice().first_mut() {
                *word &= live;
            }
        }
    }
}

impl Not for &TruthTable {
    type Output = TruthTable;

    fn not(self) -> Self::Output {
        let mut tt = TruthTable {
            bits: !self.bits.clone(),
            num_vars: self.num_vars,
        };
        tt.mask();
        tt
    }
}

impl Not for TruthTable {
    type Output = TruthTable;

    fn not(mut self) -> Self::Output {
        self.bits = !self.bits;
        self.mask();
        self
    }
}

impl BitAnd for &TruthTable {
    type Output = TruthTable;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.check_width(rhs);
        TruthTable {
            bits: self.bits.clone() & rhs.bits.as_bitslice(),
            num_vars: self.num_vars,
        }
    }
}

impl BitOr for &TruthTable {
    type Output = TruthTable;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.check_width(rhs);
        TruthTable {
            bits: self.bits.clone() | rhs.bits.as_bitslice(),
            num_vars: self.num_vars,
        }
    }
}

impl BitXor for &TruthTable {
    type Output = TruthTable;

    fn bitxor(self, rhs: Self) -> Self::Output {
        self.check_width(rhs);
        TruthTable {
            bits: self.bits.clone() ^ rhs.bits.as_bitslice(),
            num_vars: self.num_vars,
        }
    }
}

/// Hexadecimal rendering, most significant nibble first.
impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = (self.num_bits() / 4).max(1);
        let words = self.words();
        let mut s = String::with_capacity(digits);
        for i in (0..digits).rev() {
            let nibble = (words[i / 16] >> ((i % 16) * 4)) & 0xF;
            s.push(char::from_digit(nibble as u32, 16).unwrap_or('?'));
        }
        write!(f, "{}", s)
    }
}

impl fmt::Debug for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TruthTable({}, 0x{})", self.num_vars, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        let zero = TruthTable::constant(3, false);
        let one = TruthTable::constant(3, true);
        assert!(zero.is_const0());
        assert!(one.is_const1());
        assert_eq!(one.words(), &[0xFF]);
        assert_eq!(!&zero, one);
        assert_eq!(one.count_ones(), 8);
    }

    #[test]
    fn test_projections_small() {
        let a = TruthTable::nth_var(2, 0);
        let b = TruthTable::nth_var(2, 1);
        assert_eq!(a.words(), &[0b1010]);
        assert_eq!(b.words(), &[0b1100]);
        assert_eq!((&a & &b).words(), &[0b1000]);
        assert_eq!((&a | &b).words(), &[0b1110]);
        assert_eq!((&a ^ &b).words(), &[0b0110]);
        assert_eq!((!&a).words(), &[0b0101]);
    }

    #[test]
    fn test_projections_large() {
        let x7 = TruthTable::nth_var(8, 7);
        assert_eq!(x7.words(), &[0, 0, u64::MAX, u64::MAX]);
        let x6 = TruthTable::nth_var(8, 6);
        assert_eq!(x6.words(), &[0, u64::MAX, 0, u64::MAX]);
        for m in 0..256 {
            assert_eq!(x7.get_bit(m), (m >> 7) & 1 == 1);
            assert_eq!(TruthTable::nth_var(8, 3).get_bit(m), (m >> 3) & 1 == 1);
        }
    }

    #[test]
    fn test_majority() {
        let a = TruthTable::nth_var(3, 0);
        let b = TruthTable::nth_var(3, 1);
        let c = TruthTable::nth_var(3, 2);
        let m = TruthTable::maj(&a, &b, &c);
        assert_eq!(m.words(), &[0xE8]);

        let zero = TruthTable::constant(3, false);
        let one = TruthTable::constant(3, true);
        assert_eq!(TruthTable::maj(&a, &b, &zero), &a & &b);
        assert_eq!(TruthTable::maj(&a, &b, &one), &a | &b);
    }

    #[test]
    fn test_implies() {
        let a = TruthTable::nth_var(2, 0);
        let b = TruthTable::nth_var(2, 1);
        let ab = &a & &b;
        assert!(ab.implies(&a));
        assert!(ab.implies(&b));
        assert!(!a.implies(&ab));
        assert!(TruthTable::constant(2, false).implies(&a));
    }

    #[test]
    fn test_set_get_bit() {
        let mut tt = TruthTable::new(7);
        tt.set_bit(100, true);
        assert!(tt.get_bit(100));
        assert_eq!(tt.count_ones(), 1);
        tt.set_bit(100, false);
        assert!(tt.is_const0());
    }

    #[test]
    fn test_display() {
        let a = TruthTable::nth_var(2, 0);
        assert_eq!(a.to_string(), "a");
        let x = TruthTable::nth_var(3, 2);
        assert_eq!(x.to_string(), "f0");
        assert_eq!(TruthTable::constant(0, true).to_string(), "1");
    }

    #[test]
    fn test_complement_keeps_storage_clean() {
        let a = TruthTable::nth_var(3, 1);
        let na = !a.clone();
        assert_eq!(na.words(), &[0x33]);
        assert_eq!(!na, a);
        assert_eq!((!TruthTable::constant(1, false)).words(), &[0b11]);
        assert_eq!(a.as_bits().count_ones(), 4);
    }

    #[test]
    #[should_panic(expected = "at most 24 variables")]
    fn test_too_many_vars() {
        let _ = TruthTable::new(TruthTable::MAX_VARS + 1);
    }

    #[test]
    #[should_panic(expected = "different numbers of variables")]
    fn test_mismatched_widths() {
        let _ = &TruthTable::nth_var(2, 0) & &TruthTable::nth_var(3, 0);
    }
}
