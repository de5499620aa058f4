use std::fmt::{Debug, Display, Formatter};
use std::ops::{BitXor, Not};

use crate::types::Node;

/// A reference to a node together with a polarity bit.
///
/// The raw representation is `node << 1 | complemented`, so the constant-0
/// signal is `0` and the constant-1 signal is `1`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Signal(u32);

const MAX_NODE: u32 = u32::MAX >> 1;

// Constructors
impl Signal {
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn one() -> Self {
        Self(1)
    }

    pub const fn new(node: Node, complemented: bool) -> Self {
        assert!(node.id() <= MAX_NODE);
        Self(node.id() << 1 | complemented as u32)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

// Getters
impl Signal {
    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn node(self) -> Node {
        Node::new(self.0 >> 1)
    }

    /// Returns the signal with the polarity bit cleared.
    pub const fn regular(self) -> Self {
        Self(self.0 & !1)
    }
}

// Checks
impl Signal {
    pub const fn is_const(self) -> bool {
        self.0 >> 1 == 0
    }

    pub const fn is_complemented(self) -> bool {
        self.0 & 1 != 0
    }
}

impl From<bool> for Signal {
    fn from(b: bool) -> Self {
        if b {
            Self::one()
        } else {
            Self::zero()
        }
    }
}

impl From<Node> for Signal {
    fn from(node: Node) -> Self {
        Self::new(node, false)
    }
}

impl Not for Signal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(self.0 ^ 1)
    }
}

impl Not for &Signal {
    type Output = Signal;

    fn not(self) -> Self::Output {
        Signal(self.0 ^ 1)
    }
}

/// Conditional complement: `s ^ true == !s`, `s ^ false == s`.
impl BitXor<bool> for Signal {
    type Output = Self;

    fn bitxor(self, rhs: bool) -> Self::Output {
        Self(self.0 ^ rhs as u32)
    }
}

impl Display for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_const() {
            let x = self.0 & 1;
            write!(f, "{}", x)
        } else {
            if self.is_complemented() {
                write!(f, "!")?;
            }
            write!(f, "{}", self.node())
        }
    }
}

impl Debug for Signal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
