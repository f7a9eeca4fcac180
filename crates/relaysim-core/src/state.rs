//! Two-valued signal algebra.
//!
//! Relay logic uses HIGH and FLOAT, not HIGH and LOW: HIGH always wins when
//! several sources meet on a net, and FLOAT stands for "nothing driving".
//! Combining states is therefore a plain logical OR over `{FLOAT < HIGH}`.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Electrical state of a pin, tab or net.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    /// Nothing is driving; the default state of every net.
    #[default]
    Float,
    /// At least one source is driving.
    High,
}

impl Signal {
    /// Combine two states: HIGH wins.
    ///
    /// The operation is idempotent, commutative and associative, so nets can
    /// fold contributions in any order.
    pub fn combine(self, other: Signal) -> Signal {
        if self == Signal::High || other == Signal::High {
            Signal::High
        } else {
            Signal::Float
        }
    }

    /// Fold an iterator of states with [`Signal::combine`].
    pub fn combine_all<I: IntoIterator<Item = Signal>>(states: I) -> Signal {
        let mut acc = Signal::Float;
        for state in states {
            acc = acc.combine(state);
            if acc == Signal::High {
                break;
            }
        }
        acc
    }

    /// Whether this state is HIGH.
    pub fn is_high(self) -> bool {
        self == Signal::High
    }
}

impl BitOr for Signal {
    type Output = Signal;

    fn bitor(self, rhs: Signal) -> Signal {
        self.combine(rhs)
    }
}

impl BitOrAssign for Signal {
    fn bitor_assign(&mut self, rhs: Signal) {
        *self = self.combine(rhs);
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Float => write!(f, "FLOAT"),
            Signal::High => write!(f, "HIGH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_truth_table() {
        assert_eq!(Signal::Float.combine(Signal::Float), Signal::Float);
        assert_eq!(Signal::Float.combine(Signal::High), Signal::High);
        assert_eq!(Signal::High.combine(Signal::Float), Signal::High);
        assert_eq!(Signal::High.combine(Signal::High), Signal::High);
    }

    #[test]
    fn test_algebra_laws() {
        for a in [Signal::Float, Signal::High] {
            for b in [Signal::Float, Signal::High] {
                // Commutative.
                assert_eq!(a.combine(b), b.combine(a));
                // FLOAT is the identity.
                assert_eq!(a.combine(Signal::Float), a);
                // HIGH absorbs.
                assert_eq!(Signal::High.combine(a), Signal::High);
            }
            // Idempotent.
            assert_eq!(a.combine(a), a);
        }
    }

    #[test]
    fn test_combine_all() {
        assert_eq!(Signal::combine_all([]), Signal::Float);
        assert_eq!(
            Signal::combine_all([Signal::Float, Signal::Float]),
            Signal::Float
        );
        assert_eq!(
            Signal::combine_all([Signal::Float, Signal::High, Signal::Float]),
            Signal::High
        );
    }

    #[test]
    fn test_bitor_operator() {
        let mut s = Signal::Float;
        s |= Signal::Float;
        assert_eq!(s, Signal::Float);
        s |= Signal::High;
        assert_eq!(s, Signal::High);
        assert_eq!(Signal::Float | Signal::High, Signal::High);
    }

    #[test]
    fn test_display() {
        assert_eq!(Signal::High.to_string(), "HIGH");
        assert_eq!(Signal::Float.to_string(), "FLOAT");
    }
}
