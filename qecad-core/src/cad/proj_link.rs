//! Signs and projection links.
//!
//! A [`ProjLink`] records a derived polynomial (a coefficient, discriminant,
//! resultant or subresultant coefficient) as a signed product of powers of
//! projection factors. Its sign over a cell is then read off the signatures
//! of the cell's ancestors without any arithmetic.

use num_rational::BigRational;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

/// Sign of a real number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sign {
    /// `< 0`
    Negative,
    /// `= 0`
    Zero,
    /// `> 0`
    Positive,
}

impl Sign {
    /// Sign of a rational.
    pub fn of(r: &BigRational) -> Sign {
        if r.is_zero() {
            Sign::Zero
        } else if r.is_positive() {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }

    /// Sign of a product.
    pub fn mul(self, other: Sign) -> Sign {
        match (self, other) {
            (Sign::Zero, _) | (_, Sign::Zero) => Sign::Zero,
            (a, b) if a == b => Sign::Positive,
            _ => Sign::Negative,
        }
    }

    /// Sign of `self^k`.
    pub fn pow(self, k: u32) -> Sign {
        match self {
            _ if k == 0 => Sign::Positive,
            Sign::Negative if k % 2 == 0 => Sign::Positive,
            s => s,
        }
    }

    /// The opposite sign.
    pub fn negate(self) -> Sign {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Zero => Sign::Zero,
            Sign::Positive => Sign::Negative,
        }
    }

    /// Whether this is [`Sign::Zero`].
    pub fn is_zero(self) -> bool {
        self == Sign::Zero
    }
}

impl From<Ordering> for Sign {
    fn from(o: Ordering) -> Self {
        match o {
            Ordering::Less => Sign::Negative,
            Ordering::Equal => Sign::Zero,
            Ordering::Greater => Sign::Positive,
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Sign::Negative => '-',
            Sign::Zero => '0',
            Sign::Positive => '+',
        };
        write!(f, "{}", c)
    }
}

/// Index of a link in the link table.
pub type LinkId = usize;

/// The link of the constant zero.
pub const LINK_ZERO: LinkId = 0;
/// The link of a positive constant.
pub const LINK_POSITIVE: LinkId = 1;
/// The link of a negative constant.
pub const LINK_NEGATIVE: LinkId = 2;

/// Address of a projection factor: its level and its index within the
/// level's factor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactorRef {
    /// Level (main variable) of the factor.
    pub level: usize,
    /// Index within the level.
    pub index: usize,
}

/// `sign * prod factor^multiplicity`.
///
/// A link with sign zero stands for the zero polynomial and carries no
/// factors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjLink {
    /// Sign of the constant.
    pub sign: Sign,
    /// Factors with multiplicities.
    pub factors: SmallVec<[(FactorRef, u32); 4]>,
}

impl ProjLink {
    /// A constant of sign `sign`.
    pub fn constant(sign: Sign) -> Self {
        Self {
            sign,
            factors: SmallVec::new(),
        }
    }

    /// Whether the link is a constant.
    pub fn is_constant(&self) -> bool {
        self.sign.is_zero() || self.factors.is_empty()
    }

    /// Highest level among the factors, `None` for constants.
    pub fn max_level(&self) -> Option<usize> {
        self.factors.iter().map(|(f, _)| f.level).max()
    }

    /// Sign of the linked polynomial, given the signs of the factors.
    ///
    /// Returns `None` when a factor sign is unknown and no factor is known to
    /// vanish.
    pub fn eval(&self, mut factor_sign: impl FnMut(FactorRef) -> Option<Sign>) -> Option<Sign> {
        if self.sign.is_zero() {
            return Some(Sign::Zero);
        }
        let mut acc = Some(self.sign);
        for (f, m) in &self.factors {
            match factor_sign(*f) {
                Some(Sign::Zero) => return Some(Sign::Zero),
                Some(s) => acc = acc.map(|a| a.mul(s.pow(*m))),
                None => acc = None,
            }
        }
        acc
    }
}

/// Interned table of links, with the three constants at fixed slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkTable {
    links: Vec<ProjLink>,
}

impl Default for LinkTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkTable {
    /// A table holding only the constants.
    pub fn new() -> Self {
        Self {
            links: vec![
                ProjLink::constant(Sign::Zero),
                ProjLink::constant(Sign::Positive),
                ProjLink::constant(Sign::Negative),
            ],
        }
    }

    /// Id of the constant of sign `s`.
    pub fn constant(s: Sign) -> LinkId {
        match s {
            Sign::Zero => LINK_ZERO,
            Sign::Positive => LINK_POSITIVE,
            Sign::Negative => LINK_NEGATIVE,
        }
    }

    /// Store a link, reusing an identical one.
    pub fn intern(&mut self, mut link: ProjLink) -> LinkId {
        if link.is_constant() {
            return Self::constant(link.sign);
        }
        link.factors.sort_unstable();
        if let Some(i) = self.links.iter().position(|l| *l == link) {
            return i;
        }
        self.links.push(link);
        self.links.len() - 1
    }

    /// The link at `id`.
    pub fn get(&self, id: LinkId) -> &ProjLink {
        &self.links[id]
    }

    /// Number of links, constants included.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the table holds only the constants.
    pub fn is_empty(&self) -> bool {
        self.links.len() <= 3
    }

    /// All links.
    pub fn iter(&self) -> impl Iterator<Item = &ProjLink> {
        self.links.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_sign_algebra() {
        assert_eq!(Sign::Negative.mul(Sign::Negative), Sign::Positive);
        assert_eq!(Sign::Negative.pow(3), Sign::Negative);
        assert_eq!(Sign::Negative.pow(2), Sign::Positive);
        assert_eq!(Sign::Zero.pow(0), Sign::Positive);
        assert_eq!(Sign::from(Ordering::Less), Sign::Negative);
        assert_eq!(Sign::of(&BigRational::zero()), Sign::Zero);
        assert_eq!(Sign::Positive.negate().to_string(), "-");
    }

    #[test]
    fn test_link_eval() {
        let a = FactorRef { level: 0, index: 0 };
        let b = FactorRef { level: 1, index: 2 };
        let link = ProjLink {
            sign: Sign::Negative,
            factors: smallvec![(a, 2), (b, 1)],
        };
        let signs = |f: FactorRef| {
            if f == a {
                Some(Sign::Negative)
            } else {
                Some(Sign::Positive)
            }
        };
        assert_eq!(link.eval(signs), Some(Sign::Negative));
        assert_eq!(link.eval(|f| (f == a).then_some(Sign::Zero)), Some(Sign::Zero));
        assert_eq!(link.eval(|f| (f == a).then_some(Sign::Positive)), None);
        assert_eq!(link.max_level(), Some(1));
    }

    #[test]
    fn test_link_table_interning() {
        let mut table = LinkTable::new();
        assert_eq!(table.intern(ProjLink::constant(Sign::Negative)), LINK_NEGATIVE);
        let f = FactorRef { level: 0, index: 1 };
        let g = FactorRef { level: 0, index: 0 };
        let id = table.intern(ProjLink {
            sign: Sign::Positive,
            factors: smallvec![(f, 1), (g, 1)],
        });
        let again = table.intern(ProjLink {
            sign: Sign::Positive,
            factors: smallvec![(g, 1), (f, 1)],
        });
        assert_eq!(id, again);
        assert_eq!(table.len(), 4);
        assert!(!table.is_empty());
        assert_eq!(table.get(LINK_ZERO).eval(|_| None), Some(Sign::Zero));
    }
}
