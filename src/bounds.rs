//! Range endpoints and their resolution into a concrete scan range.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::timestamp::Timestamp;

/// One edge of a requested scan range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bound {
    /// Extend past every stored key in that direction.
    #[default]
    Unbounded,
    At(Timestamp),
}

impl Bound {
    fn resolve_or(self, fallback: Timestamp) -> Timestamp {
        match self {
            Bound::Unbounded => fallback,
            Bound::At(ts) => ts,
        }
    }
}

impl From<Timestamp> for Bound {
    fn from(value: Timestamp) -> Self {
        Bound::At(value)
    }
}

impl From<Option<Timestamp>> for Bound {
    fn from(value: Option<Timestamp>) -> Self {
        value.map_or(Bound::Unbounded, Bound::At)
    }
}

/// A validated, ascending, non-degenerate range. Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    lower: Timestamp,
    upper: Timestamp,
    reversed: bool,
}

impl ScanRange {
    /// Resolves two optional endpoints into an ascending range.
    ///
    /// An unset lower end resolves to `Timestamp::MIN` and an unset upper end
    /// to `Timestamp::MAX`, so leaving both unset covers every stored key no
    /// matter how few there are. Endpoints given out of order are swapped.
    /// Endpoints resolving to the same instant are rejected even if a record
    /// exists there.
    pub fn resolve(reversed: bool, lower: Bound, upper: Bound) -> Result<Self> {
        let mut lower = lower.resolve_or(Timestamp::MIN);
        let mut upper = upper.resolve_or(Timestamp::MAX);
        if lower > upper {
            std::mem::swap(&mut lower, &mut upper);
        }
        if lower == upper {
            return Err(Error::InvalidRange { lower, upper });
        }
        Ok(Self {
            lower,
            upper,
            reversed,
        })
    }

    /// Range covering every representable key; never rejected.
    pub fn full(reversed: bool) -> Self {
        Self {
            lower: Timestamp::MIN,
            upper: Timestamp::MAX,
            reversed,
        }
    }

    pub fn lower(&self) -> Timestamp {
        self.lower
    }

    pub fn upper(&self) -> Timestamp {
        self.upper
    }

    pub fn reversed(&self) -> bool {
        self.reversed
    }

    pub fn contains(&self, key: Timestamp) -> bool {
        self.lower <= key && key <= self.upper
    }
}
