//! Operators for `$`-prefixed filter keys
use std::fmt;

/// An operator applied to a candidate by a `$`-prefixed key of a composite filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `$eq`
    Eq,
    /// `$neq`
    Neq,
    /// `$lt`
    Lt,
    /// `$le`
    Le,
    /// `$gt`
    Gt,
    /// `$ge`
    Ge,
    /// `$contains`
    Contains,
    /// `$startsWith`
    StartsWith,
    /// `$endsWith`
    EndsWith,
    /// `$length`, compares the length of the candidate using [`Op::Eq`]
    Length,
    /// Any other `$`-prefixed key, never holds
    Unknown,
}

impl Op {
    /// Look up the operator for a key
    pub fn from_key(key: &str) -> Self {
        match key {
            "$eq" => Op::Eq,
            "$neq" => Op::Neq,
            "$lt" => Op::Lt,
            "$le" => Op::Le,
            "$gt" => Op::Gt,
            "$ge" => Op::Ge,
            "$contains" => Op::Contains,
            "$startsWith" => Op::StartsWith,
            "$endsWith" => Op::EndsWith,
            "$length" => Op::Length,
            _ => Op::Unknown,
        }
    }

    /// Check `actual` against `expected`
    ///
    /// Ordering operators compare both sides as `f64`, and do not hold if either side is not a
    /// number.
    pub fn check(self, actual: &str, expected: &str) -> bool {
        match self {
            Op::Eq | Op::Length => actual == expected,
            Op::Neq => actual != expected,
            Op::Contains => actual.contains(expected),
            Op::StartsWith => actual.starts_with(expected),
            Op::EndsWith => actual.ends_with(expected),
            Op::Lt | Op::Le | Op::Gt | Op::Ge => {
                let (Ok(a), Ok(b)) = (actual.parse::<f64>(), expected.parse::<f64>()) else {
                    return false;
                };
                match self {
                    Op::Lt => a < b,
                    Op::Le => a <= b,
                    Op::Gt => a > b,
                    _ => a >= b,
                }
            }
            Op::Unknown => false,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Eq => "$eq",
            Op::Neq => "$neq",
            Op::Lt => "$lt",
            Op::Le => "$le",
            Op::Gt => "$gt",
            Op::Ge => "$ge",
            Op::Contains => "$contains",
            Op::StartsWith => "$startsWith",
            Op::EndsWith => "$endsWith",
            Op::Length => "$length",
            Op::Unknown => "$unknown",
        };
        write!(f, "{s}")
    }
}
