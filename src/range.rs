//! Position ranges such as `3,5-9,6-11,14-`, used to pick rows out of a
//! selection.

use tracing::warn;

use crate::error::{FinmanError, Result};

const SEPARATOR_RANGE: char = ',';
const SEPARATOR_BOUNDS: char = '-';
const WILDCARD: &str = "*";

/// A reduced list of closed intervals over 1-based positions: sorted,
/// pairwise disjoint and never adjacent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSpec {
    intervals: Vec<(usize, usize)>,
}

impl RangeSpec {
    /// Parse a range string for a view of `upper` rows.
    ///
    /// Never fails: malformed or out-of-range tokens are dropped with a warning.
    pub fn parse(spec: &str, upper: usize) -> Self {
        let mut intervals = Vec::new();
        for token in spec.split(SEPARATOR_RANGE) {
            match parse_token(token, upper) {
                Ok(Some(interval)) => intervals.push(interval),
                Ok(None) => {}
                Err(e) => warn!(token = token.trim(), "{e}"),
            }
        }
        Self {
            intervals: reduce(intervals),
        }
    }

    /// Every position of a view of `upper` rows.
    pub fn all(upper: usize) -> Self {
        if upper == 0 {
            return Self::default();
        }
        Self {
            intervals: vec![(1, upper)],
        }
    }

    pub fn intervals(&self) -> &[(usize, usize)] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.intervals
            .iter()
            .any(|&(min, max)| min <= position && position <= max)
    }

    /// Number of positions covered.
    pub fn len(&self) -> usize {
        self.intervals.iter().map(|(min, max)| max - min + 1).sum()
    }
}

/// Parse one comma-separated token. `Ok(None)` for tokens that are silently
/// skipped (empty, out of range).
fn parse_token(token: &str, upper: usize) -> Result<Option<(usize, usize)>> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(None);
    }
    let malformed = |reason: &str| FinmanError::MalformedRange {
        token: token.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = token.split(SEPARATOR_BOUNDS).map(str::trim).collect();
    let (min, max) = match parts.as_slice() {
        [WILDCARD] => (1, upper),
        [single] => {
            let n = parse_bound(single).ok_or_else(|| malformed("not an integer"))?;
            (n, n)
        }
        [lower, ""] | [lower, WILDCARD] => {
            let n = parse_bound(lower).ok_or_else(|| malformed("lower bound is not an integer"))?;
            (n, upper)
        }
        [lower, higher] => {
            let lo = parse_bound(lower).ok_or_else(|| malformed("lower bound is not an integer"))?;
            let hi = parse_bound(higher).ok_or_else(|| malformed("upper bound is not an integer"))?;
            (lo.min(hi), lo.max(hi))
        }
        _ => return Err(malformed(&format!("{} parts", parts.len()))),
    };

    if min < 1 || max > upper || min > max {
        return Ok(None);
    }
    Ok(Some((min, max)))
}

fn parse_bound(s: &str) -> Option<usize> {
    if s.starts_with('+') {
        return None;
    }
    s.parse().ok()
}

/// Sort intervals and merge overlapping or adjacent ones.
pub fn reduce(mut intervals: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    intervals.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(intervals.len());
    for (min, max) in intervals {
        match merged.last_mut() {
            Some(last) if min <= last.1 + 1 => last.1 = last.1.max(max),
            _ => merged.push((min, max)),
        }
    }
    merged
}
