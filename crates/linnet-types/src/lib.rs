//! Shared types for token-level entity annotation.
//!
//! A [`Span`] is a labeled half-open token interval `[start, end)` over a
//! token sequence. Spans carry a set of label strings because a single
//! surface form can belong to several gazetteer categories at once
//! (e.g. "Georgia" as both a US state and a country).
//!
//! [`BilouTag`] is the per-token tag emitted once a non-overlapping span set
//! has been projected back onto the token sequence.
//!
//! ```rust
//! use linnet_types::Span;
//!
//! let a = Span::new("Atlantic City", 0, 2, ["us_city"]);
//! let b = Span::new("City of Georgia", 1, 4, ["us_city"]);
//! assert!(a.overlaps(&b));
//! ```

use std::collections::BTreeSet;
use std::fmt;

/// A labeled half-open token interval `[start, end)`.
///
/// `text` is the matched surface form and is informational only; conflict
/// analysis looks exclusively at the token range. Labels live in a
/// `BTreeSet` so iteration order is stable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Span {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub labels: BTreeSet<String>,
}

impl Span {
    pub fn new<T, L, S>(text: T, start: usize, end: usize, labels: L) -> Self
    where
        T: Into<String>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: text.into(),
            start,
            end,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of tokens covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both spans cover exactly the same token range.
    pub fn same_range(&self, other: &Span) -> bool {
        self.start == other.start && self.end == other.end
    }

    /// Standard interval intersection, excluding identical ranges.
    ///
    /// Two spans over the same `[start, end)` are duplicates of one
    /// position, not a conflict, so they do not count as overlapping.
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.same_range(other) && self.start < other.end && other.start < self.end
    }

    /// Deterministic representative label: the lexicographically smallest.
    pub fn primary_label(&self) -> Option<&str> {
        self.labels.iter().next().map(String::as_str)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}) {:?}", self.start, self.end, self.text)
    }
}

/// Per-token tag in the BILOU scheme.
///
/// Multi-token entities are tagged `B-`, `I-`*, `L-`; single-token entities
/// get `U-`; everything else is `O`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BilouTag {
    Outside,
    Begin(String),
    Inside(String),
    Last(String),
    Unit(String),
}

impl BilouTag {
    /// The entity label carried by the tag, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            BilouTag::Outside => None,
            BilouTag::Begin(l) | BilouTag::Inside(l) | BilouTag::Last(l) | BilouTag::Unit(l) => {
                Some(l)
            }
        }
    }

    pub fn is_outside(&self) -> bool {
        matches!(self, BilouTag::Outside)
    }
}

impl fmt::Display for BilouTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BilouTag::Outside => f.write_str("O"),
            BilouTag::Begin(l) => write!(f, "B-{l}"),
            BilouTag::Inside(l) => write!(f, "I-{l}"),
            BilouTag::Last(l) => write!(f, "L-{l}"),
            BilouTag::Unit(l) => write!(f, "U-{l}"),
        }
    }
}
