// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Game verdicts and evaluation results.

/// The resolved value of a game position.
///
/// The game is zero-sum and finite, so every position has exactly one of
/// these two values. An Adversary win at the root is a lower-bound
/// witness for the stretching factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The Adversary can force some bin beyond the stretched target.
    AdversaryWins,
    /// The Algorithm can keep all bins within the target forever.
    AlgorithmWins,
}

impl Verdict {
    /// Returns true if this verdict certifies a lower bound.
    #[inline]
    pub const fn is_lower_bound(self) -> bool {
        matches!(self, Verdict::AdversaryWins)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::AdversaryWins => write!(f, "Adversary wins"),
            Verdict::AlgorithmWins => write!(f, "Algorithm wins"),
        }
    }
}

/// Cached value attached to a configuration.
///
/// Only the minimax search mutates this; the feasibility oracle treats
/// configurations as value-less item multisets. In-flight task state is
/// tracked by the task registry, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionValue {
    /// Not evaluated yet.
    #[default]
    Unknown,
    /// Fully evaluated.
    Decided(Verdict),
}

impl PositionValue {
    /// Returns the verdict if the position is decided.
    #[inline]
    pub const fn verdict(self) -> Option<Verdict> {
        match self {
            PositionValue::Decided(v) => Some(v),
            PositionValue::Unknown => None,
        }
    }
}

impl std::fmt::Display for PositionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionValue::Unknown => write!(f, "Unknown"),
            PositionValue::Decided(v) => write!(f, "Decided({})", v),
        }
    }
}

/// Result of evaluating a node in one of the staged evaluation modes.
///
/// `Postponed` is only produced while generating or updating tasks (or
/// when a cooperative stop aborts an exploration); a completed Exploring
/// run always decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// The node value is proven.
    Decided(Verdict),
    /// The node value depends on tasks that are not resolved yet.
    Postponed,
}

impl Evaluation {
    /// Returns the verdict if the evaluation decided the node.
    #[inline]
    pub const fn verdict(self) -> Option<Verdict> {
        match self {
            Evaluation::Decided(v) => Some(v),
            Evaluation::Postponed => None,
        }
    }

    /// Returns true if the node is still waiting on tasks.
    #[inline]
    pub const fn is_postponed(self) -> bool {
        matches!(self, Evaluation::Postponed)
    }
}

impl std::fmt::Display for Evaluation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Evaluation::Decided(v) => write!(f, "Decided({})", v),
            Evaluation::Postponed => write!(f, "Postponed"),
        }
    }
}
