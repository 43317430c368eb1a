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

//! The outcome bundle a solver run hands back.

use crate::stats::SearchStatistics;
use binstretch_dp::DpStatistics;
use binstretch_model::{GameTree, Problem, Verdict};

/// Verdict, counters and (for Adversary wins, on request) the witness
/// strategy of one solver run.
#[derive(Debug)]
pub struct SolverOutcome {
    /// The problem that was solved.
    pub problem: Problem,
    /// The game value of the empty position.
    pub verdict: Verdict,
    /// Aggregated search counters across all engines of the run.
    pub stats: SearchStatistics,
    /// Aggregated feasibility-oracle counters.
    pub dp_stats: DpStatistics,
    /// The recorded winning Adversary strategy, when one was requested
    /// and the Adversary wins.
    pub tree: Option<GameTree>,
}

impl SolverOutcome {
    /// Returns true if the run certifies the lower bound (the Adversary
    /// wins at the root).
    #[inline]
    pub fn is_lower_bound(&self) -> bool {
        self.verdict.is_lower_bound()
    }
}

impl std::fmt::Display for SolverOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.problem, self.verdict)
    }
}
