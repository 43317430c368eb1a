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

//! The minimax game search for online bin stretching.
//!
//! The Adversary picks item sizes constrained by offline feasibility,
//! the Algorithm answers with bin placements; the Adversary wins a
//! branch as soon as every placement would push some bin past the
//! stretched target. The search is exact: every position value is the
//! game-theoretic one.
//!
//! The search runs in staged modes ([`minimax::EvalMode`]): a sequential
//! *generating* pass turns the positions just below a depth/load frontier
//! into tasks, workers *explore* tasks to completion, and interleaved
//! *updating* passes fold completed task verdicts back towards the root,
//! *decreasing* the relevance counts of tasks that dead branches no
//! longer need.
//!
//! Module map
//! - `context`: shared per-run state (problem, caches, thresholds).
//! - `minimax`: the two-player recursion itself.
//! - `tasks`: the deduplicated task registry workers feed from.
//! - `stats`: node and cache counters.
//! - `result`: the final outcome bundle handed to callers.

pub mod context;
pub mod minimax;
pub mod result;
pub mod stats;
pub mod tasks;

pub use context::SearchContext;
pub use minimax::{EvalMode, Minimax};
pub use result::SolverOutcome;
pub use stats::SearchStatistics;
pub use tasks::{TaskRegistry, TaskStatus};
