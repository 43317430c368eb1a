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

//! Problem definition and game state for the online bin-stretching game.
//!
//! This crate holds everything the search engines agree on: the validated
//! problem description (`Problem`, `SolverConfig`), the mutable game state
//! (`BinConf` with its incremental Zobrist hashes), the verdict vocabulary,
//! and the arena-backed witness game tree.
//!
//! Module map
//! - `index`: strongly typed bin and tree-node indices.
//! - `problem`: problem parameters with construction-time validation.
//! - `config`: tuning knobs for the caches and the task scheduler.
//! - `zobrist`: deterministic XOR key tables for incremental hashing.
//! - `binconf`: the bin configuration with reversible in-place mutation.
//! - `verdict`: game verdicts and evaluation results.
//! - `table`: the sharded fixed-size transposition table.
//! - `tree`: the retained witness tree (arena of nodes, index children).

pub mod binconf;
pub mod config;
pub mod index;
pub mod problem;
pub mod table;
pub mod tree;
pub mod verdict;
pub mod zobrist;

pub use binconf::BinConf;
pub use config::SolverConfig;
pub use index::{BinIndex, NodeId};
pub use problem::{Problem, ProblemError};
pub use table::TransTable;
pub use tree::{GameTree, TreeNode};
pub use verdict::{Evaluation, PositionValue, Verdict};
pub use zobrist::Zobrist;
