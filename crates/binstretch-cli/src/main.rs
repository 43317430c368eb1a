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

//! Command-line lower-bound prover for online bin stretching.
//!
//! `binstretch <CAPACITY> <TARGET> <BINS>` decides whether an adaptive
//! Adversary can force any online Algorithm past the stretched target.
//! An Adversary win is a lower-bound proof for the stretching factor
//! `TARGET/CAPACITY`; pass `--dot <FILE>` to extract the winning
//! strategy as a Graphviz graph.

mod render;

use anyhow::{Context, Result};
use binstretch_model::{Problem, SolverConfig};
use binstretch_solver::Solver;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "binstretch", version, about = "Lower-bound prover for online bin stretching")]
struct Args {
    /// Offline bin capacity S; item sizes range over 1..=S.
    capacity: u32,

    /// Stretched target R; a bin loaded beyond R loses for the Algorithm.
    target: u32,

    /// Number of bins.
    bins: usize,

    /// Worker threads; 1 runs fully sequentially.
    #[arg(long, default_value_t = 8)]
    threads: usize,

    /// Depth of the task frontier (items sent before splitting).
    #[arg(long)]
    task_depth: Option<u32>,

    /// Total-load threshold of the task frontier (default: S * BINS / 2).
    #[arg(long)]
    task_load: Option<u32>,

    /// log2 of the transposition-table size.
    #[arg(long)]
    hash_bits: Option<u32>,

    /// Write the winning Adversary strategy as a Graphviz file.
    #[arg(long, value_name = "FILE")]
    dot: Option<PathBuf>,
}

impl Args {
    fn solver_config(&self) -> SolverConfig {
        let mut config = SolverConfig::default().with_threads(self.threads);
        if let Some(task_depth) = self.task_depth {
            config = config.with_task_depth(task_depth);
        }
        if let Some(task_load) = self.task_load {
            config = config.with_task_load(task_load);
        }
        if let Some(hash_bits) = self.hash_bits {
            config = config.with_hash_bits(hash_bits);
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let problem = Problem::new(args.capacity, args.target, args.bins)
        .context("invalid problem parameters")?;
    let config = args.solver_config();
    log::info!("solving {} with {}", problem, config);

    let solver = Solver::new(problem, config);
    let mut outcome = if args.dot.is_some() {
        solver.solve_with_witness()
    } else {
        solver.solve()
    };

    if outcome.is_lower_bound() {
        println!(
            "{}/{} bin stretching on {} bins has a lower bound.",
            args.target, args.capacity, args.bins
        );
    } else {
        println!(
            "{}/{} bin stretching on {} bins can be won by the algorithm.",
            args.target, args.capacity, args.bins
        );
    }
    log::info!("{}", outcome.stats);
    log::info!("{}", outcome.dp_stats);

    if let Some(path) = &args.dot {
        match outcome.tree.as_mut() {
            Some(tree) => {
                solver.expand(tree);
                let file = File::create(path)
                    .with_context(|| format!("cannot create {}", path.display()))?;
                let mut out = BufWriter::new(file);
                render::write_dot(&mut out, tree, &problem)
                    .with_context(|| format!("cannot write {}", path.display()))?;
                println!("winning strategy written to {}", path.display());
            }
            None => {
                log::warn!("no witness to write: the algorithm wins this instance");
            }
        }
    }

    Ok(())
}
