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

//! Graphviz rendering of a witness strategy.
//!
//! Each interior node prints its bin loads and the item the Adversary
//! sends ("n: 3"); terminal nodes (where the item overflows every bin)
//! are left implicit, as are edges into them. A configuration reachable
//! along several paths is printed once: the graph is a DAG and repeats
//! are suppressed by configuration key.
//!
//! The tree must have its cached stubs expanded first (see
//! `Solver::expand`); a stub has no recorded move to print.

use binstretch_model::{GameTree, NodeId, Problem};
use rustc_hash::FxHashSet;
use std::io::{self, Write};

/// Writes the witness tree as a Graphviz `strict digraph`.
pub fn write_dot<W: Write>(out: &mut W, tree: &GameTree, problem: &Problem) -> io::Result<()> {
    writeln!(
        out,
        "strict digraph \"{}_{}_{}\" {{",
        problem.target(),
        problem.capacity(),
        problem.bins()
    )?;
    writeln!(out, "overlap = none;")?;
    let mut seen: FxHashSet<u64> = FxHashSet::default();
    emit(out, tree, GameTree::root(), &mut seen)?;
    writeln!(out, "}}")
}

fn emit<W: Write>(
    out: &mut W,
    tree: &GameTree,
    id: NodeId,
    seen: &mut FxHashSet<u64>,
) -> io::Result<()> {
    let node = tree.node(id);
    debug_assert!(!node.cached, "render called on an unexpanded tree");
    seen.insert(node.conf.key());
    if node.leaf {
        return Ok(());
    }

    write!(out, "{} [label=\"", id.get())?;
    for &load in node.conf.loads() {
        write!(out, "{}\\n", load)?;
    }
    writeln!(out, "n: {}\"];", node.next_item)?;

    for child in node.children.iter().flatten() {
        let child_node = tree.node(*child);
        if seen.contains(&child_node.conf.key()) {
            // Already printed along another path.
            continue;
        }
        if child_node.leaf {
            continue;
        }
        writeln!(out, "{} -> {}", id.get(), child.get())?;
        emit(out, tree, *child, seen)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use binstretch_model::{BinConf, BinIndex, Zobrist};
    use std::sync::Arc;

    fn sample_tree() -> (GameTree, Problem) {
        let problem = Problem::new(3, 3, 2).expect("valid problem");
        let zobrist = Arc::new(Zobrist::new(&problem));
        let mut conf = BinConf::new(&problem, zobrist);

        // Root sends 1; answers (1, 0) and a leaf where a 3 overflows.
        let mut tree = GameTree::new(conf.clone());
        tree.set_next_item(GameTree::root(), 1);
        let rank = conf.place(1, BinIndex::new(0));
        let child = tree.push(conf.clone(), 1);
        tree.set_child(GameTree::root(), 0, child);
        tree.set_next_item(child, 3);
        tree.mark_leaf(child);
        conf.remove(1, rank);

        (tree, problem)
    }

    #[test]
    fn test_dot_output_shape() {
        let (tree, problem) = sample_tree();
        let mut buffer = Vec::new();
        write_dot(&mut buffer, &tree, &problem).expect("render");
        let dot = String::from_utf8(buffer).expect("utf-8");

        assert!(dot.starts_with("strict digraph \"3_3_2\" {"));
        assert!(dot.contains("overlap = none;"));
        // Root label: empty loads, sending item 1.
        assert!(dot.contains("0 [label=\"0\\n0\\nn: 1\"];"));
        // The leaf child is neither printed nor linked.
        assert!(!dot.contains("0 -> 1"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_repeated_configurations_are_printed_once() {
        let problem = Problem::new(3, 4, 2).expect("valid problem");
        let zobrist = Arc::new(Zobrist::new(&problem));
        let mut conf = BinConf::new(&problem, zobrist);

        // Two different root answers that converge on the same child
        // configuration (loads (1, 0) with one size-1 item).
        let mut tree = GameTree::new(conf.clone());
        tree.set_next_item(GameTree::root(), 1);
        let rank = conf.place(1, BinIndex::new(0));
        let a = tree.push(conf.clone(), 1);
        conf.remove(1, rank);
        let rank = conf.place(1, BinIndex::new(1));
        let b = tree.push(conf.clone(), 1);
        conf.remove(1, rank);
        tree.set_child(GameTree::root(), 0, a);
        tree.set_child(GameTree::root(), 1, b);
        tree.set_next_item(a, 2);
        tree.mark_leaf(a);
        tree.set_next_item(b, 2);
        tree.mark_leaf(b);

        let mut buffer = Vec::new();
        write_dot(&mut buffer, &tree, &problem).expect("render");
        let dot = String::from_utf8(buffer).expect("utf-8");
        // Both children are leaves sharing a key; neither is printed and
        // no edge appears twice.
        assert_eq!(dot.matches("->").count(), 0);
    }
}
