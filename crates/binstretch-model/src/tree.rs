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

//! Arena-backed game tree recording a winning Adversary strategy.
//!
//! The tree is only materialized when a witness is requested: an
//! Adversary node stores the item size it sends (`next_item`) and one
//! child slot per bin the Algorithm may answer with. Children of a node
//! whose branch turned out losing are discarded by truncating the arena
//! back to a watermark, which is why nodes are appended strictly in
//! exploration order and never reordered.
//!
//! A node can also be a `cached` stub: its verdict came out of the
//! transposition table, so the moves below it were never recorded. The
//! renderer re-expands such stubs by evaluating the position again and
//! grafting the resulting subtree over the stub in place.

use crate::{binconf::BinConf, index::NodeId};
use smallvec::SmallVec;

/// One position in the witness tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// The configuration at this position (an owned snapshot).
    pub conf: BinConf,
    /// Item size the Adversary sends from here; 0 when not yet chosen or
    /// at a terminal position.
    pub next_item: u32,
    /// One slot per bin rank the Algorithm can answer with.
    pub children: SmallVec<[Option<NodeId>; 4]>,
    /// Items sent on the path from the root to this node.
    pub depth: u32,
    /// Terminal: the next item overflows every bin.
    pub leaf: bool,
    /// Verdict taken from the transposition table; subtree not recorded.
    pub cached: bool,
}

impl TreeNode {
    fn new(conf: BinConf, depth: u32) -> Self {
        let bins = conf.bins();
        Self {
            conf,
            next_item: 0,
            children: smallvec::smallvec![None; bins],
            depth,
            leaf: false,
            cached: false,
        }
    }
}

/// An append-only arena of [`TreeNode`]s with truncation rollback.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<TreeNode>,
}

impl GameTree {
    /// Creates a tree holding only the root position.
    pub fn new(root_conf: BinConf) -> Self {
        Self {
            nodes: vec![TreeNode::new(root_conf, 0)],
        }
    }

    /// The root node id.
    #[inline]
    pub const fn root() -> NodeId {
        NodeId::new(0)
    }

    /// Number of nodes currently in the arena.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds only the root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Current high-water mark; pass it to [`GameTree::rollback`] to drop
    /// everything appended after this point.
    #[inline]
    pub fn watermark(&self) -> usize {
        self.nodes.len()
    }

    /// Appends a node snapshotting `conf` and returns its id. The caller
    /// links it with [`GameTree::set_child`].
    pub fn push(&mut self, conf: BinConf, depth: u32) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(TreeNode::new(conf, depth));
        id
    }

    /// Immutable node access.
    #[inline]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.get()]
    }

    /// Mutable node access.
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.get()]
    }

    /// Links `child` as the answer to placing into bin rank `bin` at
    /// `parent`.
    pub fn set_child(&mut self, parent: NodeId, bin: usize, child: NodeId) {
        debug_assert!(
            child.get() > parent.get(),
            "tree nodes must be appended in exploration order"
        );
        self.nodes[parent.get()].children[bin] = Some(child);
    }

    /// Records the item the Adversary sends from `id`.
    #[inline]
    pub fn set_next_item(&mut self, id: NodeId, size: u32) {
        self.nodes[id.get()].next_item = size;
    }

    /// Marks `id` terminal: the recorded item overflows every bin.
    #[inline]
    pub fn mark_leaf(&mut self, id: NodeId) {
        self.nodes[id.get()].leaf = true;
    }

    /// Marks `id` as a cached stub whose subtree was not recorded.
    #[inline]
    pub fn mark_cached(&mut self, id: NodeId) {
        self.nodes[id.get()].cached = true;
    }

    /// Discards every node appended at or after `watermark` and unlinks
    /// them from `parent`. Used when a candidate Adversary item turns out
    /// not to win: the subtree built under it is abandoned wholesale.
    pub fn rollback(&mut self, parent: NodeId, watermark: usize) {
        debug_assert!(
            parent.get() < watermark,
            "rollback watermark {} would truncate the parent {}",
            watermark,
            parent
        );
        self.nodes.truncate(watermark);
        let node = &mut self.nodes[parent.get()];
        for slot in node.children.iter_mut() {
            if slot.is_some_and(|c| c.get() >= watermark) {
                *slot = None;
            }
        }
        node.next_item = 0;
        node.leaf = false;
    }

    /// Replaces the cached stub `at` with the tree `subtree`, whose root
    /// must hold the same configuration. The stub keeps its id and depth;
    /// the subtree's interior nodes are appended at the end of the arena
    /// with their child links rewritten.
    pub fn graft(&mut self, at: NodeId, subtree: &GameTree) {
        debug_assert!(
            self.nodes[at.get()].cached,
            "called `GameTree::graft` on a node that is not a cached stub"
        );
        debug_assert_eq!(
            self.nodes[at.get()].conf,
            subtree.nodes[0].conf,
            "grafted subtree root does not match the stub configuration"
        );

        let offset = self.nodes.len();
        let base_depth = self.nodes[at.get()].depth;
        let relocate = |id: NodeId| {
            if id.get() == 0 {
                at
            } else {
                NodeId::new(offset + id.get() - 1)
            }
        };

        let root = &subtree.nodes[0];
        let stub = &mut self.nodes[at.get()];
        stub.next_item = root.next_item;
        stub.leaf = root.leaf;
        stub.cached = false;
        stub.children = root.children.iter().map(|c| c.map(relocate)).collect();

        for node in &subtree.nodes[1..] {
            let mut copy = node.clone();
            copy.depth = base_depth + node.depth;
            copy.children = node.children.iter().map(|c| c.map(relocate)).collect();
            self.nodes.push(copy);
        }
    }

    /// Iterates over `(id, node)` pairs in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(i), node))
    }
}
