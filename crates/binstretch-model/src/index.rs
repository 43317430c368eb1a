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

//! Strongly typed indices for the two index spaces of the search: bins
//! inside a configuration, and nodes inside the witness tree arena.
//!
//! Both are transparent `usize` wrappers. Keeping them distinct prevents
//! the classic mix-up between "the bin that received the item" and "the
//! tree node recording that placement", at zero runtime cost.

/// Index of a bin inside a [`crate::BinConf`].
///
/// Bins are always kept sorted by non-increasing load, so a `BinIndex`
/// denotes a *rank* in that order, not a stable identity. The sorted-insert
/// operations on `BinConf` return the rank an item ended up at, and the
/// matching remove takes that rank back.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BinIndex(usize);

impl BinIndex {
    /// Creates a new bin index.
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying `usize`.
    #[inline(always)]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Debug for BinIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BinIndex({})", self.0)
    }
}

impl std::fmt::Display for BinIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BinIndex({})", self.0)
    }
}

impl From<usize> for BinIndex {
    #[inline(always)]
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Index of a node inside a [`crate::GameTree`] arena.
///
/// Children reference each other by `NodeId` rather than by pointer, so a
/// failed branch can be rolled back by truncating the arena and a cached
/// stub can later be replaced by a freshly expanded subtree without any
/// dangling references.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a new node id.
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying `usize`.
    #[inline(always)]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_index_round_trip() {
        let b = BinIndex::new(2);
        assert_eq!(b.get(), 2);
        assert_eq!(format!("{}", b), "BinIndex(2)");
    }

    #[test]
    fn test_node_id_ordering() {
        assert!(NodeId::new(1) < NodeId::new(7));
        assert_eq!(format!("{:?}", NodeId::new(7)), "NodeId(7)");
    }
}
