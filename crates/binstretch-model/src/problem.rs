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

//! The bin-stretching problem description.
//!
//! A `Problem` fixes the three parameters of the game: the offline bin
//! capacity `S`, the stretched target `R`, and the number of bins. The
//! Adversary tries to force some bin above `R` while keeping the item
//! sequence packable into the bins at capacity `S` by an optimal offline
//! packer; the Algorithm tries to keep every bin at or below `R`.
//!
//! All parameters are validated at construction time. In particular the
//! radix encoding used by the feasibility oracle must be able to represent
//! every load tuple in a single `u64`, which bounds `(S + 1).pow(BINS)`.

/// The error type for problem construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemError {
    /// The bin capacity `S` must be at least 1.
    ZeroCapacity,
    /// The game needs at least two bins to be meaningful.
    TooFewBins(usize),
    /// The stretched target `R` must be at least the capacity `S`;
    /// anything below lets the Adversary win with a single item.
    TargetBelowCapacity { target: u32, capacity: u32 },
    /// `(S + 1).pow(BINS)` does not fit in a `u64`, so load tuples of
    /// this problem cannot be radix-encoded.
    RadixOverflow { capacity: u32, bins: usize },
}

impl std::fmt::Display for ProblemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemError::ZeroCapacity => write!(f, "bin capacity must be at least 1"),
            ProblemError::TooFewBins(bins) => {
                write!(f, "need at least 2 bins, got {}", bins)
            }
            ProblemError::TargetBelowCapacity { target, capacity } => write!(
                f,
                "stretched target {} is below the bin capacity {}",
                target, capacity
            ),
            ProblemError::RadixOverflow { capacity, bins } => write!(
                f,
                "load tuples for capacity {} on {} bins exceed the 64-bit radix encoding",
                capacity, bins
            ),
        }
    }
}

impl std::error::Error for ProblemError {}

/// A validated instance of the online bin-stretching decision problem.
///
/// The question the solver answers for a `Problem` is: can an adaptive
/// Adversary force *any* online Algorithm to load some bin beyond
/// `target`, using only item sequences that an optimal offline packer
/// could fit into `bins` bins of size `capacity`?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Problem {
    capacity: u32,
    target: u32,
    bins: usize,
}

impl Problem {
    /// Creates a validated problem instance.
    pub fn new(capacity: u32, target: u32, bins: usize) -> Result<Self, ProblemError> {
        if capacity == 0 {
            return Err(ProblemError::ZeroCapacity);
        }
        if bins < 2 {
            return Err(ProblemError::TooFewBins(bins));
        }
        if target < capacity {
            return Err(ProblemError::TargetBelowCapacity { target, capacity });
        }
        let radix = match capacity.checked_add(1) {
            Some(radix) => u64::from(radix),
            None => return Err(ProblemError::RadixOverflow { capacity, bins }),
        };
        if radix.checked_pow(bins as u32).is_none() {
            return Err(ProblemError::RadixOverflow { capacity, bins });
        }

        Ok(Self {
            capacity,
            target,
            bins,
        })
    }

    /// The offline bin capacity `S`. Item sizes range over `1..=S`.
    #[inline]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The stretched target `R`. A bin loaded beyond `R` loses the game
    /// for the Algorithm.
    #[inline]
    pub const fn target(&self) -> u32 {
        self.target
    }

    /// The number of bins.
    #[inline]
    pub const fn bins(&self) -> usize {
        self.bins
    }

    /// The radix of the load-tuple encoding, `S + 1`. Cannot overflow:
    /// construction rejects `capacity == u32::MAX`.
    #[inline]
    pub const fn radix(&self) -> u32 {
        self.capacity + 1
    }

    /// Total load of a completely full offline packing, `S * BINS`.
    ///
    /// The total load of any reachable configuration never exceeds this;
    /// it bounds the depth of the game.
    #[inline]
    pub const fn max_total_load(&self) -> u32 {
        self.capacity * self.bins as u32
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} bin stretching on {} bins",
            self.target, self.capacity, self.bins
        )
    }
}
