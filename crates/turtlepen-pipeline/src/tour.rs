//! Tour planning: choose the order islands are drawn in.
//!
//! Uses a greedy nearest-candidate heuristic. The distance to an island
//! is the Chebyshev distance from the current plotter position to the
//! island's *entry* pixel (its traversal seed), not to its closest pixel.
//! Each selection is a linear scan over the remaining pool; on ties the
//! island that came first in extraction order wins.

use crate::types::{Island, Pixel};

/// Islands not yet visited, kept in extraction order.
#[derive(Debug, Clone, Default)]
pub struct IslandPool {
    islands: Vec<Island>,
}

impl IslandPool {
    /// Create a pool from islands in extraction order.
    ///
    /// Empty islands have no entry pixel and are dropped.
    #[must_use]
    pub fn new(islands: Vec<Island>) -> Self {
        Self {
            islands: islands.into_iter().filter(|i| !i.is_empty()).collect(),
        }
    }

    /// Number of islands still waiting to be drawn.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.islands.len()
    }

    /// Returns `true` once every island has been taken.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    /// Remove and return the island whose entry pixel is nearest to `from`.
    ///
    /// Returns `None` when the pool is empty. The pool shrinks by exactly
    /// one on every `Some`.
    pub fn take_nearest(&mut self, from: Pixel) -> Option<Island> {
        let mut best: Option<(usize, u32)> = None;

        for (index, island) in self.islands.iter().enumerate() {
            let Some(entry) = island.first() else {
                continue;
            };
            let distance = from.chebyshev_distance(*entry);
            // Strict comparison keeps the earliest island on ties.
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }

        let (index, distance) = best?;
        tracing::trace!(
            from.x = from.x,
            from.y = from.y,
            index,
            distance,
            remaining = self.islands.len() - 1,
            "nearest island selected"
        );
        // `remove` (not `swap_remove`) so later ties still resolve in
        // extraction order.
        Some(self.islands.remove(index))
    }
}

/// Iterator that drains an [`IslandPool`] in tour order.
///
/// After each island the position moves to that island's last pixel,
/// which is where the plotter ends up once the island is drawn.
#[derive(Debug, Clone)]
pub struct Tour {
    pool: IslandPool,
    position: Pixel,
}

impl Tour {
    /// Start a tour from `start` over `pool`.
    #[must_use]
    pub const fn new(pool: IslandPool, start: Pixel) -> Self {
        Self {
            pool,
            position: start,
        }
    }
}

impl Iterator for Tour {
    type Item = Island;

    fn next(&mut self) -> Option<Island> {
        let island = self.pool.take_nearest(self.position)?;
        if let Some(last) = island.last() {
            self.position = *last;
        }
        Some(island)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.pool.len(), Some(self.pool.len()))
    }
}

impl ExactSizeIterator for Tour {}

/// Order `islands` into a tour starting at `start`.
#[must_use = "returns the islands in visiting order"]
pub fn plan_tour(islands: Vec<Island>, start: Pixel) -> Vec<Island> {
    Tour::new(IslandPool::new(islands), start).collect()
}
