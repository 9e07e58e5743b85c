//! Island extraction: label 4-connected foreground regions of a mask.
//!
//! Pixels are scanned in row-major order. Each unvisited foreground pixel
//! seeds a breadth-first traversal that collects its whole region. The
//! order pixels leave the queue is the order they are stored in the
//! [`Island`], and therefore the order they are drawn in, so the
//! traversal details below are part of the output format:
//!
//! - neighbours are enqueued in the fixed order +y, +x, −y, −x;
//! - a neighbour is enqueued if it is in bounds, foreground, and not yet
//!   visited *at enqueue time*, so the same pixel may sit in the queue
//!   more than once;
//! - the visited check that matters happens at dequeue time, and a
//!   duplicate entry is dropped there without being recorded again.
//!
//! The frontier is an explicit FIFO queue, never recursion, so large
//! islands cannot exhaust the stack.

use std::collections::VecDeque;

use crate::mask::BinaryMask;
use crate::types::{Island, Pixel};

/// Neighbour offsets in enqueue order.
const NEIGHBOURS: [(i64, i64); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Extract every maximal 4-connected foreground region.
///
/// Islands are returned in the order their seed pixels are met by the
/// row-major scan. Every foreground pixel belongs to exactly one island
/// and appears in it exactly once.
#[must_use = "returns the extracted islands"]
pub fn find_islands(mask: &BinaryMask) -> Vec<Island> {
    let mut visited = vec![false; mask.width() as usize * mask.height() as usize];
    let mut queue = VecDeque::new();
    let mut islands = Vec::new();

    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.get(x, y) && !visited[mask.index(x, y)] {
                let island = flood(mask, Pixel::new(x, y), &mut visited, &mut queue);
                tracing::trace!(
                    seed.x = x,
                    seed.y = y,
                    pixels = island.len(),
                    "island extracted"
                );
                islands.push(island);
            }
        }
    }

    tracing::debug!(islands = islands.len(), "island extraction finished");
    islands
}

/// Breadth-first traversal from `seed`, marking everything reached.
///
/// `queue` is scratch space shared across seeds; it is always drained
/// on return.
fn flood(
    mask: &BinaryMask,
    seed: Pixel,
    visited: &mut [bool],
    queue: &mut VecDeque<Pixel>,
) -> Island {
    let mut pixels = Vec::new();
    queue.push_back(seed);

    while let Some(pixel) = queue.pop_front() {
        let index = mask.index(pixel.x, pixel.y);
        if visited[index] {
            continue;
        }
        visited[index] = true;
        pixels.push(pixel);

        for (dx, dy) in NEIGHBOURS {
            let Some(neighbour) = offset(mask, pixel, dx, dy) else {
                continue;
            };
            if mask.get(neighbour.x, neighbour.y) && !visited[mask.index(neighbour.x, neighbour.y)]
            {
                queue.push_back(neighbour);
            }
        }
    }

    Island::new(pixels)
}

/// The pixel at `pixel + (dx, dy)`, or `None` if it leaves the mask.
fn offset(mask: &BinaryMask, pixel: Pixel, dx: i64, dy: i64) -> Option<Pixel> {
    let x = u32::try_from(i64::from(pixel.x) + dx).ok()?;
    let y = u32::try_from(i64::from(pixel.y) + dy).ok()?;
    (x < mask.width() && y < mask.height()).then_some(Pixel::new(x, y))
}
