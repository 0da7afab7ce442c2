//! Budgeted A* over the 3D tile grid.
//!
//! All costs use fixed-point math for deterministic results across
//! clients. Missions only depend on the [`PathOracle`] contract; the
//! A* search here is the implementation the simulation uses by default.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::entry_policy::CanEnterTile;
use crate::math::{Fixed, GridPos};
use crate::tile::TileMap;

/// Shortest-path oracle consumed by missions.
pub trait PathOracle {
    /// Find a route from `origin` toward `destination`.
    ///
    /// The result starts with the first step after `origin`. If the
    /// destination is not reached within `max_expansions` node expansions
    /// (or cannot be reached at all) the route ends at the closest tile the
    /// search found instead. An empty result means no movement is possible.
    fn find_path(
        &self,
        map: &TileMap,
        origin: GridPos,
        destination: GridPos,
        max_expansions: u32,
        policy: &dyn CanEnterTile,
    ) -> Vec<GridPos>;
}

/// Cost of a move along one axis.
const STRAIGHT_COST: Fixed = Fixed::ONE;
/// √2 in fixed-point, for moves along two axes.
const DIAGONAL_COST: Fixed = Fixed::from_bits(6_074_001_000);
/// √3 in fixed-point, for moves along all three axes.
const CORNER_COST: Fixed = Fixed::from_bits(7_439_101_574);

/// All 26 neighbour offsets, in a fixed order for determinism.
const NEIGHBOURS: [(i32, i32, i32); 26] = {
    let mut out = [(0, 0, 0); 26];
    let mut i = 0;
    let mut dz = -1;
    while dz <= 1 {
        let mut dy = -1;
        while dy <= 1 {
            let mut dx = -1;
            while dx <= 1 {
                if dx != 0 || dy != 0 || dz != 0 {
                    out[i] = (dx, dy, dz);
                    i += 1;
                }
                dx += 1;
            }
            dy += 1;
        }
        dz += 1;
    }
    out
};

/// Movement cost for a neighbour offset.
#[inline]
fn step_cost(dx: i32, dy: i32, dz: i32) -> Fixed {
    match (dx != 0) as u8 + (dy != 0) as u8 + (dz != 0) as u8 {
        1 => STRAIGHT_COST,
        2 => DIAGONAL_COST,
        _ => CORNER_COST,
    }
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    pos: GridPos,
    /// g + h.
    f_score: Fixed,
    /// Estimated remaining distance, used to break f ties.
    h_score: Fixed,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse everything for min-heap behaviour.
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.h_score.cmp(&self.h_score))
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* search with a node-expansion budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AStarPathfinder;

impl PathOracle for AStarPathfinder {
    fn find_path(
        &self,
        map: &TileMap,
        origin: GridPos,
        destination: GridPos,
        max_expansions: u32,
        policy: &dyn CanEnterTile,
    ) -> Vec<GridPos> {
        if !map.in_bounds(origin) {
            tracing::error!(op = "find_path", %origin, "Path origin outside map");
            return Vec::new();
        }
        if origin == destination {
            return Vec::new();
        }

        let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
        let mut closed: HashSet<GridPos> = HashSet::new();
        let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();
        let mut g_score: HashMap<GridPos, Fixed> = HashMap::new();

        let start_h = origin.distance(destination);
        g_score.insert(origin, Fixed::ZERO);
        open_set.push(AStarNode {
            pos: origin,
            f_score: start_h,
            h_score: start_h,
        });

        // Closest expanded node so far: (h, g, pos).
        let mut best = (start_h, Fixed::ZERO, origin);
        let mut expansions = 0u32;

        while let Some(current) = open_set.pop() {
            if !closed.insert(current.pos) {
                // Stale entry superseded by a cheaper one.
                continue;
            }

            let current_g = g_score.get(&current.pos).copied().unwrap_or(Fixed::MAX);
            if (current.h_score, current_g, current.pos) < best {
                best = (current.h_score, current_g, current.pos);
            }

            if current.pos == destination {
                return reconstruct_path(&came_from, origin, destination);
            }

            expansions += 1;
            if expansions > max_expansions {
                break;
            }

            let current_tile = map.tile(current.pos);
            for &(dx, dy, dz) in &NEIGHBOURS {
                let next = current.pos.offset(dx, dy, dz);
                if closed.contains(&next) || !map.in_bounds(next) {
                    continue;
                }
                if !policy.can_enter_tile(current_tile, map.tile(next)) {
                    continue;
                }

                let tentative_g = current_g + step_cost(dx, dy, dz);
                let neighbour_g = g_score.get(&next).copied().unwrap_or(Fixed::MAX);
                if tentative_g < neighbour_g {
                    came_from.insert(next, current.pos);
                    g_score.insert(next, tentative_g);

                    let h = next.distance(destination);
                    open_set.push(AStarNode {
                        pos: next,
                        f_score: tentative_g + h,
                        h_score: h,
                    });
                }
            }
        }

        let (_, _, closest) = best;
        tracing::debug!(
            op = "find_path",
            %origin,
            %destination,
            %closest,
            expansions,
            "Destination not reached, returning partial path"
        );
        reconstruct_path(&came_from, origin, closest)
    }
}

/// Reconstruct the path from `came_from`, excluding `origin`.
fn reconstruct_path(
    came_from: &HashMap<GridPos, GridPos>,
    origin: GridPos,
    end: GridPos,
) -> Vec<GridPos> {
    let mut path = Vec::new();
    let mut current = end;

    while current != origin {
        path.push(current);
        match came_from.get(&current) {
            Some(&prev) => current = prev,
            None => break,
        }
    }

    path.reverse();
    path
}
