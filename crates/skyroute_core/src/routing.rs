//! Choosing the best approach to one of a building's landing pads.
//!
//! Every pad is routed to independently under the expansion budget. Routes
//! that reach the tile above their pad compete on length alone; routes cut
//! short by the budget compete on length plus the straight-line distance
//! still to go. Any complete route beats every partial one.

use crate::entry_policy::FlyingVehicleEntryPolicy;
use crate::math::{Fixed, GridPos};
use crate::pathfinding::PathOracle;
use crate::tile::TileMap;

/// Node-expansion budget for every routing query a mission makes.
pub const PATH_EXPANSION_BUDGET: u32 = 500;

/// A candidate approach to a pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCandidate {
    /// Last tile of the route.
    pub endpoint: GridPos,
    /// Route cost used for comparison.
    pub cost: Fixed,
    /// The route itself, starting after the origin.
    pub path: Vec<GridPos>,
}

/// Outcome of a pad route search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteChoice {
    /// The cheapest route that reaches the tile above a pad.
    Complete(RouteCandidate),
    /// No route reaches a pad; the most promising partial route.
    Partial(RouteCandidate),
    /// No pad can be approached at all.
    Unreachable,
}

/// Cost of a route that stops short of `destination`.
#[must_use]
pub fn partial_route_cost(path_len: usize, endpoint: GridPos, destination: GridPos) -> Fixed {
    Fixed::from_num(path_len) + endpoint.distance(destination)
}

/// Route from `origin` to the tile above each pad and pick the best one.
///
/// Ties keep the earlier pad.
pub fn select_pad_route(
    pathfinder: &dyn PathOracle,
    map: &TileMap,
    origin: GridPos,
    pads: &[GridPos],
) -> RouteChoice {
    let mut complete: Option<RouteCandidate> = None;
    let mut partial: Option<RouteCandidate> = None;

    for pad in pads {
        let destination = pad.above();
        let path = pathfinder.find_path(
            map,
            origin,
            destination,
            PATH_EXPANSION_BUDGET,
            &FlyingVehicleEntryPolicy,
        );

        let Some(&endpoint) = path.last() else {
            tracing::debug!(op = "select_pad_route", pad = %pad, "Pad unreachable");
            continue;
        };

        if endpoint == destination {
            let cost = Fixed::from_num(path.len());
            if complete.as_ref().map_or(true, |best| cost < best.cost) {
                complete = Some(RouteCandidate {
                    endpoint,
                    cost,
                    path,
                });
            }
        } else {
            let cost = partial_route_cost(path.len(), endpoint, destination);
            if partial.as_ref().map_or(true, |best| cost < best.cost) {
                partial = Some(RouteCandidate {
                    endpoint,
                    cost,
                    path,
                });
            }
        }
    }

    match (complete, partial) {
        (Some(route), _) => RouteChoice::Complete(route),
        (None, Some(route)) => RouteChoice::Partial(route),
        (None, None) => RouteChoice::Unreachable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::AStarPathfinder;

    #[test]
    fn test_partial_cost_adds_remaining_distance() {
        let cost = partial_route_cost(11, GridPos::new(0, 1, 0), GridPos::new(1, 0, 0));
        assert!((cost - Fixed::from_num(12.414)).abs() < Fixed::from_num(0.001));
    }

    #[test]
    fn test_partial_cost_on_the_destination_is_the_length() {
        let end = GridPos::new(4, 4, 2);
        assert_eq!(partial_route_cost(6, end, end), Fixed::from_num(6));
    }

    #[test]
    fn test_no_pads_is_unreachable() {
        let map = TileMap::new(GridPos::new(4, 4, 4));
        let choice = select_pad_route(&AStarPathfinder, &map, GridPos::new(1, 1, 1), &[]);
        assert_eq!(choice, RouteChoice::Unreachable);
    }
}
