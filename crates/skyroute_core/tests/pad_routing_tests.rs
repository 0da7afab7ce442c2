use proptest::prelude::*;

use skyroute_core::math::{Fixed, GridPos};
use skyroute_core::routing::{select_pad_route, RouteChoice, PATH_EXPANSION_BUDGET};
use skyroute_core::tile::TileMap;
use skyroute_test_utils::fixtures::{straight_route, ScriptedPathfinder};

fn pads() -> Vec<GridPos> {
    vec![
        GridPos::new(10, 0, 0),
        GridPos::new(10, 5, 0),
        GridPos::new(10, 9, 0),
    ]
}

fn map() -> TileMap {
    TileMap::new(GridPos::new(16, 16, 4))
}

#[test]
fn cheapest_complete_route_wins() {
    let pads = pads();
    let origin = GridPos::new(1, 5, 3);
    let oracle = ScriptedPathfinder::new()
        .with_route(pads[0].above(), straight_route(7, pads[0].above()))
        .with_route(pads[1].above(), straight_route(3, pads[1].above()))
        .with_route(pads[2].above(), straight_route(5, pads[2].above()));

    let choice = select_pad_route(&oracle, &map(), origin, &pads);

    let RouteChoice::Complete(route) = choice else {
        panic!("expected a complete route, got {choice:?}");
    };
    assert_eq!(route.endpoint, pads[1].above());
    assert_eq!(route.cost, Fixed::from_num(3));
    assert_eq!(route.path.len(), 3);

    // One query per pad, in pad order, from the origin under the shared budget.
    let expected: Vec<_> = pads
        .iter()
        .map(|pad| (origin, pad.above(), PATH_EXPANSION_BUDGET))
        .collect();
    assert_eq!(oracle.queries(), expected);
    assert_eq!(PATH_EXPANSION_BUDGET, 500);
}

#[test]
fn complete_route_beats_cheaper_partial() {
    let pads = pads();
    let oracle = ScriptedPathfinder::new()
        .with_route(pads[0].above(), straight_route(2, GridPos::new(3, 0, 1)))
        .with_route(pads[2].above(), straight_route(9, pads[2].above()));

    let choice = select_pad_route(&oracle, &map(), GridPos::ZERO, &pads);
    assert!(matches!(choice, RouteChoice::Complete(ref r) if r.endpoint == pads[2].above()));
}

#[test]
fn cheapest_partial_route_wins() {
    let pads = pads();
    // 11 tiles ending sqrt(2) short (≈12.4) vs 8 tiles ending 1 short (9).
    let far_end = pads[0].above().offset(-1, 1, 0);
    let near_end = pads[1].above().offset(-1, 0, 0);
    let oracle = ScriptedPathfinder::new()
        .with_route(pads[0].above(), straight_route(11, far_end))
        .with_route(pads[1].above(), straight_route(8, near_end));

    let choice = select_pad_route(&oracle, &map(), GridPos::ZERO, &pads);

    let RouteChoice::Partial(route) = choice else {
        panic!("expected a partial route, got {choice:?}");
    };
    assert_eq!(route.endpoint, near_end);
    assert!((route.cost - Fixed::from_num(9)).abs() < Fixed::from_num(0.001));
}

#[test]
fn ties_keep_first_pad() {
    let pads = pads();
    let oracle = ScriptedPathfinder::new()
        .with_route(pads[0].above(), straight_route(4, pads[0].above()))
        .with_route(pads[1].above(), straight_route(4, pads[1].above()));

    let choice = select_pad_route(&oracle, &map(), GridPos::ZERO, &pads);
    assert!(matches!(choice, RouteChoice::Complete(ref r) if r.endpoint == pads[0].above()));
}

#[test]
fn no_routes_is_unreachable() {
    let oracle = ScriptedPathfinder::new();
    let choice = select_pad_route(&oracle, &map(), GridPos::ZERO, &pads());
    assert_eq!(choice, RouteChoice::Unreachable);
    assert_eq!(oracle.queries().len(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn shortest_complete_route_is_chosen(
        lengths in proptest::collection::vec(proptest::option::of(1usize..20), 3),
    ) {
        let pads = pads();
        let mut oracle = ScriptedPathfinder::new();
        for (pad, len) in pads.iter().zip(&lengths) {
            if let Some(len) = *len {
                oracle = oracle.with_route(pad.above(), straight_route(len, pad.above()));
            }
        }

        let choice = select_pad_route(&oracle, &map(), GridPos::ZERO, &pads);

        // First pad holding the minimum length.
        let best = lengths
            .iter()
            .enumerate()
            .filter_map(|(i, len)| len.map(|len| (len, i)))
            .min();
        match best {
            Some((len, i)) => {
                let RouteChoice::Complete(route) = choice else {
                    return Err(TestCaseError::fail(format!("expected a complete route, got {choice:?}")));
                };
                prop_assert_eq!(route.endpoint, pads[i].above());
                prop_assert_eq!(route.cost, Fixed::from_num(len));
            }
            None => prop_assert_eq!(choice, RouteChoice::Unreachable),
        }
        prop_assert_eq!(oracle.queries().len(), pads.len());
    }
}
