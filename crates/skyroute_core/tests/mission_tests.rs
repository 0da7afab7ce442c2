use skyroute_core::city::{BuildingId, CityId};
use skyroute_core::math::GridPos;
use skyroute_core::mission::{Activation, VehicleMission, NO_ROUTE_SNOOZE_TICKS};
use skyroute_core::routing::PATH_EXPANSION_BUDGET;
use skyroute_core::scheduler::MissionContext;
use skyroute_core::vehicle::{Vehicle, VehicleId, VehicleLocation};
use skyroute_core::world::World;
use skyroute_test_utils::fixtures::{straight_route, ScriptedPathfinder};

struct Fixture {
    world: World,
    city: CityId,
    tower: BuildingId,
    vehicle: Vehicle,
}

/// A 16x16x6 city with one tower and a vehicle parked in it.
fn fixture(pads: Vec<GridPos>) -> Fixture {
    let mut world = World::new();
    let city = world.add_city("Metro", GridPos::new(16, 16, 6));
    let tower = world.add_building(city, "Tower", pads).unwrap();
    let mut vehicle = Vehicle::new(VehicleId::new(1), "Hawk");
    vehicle.location = VehicleLocation::Landed { building: tower };
    Fixture {
        world,
        city,
        tower,
        vehicle,
    }
}

fn airborne(f: &mut Fixture, tile: GridPos) {
    assert!(f.world.launch(&mut f.vehicle, f.city, tile));
}

#[test]
fn goto_location_drains_front_to_back() {
    let mut f = fixture(vec![GridPos::new(0, 0, 0)]);
    let origin = GridPos::new(2, 2, 2);
    airborne(&mut f, origin);
    let target = GridPos::new(5, 2, 2);
    let route = straight_route(3, target);
    let oracle = ScriptedPathfinder::new().with_route(target, route.clone());
    let mut ctx = MissionContext::new(&mut f.world, &oracle);

    let mut mission = VehicleMission::goto_location(&f.vehicle, target);
    assert_eq!(mission.start(&mut ctx, &f.vehicle), Activation::Ready);
    assert_eq!(mission.planned_path().len(), 3);
    assert!(!mission.is_finished(&mut ctx, &mut f.vehicle));

    for (i, step) in route.iter().enumerate() {
        assert_eq!(mission.next_destination(&f.vehicle), Some(step.center()));
        let finished = mission.is_finished(&mut ctx, &mut f.vehicle);
        assert_eq!(finished, i == route.len() - 1);
    }
    assert_eq!(mission.next_destination(&f.vehicle), None);

    assert_eq!(oracle.queries(), vec![(origin, target, PATH_EXPANSION_BUDGET)]);
}

#[test]
fn goto_location_outside_map_plans_nothing() {
    let mut f = fixture(vec![GridPos::new(0, 0, 0)]);
    airborne(&mut f, GridPos::new(2, 2, 2));
    let oracle = ScriptedPathfinder::new();
    let mut ctx = MissionContext::new(&mut f.world, &oracle);

    let mut mission = VehicleMission::goto_location(&f.vehicle, GridPos::new(40, 2, 2));
    assert_eq!(mission.start(&mut ctx, &f.vehicle), Activation::Ready);
    assert!(mission.planned_path().is_empty());
    assert!(mission.is_finished(&mut ctx, &mut f.vehicle));
    assert!(oracle.queries().is_empty());
}

#[test]
fn goto_building_picks_cheapest_pad() {
    let pads = vec![
        GridPos::new(10, 0, 0),
        GridPos::new(10, 5, 0),
        GridPos::new(10, 9, 0),
    ];
    let mut f = fixture(pads.clone());
    let origin = GridPos::new(1, 5, 3);
    airborne(&mut f, origin);
    let oracle = ScriptedPathfinder::new()
        .with_route(pads[0].above(), straight_route(7, pads[0].above()))
        .with_route(pads[1].above(), straight_route(3, pads[1].above()))
        .with_route(pads[2].above(), straight_route(5, pads[2].above()));
    let mut ctx = MissionContext::new(&mut f.world, &oracle);

    let mut mission = VehicleMission::goto_building(&f.vehicle, f.tower);
    let activation = mission.start(&mut ctx, &f.vehicle);
    assert_eq!(
        activation,
        Activation::Preempt(VehicleMission::goto_location(&f.vehicle, pads[1].above()))
    );
    assert!(!mission.is_finished(&mut ctx, &mut f.vehicle));

    let expected: Vec<_> = pads
        .iter()
        .map(|pad| (origin, pad.above(), PATH_EXPANSION_BUDGET))
        .collect();
    assert_eq!(oracle.queries(), expected);
}

#[test]
fn goto_building_prefers_cheaper_partial() {
    let pads = vec![GridPos::new(10, 0, 0), GridPos::new(10, 5, 0)];
    let mut f = fixture(pads.clone());
    airborne(&mut f, GridPos::new(1, 5, 3));
    let far_end = pads[0].above().offset(-1, 1, 0);
    let near_end = pads[1].above().offset(-1, 0, 0);
    let oracle = ScriptedPathfinder::new()
        .with_route(pads[0].above(), straight_route(11, far_end))
        .with_route(pads[1].above(), straight_route(8, near_end));
    let mut ctx = MissionContext::new(&mut f.world, &oracle);

    let mut mission = VehicleMission::goto_building(&f.vehicle, f.tower);
    assert_eq!(
        mission.start(&mut ctx, &f.vehicle),
        Activation::Preempt(VehicleMission::goto_location(&f.vehicle, near_end))
    );
}

#[test]
fn goto_building_unreachable_snoozes() {
    let mut f = fixture(vec![GridPos::new(10, 0, 0)]);
    airborne(&mut f, GridPos::new(1, 5, 3));
    let oracle = ScriptedPathfinder::new();
    let mut ctx = MissionContext::new(&mut f.world, &oracle);

    let mut mission = VehicleMission::goto_building(&f.vehicle, f.tower);
    assert_eq!(
        mission.start(&mut ctx, &f.vehicle),
        Activation::Preempt(VehicleMission::snooze(&f.vehicle, NO_ROUTE_SNOOZE_TICKS))
    );
}

#[test]
fn follow_vehicle_plans_toward_target_and_ends_when_it_lands() {
    let mut f = fixture(vec![GridPos::new(0, 0, 0)]);
    airborne(&mut f, GridPos::new(1, 1, 2));

    let mut other = Vehicle::new(VehicleId::new(2), "Crow");
    other.location = VehicleLocation::Landed { building: f.tower };
    let target_tile = GridPos::new(6, 1, 2);
    assert!(f.world.launch(&mut other, f.city, target_tile));

    let near = target_tile.offset(-1, 0, 0);
    let oracle = ScriptedPathfinder::new().with_route(target_tile, straight_route(4, near));
    let mut ctx = MissionContext::new(&mut f.world, &oracle);

    let mut mission = VehicleMission::follow_vehicle(&f.vehicle, other.id);
    assert_eq!(mission.start(&mut ctx, &f.vehicle), Activation::Ready);
    assert_eq!(mission.planned_path().back(), Some(&near));
    assert!(!mission.is_finished(&mut ctx, &mut f.vehicle));

    assert!(ctx.world.land(&mut other, f.tower));
    assert!(mission.is_finished(&mut ctx, &mut f.vehicle));
}
