use skyroute_core::math::{GridPos, Vec3Fixed};
use skyroute_core::mission::{MissionKind, VehicleMission, NO_ROUTE_SNOOZE_TICKS};
use skyroute_core::routing::PATH_EXPANSION_BUDGET;
use skyroute_core::scheduler::{tick_vehicle, MissionContext, VehicleEvent};
use skyroute_core::simulation::{Order, Simulation};
use skyroute_core::vehicle::{Vehicle, VehicleId};
use skyroute_core::world::World;
use skyroute_test_utils::fixtures::{
    fixed, fixed_f, spawn_airborne, straight_route, town, ScriptedPathfinder,
};

fn front_kind(sim: &Simulation, id: VehicleId) -> Option<MissionKind> {
    sim.vehicle(id)?.missions.current().map(|m| *m.kind())
}

#[test]
fn goto_building_restarts_after_snooze() {
    let (mut sim, town) = town();
    let start = GridPos::new(2, 6, 3);
    let hawk = spawn_airborne(&mut sim, "Hawk", town.city, start);
    sim.issue_order(hawk, Order::GotoBuilding(town.tower)).unwrap();
    let destination = GridPos::new(20, 6, 2);

    // No route at first: GotoBuilding falls back to a snooze.
    let blocked = ScriptedPathfinder::new();
    sim.tick_with(&blocked);
    assert_eq!(
        front_kind(&sim, hawk),
        Some(MissionKind::Snooze {
            remaining: NO_ROUTE_SNOOZE_TICKS - 1
        })
    );
    assert_eq!(sim.vehicle(hawk).unwrap().missions.len(), 2);
    for _ in 0..NO_ROUTE_SNOOZE_TICKS - 2 {
        sim.tick_with(&blocked);
    }
    assert_eq!(front_kind(&sim, hawk), Some(MissionKind::Snooze { remaining: 1 }));
    assert_eq!(blocked.queries(), vec![(start, destination, PATH_EXPANSION_BUDGET)]);

    // A route opens up; once the snooze ends GotoBuilding routes again.
    let open = ScriptedPathfinder::new().with_route(destination, straight_route(4, destination));
    let events = sim.tick_with(&open);

    assert_eq!(
        front_kind(&sim, hawk),
        Some(MissionKind::GotoLocation {
            target: destination
        })
    );
    let restarts = events
        .events
        .iter()
        .filter(|e| {
            matches!(e, VehicleEvent::MissionStarted { mission, .. } if mission == "GotoBuilding")
        })
        .count();
    assert_eq!(restarts, 1);

    // Pad selection, then the GotoLocation it hands off to, both from the snooze tile.
    assert_eq!(
        open.queries(),
        vec![(start, destination, PATH_EXPANSION_BUDGET); 2]
    );
}

#[test]
fn goto_location_moves_at_speed_and_tracks_tiles() {
    let mut world = World::new();
    let city = world.add_city("Metro", GridPos::new(10, 4, 4));
    let start = GridPos::new(0, 1, 1);
    let mut vehicle = Vehicle::new(VehicleId::new(1), "Hawk").with_speed(fixed_f(0.5));
    assert!(world.launch(&mut vehicle, city, start));
    let target = GridPos::new(3, 1, 1);
    vehicle
        .missions
        .push(VehicleMission::goto_location(&vehicle, target));
    let oracle = ScriptedPathfinder::new().with_route(target, straight_route(3, target));
    let mut ctx = MissionContext::new(&mut world, &oracle);

    tick_vehicle(&mut ctx, &mut vehicle, 1);
    let expected = start.center() + Vec3Fixed::new(fixed_f(0.5), fixed(0), fixed(0));
    assert_eq!(vehicle.position(), Some(expected));
    assert_eq!(vehicle.goal, Some(GridPos::new(1, 1, 1).center()));

    tick_vehicle(&mut ctx, &mut vehicle, 1);
    assert_eq!(vehicle.airborne_tile(), Some((city, GridPos::new(1, 1, 1))));
    assert_eq!(ctx.world.flight(vehicle.id).map(|f| f.tile), Some(GridPos::new(1, 1, 1)));
    assert_eq!(vehicle.goal, None);
    assert_eq!(oracle.queries(), vec![(start, target, PATH_EXPANSION_BUDGET)]);
}

#[test]
fn leftover_budget_carries_into_next_waypoint() {
    let mut world = World::new();
    let city = world.add_city("Metro", GridPos::new(10, 4, 4));
    let mut vehicle = Vehicle::new(VehicleId::new(1), "Hawk").with_speed(fixed(3));
    assert!(world.launch(&mut vehicle, city, GridPos::new(0, 1, 1)));
    let target = GridPos::new(5, 1, 1);
    vehicle
        .missions
        .push(VehicleMission::goto_location(&vehicle, target));
    let oracle = ScriptedPathfinder::new().with_route(target, straight_route(5, target));
    let mut ctx = MissionContext::new(&mut world, &oracle);

    tick_vehicle(&mut ctx, &mut vehicle, 1);
    assert_eq!(vehicle.airborne_tile(), Some((city, GridPos::new(3, 1, 1))));
    assert_eq!(
        vehicle.missions.current().map(|m| m.planned_path().len()),
        Some(2)
    );

    tick_vehicle(&mut ctx, &mut vehicle, 1);
    assert_eq!(vehicle.position(), Some(target.center()));
    assert!(vehicle
        .missions
        .current()
        .is_some_and(|m| m.planned_path().is_empty()));

    // Arrived with nothing left to hand out: the next tick pops the mission.
    tick_vehicle(&mut ctx, &mut vehicle, 1);
    assert!(vehicle.missions.is_empty());
    assert_eq!(vehicle.position(), Some(target.center()));
}
