//! Motion integration for airborne vehicles.
//!
//! A vehicle flies in a straight line toward its current goal at `speed`
//! tiles per tick. Reaching a goal pulls the next waypoint from the front
//! mission, and any movement budget left over carries into it.

use crate::math::{Fixed, Vec3Fixed};
use crate::mission::MissionQueue;
use crate::scheduler::MissionContext;
use crate::vehicle::Vehicle;

/// Next waypoint from the active mission, if it hands out waypoints.
fn next_waypoint(missions: &mut MissionQueue, vehicle: &Vehicle) -> Option<Vec3Fixed> {
    let mission = missions.current_mut()?;
    if !mission.is_started() || !mission.provides_waypoints() {
        return None;
    }
    mission.next_destination(vehicle)
}

/// Move `vehicle` for `ticks` ticks along the waypoints of its front mission.
pub fn advance_vehicle(
    ctx: &mut MissionContext<'_>,
    vehicle: &mut Vehicle,
    missions: &mut MissionQueue,
    ticks: u32,
) {
    if !vehicle.is_flying() {
        vehicle.goal = None;
        return;
    }

    let mut budget = vehicle.speed * Fixed::from_num(ticks);
    loop {
        let goal = match vehicle.goal {
            Some(goal) => goal,
            None => match next_waypoint(missions, vehicle) {
                Some(goal) => {
                    vehicle.goal = Some(goal);
                    goal
                }
                None => return,
            },
        };
        let Some(position) = vehicle.position() else {
            return;
        };

        let remaining = position.distance(goal);
        if remaining > budget {
            let step = (goal - position).scale(budget / remaining);
            ctx.world.relocate(vehicle, position + step);
            return;
        }

        if !ctx.world.relocate(vehicle, goal) {
            tracing::warn!(op = "advance", vehicle = %vehicle.id, %goal, "Waypoint unreachable, dropping it");
            vehicle.goal = None;
            return;
        }
        vehicle.goal = None;
        budget -= remaining;
        if budget == Fixed::ZERO {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::CityId;
    use crate::math::GridPos;
    use crate::mission::VehicleMission;
    use crate::pathfinding::AStarPathfinder;
    use crate::vehicle::{VehicleId, VehicleLocation};
    use crate::world::World;

    fn flying_vehicle(world: &mut World, city: CityId, tile: GridPos) -> Vehicle {
        let mut vehicle = Vehicle::new(VehicleId::new(1), "Hawk");
        assert!(world.launch(&mut vehicle, city, tile));
        vehicle
    }

    #[test]
    fn test_unstarted_mission_hands_out_nothing() {
        let mut world = World::new();
        let city = world.add_city("Metro", GridPos::new(10, 4, 4));
        let start = GridPos::new(0, 1, 1);
        let mut vehicle = flying_vehicle(&mut world, city, start);
        let mut ctx = MissionContext::new(&mut world, &AStarPathfinder);

        let mut queue = MissionQueue::new();
        queue.push(VehicleMission::goto_location(&vehicle, GridPos::new(4, 1, 1)));
        advance_vehicle(&mut ctx, &mut vehicle, &mut queue, 1);
        assert_eq!(vehicle.position(), Some(start.center()));
        assert_eq!(vehicle.goal, None);
    }

    #[test]
    fn test_grounded_vehicle_does_not_move() {
        let mut world = World::new();
        let mut ctx = MissionContext::new(&mut world, &AStarPathfinder);
        let mut vehicle = Vehicle::new(VehicleId::new(1), "Hawk");
        vehicle.goal = Some(Vec3Fixed::ZERO);

        advance_vehicle(&mut ctx, &mut vehicle, &mut MissionQueue::new(), 1);
        assert_eq!(vehicle.location, VehicleLocation::PendingSpawn);
        assert_eq!(vehicle.goal, None);
    }
}
