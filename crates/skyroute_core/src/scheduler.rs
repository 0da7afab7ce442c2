//! Per-vehicle mission scheduling.
//!
//! Each tick a vehicle's front mission is activated if it has not been
//! yet, updated, and popped when finished. Every mission that becomes the
//! front is started, including a parent resuming after its sub-mission.
//! The motion system then moves the vehicle along the front mission's
//! waypoints.

use serde::{Deserialize, Serialize};

use crate::city::BuildingId;
use crate::math::GridPos;
use crate::mission::{Activation, MissionQueue};
use crate::movement::advance_vehicle;
use crate::pathfinding::PathOracle;
use crate::vehicle::{Vehicle, VehicleId};
use crate::world::World;

/// Upper bound on mission activations for one vehicle in one tick.
///
/// A chain of missions that keep preempting or finishing immediately stops
/// here for the tick instead of spinning.
pub const MAX_ACTIVATIONS_PER_TICK: u32 = 32;

/// Something observable that happened to a vehicle during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleEvent {
    /// The vehicle left a building from one of its pads.
    Launched {
        /// The vehicle.
        vehicle: VehicleId,
        /// Building it left.
        building: BuildingId,
        /// Pad it launched from.
        pad: GridPos,
    },
    /// The vehicle parked in a building.
    Landed {
        /// The vehicle.
        vehicle: VehicleId,
        /// Building it parked in.
        building: BuildingId,
    },
    /// A mission became active.
    MissionStarted {
        /// The vehicle.
        vehicle: VehicleId,
        /// Display name of the mission.
        mission: String,
    },
    /// A mission completed and was removed from the queue.
    MissionFinished {
        /// The vehicle.
        vehicle: VehicleId,
        /// Display name of the mission.
        mission: String,
    },
    /// Activation stopped early this tick.
    ActivationLimitReached {
        /// The vehicle.
        vehicle: VehicleId,
    },
}

/// Everything a mission may consult or change while it runs.
pub struct MissionContext<'a> {
    /// Cities, buildings and the airborne index.
    pub world: &'a mut World,
    /// Route oracle used for all planning.
    pub pathfinder: &'a dyn PathOracle,
    /// Events produced so far.
    pub events: Vec<VehicleEvent>,
}

impl<'a> MissionContext<'a> {
    /// Create a context with no events recorded yet.
    pub fn new(world: &'a mut World, pathfinder: &'a dyn PathOracle) -> Self {
        Self {
            world,
            pathfinder,
            events: Vec::new(),
        }
    }
}

/// Run one vehicle through `ticks` ticks of mission work and motion.
pub fn tick_vehicle(ctx: &mut MissionContext<'_>, vehicle: &mut Vehicle, ticks: u32) {
    let mut queue = std::mem::take(&mut vehicle.missions);
    let mut activations = 0u32;

    if activate_front(ctx, vehicle, &mut queue, &mut activations) {
        if let Some(mission) = queue.current_mut() {
            mission.update(ctx, vehicle, ticks);
        }
        pop_finished(ctx, vehicle, &mut queue, &mut activations);
    }

    advance_vehicle(ctx, vehicle, &mut queue, ticks);
    vehicle.missions = queue;
}

/// Start the front mission, and any sub-missions it asks for, if needed.
///
/// Returns `false` if the activation limit was hit.
fn activate_front(
    ctx: &mut MissionContext<'_>,
    vehicle: &mut Vehicle,
    queue: &mut MissionQueue,
    activations: &mut u32,
) -> bool {
    loop {
        let Some(front) = queue.current_mut() else {
            return true;
        };
        if front.is_started() {
            return true;
        }
        if *activations >= MAX_ACTIVATIONS_PER_TICK {
            tracing::warn!(
                op = "activate",
                vehicle = %vehicle.id,
                mission = %front,
                "Activation limit reached, deferring to next tick"
            );
            ctx.events.push(VehicleEvent::ActivationLimitReached {
                vehicle: vehicle.id,
            });
            return false;
        }
        *activations += 1;

        front.mark_started();
        ctx.events.push(VehicleEvent::MissionStarted {
            vehicle: vehicle.id,
            mission: front.to_string(),
        });
        match front.start(ctx, vehicle) {
            Activation::Ready => return true,
            Activation::Preempt(sub) => {
                tracing::debug!(
                    op = "activate",
                    vehicle = %vehicle.id,
                    parent = %front,
                    mission = %sub,
                    "Preempting with sub-mission"
                );
                front.mark_suspended();
                queue.push_front(sub);
            }
        }
    }
}

/// Pop finished missions, activating each newly exposed front.
fn pop_finished(
    ctx: &mut MissionContext<'_>,
    vehicle: &mut Vehicle,
    queue: &mut MissionQueue,
    activations: &mut u32,
) {
    while let Some(front) = queue.current_mut() {
        if !front.is_finished(ctx, vehicle) {
            return;
        }
        if let Some(done) = queue.pop() {
            tracing::debug!(op = "pop", vehicle = %vehicle.id, mission = %done, "Mission finished");
            ctx.events.push(VehicleEvent::MissionFinished {
                vehicle: vehicle.id,
                mission: done.to_string(),
            });
        }
        if !activate_front(ctx, vehicle, queue, activations) {
            return;
        }
    }
}
