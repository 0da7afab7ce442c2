//! Vehicle missions: the orders a vehicle works through one at a time.
//!
//! A vehicle's [`MissionQueue`] holds its pending missions; only the front
//! one acts. The scheduler drives the front mission through
//! [`VehicleMission::start`], [`VehicleMission::update`] and
//! [`VehicleMission::is_finished`], and the motion system pulls waypoints
//! out of it with [`VehicleMission::next_destination`].
//!
//! A mission that needs something done first (take off, fly closer, wait)
//! returns [`Activation::Preempt`] from `start`. The sub-mission goes in
//! front of it and the parent is started again once the sub-mission has
//! been popped.
//!
//! Failures inside a mission never propagate. A dangling target or a
//! misuse is logged and the mission either stalls or falls back to a
//! harmless default.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::city::BuildingId;
use crate::entry_policy::{CanEnterTile, FlyingVehicleEntryPolicy};
use crate::math::{GridPos, Vec3Fixed};
use crate::routing::{select_pad_route, RouteChoice, PATH_EXPANSION_BUDGET};
use crate::scheduler::{MissionContext, VehicleEvent};
use crate::vehicle::{Vehicle, VehicleId};

/// Ticks to wait before retrying when no pad of a building can be routed to.
pub const NO_ROUTE_SNOOZE_TICKS: u32 = 10;

/// What a mission is trying to do, with its per-kind state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionKind {
    /// Fly to a tile.
    GotoLocation {
        /// Destination tile.
        target: GridPos,
    },
    /// Fly to a building and land in it.
    GotoBuilding {
        /// Building to land in.
        target: BuildingId,
    },
    /// Stay next to another airborne vehicle.
    FollowVehicle {
        /// Vehicle to follow.
        target: VehicleId,
        /// Target tile when the current path was planned.
        last_seen: Option<GridPos>,
    },
    /// Close in on another airborne vehicle.
    AttackVehicle {
        /// Vehicle to attack.
        target: VehicleId,
        /// Target tile when the current path was planned.
        last_seen: Option<GridPos>,
    },
    /// Fly over a building's pads.
    AttackBuilding {
        /// Building to attack.
        target: BuildingId,
    },
    /// Wait a number of ticks.
    Snooze {
        /// Ticks left to wait.
        remaining: u32,
    },
    /// Leave the building the vehicle is parked in.
    TakeOff,
    /// Descend onto a pad directly below and park in its building.
    Land {
        /// Building that owns the pad.
        target: BuildingId,
        /// Whether `start` found a pad below and planned the descent.
        approach_planned: bool,
        /// Whether the landing has happened.
        touched_down: bool,
    },
}

impl MissionKind {
    /// Short name of the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GotoLocation { .. } => "GotoLocation",
            Self::GotoBuilding { .. } => "GotoBuilding",
            Self::FollowVehicle { .. } => "FollowVehicle",
            Self::AttackVehicle { .. } => "AttackVehicle",
            Self::AttackBuilding { .. } => "AttackBuilding",
            Self::Snooze { .. } => "Snooze",
            Self::TakeOff => "TakeOff",
            Self::Land { .. } => "Land",
        }
    }
}

/// Result of activating a mission.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The mission is set up and can be updated.
    Ready,
    /// Run this sub-mission first, then start the mission again.
    Preempt(VehicleMission),
}

/// A single order in a vehicle's queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleMission {
    kind: MissionKind,
    /// Waypoints still to hand out, consumed from the front.
    planned_path: VecDeque<GridPos>,
    /// Set while the mission is the activated front of its queue.
    started: bool,
}

impl VehicleMission {
    fn new(kind: MissionKind) -> Self {
        Self {
            kind,
            planned_path: VecDeque::new(),
            started: false,
        }
    }

    /// Fly to `target`, taking off first if needed.
    #[must_use]
    pub fn goto_location(vehicle: &Vehicle, target: GridPos) -> Self {
        tracing::trace!(vehicle = %vehicle.id, %target, "Creating GotoLocation mission");
        Self::new(MissionKind::GotoLocation { target })
    }

    /// Fly to `building` and land in it.
    #[must_use]
    pub fn goto_building(vehicle: &Vehicle, building: BuildingId) -> Self {
        tracing::trace!(vehicle = %vehicle.id, %building, "Creating GotoBuilding mission");
        Self::new(MissionKind::GotoBuilding { target: building })
    }

    /// Wait `ticks` ticks.
    #[must_use]
    pub fn snooze(vehicle: &Vehicle, ticks: u32) -> Self {
        tracing::trace!(vehicle = %vehicle.id, ticks, "Creating Snooze mission");
        Self::new(MissionKind::Snooze { remaining: ticks })
    }

    /// Take off from the building the vehicle is parked in.
    ///
    /// Returns `None` if the vehicle is not parked in a building.
    #[must_use]
    pub fn take_off(vehicle: &Vehicle) -> Option<Self> {
        if vehicle.landed_in().is_none() {
            tracing::error!(
                op = "take_off",
                vehicle = %vehicle.id,
                "Trying to take off while not in a building"
            );
            return None;
        }
        Some(Self::new(MissionKind::TakeOff))
    }

    /// Land on a pad of `building` directly below the vehicle.
    #[must_use]
    pub fn land(vehicle: &Vehicle, building: BuildingId) -> Self {
        tracing::trace!(vehicle = %vehicle.id, %building, "Creating Land mission");
        Self::new(MissionKind::Land {
            target: building,
            approach_planned: false,
            touched_down: false,
        })
    }

    /// Keep flying next to `target` while it is airborne.
    #[must_use]
    pub fn follow_vehicle(vehicle: &Vehicle, target: VehicleId) -> Self {
        tracing::trace!(vehicle = %vehicle.id, %target, "Creating FollowVehicle mission");
        Self::new(MissionKind::FollowVehicle {
            target,
            last_seen: None,
        })
    }

    /// Close in on `target` while it is airborne.
    #[must_use]
    pub fn attack_vehicle(vehicle: &Vehicle, target: VehicleId) -> Self {
        tracing::trace!(vehicle = %vehicle.id, %target, "Creating AttackVehicle mission");
        Self::new(MissionKind::AttackVehicle {
            target,
            last_seen: None,
        })
    }

    /// Fly over one of `building`'s pads.
    #[must_use]
    pub fn attack_building(vehicle: &Vehicle, building: BuildingId) -> Self {
        tracing::trace!(vehicle = %vehicle.id, %building, "Creating AttackBuilding mission");
        Self::new(MissionKind::AttackBuilding { target: building })
    }

    /// The mission's kind and state.
    #[must_use]
    pub const fn kind(&self) -> &MissionKind {
        &self.kind
    }

    /// Waypoints not yet handed to the motion system.
    #[must_use]
    pub fn planned_path(&self) -> &VecDeque<GridPos> {
        &self.planned_path
    }

    /// Whether the motion system should ask this mission for waypoints.
    #[must_use]
    pub const fn provides_waypoints(&self) -> bool {
        !matches!(
            self.kind,
            MissionKind::GotoBuilding { .. } | MissionKind::Snooze { .. }
        )
    }

    pub(crate) const fn is_started(&self) -> bool {
        self.started
    }

    pub(crate) fn mark_started(&mut self) {
        self.started = true;
    }

    pub(crate) fn mark_suspended(&mut self) {
        self.started = false;
    }

    fn set_path(&mut self, path: Vec<GridPos>) {
        self.planned_path = path.into();
    }

    /// All waypoints handed out and the last one reached.
    fn route_drained(&self, vehicle: &Vehicle) -> bool {
        self.planned_path.is_empty() && vehicle.goal.is_none()
    }

    /// Activate the mission. Called each time it becomes the front of its queue.
    pub fn start(&mut self, ctx: &mut MissionContext<'_>, vehicle: &Vehicle) -> Activation {
        tracing::debug!(op = "start", vehicle = %vehicle.id, mission = %self, "Starting mission");
        match self.kind {
            MissionKind::TakeOff | MissionKind::Snooze { .. } => Activation::Ready,
            MissionKind::GotoLocation { target } => {
                if !vehicle.is_flying() {
                    return self.take_off_first(vehicle);
                }
                self.planned_path.clear();
                let path = plan_path(ctx, vehicle, target);
                self.set_path(path);
                Activation::Ready
            }
            MissionKind::GotoBuilding { target } => self.start_goto_building(ctx, vehicle, target),
            MissionKind::FollowVehicle { target, .. } | MissionKind::AttackVehicle { target, .. } => {
                if !vehicle.is_flying() {
                    return self.take_off_first(vehicle);
                }
                self.pursue(ctx, vehicle, target);
                Activation::Ready
            }
            MissionKind::AttackBuilding { target } => {
                if !vehicle.is_flying() {
                    return self.take_off_first(vehicle);
                }
                self.planned_path.clear();
                match route_to_pads(ctx, vehicle, target) {
                    Some(RouteChoice::Complete(route) | RouteChoice::Partial(route)) => {
                        self.set_path(route.path);
                        Activation::Ready
                    }
                    Some(RouteChoice::Unreachable) => {
                        tracing::warn!(
                            op = "start",
                            vehicle = %vehicle.id,
                            building = %target,
                            "No route to any pad, waiting"
                        );
                        Activation::Preempt(Self::snooze(vehicle, NO_ROUTE_SNOOZE_TICKS))
                    }
                    None => Activation::Ready,
                }
            }
            MissionKind::Land { target, .. } => {
                let planned = self.plan_landing(ctx, vehicle, target);
                self.kind = MissionKind::Land {
                    target,
                    approach_planned: planned,
                    touched_down: false,
                };
                Activation::Ready
            }
        }
    }

    fn take_off_first(&mut self, vehicle: &Vehicle) -> Activation {
        self.planned_path.clear();
        match Self::take_off(vehicle) {
            Some(take_off) => Activation::Preempt(take_off),
            None => Activation::Ready,
        }
    }

    fn start_goto_building(
        &mut self,
        ctx: &mut MissionContext<'_>,
        vehicle: &Vehicle,
        target: BuildingId,
    ) -> Activation {
        let Some(building) = ctx.world.building(target) else {
            tracing::error!(op = "start", vehicle = %vehicle.id, building = %target, "Building disappeared");
            return Activation::Ready;
        };
        if vehicle.landed_in() == Some(target) {
            return Activation::Ready;
        }
        let Some((city, tile)) = vehicle.airborne_tile() else {
            return self.take_off_first(vehicle);
        };
        if building.is_above_pad(tile) {
            return Activation::Preempt(Self::land(vehicle, target));
        }

        match route_to_pads(ctx, vehicle, target) {
            Some(RouteChoice::Complete(route)) => {
                tracing::info!(
                    op = "start",
                    vehicle = %vehicle.id,
                    building = %target,
                    %city,
                    endpoint = %route.endpoint,
                    cost = %route.cost,
                    "Routing to landing pad"
                );
                Activation::Preempt(Self::goto_location(vehicle, route.endpoint))
            }
            Some(RouteChoice::Partial(route)) => {
                tracing::info!(
                    op = "start",
                    vehicle = %vehicle.id,
                    building = %target,
                    endpoint = %route.endpoint,
                    cost = %route.cost,
                    "No complete route to any pad, moving closer"
                );
                Activation::Preempt(Self::goto_location(vehicle, route.endpoint))
            }
            Some(RouteChoice::Unreachable) => {
                tracing::warn!(
                    op = "start",
                    vehicle = %vehicle.id,
                    building = %target,
                    "No route to any pad, waiting"
                );
                Activation::Preempt(Self::snooze(vehicle, NO_ROUTE_SNOOZE_TICKS))
            }
            None => Activation::Ready,
        }
    }

    /// Find the pad below the vehicle; returns whether the descent was planned.
    fn plan_landing(
        &mut self,
        ctx: &MissionContext<'_>,
        vehicle: &Vehicle,
        target: BuildingId,
    ) -> bool {
        self.planned_path.clear();
        let Some(building) = ctx.world.building(target) else {
            tracing::error!(op = "start", vehicle = %vehicle.id, building = %target, "Building disappeared");
            return false;
        };
        let Some((city, tile)) = vehicle.airborne_tile() else {
            tracing::error!(op = "start", vehicle = %vehicle.id, "Trying to land while not airborne");
            return false;
        };
        if ctx.world.city_of_building(target) != Some(city) {
            tracing::error!(
                op = "start",
                vehicle = %vehicle.id,
                building = %target,
                %city,
                "Landing target is in another city"
            );
            return false;
        }
        if tile.z < 1 {
            tracing::error!(op = "start", vehicle = %vehicle.id, %tile, "Trying to land below ground level");
            return false;
        }
        let pad = tile.below();
        if !building.landing_pads.contains(&pad) {
            tracing::error!(
                op = "start",
                vehicle = %vehicle.id,
                building = %target,
                %tile,
                "Trying to land while not above a pad"
            );
            return false;
        }
        self.planned_path.push_back(pad);
        true
    }

    /// Re-plan toward the pursued vehicle's tile.
    fn pursue(&mut self, ctx: &MissionContext<'_>, vehicle: &Vehicle, target: VehicleId) {
        self.planned_path.clear();
        let seen = match ctx.world.flight(target) {
            Some(flight) if Some(flight.city) == vehicle.airborne_tile().map(|(c, _)| c) => {
                let path = plan_path(ctx, vehicle, flight.tile);
                self.set_path(path);
                Some(flight.tile)
            }
            Some(_) => {
                tracing::warn!(op = "pursue", vehicle = %vehicle.id, %target, "Target is in another city");
                None
            }
            None => {
                tracing::debug!(op = "pursue", vehicle = %vehicle.id, %target, "Target not airborne");
                None
            }
        };
        self.kind = match self.kind {
            MissionKind::FollowVehicle { target, .. } => MissionKind::FollowVehicle {
                target,
                last_seen: seen,
            },
            MissionKind::AttackVehicle { target, .. } => MissionKind::AttackVehicle {
                target,
                last_seen: seen,
            },
            other => other,
        };
    }

    /// Per-tick work while the mission is the active front.
    pub fn update(&mut self, ctx: &mut MissionContext<'_>, vehicle: &mut Vehicle, ticks: u32) {
        match self.kind {
            MissionKind::Snooze { remaining } => {
                self.kind = MissionKind::Snooze {
                    remaining: remaining.saturating_sub(ticks),
                };
            }
            MissionKind::TakeOff => self.launch_from_pad(ctx, vehicle),
            MissionKind::GotoLocation { .. }
            | MissionKind::GotoBuilding { .. }
            | MissionKind::Land { .. } => {}
            MissionKind::FollowVehicle { target, last_seen }
            | MissionKind::AttackVehicle { target, last_seen } => {
                if !vehicle.is_flying() || !self.route_drained(vehicle) {
                    return;
                }
                let current = ctx.world.flight(target).map(|f| f.tile);
                if current.is_some() && current != last_seen {
                    self.pursue(ctx, vehicle, target);
                }
            }
            MissionKind::AttackBuilding { target } => {
                if !vehicle.is_flying() || !self.route_drained(vehicle) {
                    return;
                }
                let Some(building) = ctx.world.building(target) else {
                    return;
                };
                let over_pad = vehicle
                    .airborne_tile()
                    .is_some_and(|(_, tile)| building.is_above_pad(tile));
                if !over_pad {
                    if let Some(RouteChoice::Complete(route) | RouteChoice::Partial(route)) =
                        route_to_pads(ctx, vehicle, target)
                    {
                        self.set_path(route.path);
                    }
                }
            }
        }
    }

    /// Search the parked building's pads for a free one and launch from it.
    fn launch_from_pad(&mut self, ctx: &mut MissionContext<'_>, vehicle: &mut Vehicle) {
        if vehicle.is_flying() {
            return;
        }
        let Some(building_id) = vehicle.landed_in() else {
            tracing::error!(op = "take_off", vehicle = %vehicle.id, "Vehicle is not in a building");
            return;
        };
        let Some(building) = ctx.world.building(building_id) else {
            tracing::error!(op = "take_off", vehicle = %vehicle.id, building = %building_id, "Building disappeared");
            return;
        };
        let Some(city_id) = ctx.world.city_of_building(building_id) else {
            tracing::error!(
                op = "take_off",
                vehicle = %vehicle.id,
                building = %building_id,
                "No city found containing building"
            );
            return;
        };
        let Some(city) = ctx.world.city(city_id) else {
            return;
        };

        let policy = FlyingVehicleEntryPolicy;
        let mut chosen = None;
        for &pad in &building.landing_pads {
            let above = pad.above();
            let (Some(pad_tile), Some(above_tile)) = (city.map.tile(pad), city.map.tile(above)) else {
                tracing::error!(
                    op = "take_off",
                    vehicle = %vehicle.id,
                    %pad,
                    "Invalid landing pad location, outside map?"
                );
                continue;
            };
            if policy.can_enter_tile(None, Some(pad_tile))
                && policy.can_enter_tile(Some(pad_tile), Some(above_tile))
            {
                chosen = Some(pad);
                break;
            }
        }

        let Some(pad) = chosen else {
            tracing::info!(
                op = "take_off",
                vehicle = %vehicle.id,
                building = %building_id,
                "No pad free, waiting"
            );
            return;
        };

        if ctx.world.launch(vehicle, city_id, pad) {
            tracing::info!(
                op = "take_off",
                vehicle = %vehicle.id,
                building = %building_id,
                city = %city_id,
                %pad,
                "Launching vehicle"
            );
            self.planned_path = VecDeque::from([pad, pad.above()]);
            ctx.events.push(VehicleEvent::Launched {
                vehicle: vehicle.id,
                building: building_id,
                pad,
            });
        }
    }

    /// Whether the mission is done and can be popped.
    ///
    /// Completing a landing happens here: the first poll that finds the
    /// descent finished parks the vehicle, later polls only report it.
    pub fn is_finished(&mut self, ctx: &mut MissionContext<'_>, vehicle: &mut Vehicle) -> bool {
        match self.kind {
            MissionKind::GotoLocation { .. } => self.route_drained(vehicle),
            MissionKind::TakeOff => vehicle.is_flying() && self.route_drained(vehicle),
            MissionKind::GotoBuilding { target } => vehicle.landed_in() == Some(target),
            MissionKind::Snooze { remaining } => remaining == 0,
            MissionKind::FollowVehicle { target, .. } | MissionKind::AttackVehicle { target, .. } => {
                ctx.world.flight(target).is_none()
            }
            MissionKind::AttackBuilding { target } => {
                let Some(building) = ctx.world.building(target) else {
                    tracing::error!(op = "is_finished", vehicle = %vehicle.id, building = %target, "Building disappeared");
                    return false;
                };
                self.route_drained(vehicle)
                    && vehicle
                        .airborne_tile()
                        .is_some_and(|(_, tile)| building.is_above_pad(tile))
            }
            MissionKind::Land {
                target,
                approach_planned,
                touched_down,
            } => {
                if touched_down {
                    return true;
                }
                if ctx.world.building(target).is_none() {
                    tracing::error!(op = "is_finished", vehicle = %vehicle.id, building = %target, "Building disappeared");
                    return false;
                }
                if !approach_planned || !self.route_drained(vehicle) {
                    return false;
                }
                if !ctx.world.land(vehicle, target) {
                    return false;
                }
                tracing::info!(op = "land", vehicle = %vehicle.id, building = %target, "Landed");
                ctx.events.push(VehicleEvent::Landed {
                    vehicle: vehicle.id,
                    building: target,
                });
                self.kind = MissionKind::Land {
                    target,
                    approach_planned,
                    touched_down: true,
                };
                true
            }
        }
    }

    /// Hand the motion system the next waypoint (a tile centre).
    pub fn next_destination(&mut self, vehicle: &Vehicle) -> Option<Vec3Fixed> {
        match self.kind {
            MissionKind::GotoBuilding { target } => {
                if vehicle.landed_in() != Some(target) {
                    tracing::warn!(
                        op = "next_destination",
                        vehicle = %vehicle.id,
                        mission = %self,
                        "Waypoint requested before reaching the target"
                    );
                }
                Some(Vec3Fixed::ZERO)
            }
            MissionKind::Snooze { .. } => None,
            _ => self.planned_path.pop_front().map(GridPos::center),
        }
    }
}

/// Path from the vehicle's tile toward `destination` on its city map.
fn plan_path(ctx: &MissionContext<'_>, vehicle: &Vehicle, destination: GridPos) -> Vec<GridPos> {
    let Some((city_id, tile)) = vehicle.airborne_tile() else {
        return Vec::new();
    };
    let Some(city) = ctx.world.city(city_id) else {
        tracing::error!(op = "plan_path", vehicle = %vehicle.id, city = %city_id, "City disappeared");
        return Vec::new();
    };
    if !city.map.in_bounds(destination) {
        tracing::error!(
            op = "plan_path",
            vehicle = %vehicle.id,
            %destination,
            "Destination outside map"
        );
        return Vec::new();
    }
    ctx.pathfinder.find_path(
        &city.map,
        tile,
        destination,
        PATH_EXPANSION_BUDGET,
        &FlyingVehicleEntryPolicy,
    )
}

/// Pad route selection for an airborne vehicle; `None` if the target is invalid.
fn route_to_pads(
    ctx: &MissionContext<'_>,
    vehicle: &Vehicle,
    target: BuildingId,
) -> Option<RouteChoice> {
    let (city_id, tile) = vehicle.airborne_tile()?;
    let Some(building) = ctx.world.building(target) else {
        tracing::error!(op = "route", vehicle = %vehicle.id, building = %target, "Building disappeared");
        return None;
    };
    if ctx.world.city_of_building(target) != Some(city_id) {
        tracing::error!(
            op = "route",
            vehicle = %vehicle.id,
            building = %target,
            city = %city_id,
            "Target building is in another city"
        );
        return None;
    }
    let city = ctx.world.city(city_id)?;
    Some(select_pad_route(
        ctx.pathfinder,
        &city.map,
        tile,
        &building.landing_pads,
    ))
}

impl fmt::Display for VehicleMission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MissionKind::GotoLocation { target } => write!(f, "GotoLocation {target}"),
            MissionKind::Land { target, .. } => write!(f, "Land in {target}"),
            other => f.write_str(other.name()),
        }
    }
}

/// A vehicle's pending missions; the front one is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissionQueue {
    missions: VecDeque<VehicleMission>,
}

impl MissionQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level order behind everything already queued.
    pub fn push(&mut self, mission: VehicleMission) {
        self.missions.push_back(mission);
    }

    /// Put a sub-mission in front of the active one.
    pub fn push_front(&mut self, mission: VehicleMission) {
        self.missions.push_front(mission);
    }

    /// The active mission.
    #[must_use]
    pub fn current(&self) -> Option<&VehicleMission> {
        self.missions.front()
    }

    /// The active mission, mutably.
    pub fn current_mut(&mut self) -> Option<&mut VehicleMission> {
        self.missions.front_mut()
    }

    /// Remove and return the active mission.
    pub fn pop(&mut self) -> Option<VehicleMission> {
        self.missions.pop_front()
    }

    /// Drop every pending mission.
    pub fn clear(&mut self) {
        self.missions.clear();
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    /// Number of queued missions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.missions.len()
    }

    /// Iterate front to back.
    pub fn iter(&self) -> impl Iterator<Item = &VehicleMission> {
        self.missions.iter()
    }
}
