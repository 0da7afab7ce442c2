//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays and snapshots are only useful if the simulation is fully
//! deterministic. Sources of non-determinism include:
//!
//! - **Floating-point math**: positions, speeds and route costs all use
//!   [`skyroute_core::math::Fixed`].
//!
//! - **HashMap iteration order**: registries are `BTreeMap`s and vehicles
//!   are processed in ascending ID order. The pathfinder's hash maps are
//!   lookup-only; its open set breaks ties by position.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual missions and the scheduler
//! 2. **Property tests**: random orders must still produce deterministic outputs
//! 3. **Integration tests**: full scenarios are reproducible
//! 4. **Parallel tests**: running N simulations on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use skyroute_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        assert!(
            self.is_deterministic,
            "Simulation is non-deterministic!\n\
             Runs: {}\n\
             Ticks: {}\n\
             Unique hashes: {} (expected 1)\n\
             All hashes: {:?}",
            self.hashes.len(),
            self.ticks,
            self.unique_hashes().len(),
            self.hashes
        );
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance state by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a simulation twice with identical setup and compare final hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick();
        },
        Simulation::state_hash,
    )
    .is_deterministic
}

/// Run `num_sims` simulations on scoped threads and collect final hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
#[must_use]
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two simulation runs tick-by-tick, finding the first divergence.
///
/// Both the state hash and the tick events are compared.
///
/// # Returns
///
/// `None` if the runs match, `Some(tick)` for the first tick that differs.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        let events1 = sim1.tick();
        let events2 = sim2.tick();

        if events1 != events2 || sim1.state_hash() != sim2.state_hash() {
            tracing::warn!(tick, "Simulations diverged");
            return Some(tick);
        }
    }

    None
}

/// Verify that a snapshot taken after `num_ticks` resumes identically.
///
/// The original and the restored simulation are both advanced for
/// `resume_ticks` more ticks and must end in the same state.
pub fn verify_snapshot_determinism<F>(setup_fn: F, num_ticks: u64, resume_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let mut sim = setup_fn();
    for _ in 0..num_ticks {
        sim.tick();
    }

    let Ok(bytes) = sim.serialize() else {
        return false;
    };
    let Ok(mut restored) = Simulation::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != sim.state_hash() {
        return false;
    }

    for _ in 0..resume_ticks {
        if sim.tick() != restored.tick() {
            return false;
        }
    }
    sim.state_hash() == restored.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of simulation determinism.
pub mod strategies {
    use proptest::prelude::*;
    use skyroute_core::math::{Fixed, GridPos};

    /// Generate a tile position inside a map of the given size.
    pub fn arb_grid_pos(size: GridPos) -> impl Strategy<Value = GridPos> {
        (0..size.x, 0..size.y, 0..size.z).prop_map(|(x, y, z)| GridPos::new(x, y, z))
    }

    /// Generate a flight speed between 0.25 and 2 tiles per tick.
    pub fn arb_vehicle_speed() -> impl Strategy<Value = Fixed> {
        (1i32..=8i32).prop_map(|quarters| Fixed::from_num(quarters) / Fixed::from_num(4))
    }

    /// Generate snooze lengths.
    pub fn arb_snooze_ticks() -> impl Strategy<Value = u32> {
        0u32..30u32
    }

    /// An order for a vehicle in the standard test town.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum TownOrder {
        /// Fly to a tile.
        Goto(GridPos),
        /// Land at the depot.
        Depot,
        /// Land at the tower.
        Tower,
        /// Wait.
        Snooze(u32),
    }

    /// Generate a town order with targets inside a map of the given size.
    pub fn arb_town_order(size: GridPos) -> impl Strategy<Value = TownOrder> {
        prop_oneof![
            arb_grid_pos(size).prop_map(TownOrder::Goto),
            Just(TownOrder::Depot),
            Just(TownOrder::Tower),
            arb_snooze_ticks().prop_map(TownOrder::Snooze),
        ]
    }

    /// Generate a sequence of town orders.
    pub fn arb_town_orders(size: GridPos, max_len: usize) -> impl Strategy<Value = Vec<TownOrder>> {
        proptest::collection::vec(arb_town_order(size), 0..max_len)
    }
}
