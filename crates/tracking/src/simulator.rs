//! Position simulator
//!
//! Stands in for a positioning sensor. Each tick moves every teammate by an
//! unbiased random step, and moves the user by a step biased north-east,
//! but only while a recording is active. Nothing outside the simulator can
//! change these coordinates; callers get copies.

use chrono::{DateTime, Utc};
use hikepal_core::{Coordinate, Position, Teammate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use tracing::{trace, warn};

/// Scale of one user step in degrees
pub const USER_STEP_DEGREES: f64 = 0.0001;
/// Latitude draw is `random() - USER_LAT_BIAS`, so steps favor north
pub const USER_LAT_BIAS: f64 = 0.3;
/// Longitude draw is `random() - USER_LON_BIAS`, so steps favor east
pub const USER_LON_BIAS: f64 = 0.4;
/// Scale of one teammate step in degrees
pub const TEAMMATE_STEP_DEGREES: f64 = 0.00015;

/// Result of one simulator tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Tick counter, starting at 1
    pub tick: u64,
    /// New user coordinate if the user moved this tick
    pub user: Option<Coordinate>,
    /// Time the tick was applied
    pub at: DateTime<Utc>,
}

/// Simulated user and teammate positions
#[derive(Debug)]
pub struct PositionSimulator<R = StdRng> {
    user: Position,
    teammates: BTreeMap<String, Teammate>,
    rng: R,
    ticks: u64,
}

impl PositionSimulator<StdRng> {
    /// Simulator seeded from OS entropy
    pub fn new(start: Coordinate, roster: Vec<Teammate>) -> Self {
        Self::with_rng(start, roster, StdRng::from_entropy())
    }

    /// Simulator with a reproducible walk
    pub fn with_seed(start: Coordinate, roster: Vec<Teammate>, seed: u64) -> Self {
        Self::with_rng(start, roster, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PositionSimulator<R> {
    /// Simulator drawing steps from `rng`
    pub fn with_rng(start: Coordinate, roster: Vec<Teammate>, rng: R) -> Self {
        let mut teammates = BTreeMap::new();
        for teammate in roster {
            let id = teammate.id.clone();
            if teammates.insert(id.clone(), teammate).is_some() {
                warn!(teammate_id = %id, "Duplicate teammate in roster, keeping the last entry");
            }
        }

        Self {
            user: Position::now(start),
            teammates,
            rng,
            ticks: 0,
        }
    }

    /// Advance the simulation by one tick.
    ///
    /// The user is moved first so callers can feed the returned coordinate
    /// straight into the path recorder.
    pub fn tick(&mut self, recording: bool) -> TickOutcome {
        self.ticks += 1;
        let now = Utc::now();

        let user = if recording {
            let delta_lat = (self.rng.gen::<f64>() - USER_LAT_BIAS) * USER_STEP_DEGREES;
            let delta_lon = (self.rng.gen::<f64>() - USER_LON_BIAS) * USER_STEP_DEGREES;
            let moved = self.user.coordinate.offset(delta_lat, delta_lon);
            self.user = Position {
                coordinate: moved,
                updated_at: now,
            };
            Some(moved)
        } else {
            None
        };

        for teammate in self.teammates.values_mut() {
            let delta_lat = (self.rng.gen::<f64>() - 0.5) * TEAMMATE_STEP_DEGREES;
            let delta_lon = (self.rng.gen::<f64>() - 0.5) * TEAMMATE_STEP_DEGREES;
            teammate.position = teammate.position.offset(delta_lat, delta_lon);
        }

        trace!(tick = self.ticks, user_moved = user.is_some(), "Simulator tick");

        TickOutcome {
            tick: self.ticks,
            user,
            at: now,
        }
    }

    /// Current user position
    pub fn user(&self) -> Position {
        self.user
    }

    /// Copy of every teammate, ordered by id
    pub fn teammates(&self) -> Vec<Teammate> {
        self.teammates.values().cloned().collect()
    }

    /// Look up one teammate
    pub fn teammate(&self, id: &str) -> Option<&Teammate> {
        self.teammates.get(id)
    }

    /// Ticks applied so far
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> Coordinate {
        Coordinate::new(22.2225, 114.2415).unwrap()
    }

    fn roster() -> Vec<Teammate> {
        vec![
            Teammate::new("t1", "Alice", Coordinate::new(22.228, 114.242).unwrap()),
            Teammate::new("t2", "Bob", Coordinate::new(22.227, 114.2415).unwrap()),
        ]
    }

    #[test]
    fn test_user_holds_still_while_idle() {
        let mut sim = PositionSimulator::with_seed(start(), roster(), 1);

        for _ in 0..10 {
            let outcome = sim.tick(false);
            assert!(outcome.user.is_none());
        }
        assert_eq!(sim.user().coordinate, start());
        assert_eq!(sim.tick_count(), 10);
    }

    #[test]
    fn test_teammates_move_regardless_of_recording() {
        let mut sim = PositionSimulator::with_seed(start(), roster(), 2);

        for recording in [false, true, false] {
            let before = sim.teammates();
            sim.tick(recording);
            let after = sim.teammates();
            for (b, a) in before.iter().zip(after.iter()) {
                assert_ne!(b.position, a.position, "{} did not move", b.id);
            }
        }
    }

    #[test]
    fn test_user_moves_while_recording() {
        let mut sim = PositionSimulator::with_seed(start(), roster(), 3);

        let outcome = sim.tick(true);
        let moved = outcome.user.expect("user should move while recording");
        assert_eq!(sim.user().coordinate, moved);
        assert_ne!(moved, start());
    }

    #[test]
    fn test_step_magnitudes_stay_within_bounds() {
        let mut sim = PositionSimulator::with_seed(start(), roster(), 4);

        for _ in 0..500 {
            let before_user = sim.user().coordinate;
            let before_team = sim.teammates();
            sim.tick(true);

            let user = sim.user().coordinate;
            let dlat = user.latitude - before_user.latitude;
            let dlon = user.longitude - before_user.longitude;
            let eps = 1e-12;
            let step = USER_STEP_DEGREES;
            assert!(dlat >= -0.3 * step - eps && dlat <= 0.7 * step + eps);
            assert!(dlon >= -0.4 * step - eps && dlon <= 0.6 * step + eps);

            let team_bound = 0.5 * TEAMMATE_STEP_DEGREES + eps;
            for (b, a) in before_team.iter().zip(sim.teammates().iter()) {
                assert!((a.position.latitude - b.position.latitude).abs() <= team_bound);
                assert!((a.position.longitude - b.position.longitude).abs() <= team_bound);
            }
        }
    }

    #[test]
    fn test_user_walk_drifts_north_east() {
        let mut sim = PositionSimulator::with_seed(start(), roster(), 5);
        for _ in 0..2_000 {
            sim.tick(true);
        }

        // Expected drift per tick: +0.2 and +0.1 steps
        let user = sim.user().coordinate;
        assert!(user.latitude > start().latitude);
        assert!(user.longitude > start().longitude);
    }

    #[test]
    fn test_same_seed_same_walk() {
        let mut a = PositionSimulator::with_seed(start(), roster(), 42);
        let mut b = PositionSimulator::with_seed(start(), roster(), 42);

        for _ in 0..20 {
            assert_eq!(a.tick(true).user, b.tick(true).user);
        }
        assert_eq!(a.teammates(), b.teammates());
    }

    #[test]
    fn test_duplicate_roster_entries_collapse() {
        let mut entries = roster();
        entries.push(Teammate::new("t1", "Alice (phone 2)", start()));
        let sim = PositionSimulator::with_seed(start(), entries, 6);

        assert_eq!(sim.teammates().len(), 2);
        assert_eq!(sim.teammate("t1").unwrap().display_name, "Alice (phone 2)");
    }
}
