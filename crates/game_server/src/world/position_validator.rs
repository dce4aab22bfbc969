//! Periodic terrain-height validation and cumulative-distance anti-cheat.
//!
//! Two independent checks run on their own cadence against the same position
//! history: one corrects honest desync against the terrain mesh, the other
//! accumulates violations against players whose movement is not physically
//! possible even when no single tick looks suspicious.

use super::entities::{EntityRegistry, WorldPosition};
use super::terrain::{grounded_height, TerrainHeightSource};
use dashmap::DashMap;
use horizon_event_system::PlayerId;
use std::collections::VecDeque;
use std::sync::Arc;

const SANE_Y_MIN: f64 = -5.0;
const SANE_Y_MAX: f64 = 200.0;
const EMERGENCY_FALLBACK_Y: f64 = 10.0;
const DRIFT_CORRECTION_THRESHOLD: f64 = 10.0;

const HISTORY_WINDOW_MS: u64 = 5_000;
const TELEPORT_DIST_TILES: f64 = 10.0;
const TELEPORT_MAX_DT_MS: u64 = 500;
/// Matches `MovementManager`'s run speed (tiles/sec).
const MAX_RUN_TILES_PER_SEC: f64 = 8.0;
const SPEED_TOLERANCE: f64 = 1.2;
const MIN_SAMPLES_FOR_SPEED_CHECK: usize = 4;
const VIOLATION_DECAY_MS: u64 = 30_000;
const KICK_THRESHOLD: u32 = 3;

/// A single anti-cheat rule trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Teleport,
    Speed,
}

/// What the caller should do in response to a recorded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntiCheatAction {
    None,
    Warn(ViolationKind),
    Kick(ViolationKind),
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    x: f64,
    z: f64,
    t_ms: u64,
}

#[derive(Debug, Default)]
struct ViolationState {
    count: u32,
    last_warning_ms: u64,
}

/// Terrain-height + anti-cheat validator owned by the tick loop.
pub struct PositionValidator {
    entities: Arc<EntityRegistry>,
    histories: DashMap<PlayerId, VecDeque<Sample>>,
    violations: DashMap<PlayerId, ViolationState>,
    started_at_ms: u64,
}

impl PositionValidator {
    pub fn new(entities: Arc<EntityRegistry>, started_at_ms: u64) -> Self {
        Self { entities, histories: DashMap::new(), violations: DashMap::new(), started_at_ms }
    }

    /// Terrain validation interval: tight for the first 10 s of uptime (while
    /// desyncs from spawn grounding are most likely), relaxed afterward.
    pub fn terrain_check_interval_ms(&self, now_ms: u64) -> u64 {
        if now_ms.saturating_sub(self.started_at_ms) < 10_000 {
            100
        } else {
            1_000
        }
    }

    /// Validates one player's height against the terrain mesh, returning a
    /// correction if the position needs to move. Emergency-corrects far
    /// out-of-bounds or non-finite heights immediately; drifts beyond the
    /// threshold are corrected gradually (this call still snaps, since the
    /// caller only invokes it on the relaxed/tight cadence rather than every
    /// tick).
    pub fn validate_terrain(&self, player_id: PlayerId, terrain: &dyn TerrainHeightSource) -> Option<WorldPosition> {
        let entity_id = self.entities.entity_id_for_player(player_id)?;
        let entity = self.entities.get_entity(&entity_id)?;
        let pos = entity.position;

        if !pos.y.is_finite() || pos.y < SANE_Y_MIN || pos.y > SANE_Y_MAX {
            let corrected_y = grounded_height(terrain, pos.x, pos.z, EMERGENCY_FALLBACK_Y);
            let corrected = WorldPosition::new(pos.x, corrected_y, pos.z);
            self.entities.set_position(&entity_id, corrected);
            return Some(corrected);
        }

        let target_y = grounded_height(terrain, pos.x, pos.z, pos.y);
        if (pos.y - target_y).abs() > DRIFT_CORRECTION_THRESHOLD {
            let corrected = WorldPosition::new(pos.x, target_y, pos.z);
            self.entities.set_position(&entity_id, corrected);
            return Some(corrected);
        }

        None
    }

    /// Records a new observed position for the rolling anti-cheat window and
    /// returns the action the caller should take.
    pub fn record_position(&self, player_id: PlayerId, x: f64, z: f64, now_ms: u64) -> AntiCheatAction {
        self.decay_violations(player_id, now_ms);

        let mut history = self.histories.entry(player_id).or_default();
        let prev = history.back().copied();

        let mut kind = None;
        if let Some(prev) = prev {
            let dt = now_ms.saturating_sub(prev.t_ms);
            let dist = ((x - prev.x).powi(2) + (z - prev.z).powi(2)).sqrt();
            if dist > TELEPORT_DIST_TILES && dt < TELEPORT_MAX_DT_MS {
                kind = Some(ViolationKind::Teleport);
            }
        }

        history.push_back(Sample { x, z, t_ms: now_ms });
        while let Some(front) = history.front() {
            if now_ms.saturating_sub(front.t_ms) > HISTORY_WINDOW_MS {
                history.pop_front();
            } else {
                break;
            }
        }

        if kind.is_none() && history.len() >= MIN_SAMPLES_FOR_SPEED_CHECK {
            let mut total = 0.0;
            let mut iter = history.iter();
            let mut prev = iter.next().copied();
            for sample in iter {
                if let Some(p) = prev {
                    total += ((sample.x - p.x).powi(2) + (sample.z - p.z).powi(2)).sqrt();
                }
                prev = Some(*sample);
            }
            let window_secs = (now_ms.saturating_sub(history.front().unwrap().t_ms) as f64 / 1000.0).max(0.001);
            let allowed = MAX_RUN_TILES_PER_SEC * window_secs * SPEED_TOLERANCE;
            if total > allowed {
                kind = Some(ViolationKind::Speed);
            }
        }
        drop(history);

        let Some(kind) = kind else {
            return AntiCheatAction::None;
        };

        let mut state = self.violations.entry(player_id).or_default();
        state.count += 1;
        state.last_warning_ms = now_ms;

        if state.count >= KICK_THRESHOLD {
            AntiCheatAction::Kick(kind)
        } else {
            AntiCheatAction::Warn(kind)
        }
    }

    /// Decrements a player's violation count by 1 after 30 s without a new warning.
    fn decay_violations(&self, player_id: PlayerId, now_ms: u64) {
        if let Some(mut state) = self.violations.get_mut(&player_id) {
            if state.count > 0 && now_ms.saturating_sub(state.last_warning_ms) > VIOLATION_DECAY_MS {
                state.count -= 1;
                state.last_warning_ms = now_ms;
            }
        }
    }

    pub fn violation_count(&self, player_id: PlayerId) -> u32 {
        self.violations.get(&player_id).map(|s| s.count).unwrap_or(0)
    }

    pub fn remove_player(&self, player_id: PlayerId) {
        self.histories.remove(&player_id);
        self.violations.remove(&player_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::entities::{Entity, EntityKind, PlayerEntity};
    use crate::world::terrain::FlatTerrain;

    fn setup(pos: WorldPosition) -> (Arc<EntityRegistry>, PlayerId, PositionValidator) {
        let registry = EntityRegistry::new();
        let player_id = PlayerId::new();
        registry.insert_entity(Entity::new("char1", EntityKind::Player, pos));
        registry.insert_player(PlayerEntity::new("char1".into(), player_id, 1, "acct1".into()));
        let validator = PositionValidator::new(registry.clone(), 0);
        (registry, player_id, validator)
    }

    #[test]
    fn non_finite_height_is_emergency_corrected() {
        let (_, player_id, validator) = setup(WorldPosition::new(0.0, f64::NAN, 0.0));
        let terrain = FlatTerrain(3.0);
        let corrected = validator.validate_terrain(player_id, &terrain).unwrap();
        assert_eq!(corrected.y, 3.1);
    }

    #[test]
    fn drift_beyond_threshold_is_corrected() {
        let (_, player_id, validator) = setup(WorldPosition::new(0.0, 50.0, 0.0));
        let terrain = FlatTerrain(0.0);
        let corrected = validator.validate_terrain(player_id, &terrain).unwrap();
        assert_eq!(corrected.y, 0.1);
    }

    #[test]
    fn small_drift_is_left_alone() {
        let (_, player_id, validator) = setup(WorldPosition::new(0.0, 5.0, 0.0));
        let terrain = FlatTerrain(0.0);
        assert!(validator.validate_terrain(player_id, &terrain).is_none());
    }

    #[test]
    fn single_step_teleport_is_a_violation() {
        let (_, player_id, validator) = setup(WorldPosition::new(0.0, 0.0, 0.0));
        assert_eq!(validator.record_position(player_id, 0.0, 0.0, 0), AntiCheatAction::None);
        assert_eq!(
            validator.record_position(player_id, 50.0, 0.0, 100),
            AntiCheatAction::Warn(ViolationKind::Teleport)
        );
    }

    #[test]
    fn sustained_speed_hack_kicks_on_third_violation() {
        let (_, player_id, validator) = setup(WorldPosition::new(0.0, 0.0, 0.0));
        // 10 tiles/sec sustained (25% over MAX_RUN, beyond the 20% tolerance),
        // sampled every 200ms (2.0 tiles/step).
        let mut t = 0u64;
        let mut x = 0.0;
        let mut last = AntiCheatAction::None;
        for _ in 0..60 {
            t += 200;
            x += 2.0;
            last = validator.record_position(player_id, x, 0.0, t);
        }
        assert_eq!(last, AntiCheatAction::Kick(ViolationKind::Speed));
        assert!(validator.violation_count(player_id) >= KICK_THRESHOLD);
    }

    #[test]
    fn violations_decay_after_30s_quiet() {
        let (_, player_id, validator) = setup(WorldPosition::new(0.0, 0.0, 0.0));
        validator.record_position(player_id, 0.0, 0.0, 0);
        validator.record_position(player_id, 50.0, 0.0, 100);
        assert_eq!(validator.violation_count(player_id), 1);

        validator.record_position(player_id, 50.0, 0.0, 40_200);
        assert_eq!(validator.violation_count(player_id), 0);
    }
}
