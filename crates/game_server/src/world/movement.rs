//! Server-authoritative click-to-move.
//!
//! The client never moves its own avatar; it sends a `moveRequest` naming a
//! destination, and this manager linearly interpolates the entity toward it
//! every tick, grounding the step to terrain height and broadcasting velocity
//! and facing so the client can animate smoothly between authoritative frames.

use super::entities::{EntityRegistry, MotionState, Quaternion, WorldPosition};
use super::terrain::{grounded_height, TerrainHeightSource};
use dashmap::DashMap;
use horizon_event_system::PlayerId;
use std::sync::Arc;

/// Squared distance below which a move is considered arrived (~0.3 m).
const ARRIVAL_DIST_SQ: f64 = 0.09;
const WALK_SPEED: f64 = 4.0;
const RUN_SPEED: f64 = 8.0;
/// Minimum spacing between in-flight movement broadcasts, matching the ~30 Hz
/// client interpolation rate rather than the 20 Hz tick rate.
const BROADCAST_INTERVAL_MS: u64 = 33;

/// A player's current move order. Reused in place across successive
/// `move_request` calls for the same player rather than reallocated, per the
/// resource-hygiene note in the design: `moveRequest` supersedes the prior
/// target without dropping and re-inserting the entry.
#[derive(Debug, Clone, Copy)]
struct MoveTarget {
    target: WorldPosition,
    max_speed: f64,
    last_broadcast_ms: u64,
}

/// Outcome returned to the caller so it can broadcast immediately; the
/// manager itself never touches the network, per the EventBridge single
/// broadcast policy.
#[derive(Debug, Clone)]
pub struct MoveEvent {
    pub entity_id: String,
    pub position: WorldPosition,
    pub rotation: Quaternion,
    pub velocity: (f64, f64),
    pub state: MotionState,
}

/// Server-authoritative click-to-move integrator.
pub struct MovementManager {
    entities: Arc<EntityRegistry>,
    targets: DashMap<PlayerId, MoveTarget>,
}

impl MovementManager {
    pub fn new(entities: Arc<EntityRegistry>) -> Self {
        Self { entities, targets: DashMap::new() }
    }

    /// Handles an incoming `moveRequest`. A `None` target or `cancel` clears
    /// any in-flight move and returns a terminal idle event; otherwise starts
    /// (or retargets) the move and returns an immediate start-moving event
    /// with zero velocity for this tick.
    pub fn move_request(
        &self,
        player_id: PlayerId,
        target: Option<(f64, f64, f64)>,
        run_mode: bool,
        cancel: bool,
    ) -> Option<MoveEvent> {
        let entity_id = self.entities.entity_id_for_player(player_id)?;
        let entity = self.entities.get_entity(&entity_id)?;

        if cancel || target.is_none() {
            self.targets.remove(&player_id);
            return Some(MoveEvent {
                entity_id,
                position: entity.position,
                rotation: entity.rotation.unwrap_or(Quaternion::IDENTITY),
                velocity: (0.0, 0.0),
                state: MotionState::Idle,
            });
        }

        let (tx, ty, tz) = target.expect("checked above");
        let target_pos = WorldPosition::new(tx, ty, tz);
        let max_speed = if run_mode { RUN_SPEED } else { WALK_SPEED };

        self.targets
            .entry(player_id)
            .and_modify(|t| {
                t.target = target_pos;
                t.max_speed = max_speed;
            })
            .or_insert(MoveTarget { target: target_pos, max_speed, last_broadcast_ms: 0 });

        let rotation = facing_quaternion(entity.position, target_pos);

        Some(MoveEvent {
            entity_id,
            position: entity.position,
            rotation,
            velocity: (0.0, 0.0),
            state: if run_mode { MotionState::Run } else { MotionState::Walk },
        })
    }

    /// Advances all in-flight moves by `dt` seconds. `now_ms` is used to rate
    /// limit the per-player broadcast to ~30 Hz. Returns one event per player
    /// whose movement changed enough to warrant a broadcast this call.
    pub fn update(&self, dt: f64, now_ms: u64, terrain: &dyn TerrainHeightSource) -> Vec<MoveEvent> {
        let mut events = Vec::new();
        let mut arrived = Vec::new();

        for mut entry in self.targets.iter_mut() {
            let player_id = *entry.key();
            let state = entry.value_mut();

            let Some(entity_id) = self.entities.entity_id_for_player(player_id) else {
                arrived.push(player_id);
                continue;
            };
            let Some(mut entity) = self.entities.get_entity(&entity_id) else {
                arrived.push(player_id);
                continue;
            };

            let dist_sq = entity.position.distance_sq(state.target);
            if dist_sq < ARRIVAL_DIST_SQ {
                let ny = grounded_height(terrain, state.target.x, state.target.z, state.target.y);
                entity.position = WorldPosition::new(state.target.x, ny, state.target.z);
                entity.state = Some(MotionState::Idle);
                self.entities.insert_entity(entity.clone());
                self.entities.with_player_mut(player_id, |p| p.moved_this_tick = true);

                events.push(MoveEvent {
                    entity_id,
                    position: entity.position,
                    rotation: entity.rotation.unwrap_or(Quaternion::IDENTITY),
                    velocity: (0.0, 0.0),
                    state: MotionState::Idle,
                });
                arrived.push(player_id);
                continue;
            }

            let dist = dist_sq.sqrt();
            let step = (state.max_speed * dt).min(dist);
            let dx = state.target.x - entity.position.x;
            let dz = state.target.z - entity.position.z;
            let (ux, uz) = if dist > 0.0 { (dx / dist, dz / dist) } else { (0.0, 0.0) };

            let nx = entity.position.x + ux * step;
            let nz = entity.position.z + uz * step;
            let ny = grounded_height(terrain, nx, nz, entity.position.y);

            let vx = ux * state.max_speed;
            let vz = uz * state.max_speed;
            let rotation = facing_from_velocity(vx, vz).unwrap_or(entity.rotation.unwrap_or(Quaternion::IDENTITY));

            entity.position = WorldPosition::new(nx, ny, nz);
            entity.rotation = Some(rotation);
            entity.state = Some(if state.max_speed > WALK_SPEED { MotionState::Run } else { MotionState::Walk });
            self.entities.insert_entity(entity.clone());
            self.entities.with_player_mut(player_id, |p| p.moved_this_tick = true);

            if now_ms.saturating_sub(state.last_broadcast_ms) >= BROADCAST_INTERVAL_MS {
                state.last_broadcast_ms = now_ms;
                events.push(MoveEvent {
                    entity_id,
                    position: entity.position,
                    rotation,
                    velocity: (vx, vz),
                    state: entity.state.unwrap_or(MotionState::Walk),
                });
            }
        }

        for player_id in arrived {
            self.targets.remove(&player_id);
        }

        events
    }

    pub fn is_moving(&self, player_id: PlayerId) -> bool {
        self.targets.contains_key(&player_id)
    }

    pub fn remove_player(&self, player_id: PlayerId) {
        self.targets.remove(&player_id);
    }
}

fn facing_from_velocity(vx: f64, vz: f64) -> Option<Quaternion> {
    if vx == 0.0 && vz == 0.0 {
        return None;
    }
    Some(Quaternion::from_yaw(vx.atan2(vz)))
}

fn facing_quaternion(from: WorldPosition, to: WorldPosition) -> Quaternion {
    facing_from_velocity(to.x - from.x, to.z - from.z).unwrap_or(Quaternion::IDENTITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::entities::{Entity, EntityKind, PlayerEntity};
    use crate::world::terrain::FlatTerrain;

    fn setup() -> (Arc<EntityRegistry>, PlayerId, MovementManager) {
        let registry = EntityRegistry::new();
        let player_id = PlayerId::new();
        registry.insert_entity(Entity::new("char1", EntityKind::Player, WorldPosition::new(0.0, 0.0, 0.0)));
        registry.insert_player(PlayerEntity::new("char1".into(), player_id, 1, "acct1".into()));
        let manager = MovementManager::new(registry.clone());
        (registry, player_id, manager)
    }

    #[test]
    fn cancel_clears_move_and_emits_idle() {
        let (_, player_id, manager) = setup();
        manager.move_request(player_id, Some((10.0, 0.0, 10.0)), false, false);
        let event = manager.move_request(player_id, None, false, true).unwrap();
        assert_eq!(event.state, MotionState::Idle);
        assert_eq!(event.velocity, (0.0, 0.0));
        assert!(!manager.is_moving(player_id));
    }

    #[test]
    fn arrival_snaps_to_target_with_zero_velocity() {
        let (registry, player_id, manager) = setup();
        registry.set_position("char1", WorldPosition::new(0.0, 0.0, 0.0));
        manager.move_request(player_id, Some((0.05, 0.0, 0.0)), false, false);

        let terrain = FlatTerrain(0.0);
        let events = manager.update(1.0, 1000, &terrain);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, MotionState::Idle);
        assert_eq!(events[0].velocity, (0.0, 0.0));
        assert!(!manager.is_moving(player_id));
    }

    #[test]
    fn in_flight_step_moves_toward_target_and_grounds() {
        let (_, player_id, manager) = setup();
        manager.move_request(player_id, Some((100.0, 0.0, 0.0)), true, false);

        let terrain = FlatTerrain(5.0);
        let events = manager.update(0.1, 1000, &terrain);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, MotionState::Run);
        assert!(events[0].position.x > 0.0 && events[0].position.x < 100.0);
        assert_eq!(events[0].position.y, 5.1);
        assert!(manager.is_moving(player_id));
    }

    #[test]
    fn broadcast_is_rate_limited_to_30hz() {
        let (_, player_id, manager) = setup();
        manager.move_request(player_id, Some((100.0, 0.0, 0.0)), true, false);
        let terrain = FlatTerrain(0.0);

        let first = manager.update(0.01, 1000, &terrain);
        assert_eq!(first.len(), 1);
        let second = manager.update(0.01, 1010, &terrain);
        assert!(second.is_empty());
        let third = manager.update(0.01, 1040, &terrain);
        assert_eq!(third.len(), 1);
    }
}
