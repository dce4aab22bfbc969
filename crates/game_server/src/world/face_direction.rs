//! Tick-deferred facing resolution.
//!
//! Facing is never applied immediately on input: a click-to-face or
//! click-to-move request only records *intent*, and the tick loop resolves
//! the actual facing once per tick, giving cardinal overrides priority and
//! skipping players who moved this tick (their facing follows movement instead).

use super::entities::{EntityRegistry, Quaternion};
use horizon_event_system::PlayerId;
use std::f64::consts::PI;
use std::sync::Arc;

/// The four cardinal snap directions, used to override free-look facing
/// (e.g. holding an arrow key) regardless of where the player last clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinal {
    North,
    South,
    East,
    West,
}

impl Cardinal {
    fn yaw(self) -> f64 {
        match self {
            Cardinal::North => 0.0,
            Cardinal::East => PI / 2.0,
            Cardinal::South => PI,
            Cardinal::West => 3.0 * PI / 2.0,
        }
    }
}

/// Snaps a raw yaw angle (radians) to the nearest of 8 compass directions.
fn snap_to_octant(yaw: f64) -> f64 {
    let octant = PI / 4.0;
    let normalized = yaw.rem_euclid(2.0 * PI);
    (normalized / octant).round() * octant % (2.0 * PI)
}

fn yaw_towards(from_x: f64, from_z: f64, to_x: f64, to_z: f64) -> f64 {
    (to_x - from_x).atan2(to_z - from_z)
}

/// Derives the cardinal direction a player must face to look at a resource
/// occupying `anchor_tile`, given the player's own tile. Only defined when
/// the player shares a row or column with the anchor (directly N/S/E/W of
/// it); a diagonal offset has no single cardinal-aligned answer.
fn cardinal_towards(player_tile: (i64, i64), anchor_tile: (i64, i64)) -> Option<Cardinal> {
    let dx = player_tile.0 - anchor_tile.0;
    let dz = player_tile.1 - anchor_tile.1;
    match (dx, dz) {
        (0, dz) if dz > 0 => Some(Cardinal::North),
        (0, dz) if dz < 0 => Some(Cardinal::South),
        (dx, 0) if dx > 0 => Some(Cardinal::West),
        (dx, 0) if dx < 0 => Some(Cardinal::East),
        _ => None,
    }
}

/// Resolves facing once per tick for every player with a pending request.
pub struct FaceDirectionManager {
    entities: Arc<EntityRegistry>,
}

impl FaceDirectionManager {
    pub fn new(entities: Arc<EntityRegistry>) -> Self {
        Self { entities }
    }

    /// Records a free-look face target; resolved on the next `process_face_direction`.
    pub fn set_face_target(&self, player_id: PlayerId, x: f64, z: f64) {
        self.entities.with_player_mut(player_id, |p| {
            p.face_target = Some((x, z));
            p.cardinal_face_direction = None;
        });
    }

    /// Records a cardinal override, deriving the direction deterministically
    /// from the player's current tile relative to `anchor_tile` (the tile of
    /// the resource they are gathering from). If the player is not aligned
    /// on a cardinal tile (i.e. the offset is diagonal), falls back to a
    /// centered free-look target at the resource's world position
    /// `(fx, fz)` instead of guessing a direction.
    pub fn set_cardinal_face_target(&self, player_id: PlayerId, anchor_tile: (i64, i64), fx: f64, fz: f64) {
        let Some(entity_id) = self.entities.entity_id_for_player(player_id) else { return };
        let Some(entity) = self.entities.get_entity(&entity_id) else { return };
        let player_tile = (entity.position.x.floor() as i64, entity.position.z.floor() as i64);

        match cardinal_towards(player_tile, anchor_tile) {
            Some(direction) => {
                self.entities.with_player_mut(player_id, |p| {
                    p.cardinal_face_direction = Some(direction);
                });
            }
            None => self.set_face_target(player_id, fx, fz),
        }
    }

    /// Marks that a player's position changed this tick via movement; their
    /// facing will be driven by the movement system instead of a stale
    /// pre-move target.
    pub fn mark_player_moved(&self, player_id: PlayerId) {
        self.entities.with_player_mut(player_id, |p| {
            p.moved_this_tick = true;
        });
    }

    /// Clears the per-tick `movedThisTick` flags. Call once at the start of
    /// every tick before the movement system runs.
    pub fn reset_movement_flags(&self) {
        for player_id in self.entities.player_ids() {
            self.entities.with_player_mut(player_id, |p| {
                p.moved_this_tick = false;
            });
        }
    }

    /// Resolves one player's pending facing into a quaternion, or `None` if
    /// there is nothing to resolve this tick (no target, or movement already
    /// drove facing this tick). Clears whichever target was resolved so the
    /// next tick is a no-op until a new face request arrives.
    pub fn process_face_direction(&self, player_id: PlayerId) -> Option<Quaternion> {
        let entity_id = self.entities.entity_id_for_player(player_id)?;
        let entity = self.entities.get_entity(&entity_id)?;
        let player = self.entities.get_player(player_id)?;

        if player.moved_this_tick {
            return None;
        }

        if let Some(cardinal) = player.cardinal_face_direction {
            self.entities.with_player_mut(player_id, |p| p.cardinal_face_direction = None);
            return Some(Quaternion::from_yaw(cardinal.yaw()));
        }

        let (tx, tz) = player.face_target?;
        let dx = tx - entity.position.x;
        let dz = tz - entity.position.z;
        if dx.abs() + dz.abs() < 0.01 {
            // Standing on the target tile: no meaningful direction to face,
            // target persists for a later tick where it might resolve.
            return None;
        }
        self.entities.with_player_mut(player_id, |p| p.face_target = None);
        let yaw = yaw_towards(entity.position.x, entity.position.z, tx, tz);
        Some(Quaternion::from_yaw(snap_to_octant(yaw) + PI))
    }

    /// Runs `process_face_direction` for every tracked player, applying the
    /// result to the registry and returning the ids whose facing changed.
    pub fn process_all(&self) -> Vec<String> {
        let mut changed = Vec::new();
        for player_id in self.entities.player_ids() {
            if let Some(rotation) = self.process_face_direction(player_id) {
                if let Some(entity_id) = self.entities.entity_id_for_player(player_id) {
                    if let Some(mut entity) = self.entities.get_entity(&entity_id) {
                        entity.rotation = Some(rotation);
                        self.entities.insert_entity(entity);
                        changed.push(entity_id);
                    }
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::entities::{Entity, EntityKind, PlayerEntity, WorldPosition};

    fn setup() -> (Arc<EntityRegistry>, PlayerId) {
        let registry = EntityRegistry::new();
        let player_id = PlayerId::new();
        registry.insert_entity(Entity::new("char1", EntityKind::Player, WorldPosition::new(0.0, 0.0, 0.0)));
        registry.insert_player(PlayerEntity::new("char1".into(), player_id, 1, "acct1".into()));
        (registry, player_id)
    }

    #[test]
    fn no_target_resolves_to_none() {
        let (registry, player_id) = setup();
        let manager = FaceDirectionManager::new(registry);
        assert!(manager.process_face_direction(player_id).is_none());
    }

    #[test]
    fn cardinal_override_wins_over_free_look_target() {
        let (registry, player_id) = setup();
        let manager = FaceDirectionManager::new(registry);
        manager.set_face_target(player_id, 100.0, 0.0);
        // Player sits at tile (0,0); anchor (resource) is at tile (0,5), i.e.
        // directly north of the player, so the player must face north.
        manager.set_cardinal_face_target(player_id, (0, 5), 0.0, 5.0);

        let rotation = manager.process_face_direction(player_id).unwrap();
        let expected = Quaternion::from_yaw(Cardinal::North.yaw());
        assert!((rotation.y - expected.y).abs() < 1e-9);
        assert!((rotation.w - expected.w).abs() < 1e-9);
    }

    #[test]
    fn diagonal_offset_falls_back_to_centered_point_target() {
        let (registry, player_id) = setup();
        let manager = FaceDirectionManager::new(registry);
        // Player at (0,0), anchor at tile (3,3): diagonal, no cardinal fit.
        manager.set_cardinal_face_target(player_id, (3, 3), 3.5, 3.5);

        let rotation = manager.process_face_direction(player_id).unwrap();
        let expected = Quaternion::from_yaw(snap_to_octant(yaw_towards(0.0, 0.0, 3.5, 3.5)) + PI);
        assert!((rotation.y - expected.y).abs() < 1e-9);
        assert!((rotation.w - expected.w).abs() < 1e-9);
    }

    #[test]
    fn point_target_within_tolerance_does_not_rotate_and_persists() {
        let (registry, player_id) = setup();
        let manager = FaceDirectionManager::new(registry);
        manager.set_face_target(player_id, 0.002, 0.002);
        assert!(manager.process_face_direction(player_id).is_none());
        // Target was not cleared, so a later tick (e.g. after the player
        // steps off the tile) can still resolve it.
        assert!(manager.process_face_direction(player_id).is_none());
    }

    #[test]
    fn movement_this_tick_skips_facing_resolution() {
        let (registry, player_id) = setup();
        let manager = FaceDirectionManager::new(registry);
        manager.set_face_target(player_id, 100.0, 0.0);
        manager.mark_player_moved(player_id);
        assert!(manager.process_face_direction(player_id).is_none());
    }

    #[test]
    fn resolved_target_is_cleared_so_next_tick_is_a_no_op() {
        let (registry, player_id) = setup();
        let manager = FaceDirectionManager::new(registry);
        manager.set_face_target(player_id, 100.0, 0.0);
        assert!(manager.process_face_direction(player_id).is_some());
        assert!(manager.process_face_direction(player_id).is_none());
    }

    #[test]
    fn reset_clears_moved_flag_for_next_tick() {
        let (registry, player_id) = setup();
        let manager = FaceDirectionManager::new(registry);
        manager.mark_player_moved(player_id);
        manager.reset_movement_flags();
        manager.set_face_target(player_id, 1.0, 0.0);
        assert!(manager.process_face_direction(player_id).is_some());
    }
}
