//! Shared entity and player-entity state owned by the tick loop.
//!
//! Outside-tick reads are permitted; outside-tick writes are forbidden. Readers
//! and writers both go through `EntityRegistry`, which wraps a `dashmap::DashMap`
//! for lock-free concurrent lookups across independent entity ids.

use dashmap::DashMap;
use horizon_event_system::PlayerId;
use std::sync::Arc;

/// Entity type tag. Gameplay rules for each kind are out of scope here; only
/// enough shape is kept to drive replication and spatial indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Mob,
    Item,
    Npc,
    Resource,
}

/// A position in world space. Kept distinct from `horizon_event_system::Position`
/// so the world module can evolve its own precision/packing independent of the
/// event-system wire type.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorldPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_sq(&self, other: WorldPosition) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

/// A rotation expressed as a quaternion `(x, y, z, w)`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Builds a yaw-only facing quaternion from an angle in radians.
    pub fn from_yaw(yaw: f64) -> Self {
        let half = yaw * 0.5;
        Self { x: 0.0, y: half.sin(), z: 0.0, w: half.cos() }
    }
}

/// Health pair `(current, max)`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

/// Movement/idle state tag carried on `entityModified` and batch frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Idle,
    Walk,
    Run,
}

/// A world entity: uniquely identified, with authoritative server-side position.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: String,
    pub kind: EntityKind,
    pub position: WorldPosition,
    pub rotation: Option<Quaternion>,
    pub health: Option<Health>,
    pub state: Option<MotionState>,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: EntityKind, position: WorldPosition) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            rotation: None,
            health: None,
            state: None,
        }
    }
}

/// Player-specific fields layered on top of an `Entity`.
#[derive(Debug, Clone)]
pub struct PlayerEntity {
    pub entity_id: String,
    pub player_id: PlayerId,
    pub socket_id: usize,
    pub account_id: String,
    pub character_id: Option<String>,
    pub face_target: Option<(f64, f64)>,
    pub cardinal_face_direction: Option<super::face_direction::Cardinal>,
    pub moved_this_tick: bool,
    pub is_loading: bool,
    pub auto_retaliate: bool,
}

impl PlayerEntity {
    pub fn new(entity_id: String, player_id: PlayerId, socket_id: usize, account_id: String) -> Self {
        Self {
            entity_id,
            player_id,
            socket_id,
            account_id,
            character_id: None,
            face_target: None,
            cardinal_face_direction: None,
            moved_this_tick: false,
            is_loading: true,
            auto_retaliate: false,
        }
    }
}

/// Registry of all live world entities and the player-specific overlay.
///
/// Owned by the tick loop. Entries are inserted on `entityAdded`/spawn and
/// removed on disconnect or stale-entity reclamation.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: DashMap<String, Entity>,
    players: DashMap<PlayerId, PlayerEntity>,
}

impl EntityRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_entity(&self, entity: Entity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn remove_entity(&self, id: &str) -> Option<Entity> {
        self.entities.remove(id).map(|(_, e)| e)
    }

    pub fn get_entity(&self, id: &str) -> Option<Entity> {
        self.entities.get(id).map(|e| e.clone())
    }

    pub fn set_position(&self, id: &str, position: WorldPosition) {
        if let Some(mut e) = self.entities.get_mut(id) {
            e.position = position;
        }
    }

    pub fn entity_ids(&self) -> Vec<String> {
        self.entities.iter().map(|e| e.key().clone()).collect()
    }

    pub fn insert_player(&self, player: PlayerEntity) {
        self.players.insert(player.player_id, player);
    }

    pub fn remove_player(&self, player_id: PlayerId) -> Option<PlayerEntity> {
        self.players.remove(&player_id).map(|(_, p)| p)
    }

    pub fn get_player(&self, player_id: PlayerId) -> Option<PlayerEntity> {
        self.players.get(&player_id).map(|p| p.clone())
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| *p.key()).collect()
    }

    pub fn with_player_mut<R>(&self, player_id: PlayerId, f: impl FnOnce(&mut PlayerEntity) -> R) -> Option<R> {
        self.players.get_mut(&player_id).map(|mut p| f(&mut p))
    }

    pub fn entity_id_for_player(&self, player_id: PlayerId) -> Option<String> {
        self.players.get(&player_id).map(|p| p.entity_id.clone())
    }

    pub fn player_for_entity(&self, entity_id: &str) -> Option<PlayerId> {
        self.players.iter().find(|p| p.entity_id == entity_id).map(|p| p.player_id)
    }

    /// Last known world position of the player occupying `socket_id`, used by
    /// the broadcaster to compute subscriber distance for throttling.
    pub fn position_for_socket(&self, socket_id: usize) -> Option<WorldPosition> {
        let entity_id = self.players.iter().find(|p| p.socket_id == socket_id).map(|p| p.entity_id.clone())?;
        self.entities.get(&entity_id).map(|e| e.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_fetch_entity() {
        let registry = EntityRegistry::new();
        registry.insert_entity(Entity::new("e1", EntityKind::Item, WorldPosition::new(1.0, 0.0, 2.0)));
        let e = registry.get_entity("e1").expect("entity present");
        assert_eq!(e.position.x, 1.0);
    }

    #[test]
    fn remove_entity_clears_lookup() {
        let registry = EntityRegistry::new();
        registry.insert_entity(Entity::new("e1", EntityKind::Mob, WorldPosition::new(0.0, 0.0, 0.0)));
        assert!(registry.remove_entity("e1").is_some());
        assert!(registry.get_entity("e1").is_none());
    }

    #[test]
    fn player_lookup_round_trips() {
        let registry = EntityRegistry::new();
        let pid = PlayerId::new();
        registry.insert_player(PlayerEntity::new("char1".into(), pid, 7, "acct1".into()));
        assert_eq!(registry.entity_id_for_player(pid).as_deref(), Some("char1"));
        assert_eq!(registry.player_for_entity("char1"), Some(pid));
    }
}
