//! Character listing, creation, and the `enterWorld` critical path.
//!
//! Persistence is opaque: this module only knows the shape of a character
//! row, not how it is stored. Concrete storage (SQL, document store, …) is
//! supplied by whoever constructs a `CharacterSelection` and implements
//! `CharacterStore`.

use super::entities::{Entity, EntityKind, EntityRegistry, PlayerEntity, WorldPosition};
use dashmap::DashMap;
use horizon_event_system::PlayerId;
use std::sync::Arc;
use std::time::Duration;

pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 50;
pub const DEFAULT_CHARACTER_NAME: &str = "Adventurer";
pub const LOADING_WATCHDOG: Duration = Duration::from_secs(30);
const GROUNDED_SPAWN_MIN_Y: f64 = -5.0;
const GROUNDED_SPAWN_MAX_Y: f64 = 200.0;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum CharacterSelectionError {
    #[error("character name must be {0}-{1} alphanumeric characters or spaces")]
    InvalidName(usize, usize),
    #[error("character already logged in")]
    AlreadyLoggedIn,
    #[error("character not found")]
    NotFound,
    #[error("character does not belong to this account")]
    NotOwned,
}

pub type CharacterSelectionResult<T> = Result<T, CharacterSelectionError>;

/// A persisted character row, as returned by `CharacterStore`.
#[derive(Debug, Clone)]
pub struct CharacterRecord {
    pub character_id: String,
    pub account_id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub saved_position: Option<WorldPosition>,
}

/// Equipment, skills, and preferences loaded alongside a character during
/// `enter_world`, so downstream systems don't need to reread storage.
#[derive(Debug, Clone, Default)]
pub struct CharacterLoadout {
    pub skills: serde_json::Value,
    pub equipment: serde_json::Value,
    pub auto_retaliate: bool,
}

/// Abstracts persistence so this module stays storage-agnostic. A concrete
/// implementation wraps whatever document or relational store the
/// deployment uses.
#[async_trait::async_trait]
pub trait CharacterStore: Send + Sync {
    async fn list_for_account(&self, account_id: &str) -> Vec<CharacterRecord>;
    async fn create(&self, account_id: &str, name: &str, avatar: Option<String>) -> CharacterRecord;
    /// Looks up a character by id, scoped to the owning account — except for
    /// agent/load-test characters, which may be looked up directly by id.
    async fn get(&self, character_id: &str, account_id: &str, is_agent: bool) -> Option<CharacterRecord>;
    async fn load_loadout(&self, character_id: &str) -> CharacterLoadout;
}

fn validate_name(raw: &str) -> CharacterSelectionResult<String> {
    let trimmed = raw.trim();
    let candidate = if trimmed.is_empty() { DEFAULT_CHARACTER_NAME } else { trimmed };
    let len_ok = (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&candidate.chars().count());
    let chars_ok = candidate.chars().all(|c| c.is_alphanumeric() || c == ' ');
    if !len_ok || !chars_ok {
        return Err(CharacterSelectionError::InvalidName(MIN_NAME_LEN, MAX_NAME_LEN));
    }
    Ok(candidate.to_string())
}

/// One socket's claim on a character, tracked so concurrent `enterWorld`
/// calls for the same character race on an atomic map insert rather than on
/// an awaited lookup.
struct ActiveClaim {
    socket_id: usize,
}

/// Outcome of `enter_world`, carrying everything the connection handler
/// needs to build the client-facing packet sequence.
pub struct EnterWorldOutcome {
    pub record: CharacterRecord,
    pub loadout: CharacterLoadout,
    pub spawn: WorldPosition,
    pub reclaimed_stale_entity: bool,
}

pub struct CharacterSelection {
    store: Arc<dyn CharacterStore>,
    entities: Arc<EntityRegistry>,
    /// character_id -> current claimant. Acts as the synchronous
    /// duplicate-detection gate described by the critical path.
    claims: DashMap<String, ActiveClaim>,
    configured_spawn: WorldPosition,
}

impl CharacterSelection {
    pub fn new(store: Arc<dyn CharacterStore>, entities: Arc<EntityRegistry>, configured_spawn: WorldPosition) -> Arc<Self> {
        Arc::new(Self { store, entities, claims: DashMap::new(), configured_spawn })
    }

    pub async fn list_characters(&self, account_id: &str) -> Vec<CharacterRecord> {
        self.store.list_for_account(account_id).await
    }

    pub async fn create_character(&self, account_id: &str, name: &str, avatar: Option<String>) -> CharacterSelectionResult<CharacterRecord> {
        let name = validate_name(name)?;
        Ok(self.store.create(account_id, &name, avatar).await)
    }

    /// Grounds a spawn position: a saved position is honored only within a
    /// sane vertical range, otherwise the configured spawn is used, both
    /// snapped to the terrain surface when `terrain` reports a height.
    pub fn compute_spawn(&self, saved: Option<WorldPosition>, terrain: Option<&dyn super::terrain::TerrainHeightSource>) -> WorldPosition {
        let base = match saved {
            Some(pos) if (GROUNDED_SPAWN_MIN_Y..=GROUNDED_SPAWN_MAX_Y).contains(&pos.y) => pos,
            _ => self.configured_spawn,
        };
        match terrain.and_then(|t| t.height_at(base.x, base.z)) {
            Some(height) => WorldPosition::new(base.x, height + 0.1, base.z),
            None => base,
        }
    }

    /// Synchronous duplicate-detection gate: the first caller to insert a
    /// claim for `character_id` wins; everyone else is rejected immediately,
    /// before any async storage lookup happens.
    fn claim(&self, character_id: &str, socket_id: usize) -> CharacterSelectionResult<bool> {
        let mut stale = false;
        match self.claims.entry(character_id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                let claim = entry.get();
                if claim.socket_id != socket_id {
                    return Err(CharacterSelectionError::AlreadyLoggedIn);
                }
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                stale = self.entities.get_entity(character_id).is_some();
                entry.insert(ActiveClaim { socket_id });
            }
        }
        Ok(stale)
    }

    pub fn release_claim(&self, character_id: &str) {
        self.claims.remove(character_id);
    }

    /// Runs the `enterWorld` critical path: claim, stale-entity reclamation,
    /// storage load, spawn grounding, and player-entity creation with
    /// `isLoading = true`. Returns what the caller needs to build the
    /// client-facing packet sequence; it is the caller's job to send packets
    /// and schedule the loading watchdog via `spawn_loading_watchdog`.
    pub async fn enter_world(
        &self,
        character_id: &str,
        account_id: &str,
        socket_id: usize,
        player_id: PlayerId,
        is_agent: bool,
        terrain: Option<&dyn super::terrain::TerrainHeightSource>,
    ) -> CharacterSelectionResult<EnterWorldOutcome> {
        let was_stale = self.claim(character_id, socket_id)?;

        if was_stale {
            self.entities.remove_entity(character_id);
        }

        let record = match self.store.get(character_id, account_id, is_agent).await {
            Some(record) => record,
            None => {
                self.release_claim(character_id);
                return Err(CharacterSelectionError::NotFound);
            }
        };

        let loadout = self.store.load_loadout(character_id).await;
        let spawn = self.compute_spawn(record.saved_position, terrain);

        let mut player = PlayerEntity::new(character_id.to_string(), player_id, socket_id, account_id.to_string());
        player.is_loading = true;
        player.auto_retaliate = loadout.auto_retaliate;
        self.entities.insert_player(player);
        self.entities.insert_entity(Entity::new(character_id, EntityKind::Player, spawn));

        Ok(EnterWorldOutcome { record, loadout, spawn, reclaimed_stale_entity: was_stale })
    }

    /// Spawns the 30 s watchdog that forces `isLoading = false` if the
    /// client never confirms `clientReady`. Returns the ids whose loading
    /// state it cleared, so the caller can decide whether to broadcast.
    pub async fn run_loading_watchdog(entities: Arc<EntityRegistry>, player_id: PlayerId, sleep: impl std::future::Future<Output = ()>) -> bool {
        sleep.await;
        entities
            .with_player_mut(player_id, |p| {
                let was_loading = p.is_loading;
                p.is_loading = false;
                was_loading
            })
            .unwrap_or(false)
    }

    /// Clears `isLoading` immediately in response to a `clientReady` message,
    /// preempting the watchdog. Returns `true` if a change was made.
    pub fn mark_client_ready(&self, player_id: PlayerId) -> bool {
        self.entities.with_player_mut(player_id, |p| {
            let was_loading = p.is_loading;
            p.is_loading = false;
            was_loading
        }).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::terrain::TerrainHeightSource;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    struct FakeStore {
        records: RwLock<HashMap<String, CharacterRecord>>,
    }

    #[async_trait::async_trait]
    impl CharacterStore for FakeStore {
        async fn list_for_account(&self, account_id: &str) -> Vec<CharacterRecord> {
            self.records.read().await.values().filter(|r| r.account_id == account_id).cloned().collect()
        }

        async fn create(&self, account_id: &str, name: &str, avatar: Option<String>) -> CharacterRecord {
            let record = CharacterRecord {
                character_id: format!("{account_id}-{name}"),
                account_id: account_id.to_string(),
                name: name.to_string(),
                avatar,
                saved_position: None,
            };
            self.records.write().await.insert(record.character_id.clone(), record.clone());
            record
        }

        async fn get(&self, character_id: &str, account_id: &str, is_agent: bool) -> Option<CharacterRecord> {
            let records = self.records.read().await;
            let record = records.get(character_id)?;
            if is_agent || record.account_id == account_id {
                Some(record.clone())
            } else {
                None
            }
        }

        async fn load_loadout(&self, _character_id: &str) -> CharacterLoadout {
            CharacterLoadout::default()
        }
    }

    struct FlatTerrain(f64);
    impl TerrainHeightSource for FlatTerrain {
        fn height_at(&self, _x: f64, _z: f64) -> Option<f64> {
            Some(self.0)
        }
    }

    fn selection() -> Arc<CharacterSelection> {
        let store: Arc<dyn CharacterStore> = Arc::new(FakeStore { records: RwLock::new(HashMap::new()) });
        CharacterSelection::new(store, EntityRegistry::new(), WorldPosition::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn name_trims_and_defaults_when_empty() {
        assert_eq!(validate_name("  ").unwrap(), DEFAULT_CHARACTER_NAME);
        assert_eq!(validate_name("  Bob  ").unwrap(), "Bob");
    }

    #[test]
    fn name_rejects_symbols_and_bad_length() {
        assert!(validate_name("Bo").is_err());
        assert!(validate_name("Bad!Name").is_err());
    }

    #[test]
    fn spawn_prefers_saved_position_within_sane_bounds() {
        let sel = selection();
        let saved = WorldPosition::new(5.0, 10.0, 5.0);
        let spawn = sel.compute_spawn(Some(saved), None);
        assert_eq!(spawn.y, 10.0);
    }

    #[test]
    fn spawn_falls_back_to_configured_when_saved_is_out_of_range() {
        let sel = selection();
        let saved = WorldPosition::new(5.0, 9999.0, 5.0);
        let spawn = sel.compute_spawn(Some(saved), None);
        assert_eq!(spawn, WorldPosition::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn spawn_snaps_to_terrain_height_plus_offset() {
        let sel = selection();
        let terrain = FlatTerrain(12.0);
        let spawn = sel.compute_spawn(None, Some(&terrain));
        assert_eq!(spawn.y, 12.1);
    }

    #[tokio::test]
    async fn enter_world_creates_player_and_entity() {
        let sel = selection();
        let record = sel.create_character("acct1", "Hero", None).await.unwrap();
        let player_id = PlayerId::new();

        let outcome = sel.enter_world(&record.character_id, "acct1", 1, player_id, false, None).await.unwrap();
        assert!(!outcome.reclaimed_stale_entity);
        assert_eq!(outcome.record.character_id, record.character_id);
    }

    #[tokio::test]
    async fn second_socket_claiming_same_character_is_rejected() {
        let sel = selection();
        let record = sel.create_character("acct1", "Hero", None).await.unwrap();
        let player_id_a = PlayerId::new();
        let player_id_b = PlayerId::new();

        sel.enter_world(&record.character_id, "acct1", 1, player_id_a, false, None).await.unwrap();
        let err = sel.enter_world(&record.character_id, "acct1", 2, player_id_b, false, None).await.unwrap_err();
        assert_eq!(err, CharacterSelectionError::AlreadyLoggedIn);
    }

    #[tokio::test]
    async fn missing_character_releases_its_claim() {
        let sel = selection();
        let player_id = PlayerId::new();
        let err = sel.enter_world("ghost", "acct1", 1, player_id, false, None).await.unwrap_err();
        assert_eq!(err, CharacterSelectionError::NotFound);

        // the claim was released, so a retry (e.g. after creating the character) is not blocked
        assert!(sel.claims.get("ghost").is_none());
    }

    #[tokio::test]
    async fn client_ready_clears_loading_before_watchdog_fires() {
        let sel = selection();
        let record = sel.create_character("acct1", "Hero", None).await.unwrap();
        let player_id = PlayerId::new();
        sel.enter_world(&record.character_id, "acct1", 1, player_id, false, None).await.unwrap();

        assert!(sel.mark_client_ready(player_id));
        assert!(!sel.mark_client_ready(player_id));
    }
}
