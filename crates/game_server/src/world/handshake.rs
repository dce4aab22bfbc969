//! Connection handshake orchestration: player-limit admission, authentication,
//! terrain-readiness wait, snapshot assembly, and reconnection reconciliation.
//!
//! This is pure orchestration over the other world/connection types — it never
//! touches a raw socket. `server::handlers::handle_connection` drives the
//! actual WebSocket and calls into this once the socket is accepted.

use super::character_selection::{CharacterRecord, CharacterSelection, CharacterSelectionError};
use super::terrain::TerrainHeightSource;
use crate::connection::{AuthError, Authenticator, ConnectionId};
use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("server is full")]
    PlayerLimitReached,
    #[error("authentication rate limited")]
    RateLimited,
    #[error("terrain did not become ready in time")]
    TerrainTimeout,
    #[error("character not found")]
    CharacterNotFound,
    #[error("another session already owns this character")]
    AlreadyLoggedIn,
    #[error("spectator target is not owned by this account")]
    SpectatorNotOwned,
}

impl From<AuthError> for HandshakeError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::RateLimited => HandshakeError::RateLimited,
            AuthError::InvalidToken | AuthError::Internal(_) => HandshakeError::RateLimited,
        }
    }
}

impl From<CharacterSelectionError> for HandshakeError {
    fn from(err: CharacterSelectionError) -> Self {
        match err {
            CharacterSelectionError::NotFound => HandshakeError::CharacterNotFound,
            CharacterSelectionError::AlreadyLoggedIn => HandshakeError::AlreadyLoggedIn,
            CharacterSelectionError::NotOwned => HandshakeError::SpectatorNotOwned,
            CharacterSelectionError::InvalidName(..) => HandshakeError::CharacterNotFound,
        }
    }
}

/// One socket's claim on an account, tracked for reconnection reconciliation.
#[derive(Debug, Clone)]
struct SocketSession {
    socket_id: ConnectionId,
    connected_at: Instant,
    spawned: bool,
}

/// Tracks every live socket per account so a reconnect can decide which of
/// two sockets for the same account wins.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    by_account: DashMap<String, Vec<SocketSession>>,
}

impl SessionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, account_id: &str, socket_id: ConnectionId) {
        self.by_account.entry(account_id.to_string()).or_default().push(SocketSession {
            socket_id,
            connected_at: Instant::now(),
            spawned: false,
        });
    }

    pub fn mark_spawned(&self, account_id: &str, socket_id: ConnectionId) {
        if let Some(mut sockets) = self.by_account.get_mut(account_id) {
            if let Some(session) = sockets.iter_mut().find(|s| s.socket_id == socket_id) {
                session.spawned = true;
            }
        }
    }

    pub fn remove(&self, account_id: &str, socket_id: ConnectionId) {
        if let Some(mut sockets) = self.by_account.get_mut(account_id) {
            sockets.retain(|s| s.socket_id != socket_id);
        }
    }

    /// Decides the fate of every *other* socket registered for `account_id`
    /// against a newly connecting `socket_id`: a socket that has already
    /// spawned a player, or has outlived `grace_period`, loses and is
    /// returned for the caller to kick. A socket within grace that has not
    /// yet spawned wins outright and the new connection is rejected.
    pub fn reconcile(&self, account_id: &str, socket_id: ConnectionId, grace_period: Duration) -> Result<Vec<ConnectionId>, HandshakeError> {
        let Some(sockets) = self.by_account.get(account_id) else { return Ok(Vec::new()) };

        let others: Vec<&SocketSession> = sockets.iter().filter(|s| s.socket_id != socket_id).collect();
        if others.iter().any(|s| !s.spawned && s.connected_at.elapsed() <= grace_period) {
            return Err(HandshakeError::AlreadyLoggedIn);
        }

        Ok(others.iter().map(|s| s.socket_id).collect())
    }
}

/// Summary of a character list entry as sent in `snapshot.characters`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CharacterSummary {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<&CharacterRecord> for CharacterSummary {
    fn from(record: &CharacterRecord) -> Self {
        Self { id: record.character_id.clone(), name: record.name.clone(), avatar: record.avatar.clone() }
    }
}

/// Account identity block embedded in `snapshot.account`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AccountSummary {
    pub account_id: String,
    pub name: String,
}

/// The `snapshot` packet payload (§6 External Interfaces).
#[derive(Debug, Clone, serde::Serialize)]
pub struct Snapshot {
    pub socket_id: ConnectionId,
    pub server_time: u64,
    pub assets_url: String,
    pub settings: serde_json::Value,
    pub chat: serde_json::Value,
    pub entities: Vec<serde_json::Value>,
    pub auth_token: Option<String>,
    pub account: AccountSummary,
    pub characters: Vec<CharacterSummary>,
    pub spectator_mode: bool,
    pub follow_entity: Option<String>,
}

/// The `resourceSnapshot` packet payload.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResourceSnapshot {
    pub resources: Vec<serde_json::Value>,
}

fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Orchestrates the admission → auth → terrain-wait → snapshot → reconcile
/// sequence described for a connecting socket. Holds no socket state itself;
/// the caller (the connection handler) performs the actual sends and closes
/// the socket on `Err`.
pub struct ConnectionHandler {
    authenticator: Arc<Authenticator>,
    characters: Arc<CharacterSelection>,
    terrain: Arc<dyn TerrainHeightSource>,
    sessions: Arc<SessionRegistry>,
    max_connections: usize,
    assets_url: String,
    terrain_wait_poll: Duration,
    terrain_wait_timeout: Duration,
    reconnect_grace_period: Duration,
}

impl ConnectionHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        authenticator: Arc<Authenticator>,
        characters: Arc<CharacterSelection>,
        terrain: Arc<dyn TerrainHeightSource>,
        sessions: Arc<SessionRegistry>,
        max_connections: usize,
        assets_url: String,
        terrain_wait_poll: Duration,
        terrain_wait_timeout: Duration,
        reconnect_grace_period: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            authenticator,
            characters,
            terrain,
            sessions,
            max_connections,
            assets_url,
            terrain_wait_poll,
            terrain_wait_timeout,
            reconnect_grace_period,
        })
    }

    /// Step 1: reject the connection outright once `current_connections`
    /// already meets the configured limit.
    pub fn check_player_limit(&self, current_connections: usize) -> Result<(), HandshakeError> {
        if current_connections >= self.max_connections {
            return Err(HandshakeError::PlayerLimitReached);
        }
        Ok(())
    }

    /// Step 2: run the authentication chain for this socket.
    pub async fn authenticate(
        &self,
        token: Option<&str>,
        remote_ip: IpAddr,
    ) -> Result<crate::connection::AuthOutcome, HandshakeError> {
        Ok(self.authenticator.authenticate(token, remote_ip).await?)
    }

    /// Step 3: poll terrain readiness at a fixed interval, up to a timeout.
    pub async fn wait_for_terrain(&self) -> Result<(), HandshakeError> {
        if self.terrain.is_ready() {
            return Ok(());
        }

        let deadline = Instant::now() + self.terrain_wait_timeout;
        while Instant::now() < deadline {
            tokio::time::sleep(self.terrain_wait_poll).await;
            if self.terrain.is_ready() {
                return Ok(());
            }
        }
        Err(HandshakeError::TerrainTimeout)
    }

    /// Steps 4-6: load the account's characters and assemble the `snapshot`
    /// packet. `entities` and `chat`/`settings` payloads are supplied by the
    /// caller, which owns the authoritative view of what else is in range.
    pub async fn build_snapshot(
        &self,
        socket_id: ConnectionId,
        account_id: &str,
        account_name: &str,
        auth_token: Option<String>,
        entities: Vec<serde_json::Value>,
        settings: serde_json::Value,
        chat: serde_json::Value,
    ) -> Snapshot {
        let characters = self.characters.list_characters(account_id).await;
        Snapshot {
            socket_id,
            server_time: now_epoch_ms(),
            assets_url: self.assets_url.clone(),
            settings,
            chat,
            entities,
            auth_token,
            account: AccountSummary { account_id: account_id.to_string(), name: account_name.to_string() },
            characters: characters.iter().map(CharacterSummary::from).collect(),
            spectator_mode: false,
            follow_entity: None,
        }
    }

    /// The spectator variant of `build_snapshot`: verifies `target_character_id`
    /// is owned by `account_id` (never trusting a client-supplied owner),
    /// and returns a reduced snapshot with no auth token or character list.
    pub async fn build_spectator_snapshot(
        &self,
        socket_id: ConnectionId,
        account_id: &str,
        target_character_id: &str,
        entities: Vec<serde_json::Value>,
        settings: serde_json::Value,
        chat: serde_json::Value,
    ) -> Result<Snapshot, HandshakeError> {
        self.characters
            .list_characters(account_id)
            .await
            .iter()
            .find(|c| c.character_id == target_character_id)
            .ok_or(HandshakeError::SpectatorNotOwned)?;

        Ok(Snapshot {
            socket_id,
            server_time: now_epoch_ms(),
            assets_url: self.assets_url.clone(),
            settings,
            chat,
            entities,
            auth_token: None,
            account: AccountSummary { account_id: account_id.to_string(), name: String::new() },
            characters: Vec::new(),
            spectator_mode: true,
            follow_entity: Some(target_character_id.to_string()),
        })
    }

    /// Step 8: registers `socket_id` under `account_id` and reconciles it
    /// against any other live socket on the same account. Returns the socket
    /// ids the caller must close.
    pub fn register_and_reconcile(&self, account_id: &str, socket_id: ConnectionId) -> Result<Vec<ConnectionId>, HandshakeError> {
        let losers = self.sessions.reconcile(account_id, socket_id, self.reconnect_grace_period)?;
        self.sessions.register(account_id, socket_id);
        Ok(losers)
    }

    pub fn mark_spawned(&self, account_id: &str, socket_id: ConnectionId) {
        self.sessions.mark_spawned(account_id, socket_id);
    }

    pub fn release(&self, account_id: &str, socket_id: ConnectionId) {
        self.sessions.remove(account_id, socket_id);
    }
}
