//! Drives the per-tick world simulation off the server's `server_tick` core
//! event: movement integration, facing resolution, AOI upkeep, anti-cheat,
//! trade expiry, and the one `OptimizedBroadcaster::flush` that turns all of
//! it into wire traffic.
//!
//! Nothing upstream of this module mutates entity position or rotation
//! outside of a tick — `MovementManager::move_request` only records intent,
//! and `FaceDirectionManager::set_face_target` only arms a pending facing.
//! This is where both get resolved, once, in a fixed order.

use super::aoi::AOIManager;
use super::broadcaster::{EntityUpdate, OptimizedBroadcaster};
use super::entities::EntityRegistry;
use super::face_direction::FaceDirectionManager;
use super::movement::MovementManager;
use super::position_validator::{AntiCheatAction, PositionValidator, ViolationKind};
use super::terrain::TerrainHeightSource;
use super::throttle::Priority;
use super::trading::TradingSystem;
use crate::connection::ConnectionManager;
use horizon_event_system::{EventError, EventSystem};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
struct TradeCancelledPacket<'a> {
    session_id: &'a str,
    reason: &'static str,
}

/// `server_tick`'s own `timestamp` field is `current_timestamp()` — whole
/// seconds, per the event system's own doc comment — far too coarse for the
/// millisecond math everything below this point runs on (30 Hz broadcast
/// pacing, 33 ms/500 ms anti-cheat windows). The tick loop keeps its own
/// millisecond clock instead of trusting that field.
fn now_epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Owns every system a tick needs to touch and runs them in a fixed order.
/// Constructed once at startup and registered against the event system's
/// `server_tick` core event; never driven from anywhere else.
pub struct TickLoop {
    entities: Arc<EntityRegistry>,
    aoi: Arc<AOIManager>,
    movement: Arc<MovementManager>,
    face_direction: Arc<FaceDirectionManager>,
    position_validator: Arc<PositionValidator>,
    trading: Arc<TradingSystem>,
    broadcaster: Arc<OptimizedBroadcaster>,
    connections: Arc<ConnectionManager>,
    terrain: Arc<dyn TerrainHeightSource>,
    tick_interval_ms: u64,
    last_tick_ms: AtomicU64,
    last_terrain_sweep_ms: AtomicU64,
}

impl TickLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entities: Arc<EntityRegistry>,
        aoi: Arc<AOIManager>,
        movement: Arc<MovementManager>,
        face_direction: Arc<FaceDirectionManager>,
        position_validator: Arc<PositionValidator>,
        trading: Arc<TradingSystem>,
        broadcaster: Arc<OptimizedBroadcaster>,
        connections: Arc<ConnectionManager>,
        terrain: Arc<dyn TerrainHeightSource>,
        tick_interval_ms: u64,
    ) -> Arc<Self> {
        Arc::new(Self {
            entities,
            aoi,
            movement,
            face_direction,
            position_validator,
            trading,
            broadcaster,
            connections,
            terrain,
            tick_interval_ms,
            last_tick_ms: AtomicU64::new(0),
            last_terrain_sweep_ms: AtomicU64::new(0),
        })
    }

    /// Subscribes `run_tick` against the `server_tick` core event. Handlers
    /// are synchronous, so the async work is dispatched via `block_on`, the
    /// same pattern `EventBridge::register` uses to reach the broadcaster.
    pub async fn register(self: &Arc<Self>, events: &Arc<EventSystem>) -> Result<(), EventError> {
        #[derive(Debug, serde::Deserialize)]
        struct ServerTickEvent {
            tick_count: u64,
        }

        let tick_loop = self.clone();
        events
            .on_core_async::<ServerTickEvent, _>("server_tick", move |event: ServerTickEvent| {
                let tick_loop = tick_loop.clone();
                let handle = tokio::runtime::Handle::try_current().map_err(|e| EventError::RuntimeError(e.to_string()))?;
                handle.block_on(tick_loop.run_tick(event.tick_count, now_epoch_ms()));
                Ok(())
            })
            .await
    }

    /// Runs one full simulation tick. `tick_count` drives the throttler and
    /// flush cadence; `now_ms` is wall-clock epoch milliseconds, used by
    /// every time-based system (movement broadcast pacing, anti-cheat
    /// windows, trade expiry).
    pub async fn run_tick(&self, tick_count: u64, now_ms: u64) {
        let dt = self.dt_seconds(now_ms);

        self.face_direction.reset_movement_flags();
        self.run_movement(now_ms, dt).await;
        self.run_face_direction().await;
        self.run_terrain_sweep(now_ms).await;
        self.run_trade_cleanup(now_ms).await;

        self.broadcaster.flush(tick_count).await;
    }

    fn dt_seconds(&self, now_ms: u64) -> f64 {
        let last = self.last_tick_ms.swap(now_ms, Ordering::Relaxed);
        if last == 0 {
            return self.tick_interval_ms as f64 / 1000.0;
        }
        now_ms.saturating_sub(last).max(1) as f64 / 1000.0
    }

    async fn run_movement(&self, now_ms: u64, dt: f64) {
        let events = self.movement.update(dt, now_ms, self.terrain.as_ref());
        for event in events {
            self.aoi.update_entity_position(&event.entity_id, event.position.x, event.position.z).await;

            if let Some(player_id) = self.entities.player_for_entity(&event.entity_id) {
                if let Some(player) = self.entities.get_player(player_id) {
                    self.aoi.update_player_subscriptions(player.socket_id, event.position.x, event.position.z).await;

                    let action = self.position_validator.record_position(player_id, event.position.x, event.position.z, now_ms);
                    self.handle_anti_cheat_action(player_id, action).await;
                }
            }

            self.broadcaster
                .queue_entity_update(
                    &event.entity_id,
                    EntityUpdate {
                        position: Some(event.position),
                        rotation: Some(event.rotation),
                        velocity: Some(event.velocity),
                        state: Some(event.state),
                        priority: Priority::High,
                        ..Default::default()
                    },
                )
                .await;
        }
    }

    async fn run_face_direction(&self) {
        for entity_id in self.face_direction.process_all() {
            let Some(entity) = self.entities.get_entity(&entity_id) else { continue };
            let Some(rotation) = entity.rotation else { continue };
            self.broadcaster
                .queue_entity_update(&entity_id, EntityUpdate { rotation: Some(rotation), ..Default::default() })
                .await;
        }
    }

    /// Terrain drift correction runs on `PositionValidator`'s own relaxed/tight
    /// cadence rather than every tick; a single shared sweep timer (rather
    /// than per-player bookkeeping) is close enough since the cadence is the
    /// same for every player at any given server uptime.
    async fn run_terrain_sweep(&self, now_ms: u64) {
        let interval = self.position_validator.terrain_check_interval_ms(now_ms);
        let last = self.last_terrain_sweep_ms.load(Ordering::Relaxed);
        if now_ms.saturating_sub(last) < interval {
            return;
        }
        self.last_terrain_sweep_ms.store(now_ms, Ordering::Relaxed);

        for player_id in self.entities.player_ids() {
            if let Some(corrected) = self.position_validator.validate_terrain(player_id, self.terrain.as_ref()) {
                if let Some(entity_id) = self.entities.entity_id_for_player(player_id) {
                    self.aoi.update_entity_position(&entity_id, corrected.x, corrected.z).await;
                    self.broadcaster
                        .queue_entity_update(
                            &entity_id,
                            EntityUpdate { position: Some(corrected), priority: Priority::High, force: true, ..Default::default() },
                        )
                        .await;
                }
            }
        }
    }

    async fn run_trade_cleanup(&self, now_ms: u64) {
        for (session_id, a, b, reason) in self.trading.cleanup_expired(now_ms) {
            let packet = TradeCancelledPacket { session_id: &session_id, reason: reason.as_str() };
            self.broadcaster.send_to_player(a, "tradeCancelled", &packet).await;
            self.broadcaster.send_to_player(b, "tradeCancelled", &packet).await;
        }
    }

    async fn handle_anti_cheat_action(&self, player_id: horizon_event_system::PlayerId, action: AntiCheatAction) {
        match action {
            AntiCheatAction::None => {}
            AntiCheatAction::Warn(kind) => {
                tracing::warn!(%player_id, kind = ?kind, "anti-cheat violation recorded");
            }
            AntiCheatAction::Kick(kind) => {
                tracing::warn!(%player_id, kind = ?kind, "anti-cheat kick threshold reached");
                let reason = match kind {
                    ViolationKind::Teleport => "movement_violation_teleport",
                    ViolationKind::Speed => "movement_violation_speed",
                };
                let _ = self.connections.kick_player(player_id, Some(reason.to_string())).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::aoi::AOIManager;
    use crate::world::broadcaster::BroadcastManager;
    use crate::world::entities::{Entity, EntityKind, PlayerEntity, WorldPosition};
    use crate::world::terrain::FlatTerrain;
    use crate::world::throttle::{default_tiers, UpdateThrottler};
    use horizon_event_system::PlayerId;

    async fn harness(moving: bool) -> (Arc<TickLoop>, Arc<EntityRegistry>, PlayerId, Arc<ConnectionManager>) {
        let connections = Arc::new(ConnectionManager::new());
        let socket_id = connections.add_connection("127.0.0.1:9100".parse().unwrap()).await;

        let entities = EntityRegistry::new();
        let player_id = PlayerId::new();
        entities.insert_entity(Entity::new("char1", EntityKind::Player, WorldPosition::new(0.0, 0.0, 0.0)));
        entities.insert_player(PlayerEntity::new("char1".into(), player_id, socket_id, "acct1".into()));
        connections.set_player_id(socket_id, player_id).await;

        let aoi = AOIManager::new(50.0, 1);
        aoi.update_player_subscriptions(socket_id, 0.0, 0.0).await;
        aoi.update_entity_position("char1", 0.0, 0.0).await;

        let throttler = UpdateThrottler::new(default_tiers());
        let broadcaster = OptimizedBroadcaster::new(aoi.clone(), throttler, entities.clone(), BroadcastManager::new(connections.clone()));

        let movement = Arc::new(MovementManager::new(entities.clone()));
        if moving {
            movement.move_request(player_id, Some((100.0, 0.0, 0.0)), true, false);
        }

        let face_direction = Arc::new(FaceDirectionManager::new(entities.clone()));
        let position_validator = Arc::new(PositionValidator::new(entities.clone(), 0));
        let trading = TradingSystem::new();
        let terrain: Arc<dyn TerrainHeightSource> = Arc::new(FlatTerrain(0.0));

        let tick_loop = TickLoop::new(
            entities.clone(),
            aoi,
            movement,
            face_direction,
            position_validator,
            trading,
            broadcaster,
            connections.clone(),
            terrain,
            50,
        );
        (tick_loop, entities, player_id, connections)
    }

    #[tokio::test]
    async fn moving_player_advances_and_flushes_a_frame() {
        let (tick_loop, _entities, _player_id, connections) = harness(true).await;
        let mut rx = connections.subscribe();

        tick_loop.run_tick(1, 1000).await;

        let (_, bytes) = rx.try_recv().expect("a batch frame was sent for the moving player");
        let (kind, _) = crate::world::wire::decode_frame(&bytes).unwrap();
        assert_eq!(kind, crate::world::wire::FrameKind::Binary);
    }

    #[tokio::test]
    async fn idle_player_produces_no_frame() {
        let (tick_loop, _entities, _player_id, connections) = harness(false).await;
        let mut rx = connections.subscribe();

        tick_loop.run_tick(1, 1000).await;

        assert!(rx.try_recv().is_err(), "a stationary player should not produce a batch frame");
    }

    #[tokio::test]
    async fn trade_cleanup_notifies_both_participants() {
        let (tick_loop, entities, player_id, connections) = harness(false).await;
        let other = PlayerId::new();
        let other_socket = connections.add_connection("127.0.0.1:9101".parse().unwrap()).await;
        connections.set_player_id(other_socket, other).await;
        entities.insert_entity(Entity::new("char2", EntityKind::Player, WorldPosition::new(1.0, 0.0, 1.0)));
        entities.insert_player(PlayerEntity::new("char2".into(), other, other_socket, "acct2".into()));

        tick_loop
            .trading
            .create_trade_request(player_id, "Adventurer".into(), 1, other, "Merchant".into(), 2, 0)
            .expect("trade request succeeds");

        let mut rx = connections.subscribe();
        // Far past REQUEST_TIMEOUT_MS, so the pending request is swept as a timeout.
        tick_loop.run_tick(1, 20_000).await;

        let mut notified = 0;
        while rx.try_recv().is_ok() {
            notified += 1;
        }
        assert!(notified >= 1, "expected at least one tradeCancelled notification to be sent");
    }
}
