//! Outbound replication: the only path gameplay systems use to reach clients.
//!
//! `BroadcastManager` is the low-level, un-batched fanout primitive (all /
//! by-socket / by-player), kept for one-off lifecycle events. Gameplay code
//! never calls it directly — it goes through `OptimizedBroadcaster`, which
//! owns AOI + throttling + per-subscriber batching and is the sole outbound
//! API.

use super::aoi::AOIManager;
use super::batch::BatchUpdater;
use super::entities::{EntityRegistry, MotionState, Quaternion, WorldPosition};
use super::throttle::{Priority, UpdateThrottler};
use super::wire::{encode_binary_frame, encode_text_packet};
use crate::connection::{ConnectionId, ConnectionManager};
use dashmap::DashMap;
use horizon_event_system::PlayerId;
use serde::Serialize;
use std::sync::Arc;

/// Low-level fanout over the connection layer. Holds no game state.
#[derive(Clone)]
pub struct BroadcastManager {
    connections: Arc<ConnectionManager>,
}

impl BroadcastManager {
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    pub async fn send_to_socket(&self, socket_id: ConnectionId, bytes: Vec<u8>) {
        self.connections.send_to_connection(socket_id, bytes).await;
    }

    pub async fn send_to_player(&self, player_id: PlayerId, bytes: Vec<u8>) -> bool {
        match self.connections.get_connection_id_by_player(player_id).await {
            Some(conn_id) => {
                self.connections.send_to_connection(conn_id, bytes).await;
                true
            }
            None => false,
        }
    }

    pub async fn broadcast_to_all(&self, bytes: Vec<u8>) -> usize {
        self.connections.broadcast_to_all(bytes).await
    }
}

/// A pending change to one entity's replicated fields, queued for the next flush.
#[derive(Debug, Clone, Default)]
pub struct EntityUpdate {
    pub position: Option<WorldPosition>,
    pub rotation: Option<Quaternion>,
    pub velocity: Option<(f64, f64)>,
    pub health: Option<(u16, u16)>,
    pub state: Option<MotionState>,
    pub priority: Priority,
    /// Bypasses the throttler regardless of distance/priority.
    pub force: bool,
}

/// Orchestrates AOI + throttling + per-subscriber batching for the tick loop.
pub struct OptimizedBroadcaster {
    aoi: Arc<AOIManager>,
    throttler: Arc<UpdateThrottler>,
    entities: Arc<EntityRegistry>,
    broadcast: BroadcastManager,
    batches: DashMap<ConnectionId, BatchUpdater>,
}

impl OptimizedBroadcaster {
    pub fn new(
        aoi: Arc<AOIManager>,
        throttler: Arc<UpdateThrottler>,
        entities: Arc<EntityRegistry>,
        broadcast: BroadcastManager,
    ) -> Arc<Self> {
        Arc::new(Self { aoi, throttler, entities, broadcast, batches: DashMap::new() })
    }

    /// Queues a replicated change to `entity_id` for every subscriber admitted
    /// by the throttler (or all subscribers, if `force` or `CRITICAL`).
    pub async fn queue_entity_update(&self, entity_id: &str, update: EntityUpdate) {
        let Some(entity) = self.entities.get_entity(entity_id) else { return };
        let subscribers = self.aoi.subscribers_for_entity(entity_id).await;

        for socket_id in subscribers {
            let admitted = update.force
                || update.priority == Priority::Critical
                || {
                    let dist_sq = self
                        .entities
                        .position_for_socket(socket_id)
                        .map(|p| p.distance_sq(entity.position))
                        .unwrap_or(0.0);
                    self.throttler.should_update(entity_id, socket_id, dist_sq, update.priority)
                };
            if !admitted {
                continue;
            }

            let mut batch = self.batches.entry(socket_id).or_default();
            if let Some(p) = update.position {
                batch.queue_position_update(entity_id, p);
            }
            if let Some(q) = update.rotation {
                batch.queue_rotation_update(entity_id, q);
            }
            if let Some((vx, vz)) = update.velocity {
                batch.queue_velocity_update(entity_id, vx, vz);
            }
            if let Some((current, max)) = update.health {
                batch.queue_health_update(entity_id, current, max);
            }
            if let Some(state) = update.state {
                batch.queue_state_update(entity_id, state);
            }
        }
    }

    /// Sets the throttler's tick and emits one `compressedUpdate` frame per
    /// subscriber with a non-empty batch. Returns the number of frames sent.
    pub async fn flush(&self, current_tick: u64) -> usize {
        self.throttler.set_tick(current_tick);

        let socket_ids: Vec<ConnectionId> = self.batches.iter().map(|e| *e.key()).collect();
        let mut sent = 0;
        for socket_id in socket_ids {
            let bytes = match self.batches.get_mut(&socket_id) {
                Some(mut batch) => batch.flush(),
                None => continue,
            };
            if let Some(bytes) = bytes {
                self.broadcast.send_to_socket(socket_id, encode_binary_frame(bytes)).await;
                sent += 1;
            }
        }
        sent
    }

    /// Un-batched fanout to every subscriber of an entity's cell, for one-off
    /// events (chat, spawn, removal) that should not wait for the next flush.
    pub async fn broadcast_to_entity_subscribers<T: Serialize>(&self, entity_id: &str, packet_name: &str, payload: &T) {
        let subscribers = self.aoi.subscribers_for_entity(entity_id).await;
        let bytes = encode_text_packet(packet_name, payload);
        for socket_id in subscribers {
            self.broadcast.send_to_socket(socket_id, bytes.clone()).await;
        }
    }

    pub async fn send_to_player<T: Serialize>(&self, player_id: PlayerId, packet_name: &str, payload: &T) -> bool {
        self.broadcast.send_to_player(player_id, encode_text_packet(packet_name, payload)).await
    }

    pub async fn broadcast_to_all<T: Serialize>(&self, packet_name: &str, payload: &T) -> usize {
        self.broadcast.broadcast_to_all(encode_text_packet(packet_name, payload)).await
    }

    pub async fn remove_subscriber(&self, socket_id: ConnectionId) {
        self.aoi.remove_player(socket_id).await;
        self.throttler.remove_player(socket_id);
        self.batches.remove(&socket_id);
    }

    pub async fn remove_entity(&self, entity_id: &str) {
        self.aoi.remove_entity(entity_id).await;
        self.throttler.remove_entity(entity_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::batch::decode_batch_frame;
    use crate::world::entities::{Entity, EntityKind};
    use crate::world::throttle::default_tiers;
    use crate::world::wire::{decode_frame, FrameKind};

    async fn setup(entity_pos: WorldPosition) -> (Arc<ConnectionManager>, ConnectionId, Arc<EntityRegistry>, Arc<OptimizedBroadcaster>) {
        let connections = Arc::new(ConnectionManager::new());
        let socket_id = connections.add_connection("127.0.0.1:9000".parse().unwrap()).await;

        let aoi = AOIManager::new(50.0, 1);
        aoi.update_player_subscriptions(socket_id, 0.0, 0.0).await;
        aoi.update_entity_position("e1", entity_pos.x, entity_pos.z).await;

        let entities = EntityRegistry::new();
        entities.insert_entity(Entity::new("e1", EntityKind::Item, entity_pos));

        let throttler = UpdateThrottler::new(default_tiers());
        let broadcaster = OptimizedBroadcaster::new(aoi, throttler, entities.clone(), BroadcastManager::new(connections.clone()));
        (connections, socket_id, entities, broadcaster)
    }

    #[tokio::test]
    async fn queued_update_flushes_as_binary_frame_to_subscriber() {
        let (connections, socket_id, _entities, broadcaster) = setup(WorldPosition::new(0.0, 0.0, 0.0)).await;
        let mut rx = connections.subscribe();

        broadcaster
            .queue_entity_update("e1", EntityUpdate { position: Some(WorldPosition::new(1.0, 0.0, 0.0)), ..Default::default() })
            .await;
        let sent = broadcaster.flush(0).await;
        assert_eq!(sent, 1);

        let (conn_id, bytes) = rx.try_recv().unwrap();
        assert_eq!(conn_id, socket_id);
        let (kind, payload) = decode_frame(&bytes).unwrap();
        assert_eq!(kind, FrameKind::Binary);
        let decoded = decode_batch_frame(payload).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[tokio::test]
    async fn non_subscriber_never_receives_update() {
        let (_, _, _entities, broadcaster) = setup(WorldPosition::new(0.0, 0.0, 0.0)).await;
        broadcaster
            .queue_entity_update("ghost", EntityUpdate { position: Some(WorldPosition::new(1.0, 0.0, 0.0)), ..Default::default() })
            .await;
        assert_eq!(broadcaster.flush(0).await, 0);
    }

    #[tokio::test]
    async fn throttle_blocks_until_tier_interval_elapses() {
        // Entity distance_sq(1600) from the subscriber lands in the 2-tick tier.
        let (connections, _socket_id, _entities, broadcaster) = setup(WorldPosition::new(40.0, 0.0, 0.0)).await;
        let mut rx = connections.subscribe();

        broadcaster
            .queue_entity_update("e1", EntityUpdate { position: Some(WorldPosition::new(40.0, 0.0, 0.0)), ..Default::default() })
            .await;
        assert_eq!(broadcaster.flush(0).await, 1);
        rx.try_recv().unwrap();

        broadcaster
            .queue_entity_update("e1", EntityUpdate { position: Some(WorldPosition::new(40.0, 0.0, 0.0)), ..Default::default() })
            .await;
        assert_eq!(broadcaster.flush(1).await, 0);
    }

    #[tokio::test]
    async fn force_bypasses_throttle() {
        let (connections, _socket_id, _entities, broadcaster) = setup(WorldPosition::new(0.0, 0.0, 0.0)).await;
        let mut rx = connections.subscribe();

        broadcaster
            .queue_entity_update("e1", EntityUpdate { position: Some(WorldPosition::new(0.0, 0.0, 0.0)), ..Default::default() })
            .await;
        broadcaster.flush(0).await;
        rx.try_recv().unwrap();

        broadcaster
            .queue_entity_update("e1", EntityUpdate { position: Some(WorldPosition::new(0.1, 0.0, 0.0)), force: true, ..Default::default() })
            .await;
        assert_eq!(broadcaster.flush(1).await, 1);
    }

    #[tokio::test]
    async fn broadcast_to_all_reaches_every_connection() {
        let (connections, _socket_id, _entities, broadcaster) = setup(WorldPosition::new(0.0, 0.0, 0.0)).await;
        let mut rx = connections.subscribe();
        let sent = broadcaster.broadcast_to_all("ping", &serde_json::json!({})).await;
        assert_eq!(sent, 1);
        rx.try_recv().unwrap();
    }
}
