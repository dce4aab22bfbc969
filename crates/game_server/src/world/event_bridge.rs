//! Maps internal domain events onto outbound wire packets.
//!
//! This is the only place in the crate that translates an `on_core` event
//! into a call on `OptimizedBroadcaster`. Gameplay systems publish domain
//! events; they never construct or send wire packets themselves, so that
//! broadcast-vs-private routing stays centralized in one policy.

use super::broadcaster::OptimizedBroadcaster;
use super::entities::Health;
use horizon_event_system::{EventError, EventSystem, PlayerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

macro_rules! domain_event {
    ($name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        #[derive(Debug, Clone, Serialize, Deserialize)]
        pub struct $name {
            $(pub $field: $ty),*
        }
    };
}

domain_event!(ResourceDepletedEvent { resource_id: String });
domain_event!(ResourceRespawnedEvent { resource_id: String });
domain_event!(ResourceSpawnedEvent { resource: serde_json::Value });
domain_event!(ResourceSpawnPointsRegisteredEvent { spawn_points: serde_json::Value });

domain_event!(InventoryUpdatedEvent { player_id: PlayerId, items: serde_json::Value, coins: u64, max_slots: u32 });
domain_event!(InventoryInitializedEvent { player_id: PlayerId, items: serde_json::Value, coins: u64, max_slots: u32 });
domain_event!(InventoryCoinsUpdatedEvent { player_id: PlayerId, coins: u64 });
domain_event!(InventoryRequestEvent { player_id: PlayerId, items: serde_json::Value, coins: u64, max_slots: u32, is_loading: bool });

/// `player_id = None` broadcasts skill changes visible to everyone (e.g. a
/// combat level-up announcement); `Some` delivers the private skill sheet.
domain_event!(SkillsUpdatedEvent { player_id: Option<PlayerId>, skills: serde_json::Value });

/// Catch-all for `UI_*` events (messages, death screen, attack style, …),
/// where `kind` is the client packet name to emit.
domain_event!(UiEvent { player_id: PlayerId, kind: String, payload: serde_json::Value });

domain_event!(CombatDamageDealtEvent { payload: serde_json::Value });
domain_event!(PlayerUpdatedEvent { player_id: PlayerId, health: Health, payload: serde_json::Value });

domain_event!(DialogueStartEvent { player_id: PlayerId, payload: serde_json::Value });
domain_event!(DialogueNodeChangeEvent { player_id: PlayerId, payload: serde_json::Value });
domain_event!(DialogueEndEvent { player_id: PlayerId, payload: serde_json::Value });

domain_event!(BankOpenRequestEvent { player_id: PlayerId, items: serde_json::Value });
domain_event!(StoreOpenRequestEvent { player_id: PlayerId, store: serde_json::Value });

/// Emitted on spawn, carrying the pre-loaded equipment so downstream systems
/// (friends list, etc.) need not reread storage. Has no direct wire packet.
domain_event!(PlayerJoinedEvent { player_id: PlayerId, character_id: String, equipment: serde_json::Value });

domain_event!(TradeStartedEvent { session_id: String, initiator: PlayerId, recipient: PlayerId });
domain_event!(TradeCancelledEvent { session_id: String, initiator: PlayerId, recipient: PlayerId, reason: String });
domain_event!(TradeCompletedEvent {
    session_id: String,
    initiator: PlayerId,
    recipient: PlayerId,
    initiator_receives: serde_json::Value,
    recipient_receives: serde_json::Value
});

/// Flattens a health pair into the payload object `playerUpdated` sends, the
/// way `entityModified`'s `changes` object flattens optional fields.
fn with_flattened_health(health: Health, mut payload: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::Object(ref mut map) = payload {
        map.insert("health".into(), serde_json::json!({ "current": health.current, "max": health.max }));
    }
    payload
}

/// Subscribes every routing-table entry from the domain event bus onto
/// `broadcaster`. Inventory, combat, and skill *content* are produced by
/// other systems; this only owns where each named event's packet goes.
pub struct EventBridge {
    broadcaster: Arc<OptimizedBroadcaster>,
}

impl EventBridge {
    pub fn new(broadcaster: Arc<OptimizedBroadcaster>) -> Arc<Self> {
        Arc::new(Self { broadcaster })
    }

    /// Registers the full routing table against `events`. Handlers are
    /// synchronous (per `on_core_async`'s contract) and dispatch onto the
    /// broadcaster via `block_on`, mirroring the pattern used by synchronous
    /// client-event handlers elsewhere in this event system.
    pub async fn register(self: &Arc<Self>, events: &Arc<EventSystem>) -> Result<(), EventError> {
        macro_rules! route_broadcast {
            ($event_name:literal, $ty:ty, $packet:literal) => {{
                let bridge = self.clone();
                events
                    .on_core_async::<$ty, _>($event_name, move |event: $ty| {
                        let bridge = bridge.clone();
                        let handle = tokio::runtime::Handle::try_current()
                            .map_err(|e| EventError::RuntimeError(e.to_string()))?;
                        handle.block_on(bridge.broadcaster.broadcast_to_all($packet, &event));
                        Ok(())
                    })
                    .await?;
            }};
        }

        route_broadcast!("RESOURCE_DEPLETED", ResourceDepletedEvent, "resourceDepleted");
        route_broadcast!("RESOURCE_RESPAWNED", ResourceRespawnedEvent, "resourceRespawned");
        route_broadcast!("RESOURCE_SPAWNED", ResourceSpawnedEvent, "resourceSpawned");
        route_broadcast!(
            "RESOURCE_SPAWN_POINTS_REGISTERED",
            ResourceSpawnPointsRegisteredEvent,
            "resourceSpawnPointsRegistered"
        );
        route_broadcast!("INVENTORY_UPDATED", InventoryUpdatedEvent, "inventoryUpdated");
        route_broadcast!("COMBAT_DAMAGE_DEALT", CombatDamageDealtEvent, "combatDamageDealt");

        {
            let bridge = self.clone();
            events
                .on_core_async::<InventoryInitializedEvent, _>("INVENTORY_INITIALIZED", move |event| {
                    let bridge = bridge.clone();
                    let handle = tokio::runtime::Handle::try_current().map_err(|e| EventError::RuntimeError(e.to_string()))?;
                    handle.block_on(bridge.broadcaster.send_to_player(event.player_id, "inventoryUpdated", &event));
                    Ok(())
                })
                .await?;
        }
        {
            let bridge = self.clone();
            events
                .on_core_async::<InventoryCoinsUpdatedEvent, _>("INVENTORY_COINS_UPDATED", move |event| {
                    let bridge = bridge.clone();
                    let handle = tokio::runtime::Handle::try_current().map_err(|e| EventError::RuntimeError(e.to_string()))?;
                    handle.block_on(bridge.broadcaster.send_to_player(event.player_id, "coinsUpdated", &event));
                    Ok(())
                })
                .await?;
        }
        {
            let bridge = self.clone();
            events
                .on_core_async::<InventoryRequestEvent, _>("INVENTORY_REQUEST", move |event| {
                    if event.is_loading {
                        return Ok(());
                    }
                    let bridge = bridge.clone();
                    let handle = tokio::runtime::Handle::try_current().map_err(|e| EventError::RuntimeError(e.to_string()))?;
                    handle.block_on(bridge.broadcaster.send_to_player(event.player_id, "inventoryUpdated", &event));
                    Ok(())
                })
                .await?;
        }
        {
            let bridge = self.clone();
            events
                .on_core_async::<SkillsUpdatedEvent, _>("SKILLS_UPDATED", move |event| {
                    let bridge = bridge.clone();
                    let handle = tokio::runtime::Handle::try_current().map_err(|e| EventError::RuntimeError(e.to_string()))?;
                    match event.player_id {
                        Some(player_id) => {
                            handle.block_on(bridge.broadcaster.send_to_player(player_id, "skillsUpdated", &event));
                        }
                        None => {
                            handle.block_on(bridge.broadcaster.broadcast_to_all("skillsUpdated", &event));
                        }
                    }
                    Ok(())
                })
                .await?;
        }
        {
            let bridge = self.clone();
            events
                .on_core_async::<UiEvent, _>("UI_EVENT", move |event| {
                    let bridge = bridge.clone();
                    let handle = tokio::runtime::Handle::try_current().map_err(|e| EventError::RuntimeError(e.to_string()))?;
                    let kind = event.kind.clone();
                    handle.block_on(bridge.broadcaster.send_to_player(event.player_id, &kind, &event.payload));
                    Ok(())
                })
                .await?;
        }
        {
            let bridge = self.clone();
            events
                .on_core_async::<PlayerUpdatedEvent, _>("PLAYER_UPDATED", move |event| {
                    let bridge = bridge.clone();
                    let handle = tokio::runtime::Handle::try_current().map_err(|e| EventError::RuntimeError(e.to_string()))?;
                    let payload = with_flattened_health(event.health, event.payload.clone());
                    handle.block_on(bridge.broadcaster.send_to_player(event.player_id, "playerUpdated", &payload));
                    Ok(())
                })
                .await?;
        }

        macro_rules! route_per_player {
            ($event_name:literal, $ty:ty, $packet:literal) => {{
                let bridge = self.clone();
                events
                    .on_core_async::<$ty, _>($event_name, move |event: $ty| {
                        let bridge = bridge.clone();
                        let handle = tokio::runtime::Handle::try_current()
                            .map_err(|e| EventError::RuntimeError(e.to_string()))?;
                        handle.block_on(bridge.broadcaster.send_to_player(event.player_id, $packet, &event));
                        Ok(())
                    })
                    .await?;
            }};
        }

        route_per_player!("DIALOGUE_START", DialogueStartEvent, "dialogueStart");
        route_per_player!("DIALOGUE_NODE_CHANGE", DialogueNodeChangeEvent, "dialogueNodeChange");
        route_per_player!("DIALOGUE_END", DialogueEndEvent, "dialogueEnd");
        route_per_player!("BANK_OPEN_REQUEST", BankOpenRequestEvent, "bankState");
        route_per_player!("STORE_OPEN_REQUEST", StoreOpenRequestEvent, "storeState");

        {
            let bridge = self.clone();
            events
                .on_core_async::<TradeStartedEvent, _>("TRADE_STARTED", move |event| {
                    let bridge = bridge.clone();
                    let handle = tokio::runtime::Handle::try_current().map_err(|e| EventError::RuntimeError(e.to_string()))?;
                    let payload = serde_json::json!({ "sessionId": event.session_id, "initiator": event.initiator, "recipient": event.recipient });
                    handle.block_on(bridge.broadcaster.send_to_player(event.initiator, "tradeStarted", &payload));
                    handle.block_on(bridge.broadcaster.send_to_player(event.recipient, "tradeStarted", &payload));
                    Ok(())
                })
                .await?;
        }
        {
            let bridge = self.clone();
            events
                .on_core_async::<TradeCancelledEvent, _>("TRADE_CANCELLED", move |event| {
                    let bridge = bridge.clone();
                    let handle = tokio::runtime::Handle::try_current().map_err(|e| EventError::RuntimeError(e.to_string()))?;
                    let payload = serde_json::json!({ "sessionId": event.session_id, "reason": event.reason });
                    handle.block_on(bridge.broadcaster.send_to_player(event.initiator, "tradeCancelled", &payload));
                    handle.block_on(bridge.broadcaster.send_to_player(event.recipient, "tradeCancelled", &payload));
                    Ok(())
                })
                .await?;
        }
        {
            let bridge = self.clone();
            events
                .on_core_async::<TradeCompletedEvent, _>("TRADE_COMPLETED", move |event| {
                    let bridge = bridge.clone();
                    let handle = tokio::runtime::Handle::try_current().map_err(|e| EventError::RuntimeError(e.to_string()))?;
                    let initiator_payload = serde_json::json!({ "sessionId": event.session_id, "received": event.initiator_receives });
                    let recipient_payload = serde_json::json!({ "sessionId": event.session_id, "received": event.recipient_receives });
                    handle.block_on(bridge.broadcaster.send_to_player(event.initiator, "tradeCompleted", &initiator_payload));
                    handle.block_on(bridge.broadcaster.send_to_player(event.recipient, "tradeCompleted", &recipient_payload));
                    Ok(())
                })
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_updated_flattens_health_into_payload() {
        let health = Health { current: 40, max: 100 };
        let payload = with_flattened_health(health, serde_json::json!({ "name": "Adventurer" }));
        assert_eq!(payload["health"]["current"], 40);
        assert_eq!(payload["health"]["max"], 100);
        assert_eq!(payload["name"], "Adventurer");
    }

    #[test]
    fn skills_updated_without_player_id_is_a_broadcast_candidate() {
        let event = SkillsUpdatedEvent { player_id: None, skills: serde_json::json!({}) };
        assert!(event.player_id.is_none());
    }
}
