//! Connection handling logic for WebSocket clients.
//!
//! This module contains the core connection handling logic that manages
//! the lifecycle of individual client connections: the WebSocket handshake,
//! the authoritative admission/auth/snapshot sequence from `world::handshake`,
//! in-world packet dispatch, and cleanup.

use crate::{
    connection::ConnectionManager,
    error::ServerError,
    server::core::WorldSystems,
    world::{
        character_selection::{CharacterSelection, LOADING_WATCHDOG},
        entities::Entity,
        event_bridge::{PlayerJoinedEvent, TradeCancelledEvent, TradeCompletedEvent, TradeStartedEvent},
        handshake::HandshakeError,
        trading::{CancelReason, OfferedItem, TradeError, TradeSession},
        wire::{decode_frame, encode_text_packet, FrameKind},
    },
};
use futures::{SinkExt, StreamExt};
use horizon_event_system::{
    current_timestamp, DisconnectReason, EventSystem, PlayerConnectedEvent,
    PlayerDisconnectedEvent, PlayerId,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{
    handshake::server::{Request, Response},
    protocol::frame::coding::CloseCode,
    protocol::CloseFrame,
    Message,
};
use tokio_tungstenite::accept_hdr_async;
use tracing::{debug, error, trace, warn};

/// Query-string token extracted from the WebSocket upgrade request, e.g.
/// `ws://host/?token=...`. `None` falls through to the anonymous auth path.
fn extract_token(uri_query: Option<&str>) -> Option<String> {
    let query = uri_query?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "token").then(|| value.to_string())
    })
}

async fn close_with(ws_sender: &mut (impl futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin), code: u16, reason: &str) {
    let _ = ws_sender
        .send(Message::Close(Some(CloseFrame { code: CloseCode::from(code), reason: reason.to_string().into() })))
        .await;
}

/// Handles a single client connection from establishment to cleanup.
///
/// # Connection Flow
///
/// 1. Perform the WebSocket handshake, pulling an auth token off the query string
/// 2. Run the authoritative admission sequence: player limit, auth, terrain wait
/// 3. Send the `snapshot` packet and reconcile any stale session for the account
/// 4. Spawn the incoming (packet dispatch) and outgoing (broadcast delivery) tasks
/// 5. On disconnect, release the character claim, world entity, and session slot
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    connection_manager: Arc<ConnectionManager>,
    horizon_event_system: Arc<EventSystem>,
    world: Arc<WorldSystems>,
) -> Result<(), ServerError> {
    let token: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let token_for_callback = token.clone();
    let callback = move |req: &Request, resp: Response| {
        *token_for_callback.lock().unwrap() = extract_token(req.uri().query());
        Ok(resp)
    };

    let ws_stream = accept_hdr_async(stream, callback)
        .await
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed: {e}")))?;
    let token = token.lock().unwrap().take();

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let connection_id = connection_manager.add_connection(addr).await;

    // Subscribed before any handshake send so the snapshot packet (queued via
    // the broadcast channel below) is never dropped waiting for a subscriber.
    let mut message_receiver = connection_manager.subscribe();

    let remote_ip: IpAddr = addr.ip();

    if let Err(e) = world.connection_handler.check_player_limit(connection_manager.connection_count().await) {
        warn!("Rejecting connection {}: {}", connection_id, e);
        close_with(&mut ws_sender, 4029, "player_limit").await;
        connection_manager.remove_connection(connection_id).await;
        return Ok(());
    }

    let auth = match world.connection_handler.authenticate(token.as_deref(), remote_ip).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Auth failed for connection {}: {}", connection_id, e);
            let code = match e {
                HandshakeError::RateLimited => 4029,
                _ => 4001,
            };
            close_with(&mut ws_sender, code, "auth_failed").await;
            connection_manager.remove_connection(connection_id).await;
            return Ok(());
        }
    };

    if let Err(e) = world.connection_handler.wait_for_terrain().await {
        warn!("Terrain not ready for connection {}: {}", connection_id, e);
        close_with(&mut ws_sender, 1001, "terrain_not_ready").await;
        connection_manager.remove_connection(connection_id).await;
        return Ok(());
    }

    let losers = match world.connection_handler.register_and_reconcile(&auth.account_id, connection_id) {
        Ok(losers) => losers,
        Err(e) => {
            warn!("Reconcile rejected connection {}: {}", connection_id, e);
            close_with(&mut ws_sender, 4003, "already_logged_in").await;
            connection_manager.remove_connection(connection_id).await;
            return Ok(());
        }
    };
    for loser in losers {
        let _ = connection_manager.kick_connection(loser, Some("duplicate_session".into())).await;
    }

    let player_id = PlayerId::new();
    connection_manager.set_player_id(connection_id, player_id).await;

    let snapshot = world
        .connection_handler
        .build_snapshot(
            connection_id,
            &auth.account_id,
            &auth.account_id,
            Some(auth.jwt.clone()),
            Vec::new(),
            serde_json::json!({}),
            serde_json::json!({}),
        )
        .await;
    let snapshot_frame = encode_text_packet("snapshot", &snapshot);
    if let Some((FrameKind::Text, payload)) = decode_frame(&snapshot_frame) {
        let _ = ws_sender.send(Message::Text(String::from_utf8_lossy(payload).to_string().into())).await;
    }

    horizon_event_system
        .emit_core(
            "player_connected",
            &PlayerConnectedEvent {
                player_id,
                connection_id: connection_id.to_string(),
                remote_addr: addr.to_string(),
                timestamp: current_timestamp(),
            },
        )
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    let ws_sender = Arc::new(tokio::sync::Mutex::new(ws_sender));
    connection_manager.register_ws_sender(connection_id, ws_sender.clone()).await;
    let ws_sender_incoming = ws_sender.clone();
    let ws_sender_outgoing = ws_sender.clone();

    let active_character: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    // Incoming message task - dispatches `{ type, ...payload }` client packets.
    let incoming_task = {
        let connection_manager = connection_manager.clone();
        let world = world.clone();
        let horizon_event_system = horizon_event_system.clone();
        let account_id = auth.account_id.clone();
        let is_agent = auth.roles.iter().any(|r| r == "agent");
        let active_character = active_character.clone();

        async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if let Err(e) = dispatch_packet(
                            &text,
                            connection_id,
                            player_id,
                            &account_id,
                            is_agent,
                            &world,
                            &connection_manager,
                            &horizon_event_system,
                            &active_character,
                        )
                        .await
                        {
                            trace!("❌ Packet dispatch error: {}", e);
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("🔌 Client {} requested close", connection_id);
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        let mut ws_sender = ws_sender_incoming.lock().await;
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Err(e) => {
                        error!("WebSocket error for connection {}: {}", connection_id, e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    };

    // Outgoing message task: drains batched/broadcast frames queued for this connection.
    let outgoing_task = {
        let ws_sender = ws_sender_outgoing;
        async move {
            while let Ok((target_connection_id, message)) = message_receiver.recv().await {
                if target_connection_id == connection_id {
                    let Some((kind, payload)) = decode_frame(&message) else {
                        error!("Dropping malformed outbound frame for connection {}", connection_id);
                        continue;
                    };
                    let ws_message = match kind {
                        FrameKind::Text => Message::Text(String::from_utf8_lossy(payload).to_string().into()),
                        FrameKind::Binary => Message::Binary(payload.to_vec().into()),
                    };
                    let mut ws_sender = ws_sender.lock().await;
                    if let Err(e) = ws_sender.send(ws_message).await {
                        error!("Failed to send message: {}", e);
                        break;
                    }
                }
            }
        }
    };

    tokio::select! {
        _ = incoming_task => {},
        _ = outgoing_task => {},
    }

    // Cleanup: release the world-side claim and session slot, then tear down
    // the entity and anti-cheat/movement/trade state tracked for this player.
    if let Some(character_id) = active_character.lock().unwrap().clone() {
        world.characters.release_claim(&character_id);
        world.entities.remove_entity(&character_id);
        world.aoi.remove_entity(&character_id).await;
        world.aoi.remove_player(connection_id).await;
    }
    world.movement.remove_player(player_id);
    world.position_validator.remove_player(player_id);
    if let Some((session_id, initiator, recipient)) = world.trading.cancel_for_player(player_id, CancelReason::Disconnected) {
        let _ = horizon_event_system
            .emit_core(
                "TRADE_CANCELLED",
                &TradeCancelledEvent { session_id, initiator, recipient, reason: CancelReason::Disconnected.as_str().to_string() },
            )
            .await;
    }
    world.connection_handler.release(&auth.account_id, connection_id);
    world.entities.remove_player(player_id);

    if let Some(player_id) = connection_manager.get_player_id(connection_id).await {
        horizon_event_system
            .emit_core(
                "player_disconnected",
                &PlayerDisconnectedEvent {
                    player_id,
                    connection_id: connection_id.to_string(),
                    reason: DisconnectReason::ClientDisconnect,
                    timestamp: current_timestamp(),
                },
            )
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
    }

    connection_manager.remove_connection(connection_id).await;
    connection_manager.remove_ws_sender(connection_id).await;
    Ok(())
}

/// Dispatches one decoded client packet (`{ "type": name, ...payload }`) to
/// the world system it belongs to. Replies are queued through the connection
/// manager's broadcast channel so they travel the same path as tick-driven
/// updates.
async fn dispatch_packet(
    text: &str,
    connection_id: crate::connection::ConnectionId,
    player_id: PlayerId,
    account_id: &str,
    is_agent: bool,
    world: &Arc<WorldSystems>,
    connection_manager: &Arc<ConnectionManager>,
    horizon_event_system: &Arc<EventSystem>,
    active_character: &Arc<Mutex<Option<String>>>,
) -> Result<(), ServerError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| ServerError::Internal(e.to_string()))?;
    let Some(name) = value.get("type").and_then(|v| v.as_str()) else {
        return Ok(());
    };

    let reply = |name: &str, payload: serde_json::Value| encode_text_packet(name, &payload);
    let now_ms = now_epoch_ms();

    match name {
        "characterListRequest" => {
            let characters = world.characters.list_characters(account_id).await;
            let summaries: Vec<_> = characters
                .iter()
                .map(|c| serde_json::json!({ "id": c.character_id, "name": c.name, "avatar": c.avatar }))
                .collect();
            connection_manager
                .send_to_connection(connection_id, reply("characterList", serde_json::json!({ "characters": summaries })))
                .await;
        }
        "characterCreate" => {
            let cname = value.get("name").and_then(|v| v.as_str()).unwrap_or_default();
            let avatar = value.get("avatar").and_then(|v| v.as_str()).map(str::to_string);
            match world.characters.create_character(account_id, cname, avatar).await {
                Ok(record) => {
                    connection_manager
                        .send_to_connection(
                            connection_id,
                            reply("characterCreated", serde_json::json!({ "id": record.character_id, "name": record.name, "avatar": record.avatar })),
                        )
                        .await;
                }
                Err(e) => {
                    connection_manager
                        .send_to_connection(connection_id, reply("characterCreated", serde_json::json!({ "success": false, "error": e.to_string() })))
                        .await;
                }
            }
        }
        "enterWorld" => {
            let Some(character_id) = value.get("characterId").and_then(|v| v.as_str()) else { return Ok(()) };
            match world
                .characters
                .enter_world(character_id, account_id, connection_id, player_id, is_agent, Some(world.terrain.as_ref()))
                .await
            {
                Ok(outcome) => {
                    *active_character.lock().unwrap() = Some(character_id.to_string());
                    world.aoi.update_entity_position(character_id, outcome.spawn.x, outcome.spawn.z).await;
                    world.aoi.update_player_subscriptions(connection_id, outcome.spawn.x, outcome.spawn.z).await;
                    world.connection_handler.mark_spawned(account_id, connection_id);

                    if let Some(self_entity) = world.entities.get_entity(character_id) {
                        connection_manager
                            .send_to_connection(connection_id, reply("entityAdded", entity_added_payload(&self_entity)))
                            .await;
                    }
                    for other_id in world.aoi.visible_entities(connection_id).await {
                        if other_id == character_id {
                            continue;
                        }
                        if let Some(other_entity) = world.entities.get_entity(&other_id) {
                            connection_manager
                                .send_to_connection(connection_id, reply("entityAdded", entity_added_payload(&other_entity)))
                                .await;
                        }
                    }

                    connection_manager
                        .send_to_connection(
                            connection_id,
                            reply("skillsUpdated", serde_json::json!({ "playerId": player_id, "skills": outcome.loadout.skills })),
                        )
                        .await;
                    connection_manager
                        .send_to_connection(
                            connection_id,
                            reply(
                                "inventoryUpdated",
                                serde_json::json!({ "playerId": player_id, "items": [], "coins": 0, "maxSlots": DEFAULT_INVENTORY_SLOTS }),
                            ),
                        )
                        .await;
                    connection_manager
                        .send_to_connection(
                            connection_id,
                            reply("equipmentUpdated", serde_json::json!({ "playerId": player_id, "equipment": outcome.loadout.equipment })),
                        )
                        .await;

                    let _ = horizon_event_system
                        .emit_core(
                            "PLAYER_JOINED",
                            &PlayerJoinedEvent {
                                player_id,
                                character_id: character_id.to_string(),
                                equipment: outcome.loadout.equipment.clone(),
                            },
                        )
                        .await;

                    if let Some(self_entity) = world.entities.get_entity(character_id) {
                        let payload = entity_added_payload(&self_entity);
                        for subscriber in world.aoi.subscribers_for_entity(character_id).await {
                            if subscriber == connection_id {
                                continue;
                            }
                            connection_manager.send_to_connection(subscriber, reply("entityAdded", payload.clone())).await;
                        }
                    }

                    connection_manager
                        .send_to_connection(connection_id, reply("enterWorldApproved", serde_json::json!({ "characterId": character_id })))
                        .await;

                    spawn_loading_watchdog(world.clone(), connection_manager.clone(), player_id, character_id.to_string());
                }
                Err(e) => {
                    connection_manager
                        .send_to_connection(
                            connection_id,
                            reply("enterWorldRejected", serde_json::json!({ "reason": e.to_string(), "message": e.to_string() })),
                        )
                        .await;
                }
            }
        }
        "clientReady" => {
            world.characters.mark_client_ready(player_id);
        }
        "moveRequest" | "input" => {
            let target = value
                .get("target")
                .and_then(|v| v.as_array())
                .filter(|a| a.len() == 3)
                .map(|a| (a[0].as_f64().unwrap_or(0.0), a[1].as_f64().unwrap_or(0.0), a[2].as_f64().unwrap_or(0.0)));
            let run_mode = value.get("runMode").and_then(|v| v.as_bool()).unwrap_or(false);
            let cancel = value.get("cancel").and_then(|v| v.as_bool()).unwrap_or(false);
            world.movement.move_request(player_id, target, run_mode, cancel);
        }
        "tradeRequest" => {
            let Some(recipient_raw) = value.get("recipientId").and_then(|v| v.as_str()) else { return Ok(()) };
            let Ok(recipient_uuid) = recipient_raw.parse::<uuid::Uuid>() else { return Ok(()) };
            let recipient = PlayerId(recipient_uuid);
            let Some(recipient_entity) = world.entities.get_player(recipient) else { return Ok(()) };
            match world.trading.create_trade_request(
                player_id,
                account_id.to_string(),
                connection_id,
                recipient,
                recipient_entity.account_id.clone(),
                recipient_entity.socket_id,
                now_ms,
            ) {
                Ok(session_id) => {
                    let _ = horizon_event_system
                        .emit_core("TRADE_STARTED", &TradeStartedEvent { session_id, initiator: player_id, recipient })
                        .await;
                }
                Err(e) => {
                    connection_manager.send_to_connection(connection_id, reply("tradeError", trade_error_payload(&e))).await;
                }
            }
        }
        "tradeResponse" => {
            let Some(session_id) = value.get("sessionId").and_then(|v| v.as_str()) else { return Ok(()) };
            let accept = value.get("accept").and_then(|v| v.as_bool()).unwrap_or(false);
            match world.trading.respond_to_trade_request(session_id, player_id, accept, now_ms) {
                Ok(()) => {
                    if accept {
                        broadcast_trade_update(world, session_id).await;
                    } else if let Some(session) = world.trading.session(session_id) {
                        let _ = horizon_event_system
                            .emit_core(
                                "TRADE_CANCELLED",
                                &TradeCancelledEvent {
                                    session_id: session_id.to_string(),
                                    initiator: session.initiator.player_id,
                                    recipient: session.recipient.player_id,
                                    reason: CancelReason::Declined.as_str().to_string(),
                                },
                            )
                            .await;
                    }
                }
                Err(e) => {
                    connection_manager.send_to_connection(connection_id, reply("tradeError", trade_error_payload(&e))).await;
                }
            }
        }
        "tradeAddItem" => {
            let Some(session_id) = value.get("sessionId").and_then(|v| v.as_str()) else { return Ok(()) };
            let item_id = value.get("itemId").and_then(|v| v.as_str()).unwrap_or_default().to_string();
            let quantity = value.get("quantity").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
            match world.trading.add_item_to_trade(session_id, player_id, item_id, quantity, now_ms) {
                Ok(_slot) => broadcast_trade_update(world, session_id).await,
                Err(e) => connection_manager.send_to_connection(connection_id, reply("tradeError", trade_error_payload(&e))).await,
            }
        }
        "tradeRemoveItem" => {
            let Some(session_id) = value.get("sessionId").and_then(|v| v.as_str()) else { return Ok(()) };
            let slot = value.get("slot").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
            match world.trading.remove_item_from_trade(session_id, player_id, slot, now_ms) {
                Ok(()) => broadcast_trade_update(world, session_id).await,
                Err(e) => connection_manager.send_to_connection(connection_id, reply("tradeError", trade_error_payload(&e))).await,
            }
        }
        "tradeAccept" => {
            let Some(session_id) = value.get("sessionId").and_then(|v| v.as_str()) else { return Ok(()) };
            match world.trading.set_acceptance(session_id, player_id, true, now_ms) {
                Ok(outcome) => {
                    if outcome.move_to_confirming {
                        let _ = world.trading.move_to_confirmation(session_id, now_ms);
                    }
                    if outcome.both_accepted {
                        if let Ok(completion) = world.trading.complete_trade(session_id) {
                            let _ = horizon_event_system
                                .emit_core(
                                    "TRADE_COMPLETED",
                                    &TradeCompletedEvent {
                                        session_id: completion.session_id,
                                        initiator: completion.initiator,
                                        recipient: completion.recipient,
                                        initiator_receives: offered_items_json(&completion.initiator_receives),
                                        recipient_receives: offered_items_json(&completion.recipient_receives),
                                    },
                                )
                                .await;
                        }
                    } else {
                        broadcast_trade_update(world, session_id).await;
                    }
                }
                Err(e) => {
                    connection_manager.send_to_connection(connection_id, reply("tradeError", trade_error_payload(&e))).await;
                }
            }
        }
        "tradeCancel" => {
            if let Some(session_id) = value.get("sessionId").and_then(|v| v.as_str()) {
                if let Some((initiator, recipient)) = world.trading.cancel(session_id, CancelReason::Cancelled) {
                    let _ = horizon_event_system
                        .emit_core(
                            "TRADE_CANCELLED",
                            &TradeCancelledEvent {
                                session_id: session_id.to_string(),
                                initiator,
                                recipient,
                                reason: CancelReason::Cancelled.as_str().to_string(),
                            },
                        )
                        .await;
                }
            }
        }
        other => {
            trace!("Unhandled client packet: {}", other);
        }
    }

    Ok(())
}

/// OSRS-convention inventory size; the loadout store does not yet persist
/// item contents, so `enterWorld` reports an empty inventory of this size.
const DEFAULT_INVENTORY_SLOTS: u32 = 28;

/// Builds the `entityAdded` payload: the entity serialized in full, as the
/// wire format requires (`Entity` itself isn't `Serialize` since it mixes
/// owned and referenced state outside this module).
fn entity_added_payload(entity: &Entity) -> serde_json::Value {
    serde_json::json!({
        "id": entity.id,
        "kind": entity.kind,
        "position": entity.position,
        "rotation": entity.rotation,
        "health": entity.health,
        "state": entity.state,
    })
}

/// Spawns the 30 s watchdog that forces `isLoading = false` if the client
/// never confirms `clientReady`, broadcasting the flip to the entity's
/// subscribers when it fires.
fn spawn_loading_watchdog(
    world: Arc<WorldSystems>,
    connection_manager: Arc<ConnectionManager>,
    player_id: PlayerId,
    entity_id: String,
) {
    tokio::spawn(async move {
        let cleared = CharacterSelection::run_loading_watchdog(world.entities.clone(), player_id, tokio::time::sleep(LOADING_WATCHDOG)).await;
        if cleared {
            let payload = encode_text_packet("entityModified", &serde_json::json!({ "id": entity_id, "changes": { "isLoading": false } }));
            for subscriber in world.aoi.subscribers_for_entity(&entity_id).await {
                connection_manager.send_to_connection(subscriber, payload.clone()).await;
            }
        }
    });
}

fn trade_error_payload(err: &TradeError) -> serde_json::Value {
    serde_json::json!({ "success": false, "error": err.to_string() })
}

fn offered_items_json(items: &[OfferedItem]) -> serde_json::Value {
    serde_json::json!(items
        .iter()
        .map(|i| serde_json::json!({ "slot": i.slot, "itemId": i.item_id, "quantity": i.quantity }))
        .collect::<Vec<_>>())
}

fn trade_session_payload(session: &TradeSession) -> serde_json::Value {
    serde_json::json!({
        "sessionId": session.id,
        "status": session.status,
        "initiator": { "playerId": session.initiator.player_id, "offeredItems": offered_items_json(&session.initiator.offered_items), "accepted": session.initiator.accepted },
        "recipient": { "playerId": session.recipient.player_id, "offeredItems": offered_items_json(&session.recipient.offered_items), "accepted": session.recipient.accepted },
    })
}

/// Pushes the full trade session state to both participants after any offer
/// mutation, so each client's trade screen mirrors the other's in real time.
async fn broadcast_trade_update(world: &Arc<WorldSystems>, session_id: &str) {
    let Some(session) = world.trading.session(session_id) else { return };
    let payload = trade_session_payload(&session);
    world.broadcaster.send_to_player(session.initiator.player_id, "tradeUpdate", &payload).await;
    world.broadcaster.send_to_player(session.recipient.player_id, "tradeUpdate", &payload).await;
}

fn now_epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}
