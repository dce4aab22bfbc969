/// Event emission methods
use crate::events::{Event, EventError};
use crate::gorc::instance::GorcObjectId;
use crate::{PlayerId, Vec3};
use super::core::EventSystem;
use super::stats::{DetailedEventSystemStats, HandlerCategoryStats};
use futures::{self, stream::{FuturesUnordered, StreamExt}};
use tracing::{debug, error, info, warn};
use compact_str::CompactString;


impl EventSystem {
    /// Emits a core server event to all registered handlers.
    #[inline]
    pub async fn emit_core<T>(&self, event_name: &str, event: &T) -> Result<(), EventError>
    where
        T: Event,
    {
        let event_key = CompactString::new_inline("core:") + event_name;
        self.emit_event(&event_key, event).await
    }

    /// Emits a client event to all registered handlers.
    #[inline]
    pub async fn emit_client<T>(
        &self,
        namespace: &str,
        event_name: &str,
        event: &T,
    ) -> Result<(), EventError>
    where
        T: Event,
    {
        let event_key = CompactString::new_inline("client:") + namespace + ":" + event_name;
        self.emit_event(&event_key, event).await
    }

    /// Emits a client event with connection context for connection-aware handlers.
    /// 
    /// This method wraps the event data with player context information, allowing
    /// connection-aware handlers to respond directly to the originating client.
    /// 
    /// # Arguments
    /// 
    /// * `namespace` - The client event namespace
    /// * `event_name` - The specific event name
    /// * `player_id` - The player ID of the client that triggered the event
    /// * `event` - The event data
    pub async fn emit_client_with_context<T>(
        &self,
        namespace: &str,
        event_name: &str,
        player_id: crate::types::PlayerId,
        event: &T,
    ) -> Result<(), EventError>
    where
        T: Event + serde::Serialize,
    {
        // Create a wrapper that includes the player context
        let context_event = serde_json::json!({
            "player_id": player_id,
            "data": event
        });
        
        let event_key = CompactString::new_inline("client:") + namespace + ":" + event_name;
        self.emit_event(&event_key, &context_event).await
    }

    /// Emits a plugin event to all registered handlers.
    #[inline]
    pub async fn emit_plugin<T>(
        &self,
        plugin_name: &str,
        event_name: &str,
        event: &T,
    ) -> Result<(), EventError>
    where
        T: Event,
    {
        let event_key = CompactString::new_inline("plugin:") + plugin_name + ":" + event_name;
        self.emit_event(&event_key, event).await
    }

    /// Emits a GORC instance event for a specific object instance.
    /// 
    /// This is the new API for emitting events that target specific object instances.
    /// The event will only be delivered to handlers that are registered for this
    /// specific object type, channel, and event name.
    /// 
    /// # Arguments
    /// 
    /// * `object_id` - The specific object instance to emit the event for
    /// * `channel` - Replication channel for the event
    /// * `event_name` - Name of the specific event
    /// * `event` - The event data to emit
    /// 
    /// # Examples
    /// 
    /// ```rust,no_run
    /// use horizon_event_system::{EventSystem, GorcEvent, current_timestamp, GorcObjectId, Dest};
    /// use serde::{Serialize, Deserialize};
    /// use std::sync::Arc;
    /// 
    /// #[derive(Serialize, Deserialize, Debug, Clone)]
    /// struct PositionUpdate {
    ///     x: f32,
    ///     y: f32,
    ///     z: f32,
    /// }
    /// 
    /// async fn emit_example() -> Result<(), Box<dyn std::error::Error>> {
    ///     let events = Arc::new(EventSystem::new());
    ///     let asteroid_id = GorcObjectId::new();
    ///     let position_update = PositionUpdate { x: 100.0, y: 200.0, z: 300.0 };
    ///     
    ///     // Emit a position update for a specific asteroid instance
    ///     events.emit_gorc_instance(
    ///         asteroid_id,
    ///         0,
    ///         "position_update",
    ///         &position_update,
    ///         Dest::Both
    ///     ).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn emit_gorc_instance<T>(
        &self,
        object_id: GorcObjectId,
        channel: u8,
        event_name: &str,
        event: &T,
        dest: crate::events::Dest,
    ) -> Result<(), EventError>
    where
        T: Event + serde::Serialize,
    {
        use crate::events::Dest;
        
        // Handle None destination early
        if dest == Dest::None {
            return Ok(());
        }
        
        // Get the object instance to determine its type and position
        if let Some(ref gorc_instances) = self.gorc_instances {
            if let Some(instance) = gorc_instances.get_object(object_id).await {
                let object_type = &instance.type_name;
                
                // Handle Server or Both destinations - emit to server-side handlers
                if dest == Dest::Server || dest == Dest::Both {
                    let instance_key = CompactString::new_inline("gorc_instance:") + object_type + ":" + &channel.to_string() + ":" + event_name;
                    
                    // Emit to instance-specific handlers only
                    if let Err(e) = self.emit_event(&instance_key, event).await {
                        warn!("Failed to emit instance event: {}", e);
                    }
                }
                
                // Handle Client or Both destinations - emit to subscribed clients
                if dest == Dest::Client || dest == Dest::Both {
                    self.emit_to_gorc_subscribers(object_id, channel, event_name, event).await?;
                }
                
                Ok(())
            } else {
                Err(EventError::HandlerNotFound(format!("Object instance {} not found", object_id)))
            }
        } else {
            Err(EventError::HandlerExecution("GORC instance manager not available".to_string()))
        }
    }
    
    /// Emits event data directly to clients subscribed to the object's channel
    async fn emit_to_gorc_subscribers<T>(
        &self,
        object_id: GorcObjectId,
        channel: u8,
        event_name: &str,
        event: &T,
    ) -> Result<(), EventError>
    where
        T: Event + serde::Serialize,
    {
        // Get the client response sender
        let sender = self.client_response_sender.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("Client response sender not configured for GORC emission".to_string())
        })?;
        
        // Get the GORC instances manager to find subscribers
        let gorc_instances = self.gorc_instances.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("GORC instance manager not available".to_string())
        })?;
        
        // Get the object instance
        let instance = gorc_instances.get_object(object_id).await.ok_or_else(|| {
            EventError::HandlerNotFound(format!("Object instance {} not found", object_id))
        })?;
        
        // Get the replication layer for this channel
        let layers = instance.object.get_layers();
        let layer = layers.iter().find(|l| l.channel == channel).ok_or_else(|| {
            EventError::HandlerExecution(format!("Channel {} not defined for object {}", channel, object_id))
        })?;
        
        // CRITICAL: Get subscribers from the instance's subscription list
        // The subscribers list is managed by zone enter/exit logic and is the authoritative source
        let subscribers: Vec<PlayerId> = instance.subscribers
            .get(&channel)
            .map(|subs| subs.iter().copied().collect())
            .unwrap_or_else(Vec::new);
        
        debug!("üì° GORC EMIT: Object {} channel {} has {} subscribers", 
               object_id, channel, subscribers.len());
        
        // Create the event message for clients - just use the event_name directly
        let client_event = serde_json::json!({
            "event_type": event_name,
            "object_id": object_id.to_string(),
            "object_type": instance.type_name,
            "channel": channel,
            "player_id": object_id.to_string(),
            "data": event,
            "timestamp": crate::utils::current_timestamp()
        });
        
        // Serialize the event data
        let data = serde_json::to_vec(&client_event)
            .map_err(|e| EventError::Serialization(e))?;
        
        // Send to all subscribers
        let mut sent_count = 0;
        for player_id in subscribers {
            if let Err(e) = sender.send_to_client(player_id, data.clone()).await {
                warn!("Failed to send GORC event to player {}: {}", player_id, e);
            } else {
                sent_count += 1;
            }
        }
        
        debug!("üì° GORC: Sent {} event to {} clients on channel {} for object {}", 
               event_name, sent_count, channel, object_id);
        
        Ok(())
    }
    
    /// Update player position and handle zone membership changes (event-driven GORC)
    pub async fn update_player_position(&self, player_id: PlayerId, new_position: Vec3) -> Result<(), EventError> {

        // Get the GORC instances manager
        let gorc_instances = self.gorc_instances.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("GORC instance manager not available".to_string())
        })?;


        // Update position and get zone changes
        let (zone_entries, zone_exits) = gorc_instances.update_player_position(player_id, new_position).await;

        debug!("üéÆ EVENT DEBUG: Got zone results - {} entries, {} exits", zone_entries.len(), zone_exits.len());

        // Handle zone entries - send zone entry messages with current layer state
        for (object_id, channel) in zone_entries {
            debug!("üéÆ EVENT DEBUG: Sending zone entry message for object {} channel {}", object_id, channel);
            self.send_zone_entry_message(player_id, object_id, channel).await?;
        }

        // Handle zone exits - send zone exit messages to inform client
        for (object_id, channel) in zone_exits {
            debug!("üéÆ EVENT DEBUG: Sending zone exit message for object {} channel {}", object_id, channel);
            self.send_zone_exit_message(player_id, object_id, channel).await?;
        }

        Ok(())
    }

    /// Update object position and handle zone membership changes for stationary players
    pub async fn update_object_position(&self, object_id: GorcObjectId, new_position: Vec3) -> Result<(), EventError> {
        // Get the GORC instances manager
        let gorc_instances = self.gorc_instances.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("GORC instance manager not available".to_string())
        })?;

        // Update object position and get zone changes for all players
        if let Some((old_position, new_position, zone_changes)) = gorc_instances.update_object_position(object_id, new_position).await {
            debug!("üéØ GORC Object Movement: Object {} moved from {:?} to {:?}, {} zone changes",
                   object_id, old_position, new_position, zone_changes.len());

            // Handle zone changes caused by object movement
            for (player_id, channel, is_entry) in zone_changes {
                if is_entry {
                    debug!("üéÆ GORC Object Movement: Sending zone entry message for object {} channel {} to player {}",
                           object_id, channel, player_id);
                    self.send_zone_entry_message(player_id, object_id, channel).await?;
                } else {
                    debug!("üéÆ GORC Object Movement: Sending zone exit message for object {} channel {} to player {}",
                           object_id, channel, player_id);
                    self.send_zone_exit_message(player_id, object_id, channel).await?;
                }
            }
        }

        Ok(())
    }

    /// Notify existing players when a new GORC object is created
    pub async fn notify_players_for_new_gorc_object(&self, object_id: GorcObjectId) -> Result<(), EventError> {
        // Get the GORC instances manager
        let gorc_instances = self.gorc_instances.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("GORC instance manager not available".to_string())
        })?;

        // Get zone entries for existing players
        let zone_entries = gorc_instances.notify_existing_players_for_new_object(object_id).await;

        debug!("üÜï GORC New Object: Object {} created, {} automatic zone entries",
               object_id, zone_entries.len());

        // Send zone entry messages to all affected players
        for (player_id, channel) in zone_entries {
            debug!("üéÆ GORC New Object: Sending zone entry message for new object {} channel {} to player {}",
                   object_id, channel, player_id);
            self.send_zone_entry_message(player_id, object_id, channel).await?;
        }

        Ok(())
    }
    
    /// Send zone entry message with current object state for a specific layer to a player
    async fn send_zone_entry_message(&self, player_id: PlayerId, object_id: GorcObjectId, channel: u8) -> Result<(), EventError> {
        // Get the client response sender
        let sender = self.client_response_sender.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("Client response sender not configured".to_string())
        })?;
        
        // Get the GORC instances manager
        let gorc_instances = self.gorc_instances.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("GORC instance manager not available".to_string())
        })?;
        
        // Get the object instance
        let instance = gorc_instances.get_object(object_id).await.ok_or_else(|| {
            EventError::HandlerNotFound(format!("Object instance {} not found", object_id))
        })?;
        
        // Get current state for this layer
        if let Some(layer_data) = gorc_instances.get_object_state_for_layer(object_id, channel).await {
            // Create zone entry message with proper format
            let zone_entry_event = serde_json::json!({
                "type": "gorc_zone_enter",
                "object_id": object_id.to_string(),
                "object_type": instance.type_name,
                "channel": channel,
                "player_id": player_id.to_string(),
                "zone_data": serde_json::from_slice::<serde_json::Value>(&layer_data)
                    .unwrap_or(serde_json::Value::Null),
                "timestamp": crate::utils::current_timestamp()
            });
            
            // Serialize and send
            let data = serde_json::to_vec(&zone_entry_event)
                .map_err(|e| EventError::Serialization(e))?;
            
            if let Err(e) = sender.send_to_client(player_id, data).await {
                warn!("‚ùå Failed to send zone entry message to player {}: {}", player_id, e);
            } else {
                info!("üîî GORC: Player {} entered zone {} of object {} ({})", 
                      player_id, channel, object_id, instance.type_name);
            }
        } else {
            warn!("‚ùå GORC: No layer data available for object {} channel {}", object_id, channel);
        }
        
        Ok(())
    }

    /// Send zone exit message to inform player they left an object's zone
    async fn send_zone_exit_message(&self, player_id: PlayerId, object_id: GorcObjectId, channel: u8) -> Result<(), EventError> {
        // Get the client response sender
        let sender = self.client_response_sender.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("Client response sender not configured".to_string())
        })?;
        
        // Get the GORC instances manager for object type lookup
        let gorc_instances = self.gorc_instances.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("GORC instance manager not available".to_string())
        })?;
        
        // Get object type for logging (optional - graceful fallback if object no longer exists)
        let object_type = if let Some(instance) = gorc_instances.get_object(object_id).await {
            instance.type_name.clone()
        } else {
            "Unknown".to_string()
        };
        
        // Create zone exit message
        let zone_exit_event = serde_json::json!({
            "type": "gorc_zone_exit",
            "object_id": object_id.to_string(),
            "object_type": object_type,
            "channel": channel,
            "player_id": player_id.to_string(),
            "timestamp": crate::utils::current_timestamp()
        });
        
        // Serialize and send
        let data = serde_json::to_vec(&zone_exit_event)
            .map_err(|e| EventError::Serialization(e))?;
        
        if let Err(e) = sender.send_to_client(player_id, data).await {
            warn!("‚ùå Failed to send zone exit message to player {}: {}", player_id, e);
        } else {
            info!("üö™ GORC: Player {} exited zone {} of object {} ({})", 
                  player_id, channel, object_id, object_type);
        }
        
        Ok(())
    }


    /// Routes a client message to GORC client handlers, providing security and authorization.
    /// 
    /// This method is specifically for client-initiated events targeting server objects.
    /// It emits to handlers registered with `on_gorc_client` that can validate permissions
    /// and apply security checks before modifying server state.
    pub async fn emit_gorc_client<T>(
        &self,
        client_player_id: crate::PlayerId,
        target_object_id: GorcObjectId,
        channel: u8,
        event_name: &str,
        event: &T,
    ) -> Result<(), EventError>
    where
        T: Event + serde::Serialize,
    {
        // Get the GORC instances manager
        let gorc_instances = self.gorc_instances.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("GORC instance manager not available".to_string())
        })?;

        // Get the target object instance to determine its type
        if let Some(instance) = gorc_instances.get_object(target_object_id).await {
            let object_type = &instance.type_name;
            
            // Create the event key for client-to-server GORC events
            let event_key = CompactString::new_inline("gorc_client:") + object_type + ":" + &channel.to_string() + ":" + event_name;
            
            // Wrap the event with player context for the handler
            let client_event = serde_json::json!({
                "player_id": client_player_id,
                "object_id": target_object_id.to_string(),
                "object_type": object_type,
                "channel": channel,
                "data": event,
                "timestamp": crate::utils::current_timestamp()
            });

            self.emit_event(&event_key, &client_event).await
        } else {
            Err(EventError::HandlerNotFound(format!("Target object {} not found", target_object_id)))
        }
    }


    /// Broadcasts an event to all connected clients.
    /// 
    /// This method sends the event data to every client currently connected to the server.
    /// The event is serialized once and then sent to all clients for optimal performance.
    /// 
    /// # Arguments
    /// 
    /// * `event` - The event data to broadcast
    /// 
    /// # Returns
    /// 
    /// Returns `Ok(usize)` with the number of clients that received the broadcast,
    /// or `Err(EventError)` if the broadcast failed or client response sender is not configured.
    /// 
    /// # Examples
    /// 
    /// ```rust,no_run
    /// use horizon_event_system::EventSystem;
    /// use serde::{Serialize, Deserialize};
    /// use std::sync::Arc;
    /// 
    /// #[derive(Serialize, Deserialize, Debug, Clone)]
    /// struct ServerAnnouncement {
    ///     message: String,
    ///     priority: String,
    /// }
    /// 
    /// async fn example() -> Result<(), Box<dyn std::error::Error>> {
    ///     let events = Arc::new(EventSystem::new());
    ///     
    ///     // Broadcast a server announcement to all players
    ///     let announcement = ServerAnnouncement {
    ///         message: "Server maintenance in 5 minutes".to_string(),
    ///         priority: "high".to_string(),
    ///     };
    ///     
    ///     match events.broadcast(&announcement).await {
    ///         Ok(client_count) => println!("Announcement sent to {} clients", client_count),
    ///         Err(e) => println!("Broadcast failed: {}", e),
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn broadcast<T>(&self, event: &T) -> Result<usize, EventError>
    where
        T: Event + serde::Serialize,
    {
        // Check if client response sender is configured
        let sender = self.client_response_sender.as_ref().ok_or_else(|| {
            EventError::HandlerExecution("Client response sender not configured for broadcasting".to_string())
        })?;

        // Serialize the event data using our serialization pool
        let data = self.serialization_pool.serialize_event(event)?;
        
        // Convert Arc<Vec<u8>> to Vec<u8> for the broadcast method
        let broadcast_data = (*data).clone();
        
        // Send to all clients via the client response sender
        match sender.broadcast_to_all(broadcast_data).await {
            Ok(client_count) => {
                if cfg!(debug_assertions) {
                    debug!("üì° Broadcasted event to {} clients", client_count);
                }
                
                // Update stats
                let mut stats = self.stats.write().await;
                stats.events_emitted += 1;
                
                Ok(client_count)
            },
            Err(e) => {
                error!("‚ùå Broadcast failed: {}", e);
                Err(EventError::HandlerExecution(format!("Broadcast failed: {}", e)))
            }
        }
    }

    /// Internal emit implementation that handles the actual event dispatch.
    /// Optimized for high throughput (500k messages/sec target).
    /// Now uses lock-free DashMap + serialization pool for maximum performance.
    async fn emit_event<T>(&self, event_key: &str, event: &T) -> Result<(), EventError>
    where
        T: Event,
    {
        // Use serialization pool for better performance and shared data
        let data = self.serialization_pool.serialize_event(event)?;
        
        // Lock-free read from DashMap - no contention!
        let event_handlers = self.handlers.get(event_key).map(|entry| entry.value().clone());

        if let Some(event_handlers) = event_handlers {
            // Only log debug info if handlers exist to reduce overhead
            if event_handlers.len() > 0 {
                if cfg!(debug_assertions) {
                    debug!("üì§ Emitting {} to {} handlers", event_key, event_handlers.len());
                }

                // Use FuturesUnordered for better memory efficiency and concurrency
                let mut futures = FuturesUnordered::new();
                
                for handler in event_handlers.iter() {
                    let data_arc = data.clone(); // Clone the Arc, not the data for speed
                    let handler_name = handler.handler_name();
                    let handler_clone = handler.clone();
                    
                    futures.push(async move {
                        if let Err(e) = handler_clone.handle(&data_arc).await {
                            error!("‚ùå Handler {} failed: {}", handler_name, e);
                        }
                    });
                }

                // Execute all handlers concurrently with better memory usage
                while let Some(_) = futures.next().await {};
            }

            // Batch stats updates to reduce lock contention
            let mut stats = self.stats.write().await;
            stats.events_emitted += 1;
            
            // Update GORC-specific stats with branch prediction optimization
            if event_key.as_bytes().get(0) == Some(&b'g') && event_key.starts_with("gorc") {
                stats.gorc_events_emitted += 1;
            }
        } else {
            // Show debugging info for missing handlers (except server_tick spam)
            if event_key != "core:server_tick" && event_key != "core:raw_client_message" {
                // Use PathRouter for efficient similarity search instead of expensive linear scan
                let similar_paths = {
                    let path_router = self.path_router.read().await;
                    path_router.find_similar_paths(event_key, 5)
                };
                
                if !similar_paths.is_empty() {
                    warn!("‚ö†Ô∏è No handlers for event: {} (similar keys available: {:?})", event_key, similar_paths);
                } else {
                    warn!("‚ö†Ô∏è No handlers for event: {} (no similar handlers found)", event_key);
                }
            }
        }

        Ok(())
    }

    /// Gets detailed statistics including GORC instance information
    pub async fn get_detailed_stats(&self) -> DetailedEventSystemStats {
        let base_stats = self.get_stats().await;
        let handler_count_by_category = self.get_handler_count_by_category().await;
        
        let gorc_instance_stats = if let Some(ref gorc_instances) = self.gorc_instances {
            Some(gorc_instances.get_stats().await)
        } else {
            None
        };

        DetailedEventSystemStats {
            base: base_stats,
            handler_count_by_category,
            gorc_instance_stats,
        }
    }

    /// Gets handler count breakdown by event category using lock-free DashMap
    async fn get_handler_count_by_category(&self) -> HandlerCategoryStats {
        let mut core_handlers = 0;
        let mut client_handlers = 0;
        let mut plugin_handlers = 0;
        let mut gorc_handlers = 0;
        let mut gorc_instance_handlers = 0;

        // Lock-free iteration over DashMap
        for entry in self.handlers.iter() {
            let key = entry.key();
            let count = entry.value().len();
            
            if key.starts_with("core:") {
                core_handlers += count;
            } else if key.starts_with("client:") {
                client_handlers += count;
            } else if key.starts_with("plugin:") {
                plugin_handlers += count;
            } else if key.starts_with("gorc_instance:") {
                gorc_instance_handlers += count;
            } else if key.starts_with("gorc:") {
                gorc_handlers += count;
            }
        }

        HandlerCategoryStats {
            core_handlers,
            client_handlers,
            plugin_handlers,
            gorc_handlers,
            gorc_instance_handlers,
        }
    }
}