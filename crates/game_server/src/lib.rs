//! # Game Server - Authoritative World Simulation
//!
//! A production-ready WebSocket game server that owns the authoritative
//! simulation for a single region: connection handshake and session
//! lifecycle, character selection, area-of-interest replication,
//! server-side movement and anti-cheat, and two-party trading. Infrastructure
//! concerns (networking, plugin loading, the generic event bus) stay generic;
//! the world-specific state and rules live in the [`world`] module, driven
//! every tick from a single `server_tick` core event.
//!
//! ## Design Philosophy
//!
//! * **WebSocket connection management** - Handles the handshake, session
//!   reconciliation, and message routing for each client connection
//! * **Authoritative world simulation** - Area-of-interest indexing,
//!   distance-throttled replication, movement, position validation, and
//!   trading all run server-side; clients only ever see validated state
//! * **Plugin system integration** - Dynamic loading and management of
//!   auxiliary game logic that doesn't belong in the core simulation
//! * **Event-driven architecture** - The world simulation and plugins both
//!   communicate through the same event system
//! * **GORC integration** - Spatial partitioning primitives available to
//!   plugins, alongside the world module's own AOI index
//! * **Multi-threaded networking** - Scalable accept loops for high-performance operation
//!
//! ## Architecture Overview
//!
//! ### Core Components
//!
//! * **Event System** - Central hub for core, plugin, and world-simulation events
//! * **Connection Manager** - WebSocket lifecycle and player mapping
//! * **World Systems** ([`server::core::WorldSystems`]) - Entity registry, AOI
//!   index, replication throttling/broadcasting, movement, anti-cheat, trading,
//!   character selection, and the connection handshake chain
//! * **Tick Loop** - Drives the world systems once per `server_tick` event
//! * **Plugin Manager** - Dynamic loading and management of auxiliary logic
//! * **GORC Components** - Spatial partitioning primitives for plugin use
//!
//! ### Message Flow
//!
//! 1. Client completes the WebSocket handshake (player limit, auth, terrain
//!    readiness, session reconciliation) and receives an initial `snapshot`
//! 2. In-world client messages are flat `{ "type": "...", ... }` packets
//!    dispatched directly to the relevant world system (character selection,
//!    movement, trading)
//! 3. Every tick, the world systems step in a fixed order and the replication
//!    layer batches and sends whatever each subscriber is owed
//! 4. Auxiliary plugins, if any, still communicate through the event system's
//!    `{namespace, event, data}` convention for traffic outside this packet set
//!
//! ### Plugin Integration
//!
//! Plugins register event handlers for specific namespace/event combinations:
//!
//! ```rust
//! # use horizon_event_system::{create_horizon_event_system, RawClientMessageEvent};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Example plugin handler registration
//! let event_system = create_horizon_event_system();
//! event_system.on_client("movement", "move_request", |event: RawClientMessageEvent, _player_id: horizon_event_system::PlayerId, _connection: horizon_event_system::ClientConnectionRef| {
//!     // Handle movement logic
//!     Ok(())
//! }).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! The server can be configured through the [`ServerConfig`] struct:
//!
//! * **Network settings** - Bind address, connection limits, timeouts
//! * **Region configuration** - Spatial bounds for the server region
//! * **Plugin management** - Plugin directory and loading behavior
//! * **Performance tuning** - Multi-threading and resource limits
//!
//! ## GORC Integration
//!
//! The server includes full GORC (Game Object Replication Channel) support:
//!
//! * **Spatial Partitioning** - Efficient proximity queries and region management
//! * **Subscription Management** - Dynamic event subscription based on player state
//! * **Multicast Groups** - Efficient broadcasting to groups of players
//! * **Replication Channels** - High-performance object state synchronization
//!
//! ## Error Handling
//!
//! The server uses structured error types ([`ServerError`]) to categorize failures:
//!
//! * **Network errors** - Connection, binding, and protocol issues
//! * **Internal errors** - Plugin failures and event system problems
//!
//! ## Thread Safety
//!
//! All server components are designed for safe concurrent access:
//!
//! * Connection management uses `Arc<RwLock<HashMap>>` for thread-safe state
//! * Event system provides async-safe handler registration and emission
//! * Plugin system coordinates safe loading and unloading of plugins
//!
//! ## Performance Considerations
//!
//! * **Multi-threaded accept loops** - Configure `use_reuse_port` for CPU core scaling
//! * **Efficient message routing** - Zero-copy message passing where possible  
//! * **Plugin isolation** - Plugins run in separate contexts to prevent interference
//! * **Connection pooling** - Reuse connections and minimize allocation overhead

// Re-export core types and functions for easy access
pub use config::ServerConfig;
pub use error::ServerError;
pub use server::GameServer;
pub use utils::{create_server, create_server_with_config};

// Public module declarations
pub mod config;
pub mod error;
pub mod server;
pub mod utils;
pub mod security;
pub mod health;
pub mod world;

// Internal modules (not part of public API)
mod connection;
mod messaging;
mod tests;

// Authentication integration tests
#[cfg(test)]
mod auth_integration_tests;