//! Server configuration types and defaults.
//!
//! This module contains the server configuration structure and default values
//! used to initialize and customize the game server behavior.

use horizon_event_system::RegionBounds;
use plugin_system::PluginSafetyConfig;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Configuration structure for the game server.
/// 
/// Contains all necessary parameters to configure server behavior including
/// network settings, region boundaries, plugin management, and connection limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,
    
    /// The spatial bounds for this server region
    pub region_bounds: RegionBounds,
    
    /// Directory path where plugins are stored
    pub plugin_directory: PathBuf,
    
    /// Maximum number of concurrent connections allowed
    pub max_connections: usize,
    
    /// Connection timeout in seconds
    pub connection_timeout: u64,
    
    /// Whether to use SO_REUSEPORT for multi-threaded accept loops
    pub use_reuse_port: bool,
    
    /// Server tick interval in milliseconds (0 to disable)
    pub tick_interval_ms: u64,
    
    /// Security configuration settings
    pub security: SecurityConfig,
    
    /// Plugin safety configuration settings
    pub plugin_safety: PluginSafetyConfig,

    /// World simulation tuning: AOI, throttling, movement, anti-cheat, trade
    #[serde(default)]
    pub world: WorldConfig,
}

/// Tuning for the AOI/throttle/movement/anti-cheat/trade subsystems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Side length, in world units, of one AOI grid cell
    pub aoi_cell_size: f64,

    /// View distance in cells (a player subscribes to a `(2k+1)x(2k+1)` window)
    pub aoi_view_distance: i64,

    /// Squared-distance upper bound and update interval (in ticks) per throttle tier
    pub throttle_tiers: Vec<(f64, u64)>,

    /// Max entities flushed into one subscriber's batch per tick
    pub max_updates_per_batch: usize,

    /// Walking speed in world units/sec
    pub walk_speed: f64,

    /// Running speed in world units/sec
    pub run_speed: f64,

    /// Distance (tiles) beyond which a single movement sample is a teleport
    pub teleport_dist_tiles: f64,

    /// Max elapsed time (ms) between samples for the teleport check to apply
    pub teleport_max_dt_ms: u64,

    /// Allowed multiplier over `run_speed` before the cumulative-speed check trips
    pub speed_tolerance: f64,

    /// Consecutive violations before `PositionValidator` recommends a kick
    pub anti_cheat_kick_threshold: u32,

    /// Milliseconds between identical trade requests from the same pair of players
    pub trade_request_cooldown_ms: u64,

    /// Milliseconds a pending trade request waits before expiring
    pub trade_request_timeout_ms: u64,

    /// Milliseconds of trade inactivity before the session is cancelled
    pub trade_activity_timeout_ms: u64,

    /// Poll interval (ms) while the connection handshake waits for terrain readiness
    pub terrain_wait_poll_ms: u64,

    /// Max time (ms) the handshake waits for terrain before closing the socket
    pub terrain_wait_timeout_ms: u64,

    /// Seconds a spawned-but-not-ready player waits before the loading watchdog forces `isLoading = false`
    pub loading_watchdog_secs: u64,

    /// Anonymous-account creations allowed per IP per hour
    pub anonymous_accounts_per_hour: u32,

    /// Grace period (seconds) a reconnecting socket has before an unspawned duplicate is evicted
    pub reconnect_grace_period_secs: u64,

    /// Secret used to sign and verify session JWTs minted for anonymous/local accounts
    pub jwt_secret: String,

    /// Admin bypass code honored by `Authenticator::expand_roles`; `None` disables the bypass
    pub admin_code: Option<String>,

    /// Relaxes the `~admin` role grant for local development when no `admin_code` is set
    pub dev_mode: bool,

    /// Base URL the `snapshot` packet points clients at for asset downloads
    pub assets_url: String,

    /// Configured spawn position used when a character has no saved position
    pub spawn_x: f64,
    pub spawn_y: f64,
    pub spawn_z: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            aoi_cell_size: 50.0,
            aoi_view_distance: 1,
            throttle_tiers: vec![(625.0, 1), (2500.0, 2), (10_000.0, 4), (f64::INFINITY, 8)],
            max_updates_per_batch: 256,
            walk_speed: 4.0,
            run_speed: 8.0,
            teleport_dist_tiles: 10.0,
            teleport_max_dt_ms: 500,
            speed_tolerance: 1.2,
            anti_cheat_kick_threshold: 3,
            trade_request_cooldown_ms: 3_000,
            trade_request_timeout_ms: 15_000,
            trade_activity_timeout_ms: 120_000,
            terrain_wait_poll_ms: 100,
            terrain_wait_timeout_ms: 10_000,
            loading_watchdog_secs: 30,
            anonymous_accounts_per_hour: 5,
            reconnect_grace_period_secs: 10,
            jwt_secret: "change-me-in-production".to_string(),
            admin_code: None,
            dev_mode: false,
            assets_url: "https://assets.example".to_string(),
            spawn_x: 0.0,
            spawn_y: 0.0,
            spawn_z: 0.0,
        }
    }
}

/// Security configuration for input validation and protection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Enable rate limiting
    pub enable_rate_limiting: bool,
    
    /// Maximum requests per minute per IP
    pub max_requests_per_minute: u32,
    
    /// Maximum message size in bytes
    pub max_message_size: usize,
    
    /// Maximum allowed nesting depth for JSON messages
    pub max_json_depth: usize,
    
    /// Maximum allowed string length in JSON
    pub max_string_length: usize,
    
    /// Maximum allowed array/object size
    pub max_collection_size: usize,
    
    /// Enable DDoS protection
    pub enable_ddos_protection: bool,
    
    /// Banned IP addresses
    pub banned_ips: Vec<IpAddr>,
    
    /// Maximum concurrent connections per IP
    pub max_connections_per_ip: u32,
    
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().expect("Invalid default bind address"),
            region_bounds: RegionBounds {
                min_x: -1000.0,
                max_x: 1000.0,
                min_y: -1000.0,
                max_y: 1000.0,
                min_z: -100.0,
                max_z: 100.0,
            },
            plugin_directory: PathBuf::from("plugins"),
            max_connections: 1000,
            connection_timeout: 60,
            use_reuse_port: false,
            tick_interval_ms: 50, // 20 ticks per second by default
            security: SecurityConfig::default(),
            plugin_safety: PluginSafetyConfig::default(),
            world: WorldConfig::default(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_rate_limiting: true,
            max_requests_per_minute: 60,
            max_message_size: 64 * 1024, // 64KB
            max_json_depth: 10,
            max_string_length: 1024,
            max_collection_size: 100,
            enable_ddos_protection: true,
            banned_ips: Vec::new(),
            max_connections_per_ip: 10,
        }
    }
}