//! Terrain height lookup, shared by movement grounding and position validation.
//!
//! The terrain mesh itself is out of scope here (procedural-content generation is
//! a non-goal); this crate only needs a stable height query it can ground entities
//! against. Production wiring supplies a sampler backed by the world's heightmap,
//! tests supply a constant or table-driven stub.

/// Queries terrain height at a world `(x, z)` coordinate.
pub trait TerrainHeightSource: Send + Sync {
    /// Returns the terrain height at `(x, z)`, or `None` if the terrain chunk
    /// covering that coordinate has not loaded yet.
    fn height_at(&self, x: f64, z: f64) -> Option<f64>;

    /// True once enough terrain has loaded to ground spawns and movement.
    /// `ConnectionHandler` polls this during the handshake's terrain wait.
    fn is_ready(&self) -> bool {
        true
    }
}

/// A flat plane at a fixed height, for tests and load-test bots.
pub struct FlatTerrain(pub f64);

impl TerrainHeightSource for FlatTerrain {
    fn height_at(&self, _x: f64, _z: f64) -> Option<f64> {
        Some(self.0)
    }
}

/// Height above the raw terrain sample that entities are grounded to, matching
/// the client's visual foot offset.
pub const GROUND_OFFSET: f64 = 0.1;

/// Snaps `y` to `terrain_height + GROUND_OFFSET` when the terrain sampler has
/// an answer, otherwise falls back to `fallback_y`.
pub fn grounded_height(terrain: &dyn TerrainHeightSource, x: f64, z: f64, fallback_y: f64) -> f64 {
    match terrain.height_at(x, z) {
        Some(h) if h.is_finite() => h + GROUND_OFFSET,
        _ => fallback_y,
    }
}
