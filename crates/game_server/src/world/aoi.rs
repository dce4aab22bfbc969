//! Uniform-grid Area-of-Interest spatial index.
//!
//! Mirrors the async `RwLock<HashMap>` manager shape used elsewhere in this
//! codebase for spatial bookkeeping, but keyed on integer grid cells instead
//! of an R-tree: `shouldUpdate`-style lookups here are O(1) per cell rather
//! than O(log n) per query, which is the right tradeoff for a fixed-size
//! view window around every player.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// `(cx, cz)` grid cell key.
pub type CellKey = (i64, i64);

/// Cell key for a coordinate pair, using floor semantics so negative
/// coordinates land in the expected cell (`-25 / 50 -> -1`, not `0`).
pub fn cell_key(x: f64, z: f64, cell_size: f64) -> CellKey {
    ((x / cell_size).floor() as i64, (z / cell_size).floor() as i64)
}

/// The set of cells entered and exited when a player's subscription window moves.
#[derive(Debug, Default, Clone)]
pub struct SubscriptionDelta {
    pub entered: Vec<CellKey>,
    pub exited: Vec<CellKey>,
}

#[derive(Debug, Default)]
struct AOIState {
    /// Entity id -> cell it currently occupies.
    entity_cell: HashMap<String, CellKey>,
    /// Cell -> entity ids located there.
    cell_entities: HashMap<CellKey, HashSet<String>>,
    /// Player socket id -> cell its window is centered on.
    player_cell: HashMap<usize, CellKey>,
    /// Player socket id -> set of cells currently subscribed to.
    player_window: HashMap<usize, HashSet<CellKey>>,
    /// Cell -> subscriber socket ids (inverse of `player_window`).
    cell_subscribers: HashMap<CellKey, HashSet<usize>>,
}

/// O(1) spatial lookup of "who should see entity E" and "what should player P see".
#[derive(Debug)]
pub struct AOIManager {
    cell_size: f64,
    view_distance: i64,
    state: RwLock<AOIState>,
}

impl AOIManager {
    pub fn new(cell_size: f64, view_distance: i64) -> Arc<Self> {
        Arc::new(Self {
            cell_size,
            view_distance,
            state: RwLock::new(AOIState::default()),
        })
    }

    fn window_around(&self, center: CellKey) -> HashSet<CellKey> {
        let k = self.view_distance;
        let mut cells = HashSet::with_capacity(((2 * k + 1) * (2 * k + 1)) as usize);
        for dx in -k..=k {
            for dz in -k..=k {
                cells.insert((center.0 + dx, center.1 + dz));
            }
        }
        cells
    }

    /// Inserts or moves an entity to the cell containing `(x, z)`. Returns
    /// true iff the entity's cell changed (or it was not tracked before).
    pub async fn update_entity_position(&self, id: &str, x: f64, z: f64) -> bool {
        let new_cell = cell_key(x, z, self.cell_size);
        let mut state = self.state.write().await;
        let prev_cell = state.entity_cell.get(id).copied();
        if prev_cell == Some(new_cell) {
            return false;
        }
        if let Some(old_cell) = prev_cell {
            if let Some(set) = state.cell_entities.get_mut(&old_cell) {
                set.remove(id);
                if set.is_empty() {
                    state.cell_entities.remove(&old_cell);
                }
            }
        }
        state.cell_entities.entry(new_cell).or_default().insert(id.to_string());
        state.entity_cell.insert(id.to_string(), new_cell);
        true
    }

    /// Recomputes a player's subscription window around `(x, z)` and returns
    /// the cells entered and exited relative to its previous window. The
    /// window is only recomputed when the player's own cell changes.
    pub async fn update_player_subscriptions(&self, socket_id: usize, x: f64, z: f64) -> SubscriptionDelta {
        let new_center = cell_key(x, z, self.cell_size);
        let mut state = self.state.write().await;

        if state.player_cell.get(&socket_id) == Some(&new_center) {
            return SubscriptionDelta::default();
        }
        state.player_cell.insert(socket_id, new_center);

        let new_window = self.window_around(new_center);
        let old_window = state.player_window.remove(&socket_id).unwrap_or_default();

        let entered: Vec<CellKey> = new_window.difference(&old_window).copied().collect();
        let exited: Vec<CellKey> = old_window.difference(&new_window).copied().collect();

        for cell in &exited {
            if let Some(subs) = state.cell_subscribers.get_mut(cell) {
                subs.remove(&socket_id);
                if subs.is_empty() {
                    state.cell_subscribers.remove(cell);
                }
            }
        }
        for cell in &entered {
            state.cell_subscribers.entry(*cell).or_default().insert(socket_id);
        }

        state.player_window.insert(socket_id, new_window);

        SubscriptionDelta { entered, exited }
    }

    /// Union of players subscribed to the entity's current cell.
    pub async fn subscribers_for_entity(&self, id: &str) -> HashSet<usize> {
        let state = self.state.read().await;
        match state.entity_cell.get(id) {
            Some(cell) => state.cell_subscribers.get(cell).cloned().unwrap_or_default(),
            None => HashSet::new(),
        }
    }

    /// Union of entities in the player's subscribed cells.
    pub async fn visible_entities(&self, socket_id: usize) -> HashSet<String> {
        let state = self.state.read().await;
        let Some(window) = state.player_window.get(&socket_id) else {
            return HashSet::new();
        };
        let mut out = HashSet::new();
        for cell in window {
            if let Some(ids) = state.cell_entities.get(cell) {
                out.extend(ids.iter().cloned());
            }
        }
        out
    }

    pub async fn remove_player(&self, socket_id: usize) {
        let mut state = self.state.write().await;
        if let Some(window) = state.player_window.remove(&socket_id) {
            for cell in window {
                if let Some(subs) = state.cell_subscribers.get_mut(&cell) {
                    subs.remove(&socket_id);
                    if subs.is_empty() {
                        state.cell_subscribers.remove(&cell);
                    }
                }
            }
        }
        state.player_cell.remove(&socket_id);
    }

    pub async fn remove_entity(&self, id: &str) {
        let mut state = self.state.write().await;
        if let Some(cell) = state.entity_cell.remove(id) {
            if let Some(set) = state.cell_entities.get_mut(&cell) {
                set.remove(id);
                if set.is_empty() {
                    state.cell_entities.remove(&cell);
                }
            }
        }
    }

    pub async fn clear(&self) {
        *self.state.write().await = AOIState::default();
    }
}
