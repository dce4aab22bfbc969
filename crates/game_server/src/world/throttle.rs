//! Distance-tiered, priority-aware per-pair update rate limiter.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Relative update urgency for a queued entity update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Normal,
    Low,
}

/// One squared-distance tier and its base update interval, in ticks.
#[derive(Debug, Clone, Copy)]
pub struct Tier {
    pub max_dist_sq: f64,
    pub interval_ticks: u64,
}

/// Default tiers: `<=625 -> every tick`, `<=2500 -> every 2`, `<=10000 -> every 4`, `else -> every 8`.
pub fn default_tiers() -> Vec<Tier> {
    vec![
        Tier { max_dist_sq: 625.0, interval_ticks: 1 },
        Tier { max_dist_sq: 2500.0, interval_ticks: 2 },
        Tier { max_dist_sq: 10_000.0, interval_ticks: 4 },
        Tier { max_dist_sq: f64::INFINITY, interval_ticks: 8 },
    ]
}

/// Converts `WorldConfig::throttle_tiers` (squared-distance, interval pairs)
/// into the tier list `UpdateThrottler` consumes.
pub fn tiers_from_config(pairs: &[(f64, u64)]) -> Vec<Tier> {
    pairs.iter().map(|&(max_dist_sq, interval_ticks)| Tier { max_dist_sq, interval_ticks }).collect()
}

#[derive(Debug, Clone, Copy)]
struct ThrottleState {
    last_update_tick: u64,
}

/// Tiered per-(entity, player) rate limiter.
#[derive(Debug)]
pub struct UpdateThrottler {
    tiers: Vec<Tier>,
    current_tick: AtomicU64,
    pairs: DashMap<(String, usize), ThrottleState>,
}

impl UpdateThrottler {
    pub fn new(tiers: Vec<Tier>) -> Arc<Self> {
        Arc::new(Self {
            tiers,
            current_tick: AtomicU64::new(0),
            pairs: DashMap::new(),
        })
    }

    pub fn set_tick(&self, tick: u64) {
        self.current_tick.store(tick, Ordering::Relaxed);
    }

    fn tier_interval(&self, dist_sq: f64) -> u64 {
        self.tiers
            .iter()
            .find(|t| dist_sq <= t.max_dist_sq)
            .map(|t| t.interval_ticks)
            .unwrap_or(8)
    }

    fn effective_interval(&self, dist_sq: f64, priority: Priority) -> u64 {
        let base = self.tier_interval(dist_sq);
        match priority {
            Priority::Critical => 0,
            Priority::High => (base / 2).max(1),
            Priority::Normal => base,
            Priority::Low => base * 2,
        }
    }

    /// Returns true iff an update for `(entity_id, socket_id)` should be sent
    /// this tick. `CRITICAL` always passes without consuming throttle state.
    pub fn should_update(&self, entity_id: &str, socket_id: usize, dist_sq: f64, priority: Priority) -> bool {
        if priority == Priority::Critical {
            return true;
        }

        let current_tick = self.current_tick.load(Ordering::Relaxed);
        let interval = self.effective_interval(dist_sq, priority);
        let key = (entity_id.to_string(), socket_id);

        match self.pairs.get_mut(&key) {
            None => {
                self.pairs.insert(key, ThrottleState { last_update_tick: current_tick });
                true
            }
            Some(mut state) => {
                if current_tick.saturating_sub(state.last_update_tick) >= interval {
                    state.last_update_tick = current_tick;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn remove_pair(&self, entity_id: &str, socket_id: usize) {
        self.pairs.remove(&(entity_id.to_string(), socket_id));
    }

    pub fn remove_player(&self, socket_id: usize) {
        self.pairs.retain(|(_, sid), _| *sid != socket_id);
    }

    pub fn remove_entity(&self, entity_id: &str) {
        self.pairs.retain(|(eid, _), _| eid != entity_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_always_passes() {
        let throttler = UpdateThrottler::new(default_tiers());
        assert!(throttler.should_update("e1", 1, 5625.0, Priority::Normal));
    }

    #[test]
    fn throttled_far_entity_scenario() {
        let throttler = UpdateThrottler::new(default_tiers());
        throttler.set_tick(0);
        assert!(throttler.should_update("e1", 1, 5625.0, Priority::Normal));
        for tick in 1..=3 {
            throttler.set_tick(tick);
            assert!(!throttler.should_update("e1", 1, 5625.0, Priority::Normal));
        }
        throttler.set_tick(4);
        assert!(throttler.should_update("e1", 1, 5625.0, Priority::Normal));
    }

    #[test]
    fn critical_always_bypasses() {
        let throttler = UpdateThrottler::new(default_tiers());
        throttler.set_tick(0);
        assert!(throttler.should_update("e1", 1, 1_000_000.0, Priority::Critical));
        throttler.set_tick(1);
        assert!(throttler.should_update("e1", 1, 1_000_000.0, Priority::Critical));
    }

    #[test]
    fn high_priority_tier_zero_floors_at_one_tick() {
        let throttler = UpdateThrottler::new(default_tiers());
        throttler.set_tick(0);
        assert!(throttler.should_update("e1", 1, 10.0, Priority::High));
        throttler.set_tick(1);
        assert!(throttler.should_update("e1", 1, 10.0, Priority::High));
    }

    #[test]
    fn low_priority_doubles_interval() {
        let throttler = UpdateThrottler::new(default_tiers());
        throttler.set_tick(0);
        assert!(throttler.should_update("e1", 1, 5625.0, Priority::Low));
        for tick in 1..=3 {
            throttler.set_tick(tick);
            assert!(!throttler.should_update("e1", 1, 5625.0, Priority::Low));
        }
        throttler.set_tick(4);
        assert!(!throttler.should_update("e1", 1, 5625.0, Priority::Low));
        throttler.set_tick(8);
        assert!(throttler.should_update("e1", 1, 5625.0, Priority::Low));
    }
}
