//! Per-subscriber coalescing codec for `compressedUpdate` frames.

use super::entities::{MotionState, Quaternion, WorldPosition};
use super::wire::entity_hash;
use std::collections::HashMap;

/// Bitset of which optional fields a queued record carries.
pub mod flags {
    pub const POSITION: u8 = 1 << 0;
    pub const ROTATION: u8 = 1 << 1;
    pub const HEALTH: u8 = 1 << 2;
    pub const STATE: u8 = 1 << 3;
    pub const VELOCITY: u8 = 1 << 4;
}

/// Maximum number of distinct entity records emitted per `flush()`. Entities
/// queued beyond this bound remain queued for the next flush.
pub const MAX_UPDATES_PER_BATCH: usize = 256;

/// Millimeter fixed-point scale used to pack position components into `i32`.
const POSITION_SCALE: f64 = 1000.0;
/// Fixed-point scale for quaternion components packed into `i16`.
const ROTATION_SCALE: f64 = i16::MAX as f64;

#[derive(Debug, Clone, Default)]
struct PendingRecord {
    flags: u8,
    position: Option<WorldPosition>,
    rotation: Option<Quaternion>,
    velocity: Option<(f64, f64)>,
    health: Option<(u16, u16)>,
    state: Option<MotionState>,
}

/// Per-session binary frame accumulator. One instance lives per connected
/// subscriber and is drained once per tick by `OptimizedBroadcaster::flush`.
#[derive(Debug, Default)]
pub struct BatchUpdater {
    pending: HashMap<String, PendingRecord>,
}

impl BatchUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_position_update(&mut self, entity_id: &str, position: WorldPosition) {
        let record = self.pending.entry(entity_id.to_string()).or_default();
        record.flags |= flags::POSITION;
        record.position = Some(position);
    }

    pub fn queue_rotation_update(&mut self, entity_id: &str, rotation: Quaternion) {
        let record = self.pending.entry(entity_id.to_string()).or_default();
        record.flags |= flags::ROTATION;
        record.rotation = Some(rotation);
    }

    pub fn queue_velocity_update(&mut self, entity_id: &str, vx: f64, vz: f64) {
        let record = self.pending.entry(entity_id.to_string()).or_default();
        record.flags |= flags::VELOCITY;
        record.velocity = Some((vx, vz));
    }

    pub fn queue_transform_update(&mut self, entity_id: &str, position: WorldPosition, rotation: Quaternion) {
        self.queue_position_update(entity_id, position);
        self.queue_rotation_update(entity_id, rotation);
    }

    pub fn queue_health_update(&mut self, entity_id: &str, current: u16, max: u16) {
        let record = self.pending.entry(entity_id.to_string()).or_default();
        record.flags |= flags::HEALTH;
        record.health = Some((current, max));
    }

    pub fn queue_state_update(&mut self, entity_id: &str, state: MotionState) {
        let record = self.pending.entry(entity_id.to_string()).or_default();
        record.flags |= flags::STATE;
        record.state = Some(state);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Produces one framed payload and clears the queue. Entities beyond
    /// `MAX_UPDATES_PER_BATCH` are left queued for the next flush.
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            return None;
        }

        let mut ids: Vec<String> = self.pending.keys().cloned().collect();
        ids.sort_unstable();
        let (emit_ids, deferred_ids) = ids.split_at(ids.len().min(MAX_UPDATES_PER_BATCH));

        let mut buf = Vec::with_capacity(2 + emit_ids.len() * 16);
        buf.extend_from_slice(&(emit_ids.len() as u16).to_le_bytes());

        for id in emit_ids {
            let record = self.pending.remove(id).expect("id came from pending keys");
            buf.extend_from_slice(&entity_hash(id).to_le_bytes());
            buf.push(record.flags);

            if let Some(p) = record.position {
                buf.extend_from_slice(&((p.x * POSITION_SCALE) as i32).to_le_bytes());
                buf.extend_from_slice(&((p.y * POSITION_SCALE) as i32).to_le_bytes());
                buf.extend_from_slice(&((p.z * POSITION_SCALE) as i32).to_le_bytes());
            }
            if let Some(q) = record.rotation {
                buf.extend_from_slice(&((q.x * ROTATION_SCALE) as i16).to_le_bytes());
                buf.extend_from_slice(&((q.y * ROTATION_SCALE) as i16).to_le_bytes());
                buf.extend_from_slice(&((q.z * ROTATION_SCALE) as i16).to_le_bytes());
                buf.extend_from_slice(&((q.w * ROTATION_SCALE) as i16).to_le_bytes());
            }
            if let Some((vx, vz)) = record.velocity {
                buf.extend_from_slice(&((vx * POSITION_SCALE) as i32).to_le_bytes());
                buf.extend_from_slice(&((vz * POSITION_SCALE) as i32).to_le_bytes());
            }
            if let Some((current, max)) = record.health {
                buf.extend_from_slice(&current.to_le_bytes());
                buf.extend_from_slice(&max.to_le_bytes());
            }
            if let Some(state) = record.state {
                let tag: u8 = match state {
                    MotionState::Idle => 0,
                    MotionState::Walk => 1,
                    MotionState::Run => 2,
                };
                buf.push(tag);
            }
        }

        if !deferred_ids.is_empty() {
            // leave the remainder queued for the next flush; nothing to do,
            // they were never removed from `self.pending`.
        }

        Some(buf)
    }
}

/// Decodes one `compressedUpdate` frame back into `(entity_hash, flags, fields)`
/// tuples. Used by tests to check the round-trip property of `flush`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub entity_hash: u32,
    pub flags: u8,
    pub position: Option<(i32, i32, i32)>,
    pub rotation: Option<(i16, i16, i16, i16)>,
    pub velocity: Option<(i32, i32)>,
    pub health: Option<(u16, u16)>,
    pub state: Option<u8>,
}

pub fn decode_batch_frame(mut bytes: &[u8]) -> Option<Vec<DecodedRecord>> {
    if bytes.len() < 2 {
        return None;
    }
    let count = u16::from_le_bytes(bytes[0..2].try_into().ok()?) as usize;
    bytes = &bytes[2..];
    let mut out = Vec::with_capacity(count);

    for _ in 0..count {
        if bytes.len() < 5 {
            return None;
        }
        let entity_hash = u32::from_le_bytes(bytes[0..4].try_into().ok()?);
        let record_flags = bytes[4];
        bytes = &bytes[5..];

        let position = if record_flags & flags::POSITION != 0 {
            if bytes.len() < 12 {
                return None;
            }
            let x = i32::from_le_bytes(bytes[0..4].try_into().ok()?);
            let y = i32::from_le_bytes(bytes[4..8].try_into().ok()?);
            let z = i32::from_le_bytes(bytes[8..12].try_into().ok()?);
            bytes = &bytes[12..];
            Some((x, y, z))
        } else {
            None
        };

        let rotation = if record_flags & flags::ROTATION != 0 {
            if bytes.len() < 8 {
                return None;
            }
            let x = i16::from_le_bytes(bytes[0..2].try_into().ok()?);
            let y = i16::from_le_bytes(bytes[2..4].try_into().ok()?);
            let z = i16::from_le_bytes(bytes[4..6].try_into().ok()?);
            let w = i16::from_le_bytes(bytes[6..8].try_into().ok()?);
            bytes = &bytes[8..];
            Some((x, y, z, w))
        } else {
            None
        };

        let velocity = if record_flags & flags::VELOCITY != 0 {
            if bytes.len() < 8 {
                return None;
            }
            let vx = i32::from_le_bytes(bytes[0..4].try_into().ok()?);
            let vz = i32::from_le_bytes(bytes[4..8].try_into().ok()?);
            bytes = &bytes[8..];
            Some((vx, vz))
        } else {
            None
        };

        let health = if record_flags & flags::HEALTH != 0 {
            if bytes.len() < 4 {
                return None;
            }
            let current = u16::from_le_bytes(bytes[0..2].try_into().ok()?);
            let max = u16::from_le_bytes(bytes[2..4].try_into().ok()?);
            bytes = &bytes[4..];
            Some((current, max))
        } else {
            None
        };

        let state = if record_flags & flags::STATE != 0 {
            if bytes.is_empty() {
                return None;
            }
            let s = bytes[0];
            bytes = &bytes[1..];
            Some(s)
        } else {
            None
        };

        out.push(DecodedRecord { entity_hash, flags: record_flags, position, rotation, velocity, health, state });
    }

    Some(out)
}
