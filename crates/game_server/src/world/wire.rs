//! Wire framing helpers shared by the batch codec and the outbound dispatch path.
//!
//! Outgoing server->client traffic is either a JSON-tagged text packet or the
//! single binary `compressedUpdate` frame. Both travel over the same
//! `ConnectionManager` broadcast channel (`Vec<u8>`), so a one-byte kind tag
//! is prepended here and stripped by the connection handler's outgoing task.

use serde::Serialize;

/// Tag byte prepended to every queued outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    Text = 0,
    Binary = 1,
}

/// Encodes a named JSON packet as `{ "type": name, ...payload }`, tagged for
/// delivery as a WebSocket text frame.
pub fn encode_text_packet<T: Serialize>(name: &str, payload: &T) -> Vec<u8> {
    let mut value = serde_json::to_value(payload).unwrap_or(serde_json::Value::Null);
    if let serde_json::Value::Object(ref mut map) = value {
        map.insert("type".to_string(), serde_json::Value::String(name.to_string()));
    } else {
        value = serde_json::json!({ "type": name, "payload": value });
    }
    let mut out = vec![FrameKind::Text as u8];
    out.extend_from_slice(&serde_json::to_vec(&value).unwrap_or_default());
    out
}

/// Tags an already-serialized text payload (e.g. a plugin's own JSON
/// response) for delivery as a WebSocket text frame, without re-shaping it
/// the way `encode_text_packet` does for a typed payload.
pub fn tag_text_frame(payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(FrameKind::Text as u8);
    out.extend_from_slice(&payload);
    out
}

/// Tags a pre-encoded binary frame (the `compressedUpdate` batch payload) for
/// delivery as a WebSocket binary frame.
pub fn encode_binary_frame(payload: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(FrameKind::Binary as u8);
    out.extend_from_slice(&payload);
    out
}

/// Splits a tagged outbound message back into its kind and raw payload.
pub fn decode_frame(tagged: &[u8]) -> Option<(FrameKind, &[u8])> {
    let (tag, rest) = tagged.split_first()?;
    let kind = match *tag {
        0 => FrameKind::Text,
        1 => FrameKind::Binary,
        _ => return None,
    };
    Some((kind, rest))
}

/// 32-bit FNV-1a hash of an entity id, used to compress ids in the batch frame.
pub fn entity_hash(id: &str) -> u32 {
    const FNV_OFFSET: u32 = 0x811c9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;
    let mut hash = FNV_OFFSET;
    for byte in id.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_packet_round_trips_through_json() {
        let bytes = encode_text_packet("kick", &serde_json::json!({ "reason": "player_limit" }));
        let (kind, payload) = decode_frame(&bytes).unwrap();
        assert_eq!(kind, FrameKind::Text);
        let value: serde_json::Value = serde_json::from_slice(payload).unwrap();
        assert_eq!(value["type"], "kick");
        assert_eq!(value["reason"], "player_limit");
    }

    #[test]
    fn binary_frame_is_tagged_and_stripped() {
        let bytes = encode_binary_frame(vec![1, 2, 3]);
        let (kind, payload) = decode_frame(&bytes).unwrap();
        assert_eq!(kind, FrameKind::Binary);
        assert_eq!(payload, &[1, 2, 3]);
    }

    #[test]
    fn entity_hash_is_deterministic() {
        assert_eq!(entity_hash("char-1"), entity_hash("char-1"));
        assert_ne!(entity_hash("char-1"), entity_hash("char-2"));
    }
}
