//! OSRS two-screen P2P trade state machine.
//!
//! Item ownership and existence are validated by the inventory handler layer
//! before it calls into this module — `add_item_to_trade` takes an
//! already-validated `(slot, item_id, quantity)` triple and never re-reads
//! inventory state itself (see the trade/inventory boundary decision).

use dashmap::DashMap;
use horizon_event_system::PlayerId;
use std::sync::Arc;

pub const MAX_TRADE_SLOTS: usize = 28;
pub const REQUEST_COOLDOWN_MS: u64 = 3_000;
pub const REQUEST_TIMEOUT_MS: u64 = 15_000;
pub const ACTIVITY_TIMEOUT_MS: u64 = 120_000;

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum TradeError {
    #[error("cannot trade with yourself")]
    SelfTrade,
    #[error("already_in_trade")]
    AlreadyInTrade,
    #[error("player_busy")]
    PlayerBusy,
    #[error("rate_limited")]
    RateLimited,
    #[error("session not found")]
    NotFound,
    #[error("recipient mismatch")]
    RecipientMismatch,
    #[error("session expired")]
    Expired,
    #[error("invalid trade state for this operation")]
    InvalidState,
    #[error("invalid slot index")]
    InvalidSlot,
    #[error("invalid quantity")]
    InvalidQuantity,
    #[error("INVENTORY_FULL")]
    InventoryFull,
    #[error("not a participant in this session")]
    NotParticipant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Pending,
    Active,
    Confirming,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Declined,
    Timeout,
    Disconnected,
    PlayerDied,
    ServerError,
    Cancelled,
}

impl CancelReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CancelReason::Declined => "declined",
            CancelReason::Timeout => "timeout",
            CancelReason::Disconnected => "disconnected",
            CancelReason::PlayerDied => "player_died",
            CancelReason::ServerError => "server_error",
            CancelReason::Cancelled => "cancelled",
        }
    }
}

/// An item offered into a trade slot.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferedItem {
    pub slot: usize,
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct TradeParticipant {
    pub player_id: PlayerId,
    pub player_name: String,
    pub socket_id: usize,
    pub offered_items: Vec<OfferedItem>,
    pub accepted: bool,
}

impl TradeParticipant {
    fn new(player_id: PlayerId, player_name: String, socket_id: usize) -> Self {
        Self { player_id, player_name, socket_id, offered_items: Vec::new(), accepted: false }
    }

    fn next_free_slot(&self) -> Option<usize> {
        (0..MAX_TRADE_SLOTS).find(|slot| !self.offered_items.iter().any(|i| i.slot == *slot))
    }
}

#[derive(Debug, Clone)]
pub struct TradeSession {
    pub id: String,
    pub status: TradeStatus,
    pub initiator: TradeParticipant,
    pub recipient: TradeParticipant,
    pub created_at_ms: u64,
    pub expires_at_ms: u64,
    pub last_activity_ms: u64,
}

impl TradeSession {
    fn participant_mut(&mut self, player_id: PlayerId) -> Option<&mut TradeParticipant> {
        if self.initiator.player_id == player_id {
            Some(&mut self.initiator)
        } else if self.recipient.player_id == player_id {
            Some(&mut self.recipient)
        } else {
            None
        }
    }

    fn counterpart_mut(&mut self, player_id: PlayerId) -> Option<&mut TradeParticipant> {
        if self.initiator.player_id == player_id {
            Some(&mut self.recipient)
        } else if self.recipient.player_id == player_id {
            Some(&mut self.initiator)
        } else {
            None
        }
    }

    pub fn is_participant(&self, player_id: PlayerId) -> bool {
        self.initiator.player_id == player_id || self.recipient.player_id == player_id
    }
}

/// Returned by `set_acceptance` so the caller knows which follow-up
/// transition (if any) to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptanceOutcome {
    pub move_to_confirming: bool,
    pub both_accepted: bool,
}

/// Emitted when a trade completes, carrying both offers for the atomic
/// inventory swap performed out-of-band by the inventory subsystem.
#[derive(Debug, Clone)]
pub struct TradeCompletion {
    pub session_id: String,
    pub initiator: PlayerId,
    pub recipient: PlayerId,
    /// Items the initiator receives (the recipient's former offer).
    pub initiator_receives: Vec<OfferedItem>,
    /// Items the recipient receives (the initiator's former offer).
    pub recipient_receives: Vec<OfferedItem>,
}

/// Full P2P trade state machine. A player appears in at most one session at
/// a time, tracked via `player_trades`.
pub struct TradingSystem {
    sessions: DashMap<String, TradeSession>,
    player_trades: DashMap<PlayerId, String>,
    cooldowns: DashMap<(PlayerId, PlayerId), u64>,
    next_id: std::sync::atomic::AtomicU64,
}

impl TradingSystem {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: DashMap::new(),
            player_trades: DashMap::new(),
            cooldowns: DashMap::new(),
            next_id: std::sync::atomic::AtomicU64::new(1),
        })
    }

    fn generate_id(&self) -> String {
        let n = self.next_id.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("trade-{n}")
    }

    pub fn create_trade_request(
        &self,
        initiator: PlayerId,
        initiator_name: String,
        initiator_socket: usize,
        recipient: PlayerId,
        recipient_name: String,
        recipient_socket: usize,
        now_ms: u64,
    ) -> Result<String, TradeError> {
        if initiator == recipient {
            return Err(TradeError::SelfTrade);
        }
        if self.player_trades.contains_key(&initiator) {
            return Err(TradeError::AlreadyInTrade);
        }
        if self.player_trades.contains_key(&recipient) {
            return Err(TradeError::PlayerBusy);
        }

        let cooldown_key = (initiator, recipient);
        if let Some(last) = self.cooldowns.get(&cooldown_key) {
            if now_ms.saturating_sub(*last) < REQUEST_COOLDOWN_MS {
                return Err(TradeError::RateLimited);
            }
        }
        self.cooldowns.insert(cooldown_key, now_ms);

        let id = self.generate_id();
        let session = TradeSession {
            id: id.clone(),
            status: TradeStatus::Pending,
            initiator: TradeParticipant::new(initiator, initiator_name, initiator_socket),
            recipient: TradeParticipant::new(recipient, recipient_name, recipient_socket),
            created_at_ms: now_ms,
            expires_at_ms: now_ms + REQUEST_TIMEOUT_MS,
            last_activity_ms: now_ms,
        };

        self.sessions.insert(id.clone(), session);
        self.player_trades.insert(initiator, id.clone());
        self.player_trades.insert(recipient, id.clone());
        Ok(id)
    }

    pub fn respond_to_trade_request(
        &self,
        session_id: &str,
        recipient: PlayerId,
        accept: bool,
        now_ms: u64,
    ) -> Result<(), TradeError> {
        let mut session = self.sessions.get_mut(session_id).ok_or(TradeError::NotFound)?;
        if session.status != TradeStatus::Pending {
            return Err(TradeError::InvalidState);
        }
        if session.recipient.player_id != recipient {
            return Err(TradeError::RecipientMismatch);
        }
        if now_ms > session.expires_at_ms {
            return Err(TradeError::Expired);
        }

        if !accept {
            drop(session);
            self.cancel(session_id, CancelReason::Declined);
            return Ok(());
        }

        session.status = TradeStatus::Active;
        session.expires_at_ms = now_ms + ACTIVITY_TIMEOUT_MS;
        session.last_activity_ms = now_ms;
        Ok(())
    }

    pub fn add_item_to_trade(
        &self,
        session_id: &str,
        player_id: PlayerId,
        item_id: String,
        quantity: u32,
        now_ms: u64,
    ) -> Result<usize, TradeError> {
        if quantity == 0 {
            return Err(TradeError::InvalidQuantity);
        }
        let mut session = self.sessions.get_mut(session_id).ok_or(TradeError::NotFound)?;
        if session.status != TradeStatus::Active {
            return Err(TradeError::InvalidState);
        }
        let participant = session.participant_mut(player_id).ok_or(TradeError::NotParticipant)?;
        let slot = participant.next_free_slot().ok_or(TradeError::InventoryFull)?;
        participant.offered_items.push(OfferedItem { slot, item_id, quantity });

        session.initiator.accepted = false;
        session.recipient.accepted = false;
        session.expires_at_ms = now_ms + ACTIVITY_TIMEOUT_MS;
        session.last_activity_ms = now_ms;
        Ok(slot)
    }

    pub fn remove_item_from_trade(
        &self,
        session_id: &str,
        player_id: PlayerId,
        slot: usize,
        now_ms: u64,
    ) -> Result<(), TradeError> {
        if slot >= MAX_TRADE_SLOTS {
            return Err(TradeError::InvalidSlot);
        }
        let mut session = self.sessions.get_mut(session_id).ok_or(TradeError::NotFound)?;
        if session.status != TradeStatus::Active {
            return Err(TradeError::InvalidState);
        }
        let participant = session.participant_mut(player_id).ok_or(TradeError::NotParticipant)?;
        let before = participant.offered_items.len();
        participant.offered_items.retain(|i| i.slot != slot);
        if participant.offered_items.len() == before {
            return Err(TradeError::InvalidSlot);
        }

        session.initiator.accepted = false;
        session.recipient.accepted = false;
        session.expires_at_ms = now_ms + ACTIVITY_TIMEOUT_MS;
        session.last_activity_ms = now_ms;
        Ok(())
    }

    /// Sets one participant's acceptance flag, valid in `active` or
    /// `confirming`. The caller is responsible for invoking
    /// `move_to_confirmation` / `complete_trade` based on the outcome.
    pub fn set_acceptance(
        &self,
        session_id: &str,
        player_id: PlayerId,
        accept: bool,
        now_ms: u64,
    ) -> Result<AcceptanceOutcome, TradeError> {
        let mut session = self.sessions.get_mut(session_id).ok_or(TradeError::NotFound)?;
        if !matches!(session.status, TradeStatus::Active | TradeStatus::Confirming) {
            return Err(TradeError::InvalidState);
        }
        let participant = session.participant_mut(player_id).ok_or(TradeError::NotParticipant)?;
        participant.accepted = accept;
        session.last_activity_ms = now_ms;

        let both = session.initiator.accepted && session.recipient.accepted;
        Ok(AcceptanceOutcome {
            move_to_confirming: both && session.status == TradeStatus::Active,
            both_accepted: both && session.status == TradeStatus::Confirming,
        })
    }

    /// Transitions `active -> confirming`, resetting both acceptance flags so
    /// the confirmation screen requires a fresh, explicit accept.
    pub fn move_to_confirmation(&self, session_id: &str, now_ms: u64) -> Result<(), TradeError> {
        let mut session = self.sessions.get_mut(session_id).ok_or(TradeError::NotFound)?;
        if session.status != TradeStatus::Active {
            return Err(TradeError::InvalidState);
        }
        session.status = TradeStatus::Confirming;
        session.initiator.accepted = false;
        session.recipient.accepted = false;
        session.expires_at_ms = now_ms + ACTIVITY_TIMEOUT_MS;
        session.last_activity_ms = now_ms;
        Ok(())
    }

    /// Completes a `confirming` session with both accepted, emitting the
    /// item transfer description and cleaning up bookkeeping.
    pub fn complete_trade(&self, session_id: &str) -> Result<TradeCompletion, TradeError> {
        let mut session = self.sessions.get_mut(session_id).ok_or(TradeError::NotFound)?;
        if session.status != TradeStatus::Confirming {
            return Err(TradeError::InvalidState);
        }
        if !(session.initiator.accepted && session.recipient.accepted) {
            return Err(TradeError::InvalidState);
        }

        session.status = TradeStatus::Completed;
        let completion = TradeCompletion {
            session_id: session.id.clone(),
            initiator: session.initiator.player_id,
            recipient: session.recipient.player_id,
            initiator_receives: session.recipient.offered_items.clone(),
            recipient_receives: session.initiator.offered_items.clone(),
        };
        let initiator = session.initiator.player_id;
        let recipient = session.recipient.player_id;
        drop(session);

        self.player_trades.remove(&initiator);
        self.player_trades.remove(&recipient);
        Ok(completion)
    }

    /// Cancels a session regardless of its current (non-terminal) state.
    pub fn cancel(&self, session_id: &str, reason: CancelReason) -> Option<(PlayerId, PlayerId)> {
        let mut session = self.sessions.get_mut(session_id)?;
        if matches!(session.status, TradeStatus::Completed | TradeStatus::Cancelled) {
            return None;
        }
        session.status = TradeStatus::Cancelled;
        let initiator = session.initiator.player_id;
        let recipient = session.recipient.player_id;
        drop(session);
        drop(reason);

        self.player_trades.remove(&initiator);
        self.player_trades.remove(&recipient);
        Some((initiator, recipient))
    }

    /// Cancels whatever session the given player owns, if any (disconnect or death hook).
    pub fn cancel_for_player(&self, player_id: PlayerId, reason: CancelReason) -> Option<(String, PlayerId, PlayerId)> {
        let session_id = self.player_trades.get(&player_id)?.clone();
        let (a, b) = self.cancel(&session_id, reason)?;
        Some((session_id, a, b))
    }

    /// Janitor sweep: cancels sessions past their expiry. `pending` sessions
    /// time out with `timeout`; active/confirming sessions that go quiet
    /// time out with `cancelled`.
    pub fn cleanup_expired(&self, now_ms: u64) -> Vec<(String, PlayerId, PlayerId, CancelReason)> {
        let expired: Vec<(String, TradeStatus)> = self
            .sessions
            .iter()
            .filter(|s| now_ms > s.expires_at_ms && !matches!(s.status, TradeStatus::Completed | TradeStatus::Cancelled))
            .map(|s| (s.id.clone(), s.status))
            .collect();

        let mut out = Vec::new();
        for (id, status) in expired {
            let reason = if status == TradeStatus::Pending { CancelReason::Timeout } else { CancelReason::Cancelled };
            if let Some((a, b)) = self.cancel(&id, reason) {
                out.push((id, a, b, reason));
            }
        }
        out
    }

    pub fn session(&self, session_id: &str) -> Option<TradeSession> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    pub fn session_for_player(&self, player_id: PlayerId) -> Option<String> {
        self.player_trades.get(&player_id).map(|id| id.clone())
    }
}

impl Default for AcceptanceOutcome {
    fn default() -> Self {
        Self { move_to_confirming: false, both_accepted: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_players() -> (PlayerId, PlayerId) {
        (PlayerId::new(), PlayerId::new())
    }

    #[test]
    fn self_trade_is_rejected() {
        let trading = TradingSystem::new();
        let (a, _) = two_players();
        let err = trading
            .create_trade_request(a, "A".into(), 1, a, "A".into(), 1, 0)
            .unwrap_err();
        assert_eq!(err, TradeError::SelfTrade);
    }

    #[test]
    fn player_appears_in_at_most_one_session() {
        let trading = TradingSystem::new();
        let (a, b) = two_players();
        let c = PlayerId::new();
        trading.create_trade_request(a, "A".into(), 1, b, "B".into(), 2, 0).unwrap();

        let err = trading.create_trade_request(a, "A".into(), 1, c, "C".into(), 3, 0).unwrap_err();
        assert_eq!(err, TradeError::AlreadyInTrade);

        let err = trading.create_trade_request(c, "C".into(), 3, b, "B".into(), 2, 0).unwrap_err();
        assert_eq!(err, TradeError::PlayerBusy);
    }

    #[test]
    fn rate_limited_within_cooldown() {
        let trading = TradingSystem::new();
        let (a, b) = two_players();
        let id = trading.create_trade_request(a, "A".into(), 1, b, "B".into(), 2, 0).unwrap();
        trading.cancel(&id, CancelReason::Cancelled);

        let err = trading
            .create_trade_request(a, "A".into(), 1, b, "B".into(), 2, 100)
            .unwrap_err();
        assert_eq!(err, TradeError::RateLimited);
    }

    #[test]
    fn full_trade_completion_scenario() {
        let trading = TradingSystem::new();
        let (a, b) = two_players();
        let id = trading.create_trade_request(a, "A".into(), 1, b, "B".into(), 2, 0).unwrap();
        trading.respond_to_trade_request(&id, b, true, 0).unwrap();

        let slot_a = trading.add_item_to_trade(&id, a, "sword".into(), 1, 0).unwrap();
        assert_eq!(slot_a, 0);
        let slot_b = trading.add_item_to_trade(&id, b, "gold".into(), 500, 0).unwrap();
        assert_eq!(slot_b, 0);

        let outcome = trading.set_acceptance(&id, a, true, 0).unwrap();
        assert!(!outcome.move_to_confirming);
        let outcome = trading.set_acceptance(&id, b, true, 0).unwrap();
        assert!(outcome.move_to_confirming);

        trading.move_to_confirmation(&id, 0).unwrap();
        let outcome = trading.set_acceptance(&id, a, true, 0).unwrap();
        assert!(!outcome.both_accepted);
        let outcome = trading.set_acceptance(&id, b, true, 0).unwrap();
        assert!(outcome.both_accepted);

        let completion = trading.complete_trade(&id).unwrap();
        assert_eq!(completion.initiator_receives[0].item_id, "gold");
        assert_eq!(completion.recipient_receives[0].item_id, "sword");
        assert!(trading.session_for_player(a).is_none());
        assert!(trading.session_for_player(b).is_none());
    }

    #[test]
    fn offer_mutation_resets_both_accepted_flags() {
        let trading = TradingSystem::new();
        let (a, b) = two_players();
        let id = trading.create_trade_request(a, "A".into(), 1, b, "B".into(), 2, 0).unwrap();
        trading.respond_to_trade_request(&id, b, true, 0).unwrap();
        trading.set_acceptance(&id, a, true, 0).unwrap();
        trading.add_item_to_trade(&id, b, "gold".into(), 1, 0).unwrap();

        let session = trading.session(&id).unwrap();
        assert!(!session.initiator.accepted);
        assert!(!session.recipient.accepted);
    }

    #[test]
    fn trade_offer_full_rejects_29th_item() {
        let trading = TradingSystem::new();
        let (a, b) = two_players();
        let id = trading.create_trade_request(a, "A".into(), 1, b, "B".into(), 2, 0).unwrap();
        trading.respond_to_trade_request(&id, b, true, 0).unwrap();

        for i in 0..MAX_TRADE_SLOTS {
            trading.add_item_to_trade(&id, a, format!("item{i}"), 1, 0).unwrap();
        }
        let err = trading.add_item_to_trade(&id, a, "one_too_many".into(), 1, 0).unwrap_err();
        assert_eq!(err, TradeError::InventoryFull);
    }

    #[test]
    fn pending_sessions_expire_with_timeout_reason() {
        let trading = TradingSystem::new();
        let (a, b) = two_players();
        trading.create_trade_request(a, "A".into(), 1, b, "B".into(), 2, 0).unwrap();

        let expired = trading.cleanup_expired(REQUEST_TIMEOUT_MS + 1);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].3, CancelReason::Timeout);
        assert!(trading.session_for_player(a).is_none());
    }

    #[test]
    fn disconnect_cancels_owned_session() {
        let trading = TradingSystem::new();
        let (a, b) = two_players();
        let id = trading.create_trade_request(a, "A".into(), 1, b, "B".into(), 2, 0).unwrap();
        let (cancelled_id, _, _) = trading.cancel_for_player(a, CancelReason::Disconnected).unwrap();
        assert_eq!(cancelled_id, id);
        assert!(trading.session_for_player(b).is_none());
    }
}
