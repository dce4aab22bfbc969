//! Error types for the world simulation core.

/// Errors produced by the AOI/throttle/batch/broadcast/movement/trading pipeline.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error("trade error: {0}")]
    Trade(#[from] super::trading::TradeError),

    #[error("encoding error: {0}")]
    Encoding(String),
}

pub type WorldResult<T> = Result<T, WorldError>;
