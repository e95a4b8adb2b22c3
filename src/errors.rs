//! Error types for the dicehouse settlement engine.
//!
//! Every failure aborts the whole enclosing operation; callers resubmit a
//! corrected call. No variant is ever recovered from by partially applying
//! state.

use uuid::Uuid;

/// Settlement error taxonomy.
///
/// Validation, resource, replay, cryptographic and timing failures map to
/// distinct variants so the API layer can surface distinct status codes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid selection {0}: must be 0 (even) or 1 (odd)")]
    InvalidSelection(u8),

    #[error("invalid stake amount {amount}: allowed range is {min}..={max}")]
    InvalidStakeAmount { amount: u64, min: u64, max: u64 },

    #[error("house cannot match stake: required {required}, available {available}")]
    InsufficientReserve { required: u64, available: u64 },

    #[error("seed {0} has already been used")]
    SeedAlreadyUsed(String),

    #[error("game has already been resolved")]
    AlreadyResolved,

    #[error("game has already been refunded")]
    AlreadyRefunded,

    #[error("VRF proof verification failed: {0}")]
    InvalidProof(String),

    #[error("refund window not yet open: {elapsed_ms}ms elapsed, {required_ms}ms required")]
    TooEarly { elapsed_ms: u64, required_ms: u64 },

    #[error("game {0} not found")]
    GameNotFound(Uuid),

    #[error("insufficient house balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("balance arithmetic overflowed")]
    ArithmeticOverflow,
}

/// Configuration load/validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("missing required field: {0}")]
    MissingRequired(String),

    #[error("invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Convenience alias for settlement results.
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GameError::InvalidStakeAmount {
            amount: 5,
            min: 100,
            max: 10_000,
        };
        assert!(err.to_string().contains("100..=10000"));

        let err = GameError::TooEarly {
            elapsed_ms: 119_999,
            required_ms: 120_000,
        };
        assert!(err.to_string().contains("119999"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "vrf.public_key".to_string(),
            value: "zz".to_string(),
            reason: "not valid hex".to_string(),
        };
        assert!(err.to_string().contains("vrf.public_key"));
    }
}
