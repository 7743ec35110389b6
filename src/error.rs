//! Error types for the certification ceremony core.

use thiserror::Error;

use crate::engine::EngineError;

/// Ceremony error
///
/// Every failure a ceremony can surface maps to exactly one variant, so
/// callers can attribute a failed run to the step that broke.
#[derive(Debug, Error)]
pub enum CeremonyError {
    /// Engine context or keyring home binding failed
    #[error("engine initialization failed")]
    EngineInit(#[source] EngineError),

    /// Default keyring unreadable or a secret key import was rejected
    #[error("secret key seeding failed")]
    Seed(#[source] EngineError),

    /// Malformed fingerprint, rejected before any lookup or engine call
    #[error("invalid fingerprint {0:?}")]
    InvalidFingerprint(String),

    /// Key material rejected by the engine
    #[error("key import failed")]
    Import(#[source] EngineError),

    /// No usable secret key, or the engine rejected the certification
    #[error("identity certification failed: {reason}")]
    Signing {
        reason: String,
        #[source]
        source: Option<EngineError>,
    },
}

impl CeremonyError {
    pub(crate) fn signing(reason: impl Into<String>) -> Self {
        CeremonyError::Signing {
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn signing_engine(reason: impl Into<String>, source: EngineError) -> Self {
        CeremonyError::Signing {
            reason: reason.into(),
            source: Some(source),
        }
    }
}

/// Result type for ceremony operations
pub type Result<T> = std::result::Result<T, CeremonyError>;
