//! Error taxonomy surfaced by the signing core.
//!
//! Every fallible operation in this crate returns [`Error`] rather than an
//! erased `anyhow::Error`: callers at the system boundary translate these
//! into exit codes (usage, auth, network) and need the precise kind, not a
//! formatted message.

use thiserror::Error;

/// The error kinds the signing core can surface.
///
/// Nothing in this crate retries internally; every error propagates
/// synchronously to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed decimal string, non-hex private key, or an oversized scale.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Encoder output would exceed the caller-provided buffer.
    #[error("buffer overflow: needed at least {needed} bytes, capacity was {capacity}")]
    BufferOverflow {
        /// Minimum capacity that would have been required to finish encoding.
        needed: usize,
        /// Capacity of the buffer that was actually provided.
        capacity: usize,
    },

    /// Private key is 0 or ≥ n, ephemeral `R` has zero x, `s` computed as
    /// zero, or generator multiplication yielded the point at infinity.
    #[error("operation would yield the identity element or an invalid scalar")]
    IdentityElement,

    /// A scalar failed the canonical range check during recovery.
    #[error("non-canonical scalar encountered during recovery")]
    NonCanonical,

    /// The message hash reduces to 0 during recovery.
    #[error("message hash reduces to zero")]
    InvalidMessageHash,

    /// Malformed public key bytes encountered during recovery.
    #[error("failed to decode a curve point")]
    CurveDecodeFailure,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
