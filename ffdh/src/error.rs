//! Error types

use core::fmt;

/// Result type with the `ffdh` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Diffie-Hellman key exchange errors.
///
/// Every error is terminal for the exchange attempt it was raised in: nothing
/// is retried internally and no secret is observable afterwards.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested key size or the supplied domain parameters can't be used
    /// to generate a keypair.
    #[error("DH key generation failed: {0}")]
    KeyGeneration(String),

    /// The encoded public key is not a valid DH SubjectPublicKeyInfo.
    #[error("DH public key decoding failed: {0}")]
    Decoding(#[from] spki::Error),

    /// The peer's public key belongs to a different DH group than ours.
    #[error("peer public key uses different DH domain parameters")]
    ParameterMismatch,

    /// An operation was invoked out of protocol order.
    #[error("`{operation}` is not allowed in agreement state {state}")]
    AgreementState {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the participant was in.
        state: State,
    },

    /// The agreement produced a trivial value (`0`, `1` or `p - 1`).
    #[error("key agreement produced a degenerate shared secret")]
    DegenerateSecret,
}

/// Agreement state of a [`Participant`][`crate::Participant`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum State {
    /// No keypair has been generated yet.
    Uninitialized,

    /// A keypair is bound and the phase has not run.
    Initialized,

    /// The phase completed; the shared secret can be extracted.
    PhaseComplete,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Uninitialized => "uninitialized",
            State::Initialized => "initialized",
            State::PhaseComplete => "phase-complete",
        })
    }
}
