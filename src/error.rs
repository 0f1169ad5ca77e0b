//! Error types for ticket issuance, verification and redemption.

use thiserror::Error;

/// Result type alias for gatepass operations.
pub type Result<T> = std::result::Result<T, GatepassError>;

/// Error taxonomy for the ticket protocol and its grant adapter.
///
/// Codec-level detail (base32 failure, AEAD authentication failure,
/// payload parse failure) is deliberately collapsed into
/// [`GatepassError::InvalidTicket`] before it crosses the verification
/// seam, so cryptographic failure modes never leak to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatepassError {
    // ═══════════════════════════════════════════════════════════
    // Ticket Errors
    // ═══════════════════════════════════════════════════════════
    /// Ticket is malformed, corrupted or tampered with.
    #[error("Invalid ticket")]
    InvalidTicket,

    /// Ticket was valid but its expiry timestamp has passed.
    #[error("Ticket has expired")]
    ExpiredTicket,

    /// Ticket was issued for an empty email address.
    #[error("Email address must not be empty")]
    EmptyEmail,

    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════
    /// Wrong password, unknown account, or a ticket that resolves to
    /// empty identity or credential.
    #[error("Authentication failed")]
    AuthenticationFailed,

    // ═══════════════════════════════════════════════════════════
    // Storage Errors
    // ═══════════════════════════════════════════════════════════
    /// The row already exists (unique constraint hit).
    ///
    /// Recoverable: provisioning treats this as "another writer won the
    /// race" and re-fetches instead of propagating.
    #[error("Record already exists")]
    Conflict,

    /// Requested record was not found.
    #[error("Record not found")]
    NotFound,

    /// Storage failed while creating or loading an account. Fatal to
    /// the grant being processed.
    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    /// Channel subscription side effect failed. Non-fatal: logged and
    /// swallowed by the redeemer, since the account was already
    /// provisioned.
    #[error("Subscription failed: {0}")]
    Subscription(String),

    /// Generic storage failure.
    #[error("Storage error: {0}")]
    Storage(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════
    /// Email delivery failed.
    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatepassError {
    /// Returns `true` for failures the HTTP layer should translate into
    /// its uniform "authentication failed" response.
    ///
    /// Ticket-format errors, expired tickets and wrong credentials are
    /// deliberately indistinguishable to the outside, to avoid leaking
    /// account existence.
    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidTicket
                | Self::ExpiredTicket
                | Self::AuthenticationFailed
                | Self::EmptyEmail
        )
    }

    /// Returns `true` if the error is a recoverable uniqueness conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}
