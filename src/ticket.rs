//! Ticket payload types.
//!
//! A ticket is an opaque, encrypted, time-bounded bearer string encoding
//! an intended action (signup, invite, password reset) and its
//! parameters. Payloads are ephemeral: they exist only inside the
//! encrypted ticket and are never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire sentinel meaning "assign a random password at redemption time".
///
/// Kept for format compatibility with previously issued tickets; the
/// public API uses [`Credential`] instead of the magic string.
pub(crate) const RANDOM_PASSWORD_SENTINEL: &str = "-1rnd";

/// The credential carried by a signup or invite ticket.
///
/// Replaces the legacy sentinel-string convention with a tagged option:
/// either the recipient's chosen password travels in the ticket, or the
/// redeemer assigns a random one on first login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Credential {
    /// A plaintext password to set when the account is first created.
    Explicit(String),

    /// Assign a freshly generated random password at redemption time.
    ///
    /// Used for invites where the inviter supplied no password.
    Randomize,
}

impl Credential {
    /// Wire representation of this credential inside a ticket payload.
    #[must_use]
    pub(crate) fn to_wire(&self) -> String {
        match self {
            Self::Explicit(password) => password.clone(),
            Self::Randomize => RANDOM_PASSWORD_SENTINEL.to_string(),
        }
    }

    /// Parse the wire representation back into a credential.
    #[must_use]
    pub(crate) fn from_wire(raw: &str) -> Self {
        if raw == RANDOM_PASSWORD_SENTINEL {
            Self::Randomize
        } else {
            Self::Explicit(raw.to_string())
        }
    }

    /// Returns `true` if this is an explicit, empty credential.
    #[must_use]
    pub fn is_empty_explicit(&self) -> bool {
        matches!(self, Self::Explicit(password) if password.is_empty())
    }
}

/// Which flavor of ticket is being issued or delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketKind {
    /// Self-service account registration.
    Signup,

    /// Invitation into an existing account's network, optionally with a
    /// channel to auto-subscribe to.
    Invite,

    /// Password reset for an existing account.
    PasswordReset,
}

impl TicketKind {
    /// Stable string name, used in logs and email dispatch.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Signup => "signup",
            Self::Invite => "invite",
            Self::PasswordReset => "reset",
        }
    }
}

/// The decoded, verified contents of a ticket.
///
/// Produced only by [`crate::TicketVerifier`] after successful
/// authenticated decryption and expiry checking; on any failure the
/// verifier returns an error with no partial data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketClaims {
    /// Recipient identity. Non-empty for every well-formed ticket.
    pub email: String,

    /// Credential to apply at first creation. `None` for reset tickets,
    /// which carry no credential at all.
    pub credential: Option<Credential>,

    /// Channel to auto-subscribe the account to. `None` means no
    /// auto-subscription.
    pub group_ref: Option<String>,

    /// Opaque session reference. Carried through verification but not
    /// consumed by it; exposed for callers that want it.
    pub session_ref: Option<String>,

    /// Absolute expiry of the ticket.
    pub expires_at: DateTime<Utc>,
}
