//! External collaborator contracts.
//!
//! This module defines traits for everything the ticket core does not
//! own: account/subscription storage, outbound email, the realtime
//! messaging hub, and the optional replay guard. The core depends only
//! on these traits; the application supplies concrete implementations
//! (PostgreSQL, SMTP, …) and tests supply the in-memory doubles from
//! [`crate::mocks`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod console;
pub mod email;
pub mod notify;
pub mod replay;
pub mod repository;
pub mod sink;
pub mod smtp;

pub use console::ConsoleMailer;
pub use email::TicketMailer;
pub use notify::SubscriptionNotifier;
pub use replay::{InMemoryReplayGuard, ReplayGuard};
pub use repository::AccountRepository;
pub use sink::TicketSink;
pub use smtp::SmtpMailer;

/// Unique identifier for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub uuid::Uuid);

impl AccountId {
    /// Generate a new random `AccountId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Account data model.
///
/// Owned and persisted by the storage collaborator; this core only
/// creates it once and reads it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID, generated at first creation.
    pub id: AccountId,

    /// Email address (unique key).
    pub email: String,

    /// Salted argon2 hash in PHC string format. Empty if a password was
    /// never set. Redemption never overwrites a non-empty hash.
    pub password_hash: String,

    /// Last successful password login.
    pub last_login_at: Option<DateTime<Utc>>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// IP address the account was provisioned from. Empty if unknown.
    pub source_ip: String,
}

/// Channel subscription relation.
///
/// Created at most once per `(account, channel)` pair; the storage
/// layer upserts on conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscribed account.
    pub account_id: AccountId,

    /// Opaque channel/group identifier.
    pub channel_id: String,

    /// Always `true` when created via ticket redemption.
    pub approved: bool,

    /// Account that initiated the subscription.
    pub created_by: AccountId,
}
