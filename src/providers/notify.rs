//! Realtime messaging contract.

use crate::error::Result;
use crate::providers::Account;
use std::future::Future;

/// System-message emission into the messaging collaborator.
///
/// Implementations post a "user subscribed" system message to the
/// channel's feed (and typically fan it out over the realtime hub).
/// The redeemer dispatches this fire-and-forget: failures are logged
/// and never roll back the already-committed subscription.
pub trait SubscriptionNotifier: Send + Sync {
    /// Announce that `account` was subscribed to `channel_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the system message cannot be emitted. The
    /// caller treats this as non-fatal.
    fn notify_user_subscribed(
        &self,
        account: &Account,
        channel_id: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}
