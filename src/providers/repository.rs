//! Account storage contract.

use super::{Account, AccountId, Subscription};
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::future::Future;

/// Account and subscription repository.
///
/// This trait abstracts over the persistent store. The core never
/// assumes it is the sole writer: uniqueness of `email` and of the
/// `(account, channel)` pair is enforced by the storage layer, and
/// [`crate::GatepassError::Conflict`] from [`create`] is a normal
/// outcome of two requests racing to provision the same address.
///
/// [`create`]: AccountRepository::create
pub trait AccountRepository: Send + Sync {
    /// Look up an account by its unique email address.
    ///
    /// # Errors
    ///
    /// - `GatepassError::NotFound` if no account has this email.
    /// - `GatepassError::Storage` if the query fails.
    fn find_by_email(&self, email: &str) -> impl Future<Output = Result<Account>> + Send;

    /// Insert a new account row.
    ///
    /// # Errors
    ///
    /// - `GatepassError::Conflict` if the email already exists under
    ///   the uniqueness constraint; callers re-fetch instead of failing.
    /// - `GatepassError::Storage` if the insert fails.
    fn create(&self, account: &Account) -> impl Future<Output = Result<Account>> + Send;

    /// Record a successful password login.
    ///
    /// # Errors
    ///
    /// Returns `GatepassError::Storage` if the update fails. Callers
    /// treat this as non-fatal.
    fn update_last_login(
        &self,
        account_id: AccountId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Create or refresh a channel subscription.
    ///
    /// Upserts on the `(account, channel)` uniqueness constraint, so
    /// redeeming the same invite twice leaves exactly one row.
    ///
    /// # Errors
    ///
    /// Returns `GatepassError::Subscription` or `GatepassError::Storage`
    /// if the upsert fails.
    fn upsert_subscription(
        &self,
        subscription: &Subscription,
    ) -> impl Future<Output = Result<()>> + Send;
}
