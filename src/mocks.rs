//! Mock providers for testing.
//!
//! Every mock keeps its state behind `Arc<Mutex<…>>` so clones share
//! one store, mirroring how a shared database or broker behaves across
//! the collaborators under test. Enabled through the `test-utils`
//! feature (on by default) so downstream crates can drive the full
//! redemption flow without infrastructure.

#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

use crate::error::{GatepassError, Result};
use crate::providers::{Account, AccountId, AccountRepository, Subscription, SubscriptionNotifier, TicketMailer, TicketSink};
use crate::ticket::TicketKind;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory [`AccountRepository`] keyed by email.
#[derive(Debug, Clone, Default)]
pub struct MockAccountRepository {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
    subscriptions: Arc<Mutex<HashMap<(Uuid, String), Subscription>>>,
    pending_race: Arc<Mutex<Option<Account>>>,
    fail_subscriptions: Arc<Mutex<bool>>,
    fail_next_create: Arc<Mutex<bool>>,
}

impl MockAccountRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account directly, bypassing provisioning.
    pub fn insert(&self, account: Account) {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.email.clone(), account);
    }

    /// Arrange for the next `create` call to lose a creation race:
    /// `winner` is inserted first and the call returns `Conflict`.
    pub fn inject_race(&self, winner: Account) {
        *self.pending_race.lock().unwrap() = Some(winner);
    }

    /// Make every subsequent subscription upsert fail.
    pub fn fail_subscriptions(&self) {
        *self.fail_subscriptions.lock().unwrap() = true;
    }

    /// Make the next `create` call fail with a storage error,
    /// simulating a transient outage.
    pub fn fail_next_create(&self) {
        *self.fail_next_create.lock().unwrap() = true;
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    /// Fetch a stored account by email, if any.
    #[must_use]
    pub fn account(&self, email: &str) -> Option<Account> {
        self.accounts.lock().unwrap().get(email).cloned()
    }

    /// Fetch a stored subscription, if any.
    #[must_use]
    pub fn subscription(&self, account_id: AccountId, channel_id: &str) -> Option<Subscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .get(&(account_id.0, channel_id.to_string()))
            .cloned()
    }

    /// Number of stored subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }
}

impl AccountRepository for MockAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Account> {
        self.accounts
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or(GatepassError::NotFound)
    }

    async fn create(&self, account: &Account) -> Result<Account> {
        if std::mem::take(&mut *self.fail_next_create.lock().unwrap()) {
            return Err(GatepassError::Storage("account store unavailable".to_string()));
        }
        if let Some(winner) = self.pending_race.lock().unwrap().take() {
            self.accounts
                .lock()
                .unwrap()
                .insert(winner.email.clone(), winner);
            return Err(GatepassError::Conflict);
        }
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&account.email) {
            return Err(GatepassError::Conflict);
        }
        accounts.insert(account.email.clone(), account.clone());
        Ok(account.clone())
    }

    async fn update_last_login(&self, account_id: AccountId, at: DateTime<Utc>) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .values_mut()
            .find(|a| a.id == account_id)
            .ok_or(GatepassError::NotFound)?;
        account.last_login_at = Some(at);
        Ok(())
    }

    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<()> {
        if *self.fail_subscriptions.lock().unwrap() {
            return Err(GatepassError::Subscription(
                "subscription store unavailable".to_string(),
            ));
        }
        self.subscriptions.lock().unwrap().insert(
            (subscription.account_id.0, subscription.channel_id.clone()),
            subscription.clone(),
        );
        Ok(())
    }
}

/// [`TicketMailer`] that records deliveries instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct MockMailer {
    sent: Arc<Mutex<Vec<(TicketKind, String, String)>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockMailer {
    /// Create a mailer that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delivery fail.
    pub fn fail_deliveries(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// All recorded deliveries, as `(kind, recipient, ticket)`.
    #[must_use]
    pub fn deliveries(&self) -> Vec<(TicketKind, String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl TicketMailer for MockMailer {
    async fn send_ticket(&self, kind: TicketKind, recipient: &str, ticket: &str) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(GatepassError::EmailDelivery("mock delivery refused".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((kind, recipient.to_string(), ticket.to_string()));
        Ok(())
    }
}

/// [`SubscriptionNotifier`] that records announcements.
#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    notified: Arc<Mutex<Vec<(String, String)>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockNotifier {
    /// Create a notifier that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent notification fail.
    pub fn fail_notifications(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// All recorded announcements, as `(email, channel_id)`.
    #[must_use]
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notified.lock().unwrap().clone()
    }
}

impl SubscriptionNotifier for MockNotifier {
    async fn notify_user_subscribed(&self, account: &Account, channel_id: &str) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(GatepassError::Subscription("mock notifier refused".to_string()));
        }
        self.notified
            .lock()
            .unwrap()
            .push((account.email.clone(), channel_id.to_string()));
        Ok(())
    }
}

/// [`TicketSink`] that captures issued tickets for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<(TicketKind, String, String)>>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded tickets, as `(kind, email, ticket)`.
    #[must_use]
    pub fn records(&self) -> Vec<(TicketKind, String, String)> {
        self.records.lock().unwrap().clone()
    }

    /// The most recently issued ticket string, if any.
    #[must_use]
    pub fn last_ticket(&self) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .last()
            .map(|(_, _, ticket)| ticket.clone())
    }
}

impl TicketSink for RecordingSink {
    fn record(&self, kind: TicketKind, email: &str, ticket: &str) {
        self.records
            .lock()
            .unwrap()
            .push((kind, email.to_string(), ticket.to_string()));
    }
}
