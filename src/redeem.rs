//! Ticket redemption.
//!
//! Redemption is where a verified ticket becomes an account: claims
//! are checked, a random password is generated when the ticket asked
//! for one, the account is provisioned idempotently, and any group
//! reference on the ticket turns into an approved subscription with a
//! best-effort notification.

use crate::error::{GatepassError, Result};
use crate::providers::{
    Account, AccountRepository, ReplayGuard, Subscription, SubscriptionNotifier,
};
use crate::provision::AccountProvisioner;
use crate::ticket::{Credential, TicketClaims};
use crate::utils::{random_password, ticket_fingerprint};
use crate::verifier::TicketVerifier;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Length of passwords generated for [`Credential::Randomize`] tickets.
const GENERATED_PASSWORD_LEN: usize = 32;

/// The outcome of a successful redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    /// The account the ticket resolved to (found or freshly created).
    pub account: Account,
    /// The group the account was subscribed to, when the ticket
    /// carried a group reference.
    pub subscribed: Option<String>,
}

/// Turns tickets into provisioned accounts.
pub struct TicketRedeemer<R, N> {
    verifier: TicketVerifier,
    provisioner: AccountProvisioner<R>,
    notifier: N,
    replay: Option<Arc<dyn ReplayGuard>>,
}

impl<R, N> TicketRedeemer<R, N>
where
    R: AccountRepository,
    N: SubscriptionNotifier + Clone + 'static,
{
    /// Assemble a redeemer from its collaborators.
    pub const fn new(verifier: TicketVerifier, provisioner: AccountProvisioner<R>, notifier: N) -> Self {
        Self {
            verifier,
            provisioner,
            notifier,
            replay: None,
        }
    }

    /// Assemble a redeemer from configuration, installing an
    /// [`InMemoryReplayGuard`](crate::providers::InMemoryReplayGuard)
    /// when [`TicketConfig::single_use`](crate::TicketConfig::single_use)
    /// is set.
    ///
    /// # Errors
    ///
    /// Returns `GatepassError::Internal` if the configured key set is
    /// empty.
    pub fn from_config(config: &crate::TicketConfig, repo: R, notifier: N) -> Result<Self> {
        let mut redeemer = Self::new(
            TicketVerifier::new(config)?,
            AccountProvisioner::new(repo),
            notifier,
        );
        if config.single_use {
            redeemer.replay = Some(Arc::new(crate::providers::InMemoryReplayGuard::new()));
        }
        Ok(redeemer)
    }

    /// Enforce single-use tickets through the given guard.
    ///
    /// Without a guard, tickets stay reusable for their whole lifetime
    /// and idempotent provisioning absorbs repeats.
    #[must_use]
    pub fn with_replay_guard(mut self, guard: Arc<dyn ReplayGuard>) -> Self {
        self.replay = Some(guard);
        self
    }

    /// Redeem a ticket against the current clock.
    ///
    /// # Errors
    ///
    /// Ticket-shaped failures (undecryptable, expired, replayed, or
    /// missing email/credential) surface as
    /// [`GatepassError::AuthenticationFailed`] or the specific ticket
    /// error; account-store failures surface as
    /// [`GatepassError::Provisioning`]. Subscription and notification
    /// failures are logged and swallowed.
    pub async fn redeem(&self, ticket: &str, source_ip: &str) -> Result<Redemption> {
        self.redeem_at(ticket, source_ip, Utc::now()).await
    }

    /// Redeem a ticket against an explicit clock reading.
    ///
    /// # Errors
    ///
    /// As for [`redeem`](Self::redeem).
    pub async fn redeem_at(
        &self,
        ticket: &str,
        source_ip: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption> {
        let claims = self.verifier.verify_at(ticket, now)?;
        let password = Self::resolve_credential(&claims)?;

        let account = self
            .provisioner
            .find_or_create(&claims.email, &password, source_ip)
            .await?;

        // Consumed only once provisioning has succeeded, so a
        // transient storage failure does not burn the ticket.
        self.consume_once(ticket, &claims.email)?;

        let subscribed = match &claims.group_ref {
            Some(group) if self.subscribe(&account, group).await => Some(group.clone()),
            _ => None,
        };

        Ok(Redemption { account, subscribed })
    }

    /// A redeemable ticket must name both a recipient and a
    /// credential; reset tickets in particular carry no credential and
    /// cannot be redeemed into an account.
    fn resolve_credential(claims: &TicketClaims) -> Result<String> {
        if claims.email.trim().is_empty() {
            tracing::warn!("rejected ticket with empty email");
            return Err(GatepassError::AuthenticationFailed);
        }
        match &claims.credential {
            Some(Credential::Explicit(password)) if !password.is_empty() => Ok(password.clone()),
            Some(Credential::Randomize) => Ok(random_password(GENERATED_PASSWORD_LEN)),
            Some(Credential::Explicit(_)) | None => {
                tracing::warn!(email = %claims.email, "rejected ticket with empty credential");
                Err(GatepassError::AuthenticationFailed)
            }
        }
    }

    fn consume_once(&self, ticket: &str, email: &str) -> Result<()> {
        let Some(guard) = &self.replay else {
            return Ok(());
        };
        if guard.consume(&ticket_fingerprint(ticket))? {
            Ok(())
        } else {
            tracing::warn!(email, "rejected replayed ticket");
            Err(GatepassError::AuthenticationFailed)
        }
    }

    /// Subscribe the account to the ticket's group. Subscription
    /// failures never fail the redemption that carried them; the
    /// account is already provisioned and the subscription can be
    /// repaired manually.
    async fn subscribe(&self, account: &Account, group: &str) -> bool {
        let subscription = Subscription {
            account_id: account.id,
            channel_id: group.to_string(),
            approved: true,
            created_by: account.id,
        };
        if let Err(e) = self.provisioner.repo().upsert_subscription(&subscription).await {
            tracing::warn!(email = %account.email, group, error = %e, "subscription write failed");
            return false;
        }

        // Notification is fire-and-forget; a broken notifier must not
        // slow down or fail redemption.
        let notifier = self.notifier.clone();
        let account = account.clone();
        let group = group.to_string();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify_user_subscribed(&account, &group).await {
                tracing::warn!(email = %account.email, group, error = %e, "subscription notification failed");
            }
        });
        true
    }
}
