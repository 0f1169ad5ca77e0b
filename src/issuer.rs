//! Ticket issuance.
//!
//! Three entry points, one per ticket flavor. Signup and invite tickets
//! carry the five-field payload `[email, credential, expiry, group,
//! session]`; reset tickets carry the two-field payload `[email,
//! expiry]`. Expiry is always "now + TTL" (24 hours by default).
//!
//! Issuance has no side effects beyond cryptographic randomness
//! consumption; the `send_*` variants additionally hand the ticket to
//! the email collaborator and to the optional issuance sink.

use crate::codec::TicketCodec;
use crate::config::TicketConfig;
use crate::error::{GatepassError, Result};
use crate::providers::{TicketMailer, TicketSink};
use crate::ticket::{Credential, TicketKind};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Issues signup, invite and password-reset tickets.
#[derive(Clone)]
pub struct TicketIssuer<M> {
    codec: TicketCodec,
    ttl: Duration,
    mailer: M,
    sink: Option<Arc<dyn TicketSink>>,
}

impl<M: TicketMailer> TicketIssuer<M> {
    /// Create an issuer from configuration and a mailer.
    ///
    /// # Errors
    ///
    /// Returns `GatepassError::Internal` if the configured key set is
    /// empty.
    pub fn new(config: &TicketConfig, mailer: M) -> Result<Self> {
        let codec = TicketCodec::new(config.keys.clone())
            .map_err(|e| GatepassError::Internal(e.to_string()))?;
        Ok(Self {
            codec,
            ttl: config.ttl,
            mailer,
            sink: None,
        })
    }

    /// Install an issuance observer.
    ///
    /// Only tests should need this; the production path runs without a
    /// sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn TicketSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn expiry_field(&self) -> String {
        (Utc::now() + self.ttl).timestamp().to_string()
    }

    fn require_email(email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(GatepassError::EmptyEmail);
        }
        Ok(())
    }

    /// Issue a signup ticket carrying the chosen password.
    ///
    /// # Errors
    ///
    /// Returns [`GatepassError::EmptyEmail`] for a blank address, or an
    /// internal error if encryption fails.
    pub fn issue_signup(&self, email: &str, password: &str) -> Result<String> {
        Self::require_email(email)?;
        let fields = vec![
            email.to_string(),
            password.to_string(),
            self.expiry_field(),
            String::new(),
            String::new(),
        ];
        self.seal(&fields)
    }

    /// Issue an invite ticket.
    ///
    /// An empty explicit credential is promoted to
    /// [`Credential::Randomize`], matching how invites without a
    /// password have always behaved.
    ///
    /// # Errors
    ///
    /// Returns [`GatepassError::EmptyEmail`] for a blank address, or an
    /// internal error if encryption fails.
    pub fn issue_invite(
        &self,
        email: &str,
        credential: Credential,
        group_ref: Option<&str>,
        session_ref: Option<&str>,
    ) -> Result<String> {
        Self::require_email(email)?;
        let credential = if credential.is_empty_explicit() {
            Credential::Randomize
        } else {
            credential
        };
        let fields = vec![
            email.to_string(),
            credential.to_wire(),
            self.expiry_field(),
            group_ref.unwrap_or_default().to_string(),
            session_ref.unwrap_or_default().to_string(),
        ];
        self.seal(&fields)
    }

    /// Issue a password-reset ticket (two-field variant; no credential,
    /// group or session fields).
    ///
    /// # Errors
    ///
    /// Returns [`GatepassError::EmptyEmail`] for a blank address, or an
    /// internal error if encryption fails.
    pub fn issue_reset(&self, email: &str) -> Result<String> {
        Self::require_email(email)?;
        let fields = vec![email.to_string(), self.expiry_field()];
        self.seal(&fields)
    }

    /// Issue a signup ticket and email it to the recipient.
    ///
    /// # Errors
    ///
    /// Issuance errors as for [`issue_signup`](Self::issue_signup),
    /// plus `GatepassError::EmailDelivery` if the mailer fails.
    pub async fn send_signup(&self, email: &str, password: &str) -> Result<String> {
        let ticket = self.issue_signup(email, password)?;
        self.dispatch(TicketKind::Signup, email, &ticket).await?;
        Ok(ticket)
    }

    /// Issue an invite ticket and email it to the recipient.
    ///
    /// # Errors
    ///
    /// Issuance errors as for [`issue_invite`](Self::issue_invite),
    /// plus `GatepassError::EmailDelivery` if the mailer fails.
    pub async fn send_invite(
        &self,
        email: &str,
        credential: Credential,
        group_ref: Option<&str>,
        session_ref: Option<&str>,
    ) -> Result<String> {
        let ticket = self.issue_invite(email, credential, group_ref, session_ref)?;
        self.dispatch(TicketKind::Invite, email, &ticket).await?;
        Ok(ticket)
    }

    /// Issue a password-reset ticket and email it to the recipient.
    ///
    /// # Errors
    ///
    /// Issuance errors as for [`issue_reset`](Self::issue_reset), plus
    /// `GatepassError::EmailDelivery` if the mailer fails.
    pub async fn send_reset(&self, email: &str) -> Result<String> {
        let ticket = self.issue_reset(email)?;
        self.dispatch(TicketKind::PasswordReset, email, &ticket).await?;
        Ok(ticket)
    }

    fn seal(&self, fields: &[String]) -> Result<String> {
        // Codec detail stays internal; issuance failures are never
        // ticket-shaped errors.
        self.codec
            .encode(fields)
            .map_err(|e| GatepassError::Internal(e.to_string()))
    }

    async fn dispatch(&self, kind: TicketKind, email: &str, ticket: &str) -> Result<()> {
        if let Some(sink) = &self.sink {
            sink.record(kind, email, ticket);
        }
        tracing::debug!(kind = kind.as_str(), email, len = ticket.len(), "issued ticket");
        self.mailer.send_ticket(kind, email, ticket).await
    }
}
