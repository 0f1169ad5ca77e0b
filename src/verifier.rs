//! Ticket verification.
//!
//! Decrypts a ticket, shapes the field vector into [`TicketClaims`]
//! and enforces expiry. Two payload shapes are accepted: the
//! two-field reset variant `[email, expiry]` and the five-field
//! variant `[email, credential, expiry, group, session]`. Anything
//! else is an invalid ticket.
//!
//! Expiry is a hard failure: an expired ticket never yields claims.

use crate::codec::TicketCodec;
use crate::config::TicketConfig;
use crate::error::{GatepassError, Result};
use crate::ticket::{Credential, TicketClaims};
use chrono::{DateTime, TimeZone, Utc};

/// Decrypts and validates tickets issued by
/// [`TicketIssuer`](crate::issuer::TicketIssuer).
#[derive(Debug, Clone)]
pub struct TicketVerifier {
    codec: TicketCodec,
}

impl TicketVerifier {
    /// Create a verifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns `GatepassError::Internal` if the configured key set is
    /// empty.
    pub fn new(config: &TicketConfig) -> Result<Self> {
        let codec = TicketCodec::new(config.keys.clone())
            .map_err(|e| GatepassError::Internal(e.to_string()))?;
        Ok(Self { codec })
    }

    /// Verify a ticket against the current clock.
    ///
    /// # Errors
    ///
    /// Returns [`GatepassError::InvalidTicket`] for anything that does
    /// not decrypt to a well-formed payload, and
    /// [`GatepassError::ExpiredTicket`] once the embedded expiry has
    /// passed.
    pub fn verify(&self, ticket: &str) -> Result<TicketClaims> {
        self.verify_at(ticket, Utc::now())
    }

    /// Verify a ticket against an explicit clock reading.
    ///
    /// # Errors
    ///
    /// As for [`verify`](Self::verify).
    pub fn verify_at(&self, ticket: &str, now: DateTime<Utc>) -> Result<TicketClaims> {
        let fields = self.codec.decode(ticket).map_err(|e| {
            tracing::warn!(error = %e, "rejected undecryptable ticket");
            GatepassError::InvalidTicket
        })?;

        let claims = match fields.as_slice() {
            [email, expiry] => TicketClaims {
                email: email.clone(),
                credential: None,
                group_ref: None,
                session_ref: None,
                expires_at: parse_expiry(expiry)?,
            },
            [email, credential, expiry, group, session] => TicketClaims {
                email: email.clone(),
                credential: Some(Credential::from_wire(credential)),
                group_ref: non_empty(group),
                session_ref: non_empty(session),
                expires_at: parse_expiry(expiry)?,
            },
            _ => {
                tracing::warn!(fields = fields.len(), "rejected ticket with unexpected field count");
                return Err(GatepassError::InvalidTicket);
            }
        };

        if now > claims.expires_at {
            tracing::warn!(email = %claims.email, expired_at = %claims.expires_at, "rejected expired ticket");
            return Err(GatepassError::ExpiredTicket);
        }
        Ok(claims)
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_expiry(raw: &str) -> Result<DateTime<Utc>> {
    let seconds: i64 = raw.parse().map_err(|_| {
        tracing::warn!("rejected ticket with malformed expiry field");
        GatepassError::InvalidTicket
    })?;
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or(GatepassError::InvalidTicket)
}
