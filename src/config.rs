//! Ticket protocol configuration.
//!
//! Configuration values are provided by the application and injected at
//! construction; there is no global state. The symmetric ticket key in
//! particular is explicit configuration, parsed once at startup.

use crate::codec::{CodecError, TicketKey};
use chrono::Duration;

/// Ticket issuance and redemption policy.
#[derive(Debug, Clone)]
pub struct TicketConfig {
    /// Ordered symmetric key set. The first key encrypts newly issued
    /// tickets; all keys are accepted on decode, which is what makes a
    /// key rotation possible without invalidating outstanding tickets.
    pub keys: Vec<TicketKey>,

    /// How long a ticket stays valid after issuance.
    ///
    /// Default: 24 hours.
    pub ttl: Duration,

    /// Whether each ticket may be redeemed only once.
    ///
    /// The protocol is stateless, so with the default (`false`) any
    /// valid, non-expired ticket is redeemable an unbounded number of
    /// times (tickets behave as durable invite links). Enabling this
    /// makes the redeemer consume each ticket's fingerprint through a
    /// [`crate::providers::ReplayGuard`].
    pub single_use: bool,
}

impl TicketConfig {
    /// Create a configuration with a single key and default policy.
    #[must_use]
    pub fn new(key: TicketKey) -> Self {
        Self {
            keys: vec![key],
            ttl: Duration::hours(24),
            single_use: false,
        }
    }

    /// Create a configuration from a hex-encoded 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not 64 hex characters.
    pub fn from_hex_key(hex_key: &str) -> Result<Self, CodecError> {
        Ok(Self::new(TicketKey::from_hex(hex_key)?))
    }

    /// Add an additional decode-only key (rotation support).
    #[must_use]
    pub fn with_fallback_key(mut self, key: TicketKey) -> Self {
        self.keys.push(key);
        self
    }

    /// Set the ticket time-to-live.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable single-use redemption.
    #[must_use]
    pub const fn with_single_use(mut self, single_use: bool) -> Self {
        self.single_use = single_use;
        self
    }
}

/// SMTP delivery configuration for [`crate::providers::SmtpMailer`].
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP relay address (e.g. "email-smtp.eu-west-1.amazonaws.com").
    pub server: String,

    /// SMTP port (usually 587 for STARTTLS).
    pub port: u16,

    /// SMTP authentication username.
    pub username: String,

    /// SMTP authentication password.
    pub password: String,

    /// Sender address. Must be verified with the relay provider.
    pub from_email: String,

    /// Sender display name.
    pub from_name: String,

    /// Base URL the emailed verification links point at
    /// (e.g. "https://app.example.com").
    pub base_url: String,
}

impl SmtpConfig {
    /// Create an SMTP configuration.
    #[must_use]
    pub fn new(
        server: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        from_email: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            port,
            username: username.into(),
            password: password.into(),
            from_email: from_email.into(),
            from_name: "Gatepass".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }

    /// Set the sender display name.
    #[must_use]
    pub fn with_from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = name.into();
        self
    }

    /// Set the base URL used in verification links.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TicketConfig::new(TicketKey::from_bytes([1; 32]));
        assert_eq!(config.ttl, Duration::hours(24));
        assert!(!config.single_use);
        assert_eq!(config.keys.len(), 1);
    }

    #[test]
    fn builder_chain() {
        let config = TicketConfig::new(TicketKey::from_bytes([1; 32]))
            .with_fallback_key(TicketKey::from_bytes([2; 32]))
            .with_ttl(Duration::hours(1))
            .with_single_use(true);

        assert_eq!(config.keys.len(), 2);
        assert_eq!(config.ttl, Duration::hours(1));
        assert!(config.single_use);
    }

    #[test]
    fn hex_key_config() {
        let config = TicketConfig::from_hex_key(
            "6368616e676520746869732070617373776f726420746f206120736563726574",
        )
        .unwrap();
        assert_eq!(config.keys.len(), 1);

        assert!(TicketConfig::from_hex_key("nope").is_err());
    }

    #[test]
    fn smtp_builder() {
        let config = SmtpConfig::new("smtp.example.com", 587, "user", "pass", "noreply@example.com")
            .with_from_name("Example")
            .with_base_url("https://app.example.com");
        assert_eq!(config.from_name, "Example");
        assert_eq!(config.base_url, "https://app.example.com");
    }
}
