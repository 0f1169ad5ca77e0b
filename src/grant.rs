//! Credential-grant integration.
//!
//! [`GrantVerifier`] is the seam an OAuth2-style token server calls
//! into during a grant: user and client validation, authorization-code
//! exchange, and per-token claim/property hooks.
//! [`CredentialGrantAdapter`] implements it over a
//! [`TicketRedeemer`]: tickets ride in as the client secret presented
//! to the client and code hooks, and a successful grant leaves behind
//! a provisioned account.
//!
//! Everything ticket-shaped collapses to
//! [`GatepassError::AuthenticationFailed`] at this boundary so the
//! token server leaks nothing about why a grant was refused.

use crate::error::{GatepassError, Result};
use crate::providers::{AccountRepository, SubscriptionNotifier};
use crate::provision::verify_password;
use crate::redeem::TicketRedeemer;
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;

/// Which grant a token hook is being invoked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantTokenKind {
    /// Resource-owner password grant.
    User,
    /// Client-credentials grant.
    Client,
    /// Authorization-code exchange.
    AuthCode,
}

impl GrantTokenKind {
    /// Short tag used in token properties and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Client => "client",
            Self::AuthCode => "auth_code",
        }
    }
}

/// The verifier contract a token server drives during a grant.
///
/// Implementations must be cheap to call concurrently; every method
/// takes `&self`.
pub trait GrantVerifier: Send + Sync {
    /// Validate a resource-owner username and password.
    fn validate_user(
        &self,
        username: &str,
        password: &str,
        scope: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Validate a client id and secret.
    fn validate_client(
        &self,
        client_id: &str,
        client_secret: &str,
        scope: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Exchange an authorization code, returning the credential
    /// (username) the issued token is for. The ticket rides in
    /// `client_secret`; `source_ip` is supplementary request context
    /// on top of the host's four-parameter hook.
    fn validate_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
        source_ip: &str,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Extra JWT claims for the token being issued.
    fn add_claims(
        &self,
        kind: GrantTokenKind,
        credential: &str,
        token_id: &str,
        scope: &str,
    ) -> impl Future<Output = Result<HashMap<String, String>>> + Send;

    /// Extra opaque properties stored alongside the token.
    fn add_properties(
        &self,
        kind: GrantTokenKind,
        credential: &str,
        token_id: &str,
        scope: &str,
    ) -> impl Future<Output = Result<HashMap<String, String>>> + Send;

    /// Persist a freshly issued token id, when tokens are tracked.
    ///
    /// # Errors
    ///
    /// Implementations tracking tokens report storage failures here.
    fn store_token_id(
        &self,
        kind: GrantTokenKind,
        credential: &str,
        token_id: &str,
        refresh_token_id: &str,
    ) -> Result<()>;

    /// Check a presented token id against the store, when tokens are
    /// tracked.
    ///
    /// # Errors
    ///
    /// Implementations tracking tokens reject unknown ids here.
    fn validate_token_id(
        &self,
        kind: GrantTokenKind,
        credential: &str,
        token_id: &str,
        refresh_token_id: &str,
    ) -> Result<()>;
}

/// [`GrantVerifier`] backed by ticket redemption and the account
/// store.
pub struct CredentialGrantAdapter<R, N> {
    repo: R,
    redeemer: TicketRedeemer<R, N>,
}

impl<R, N> CredentialGrantAdapter<R, N>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: SubscriptionNotifier + Clone + 'static,
{
    /// Wrap a redeemer and the repository it provisions into.
    pub const fn new(repo: R, redeemer: TicketRedeemer<R, N>) -> Self {
        Self { repo, redeemer }
    }

    /// Redeem a ticket presented through the grant surface, collapsing
    /// every ticket-shaped failure to an opaque authentication error.
    async fn redeem_opaque(&self, ticket: &str, source_ip: &str) -> Result<String> {
        match self.redeemer.redeem(ticket, source_ip).await {
            Ok(redemption) => Ok(redemption.account.email),
            Err(e) if e.is_authentication_failure() => {
                tracing::info!(error = %e, "grant refused: ticket rejected");
                Err(GatepassError::AuthenticationFailed)
            }
            Err(e) => Err(e),
        }
    }
}

impl<R, N> GrantVerifier for CredentialGrantAdapter<R, N>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
    N: SubscriptionNotifier + Clone + 'static,
{
    async fn validate_user(&self, username: &str, password: &str, _scope: &str) -> Result<()> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(GatepassError::AuthenticationFailed);
        }
        let account = match self.repo.find_by_email(username).await {
            Ok(account) => account,
            Err(e) => {
                tracing::info!(username, error = %e, "grant refused: unknown user");
                return Err(GatepassError::AuthenticationFailed);
            }
        };
        if !verify_password(&account.password_hash, password) {
            tracing::info!(username, "grant refused: password mismatch");
            return Err(GatepassError::AuthenticationFailed);
        }

        // Last-login bookkeeping must not delay or fail the grant.
        let repo = self.repo.clone();
        let account_id = account.id;
        tokio::spawn(async move {
            if let Err(e) = repo.update_last_login(account_id, Utc::now()).await {
                tracing::warn!(account_id = %account_id, error = %e, "last-login update failed");
            }
        });
        Ok(())
    }

    async fn validate_client(&self, _client_id: &str, client_secret: &str, _scope: &str) -> Result<()> {
        self.redeem_opaque(client_secret, "").await.map(|_| ())
    }

    async fn validate_code(
        &self,
        _client_id: &str,
        client_secret: &str,
        _code: &str,
        _redirect_uri: &str,
        source_ip: &str,
    ) -> Result<String> {
        self.redeem_opaque(client_secret, source_ip).await
    }

    async fn add_claims(
        &self,
        _kind: GrantTokenKind,
        _credential: &str,
        _token_id: &str,
        _scope: &str,
    ) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }

    async fn add_properties(
        &self,
        kind: GrantTokenKind,
        credential: &str,
        _token_id: &str,
        _scope: &str,
    ) -> Result<HashMap<String, String>> {
        let account = self.repo.find_by_email(credential).await.map_err(|e| {
            tracing::warn!(credential, error = %e, "token property lookup failed");
            GatepassError::AuthenticationFailed
        })?;
        let mut props = HashMap::new();
        props.insert("uid".to_string(), credential.to_string());
        props.insert("id".to_string(), account.id.to_string());
        props.insert("ts".to_string(), Utc::now().to_rfc3339());
        props.insert("kind".to_string(), kind.as_str().to_string());
        Ok(props)
    }

    // Tokens are stateless JWTs; there is no token store to write to
    // or check against.
    fn store_token_id(
        &self,
        _kind: GrantTokenKind,
        _credential: &str,
        _token_id: &str,
        _refresh_token_id: &str,
    ) -> Result<()> {
        Ok(())
    }

    fn validate_token_id(
        &self,
        _kind: GrantTokenKind,
        _credential: &str,
        _token_id: &str,
        _refresh_token_id: &str,
    ) -> Result<()> {
        Ok(())
    }
}
