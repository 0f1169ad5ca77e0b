//! Idempotent account provisioning.
//!
//! [`AccountProvisioner::find_or_create`] is the only write path into
//! the account store that ticket redemption uses. It is safe to call
//! concurrently for the same email: the loser of a creation race
//! re-fetches the winner's row, and an existing account is never
//! mutated (in particular its password hash is never overwritten).

use crate::error::{GatepassError, Result};
use crate::providers::{Account, AccountId, AccountRepository};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;

/// Hash a password with Argon2id and a fresh random salt, producing a
/// PHC-format string.
///
/// # Errors
///
/// Returns `GatepassError::Internal` if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| GatepassError::Internal(format!("password hashing failed: {e}")))
}

/// Check a candidate password against a stored PHC-format hash.
///
/// An empty or malformed stored hash never matches; accounts that were
/// provisioned without a password cannot be logged into until one is
/// set.
#[must_use]
pub fn verify_password(stored_hash: &str, candidate: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

/// Finds or creates accounts against an [`AccountRepository`].
#[derive(Debug, Clone)]
pub struct AccountProvisioner<R> {
    repo: R,
}

impl<R: AccountRepository> AccountProvisioner<R> {
    /// Wrap a repository.
    pub const fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Return the existing account for `email`, or create one with the
    /// given password and source address.
    ///
    /// Redeeming the same ticket twice therefore converges on a single
    /// row: the second call finds the first call's account and leaves
    /// it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GatepassError::Provisioning`] when the repository
    /// fails in a way that is neither "not found" nor a creation race.
    pub async fn find_or_create(
        &self,
        email: &str,
        password: &str,
        source_ip: &str,
    ) -> Result<Account> {
        match self.repo.find_by_email(email).await {
            Ok(existing) => return Ok(existing),
            Err(GatepassError::NotFound) => {}
            Err(e) => return Err(GatepassError::Provisioning(e.to_string())),
        }

        let account = Account {
            id: AccountId::new(),
            email: email.to_string(),
            password_hash: hash_password(password)?,
            last_login_at: None,
            created_at: Utc::now(),
            source_ip: source_ip.to_string(),
        };

        match self.repo.create(&account).await {
            Ok(stored) => {
                tracing::info!(email, account_id = %stored.id, "provisioned account");
                Ok(stored)
            }
            Err(GatepassError::Conflict) => {
                // Lost the creation race; the concurrent writer's row
                // is authoritative.
                tracing::debug!(email, "account creation raced, re-fetching");
                self.repo
                    .find_by_email(email)
                    .await
                    .map_err(|e| GatepassError::Provisioning(e.to_string()))
            }
            Err(e) => Err(GatepassError::Provisioning(e.to_string())),
        }
    }

    pub(crate) const fn repo(&self) -> &R {
        &self.repo
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::MockAccountRepository;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse"));
        assert!(!verify_password(&hash, "wrong horse"));
    }

    #[test]
    fn empty_or_malformed_hash_never_verifies() {
        assert!(!verify_password("", "anything"));
        assert!(!verify_password("", ""));
        assert!(!verify_password("plaintext-not-a-hash", "plaintext-not-a-hash"));
    }

    #[test]
    fn salts_are_unique_per_hash() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
        assert!(verify_password(&a, "pw"));
        assert!(verify_password(&b, "pw"));
    }

    #[tokio::test]
    async fn creates_account_when_missing() {
        let repo = MockAccountRepository::new();
        let provisioner = AccountProvisioner::new(repo.clone());
        let account = provisioner
            .find_or_create("new@example.com", "pw1", "10.0.0.1")
            .await
            .unwrap();
        assert_eq!(account.email, "new@example.com");
        assert_eq!(account.source_ip, "10.0.0.1");
        assert!(verify_password(&account.password_hash, "pw1"));
        assert_eq!(repo.account_count(), 1);
    }

    #[tokio::test]
    async fn existing_account_is_returned_unchanged() {
        let repo = MockAccountRepository::new();
        let provisioner = AccountProvisioner::new(repo.clone());
        let first = provisioner
            .find_or_create("dup@example.com", "original", "10.0.0.1")
            .await
            .unwrap();
        let second = provisioner
            .find_or_create("dup@example.com", "different", "10.0.0.2")
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.password_hash, second.password_hash);
        assert!(verify_password(&second.password_hash, "original"));
        assert_eq!(repo.account_count(), 1);
    }

    #[tokio::test]
    async fn creation_race_loser_adopts_the_winner() {
        let repo = MockAccountRepository::new();
        let winner = Account {
            id: AccountId::new(),
            email: "race@example.com".to_string(),
            password_hash: hash_password("winner-pw").unwrap(),
            last_login_at: None,
            created_at: Utc::now(),
            source_ip: "10.0.0.9".to_string(),
        };
        repo.inject_race(winner.clone());

        let provisioner = AccountProvisioner::new(repo.clone());
        let resolved = provisioner
            .find_or_create("race@example.com", "loser-pw", "10.0.0.1")
            .await
            .unwrap();
        assert_eq!(resolved.id, winner.id);
        assert!(verify_password(&resolved.password_hash, "winner-pw"));
        assert_eq!(repo.account_count(), 1);
    }
}
