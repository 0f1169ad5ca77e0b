//! Utility functions for the ticket protocol.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Validate email address shape.
///
/// Basic RFC 5322 validation: exactly one `@`, non-empty local and
/// domain parts, a dotted domain, sane length. For full compliance use
/// the `email_address` crate; this is only the precondition gate in
/// front of ticket issuance.
///
/// # Examples
///
/// ```
/// use gatepass::utils::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("user+tag@subdomain.example.com"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("@example.com"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    if !local.chars().all(valid_local) || !domain.chars().all(valid_domain) {
        return false;
    }

    // Domain labels between dots must be non-empty.
    domain.split('.').all(|label| !label.is_empty())
}

/// Symbols used for generated passwords.
const PASSWORD_ALPHABET: &[u8] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Generate a random password of `len` symbols.
///
/// Used when an invite carries [`crate::Credential::Randomize`]: the
/// account is created with a password the invitee never sees and can
/// replace through the reset flow.
#[must_use]
pub fn random_password(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..PASSWORD_ALPHABET.len());
            PASSWORD_ALPHABET[idx] as char
        })
        .collect()
}

/// SHA-256 fingerprint of an encoded ticket, hex-encoded.
///
/// Identifies a ticket to the replay guard without storing the ticket
/// itself.
#[must_use]
pub fn ticket_fingerprint(ticket: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ticket.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@example.com"));
        assert!(is_valid_email("user+tag@example.com"));
        assert!(is_valid_email("user-name@example.co.uk"));
        assert!(is_valid_email("a@b.c"));
    }

    #[test]
    fn invalid_emails() {
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example..com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email(""));
        let long_email = format!("{}@example.com", "a".repeat(250));
        assert!(!is_valid_email(&long_email));
    }

    #[test]
    fn random_passwords_have_requested_length() {
        assert_eq!(random_password(32).len(), 32);
        assert_eq!(random_password(0).len(), 0);
    }

    #[test]
    fn random_passwords_differ() {
        assert_ne!(random_password(32), random_password(32));
    }

    #[test]
    fn fingerprint_is_stable_and_distinct() {
        let a = ticket_fingerprint("TICKETA");
        assert_eq!(a, ticket_fingerprint("TICKETA"));
        assert_ne!(a, ticket_fingerprint("TICKETB"));
        assert_eq!(a.len(), 64);
    }
}
