//! Ticket codec: ordered string tuples ⇄ opaque, tamper-evident text.
//!
//! Wire format: `base32( nonce(24 bytes) || XChaCha20-Poly1305 ciphertext )`
//! where the plaintext is the bincode encoding of the ordered field
//! vector (length-delimited and order-preserving; field positions are
//! significant). The base32 alphabet is RFC 4648 with padding, decoded
//! case-insensitively, so tickets are safe in URLs and JSON.
//!
//! The nonce is generated fresh from OS entropy for every encode and
//! must never be reused with the same key; the 192-bit space makes
//! accidental collision negligible.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

/// Byte length of an XChaCha20-Poly1305 nonce.
pub const NONCE_LEN: usize = 24;

/// Byte length of the Poly1305 authentication tag appended to the
/// ciphertext.
pub const TAG_LEN: usize = 16;

const ALPHABET: base32::Alphabet = base32::Alphabet::RFC4648 { padding: true };

/// Codec-internal failure modes.
///
/// These carry more detail than callers should ever see; the verifier
/// collapses both variants into [`crate::GatepassError::InvalidTicket`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Base32 decoding failed, the input was too short to contain a
    /// nonce and tag, or the decrypted plaintext did not parse back
    /// into a field vector.
    #[error("malformed ticket: {0}")]
    Format(String),

    /// AEAD authentication failed under every configured key: wrong
    /// key, truncation, corruption or tampering.
    #[error("ticket failed authentication")]
    Integrity,
}

/// 256-bit symmetric ticket key.
///
/// Process-wide, read-only state: loaded once from configuration at
/// codec construction and never rotated within a running process.
/// Rotation across processes is supported by configuring several keys,
/// see [`TicketCodec::new`].
#[derive(Clone, PartialEq, Eq)]
pub struct TicketKey([u8; 32]);

impl TicketKey {
    /// Build a key from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a key from a 64-character hex string.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Format`] if the string is not valid hex or
    /// does not decode to exactly 32 bytes.
    pub fn from_hex(hex_str: &str) -> Result<Self, CodecError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| CodecError::Format(format!("key is not valid hex: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CodecError::Format("key must be exactly 32 bytes".to_string()))?;
        Ok(Self(bytes))
    }

    /// Generate a fresh random key from OS entropy.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    fn cipher(&self) -> XChaCha20Poly1305 {
        XChaCha20Poly1305::new(Key::from_slice(&self.0))
    }
}

impl std::fmt::Debug for TicketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.write_str("TicketKey([redacted])")
    }
}

/// Authenticated-encryption codec for ticket payloads.
///
/// The first configured key encrypts; every configured key is tried on
/// decode, so previously issued tickets stay redeemable across a key
/// rotation.
#[derive(Debug, Clone)]
pub struct TicketCodec {
    keys: Vec<TicketKey>,
}

impl TicketCodec {
    /// Create a codec over a non-empty ordered key set.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Format`] if `keys` is empty.
    pub fn new(keys: Vec<TicketKey>) -> Result<Self, CodecError> {
        if keys.is_empty() {
            return Err(CodecError::Format(
                "at least one ticket key is required".to_string(),
            ));
        }
        Ok(Self { keys })
    }

    /// Convenience constructor for the single-key case.
    #[must_use]
    pub fn with_key(key: TicketKey) -> Self {
        Self { keys: vec![key] }
    }

    /// Serialize, encrypt and encode an ordered field sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Format`] if serialization fails and
    /// [`CodecError::Integrity`] if encryption fails.
    pub fn encode(&self, fields: &[String]) -> Result<String, CodecError> {
        let plaintext = bincode::serialize(fields)
            .map_err(|e| CodecError::Format(format!("field serialization failed: {e}")))?;

        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self.keys[0]
            .cipher()
            .encrypt(XNonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|_| CodecError::Integrity)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(base32::encode(ALPHABET, &sealed))
    }

    /// Decode, authenticate, decrypt and deserialize a ticket.
    ///
    /// # Errors
    ///
    /// - [`CodecError::Format`] if base32 decoding fails, the payload is
    ///   too short, or the decrypted plaintext does not parse back into
    ///   a field vector.
    /// - [`CodecError::Integrity`] if authentication fails under every
    ///   configured key (wrong key, truncated/corrupted input, or
    ///   tampering).
    pub fn decode(&self, ticket: &str) -> Result<Vec<String>, CodecError> {
        let sealed = base32::decode(ALPHABET, ticket)
            .ok_or_else(|| CodecError::Format("not valid base32".to_string()))?;

        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CodecError::Format(format!(
                "sealed payload too short: {} bytes",
                sealed.len()
            )));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = XNonce::from_slice(nonce);

        let plaintext = self
            .keys
            .iter()
            .find_map(|key| key.cipher().decrypt(nonce, ciphertext).ok())
            .ok_or(CodecError::Integrity)?;

        bincode::deserialize(&plaintext)
            .map_err(|e| CodecError::Format(format!("field deserialization failed: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> TicketCodec {
        TicketCodec::with_key(TicketKey::from_bytes([0x42; 32]))
    }

    fn fields(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn roundtrip_five_fields() {
        let codec = codec();
        let input = fields(&["a@x.com", "pw1", "1735689600", "G1", "sess"]);
        let ticket = codec.encode(&input).unwrap();
        assert_eq!(codec.decode(&ticket).unwrap(), input);
    }

    #[test]
    fn roundtrip_two_fields() {
        let codec = codec();
        let input = fields(&["a@x.com", "1735689600"]);
        let ticket = codec.encode(&input).unwrap();
        assert_eq!(codec.decode(&ticket).unwrap(), input);
    }

    #[test]
    fn roundtrip_empty_and_unicode_fields() {
        let codec = codec();
        let input = fields(&["bjørn@x.no", "", "0", "", "日本語"]);
        let ticket = codec.encode(&input).unwrap();
        assert_eq!(codec.decode(&ticket).unwrap(), input);
    }

    #[test]
    fn ticket_is_base32_text() {
        let codec = codec();
        let ticket = codec.encode(&fields(&["a@x.com", "pw"])).unwrap();
        assert!(
            ticket
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '=')
        );
    }

    #[test]
    fn decode_is_case_insensitive() {
        let codec = codec();
        let input = fields(&["a@x.com", "pw"]);
        let ticket = codec.encode(&input).unwrap();
        assert_eq!(codec.decode(&ticket.to_lowercase()).unwrap(), input);
    }

    #[test]
    fn tampered_ciphertext_fails_integrity() {
        let codec = codec();
        let ticket = codec.encode(&fields(&["a@x.com", "pw1", "0", "", ""])).unwrap();

        // Flip one byte in the ciphertext region (past the nonce), then
        // re-encode. Authentication must fail, never wrong fields.
        let mut sealed = base32::decode(ALPHABET, &ticket).unwrap();
        let target = NONCE_LEN + 1;
        sealed[target] ^= 0xFF;
        let tampered = base32::encode(ALPHABET, &sealed);

        assert_eq!(codec.decode(&tampered), Err(CodecError::Integrity));
    }

    #[test]
    fn every_ciphertext_byte_is_authenticated() {
        let codec = codec();
        let ticket = codec.encode(&fields(&["a@x.com", "pw"])).unwrap();
        let sealed = base32::decode(ALPHABET, &ticket).unwrap();

        for i in NONCE_LEN..sealed.len() {
            let mut corrupt = sealed.clone();
            corrupt[i] ^= 0x01;
            let corrupt = base32::encode(ALPHABET, &corrupt);
            assert_eq!(codec.decode(&corrupt), Err(CodecError::Integrity), "byte {i}");
        }
    }

    #[test]
    fn wrong_key_fails_integrity() {
        let encoder = TicketCodec::with_key(TicketKey::from_bytes([0x01; 32]));
        let decoder = TicketCodec::with_key(TicketKey::from_bytes([0x02; 32]));
        let ticket = encoder.encode(&fields(&["a@x.com", "pw"])).unwrap();
        assert_eq!(decoder.decode(&ticket), Err(CodecError::Integrity));
    }

    #[test]
    fn rotated_key_set_still_decodes_old_tickets() {
        let old_key = TicketKey::from_bytes([0x01; 32]);
        let new_key = TicketKey::from_bytes([0x02; 32]);
        let old_codec = TicketCodec::with_key(old_key.clone());
        let rotated = TicketCodec::new(vec![new_key, old_key]).unwrap();

        let input = fields(&["a@x.com", "pw", "0", "", ""]);
        let ticket = old_codec.encode(&input).unwrap();
        assert_eq!(rotated.decode(&ticket).unwrap(), input);
    }

    #[test]
    fn garbage_input_fails_format() {
        let codec = codec();
        assert!(matches!(
            codec.decode("not base32 at all!!"),
            Err(CodecError::Format(_))
        ));
        assert!(matches!(codec.decode(""), Err(CodecError::Format(_))));
        // Valid base32 but shorter than nonce + tag.
        assert!(matches!(
            codec.decode("MZXW6==="),
            Err(CodecError::Format(_))
        ));
    }

    #[test]
    fn truncated_ticket_fails() {
        let codec = codec();
        let ticket = codec.encode(&fields(&["a@x.com", "pw1", "0", "G1", ""])).unwrap();
        let truncated = &ticket[..ticket.len() / 2];
        assert!(codec.decode(truncated).is_err());
    }

    #[test]
    fn empty_key_set_is_rejected() {
        assert!(matches!(
            TicketCodec::new(Vec::new()),
            Err(CodecError::Format(_))
        ));
    }

    #[test]
    fn key_from_hex_roundtrip() {
        let hex_key = "6368616e676520746869732070617373776f726420746f206120736563726574";
        let key = TicketKey::from_hex(hex_key).unwrap();
        assert_eq!(key, TicketKey::from_bytes(*b"change this password to a secret"));

        assert!(TicketKey::from_hex("deadbeef").is_err());
        assert!(TicketKey::from_hex("zz").is_err());
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = TicketKey::generate();
        assert_eq!(format!("{key:?}"), "TicketKey([redacted])");
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(input in proptest::collection::vec(".*", 0..6)) {
            let codec = codec();
            let ticket = codec.encode(&input).unwrap();
            prop_assert_eq!(codec.decode(&ticket).unwrap(), input);
        }
    }
}
