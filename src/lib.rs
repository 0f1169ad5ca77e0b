//! # Gatepass
//!
//! Stateless, encrypted verification tickets for signup, invites and
//! password resets, plus the credential-grant plumbing that turns a
//! redeemed ticket into a provisioned account.
//!
//! ## Features
//!
//! - **Stateless**: a ticket is a self-contained encrypted payload;
//!   nothing is written at issuance
//! - **Authenticated encryption**: XChaCha20-Poly1305 under a rotating
//!   key set, base32-armored for URLs and email
//! - **Idempotent**: redeeming the same ticket twice converges on one
//!   account, with existing credentials never overwritten
//! - **Testable**: every collaborator sits behind a trait, with mocks
//!   shipped under the `test-utils` feature
//!
//! ## Flow
//!
//! ```text
//! TicketIssuer ── email ──▶ recipient ── grant ──▶ TicketRedeemer
//!                                                      │
//!                                      TicketVerifier ─┤ AccountProvisioner
//!                                                      ▼
//!                                            Account (+ subscription)
//! ```
//!
//! ## Example: invite round trip
//!
//! ```rust
//! use gatepass::{
//!     AccountProvisioner, Credential, TicketConfig, TicketIssuer, TicketKey,
//!     TicketRedeemer, TicketVerifier,
//! };
//! use gatepass::mocks::{MockAccountRepository, MockMailer, MockNotifier};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> gatepass::Result<()> {
//! let config = TicketConfig::new(TicketKey::generate());
//! let issuer = TicketIssuer::new(&config, MockMailer::new())?;
//! let repo = MockAccountRepository::new();
//! let redeemer = TicketRedeemer::new(
//!     TicketVerifier::new(&config)?,
//!     AccountProvisioner::new(repo.clone()),
//!     MockNotifier::new(),
//! );
//!
//! let ticket = issuer.issue_invite(
//!     "new.member@example.com",
//!     Credential::Randomize,
//!     Some("general"),
//!     None,
//! )?;
//! let redemption = redeemer.redeem(&ticket, "203.0.113.7").await?;
//! assert_eq!(redemption.account.email, "new.member@example.com");
//! assert_eq!(redemption.subscribed.as_deref(), Some("general"));
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod codec;
pub mod config;
pub mod error;
pub mod grant;
pub mod issuer;
pub mod providers;
pub mod provision;
pub mod redeem;
pub mod ticket;
pub mod utils;
pub mod verifier;

#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export core types
pub use codec::{CodecError, TicketCodec, TicketKey};
pub use config::{SmtpConfig, TicketConfig};
pub use error::{GatepassError, Result};
pub use grant::{CredentialGrantAdapter, GrantTokenKind, GrantVerifier};
pub use issuer::TicketIssuer;
pub use providers::{
    Account, AccountId, AccountRepository, ConsoleMailer, InMemoryReplayGuard, ReplayGuard,
    SmtpMailer, Subscription, SubscriptionNotifier, TicketMailer, TicketSink,
};
pub use provision::{hash_password, verify_password, AccountProvisioner};
pub use redeem::{Redemption, TicketRedeemer};
pub use ticket::{Credential, TicketClaims, TicketKind};
pub use verifier::TicketVerifier;
