//! Console ticket mailer for local development.

use crate::error::Result;
use crate::providers::TicketMailer;
use crate::ticket::TicketKind;

/// Ticket mailer that logs instead of sending.
///
/// Useful during development: the ticket shows up in the process log
/// and can be pasted straight into the frontend, no SMTP relay needed.
#[derive(Debug, Clone, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    /// Create a new console mailer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TicketMailer for ConsoleMailer {
    async fn send_ticket(&self, kind: TicketKind, recipient: &str, ticket: &str) -> Result<()> {
        tracing::info!(
            kind = kind.as_str(),
            recipient,
            ticket,
            "ticket email (console delivery)"
        );
        Ok(())
    }
}
