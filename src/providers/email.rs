//! Email delivery contract.

use crate::error::Result;
use crate::ticket::TicketKind;
use std::future::Future;

/// Outbound ticket email delivery.
///
/// This trait abstracts over the delivery mechanism (SMTP relay,
/// SendGrid, AWS SES, …). The core supplies the ticket kind, the
/// recipient and the opaque ticket string; how the message is rendered
/// and delivered is entirely the implementation's business.
pub trait TicketMailer: Send + Sync {
    /// Deliver a ticket to its recipient.
    ///
    /// # Errors
    ///
    /// Returns `GatepassError::EmailDelivery` if the message cannot be
    /// built or handed to the transport.
    fn send_ticket(
        &self,
        kind: TicketKind,
        recipient: &str,
        ticket: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}
