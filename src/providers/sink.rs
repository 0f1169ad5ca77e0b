//! Issuance observer.

use crate::ticket::TicketKind;

/// Observer of issued tickets.
///
/// Injected into [`crate::TicketIssuer`] so tests can capture the
/// opaque ticket string without intercepting email delivery. The real
/// path runs with no sink installed and carries zero test-only state;
/// this replaces the kind of process-global "issued tickets" list that
/// leaks test plumbing into production code.
pub trait TicketSink: Send + Sync {
    /// Record a freshly issued ticket.
    fn record(&self, kind: TicketKind, email: &str, ticket: &str);
}
