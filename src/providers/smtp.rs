//! SMTP ticket mailer using Lettre.

use crate::config::SmtpConfig;
use crate::error::{GatepassError, Result};
use crate::providers::TicketMailer;
use crate::ticket::TicketKind;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// SMTP ticket mailer.
///
/// Sends real verification emails via an SMTP relay, suitable for
/// production use. A fresh transport is built per send to avoid
/// connection pooling issues, and the blocking send runs on the
/// blocking thread pool.
#[derive(Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
    credentials: Credentials,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    #[must_use]
    pub fn new(config: SmtpConfig) -> Self {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        Self {
            config,
            credentials,
        }
    }

    fn build_transport(&self) -> Result<SmtpTransport> {
        Ok(SmtpTransport::relay(&self.config.server)
            .map_err(|e| GatepassError::EmailDelivery(format!("SMTP relay error: {e}")))?
            .port(self.config.port)
            .credentials(self.credentials.clone())
            .build())
    }

    fn from_header(&self) -> String {
        format!("{} <{}>", self.config.from_name, self.config.from_email)
    }

    fn subject(kind: TicketKind) -> &'static str {
        match kind {
            TicketKind::Signup => "Account Registration",
            TicketKind::Invite => "Invitation to Networking Group",
            TicketKind::PasswordReset => "Password Reset Verification",
        }
    }

    fn verification_link(&self, kind: TicketKind, ticket: &str) -> String {
        let base = &self.config.base_url;
        match kind {
            TicketKind::Signup | TicketKind::Invite => {
                format!("{base}/#/signup/verify/{ticket}")
            }
            TicketKind::PasswordReset => format!("{base}/#/signup/reset/{ticket}"),
        }
    }

    fn html_body(&self, kind: TicketKind, link: &str) -> String {
        let (headline, lead) = match kind {
            TicketKind::Signup => (
                "Confirm your registration",
                "Click the link below to finish creating your account. The link is valid for 24 hours.",
            ),
            TicketKind::Invite => (
                "You have been invited",
                "Click the link below to accept the invitation and join the group. The link is valid for 24 hours.",
            ),
            TicketKind::PasswordReset => (
                "Reset your password",
                "Click the link below to reset your password. The link is valid for 24 hours.",
            ),
        };

        format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        <h2>{headline}</h2>
        <p>{lead}</p>
        <p style="margin: 30px 0;">
            <a href="{link}"
               style="display: inline-block; background-color: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px;">
                Continue
            </a>
        </p>
        <p style="color: #666; font-size: 14px;">
            If you didn't request this email, you can safely ignore it.
        </p>
        <p style="color: #666; font-size: 12px; margin-top: 40px;">
            Or copy and paste this link into your browser:<br>
            {link}
        </p>
    </div>
</body>
</html>
"#
        )
    }
}

impl TicketMailer for SmtpMailer {
    async fn send_ticket(&self, kind: TicketKind, recipient: &str, ticket: &str) -> Result<()> {
        let link = self.verification_link(kind, ticket);

        let email = Message::builder()
            .from(
                self.from_header()
                    .parse()
                    .map_err(|e| GatepassError::EmailDelivery(format!("invalid from address: {e}")))?,
            )
            .to(recipient
                .parse()
                .map_err(|e| GatepassError::EmailDelivery(format!("invalid to address: {e}")))?)
            .subject(Self::subject(kind))
            .header(ContentType::TEXT_HTML)
            .body(self.html_body(kind, &link))
            .map_err(|e| GatepassError::EmailDelivery(format!("failed to build email: {e}")))?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| GatepassError::EmailDelivery(format!("failed to send email: {e}")))
        })
        .await
        .map_err(|e| GatepassError::EmailDelivery(format!("email task failed: {e}")))?
        .map(|_| ())
    }
}
