use axum::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::{
    email::{MailError, Mailer, OutgoingEmail},
    settings::SmtpSettings,
};

const SENDER_NAME: &str = "JRMSU Tabulation System";

/// The SMTPS port. Any other port is expected to upgrade with STARTTLS.
pub const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    Implicit,
    StartTls,
}

impl TlsMode {
    pub fn for_port(port: u16) -> Self {
        if port == IMPLICIT_TLS_PORT {
            TlsMode::Implicit
        } else {
            TlsMode::StartTls
        }
    }
}

/// Sends mail through an SMTP relay, using implicit TLS on port 465 and
/// STARTTLS elsewhere (e.g. 587).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let sender =
            Mailbox::new(Some(SENDER_NAME.to_string()), settings.user.parse()?);

        let builder = match TlsMode::for_port(settings.port) {
            TlsMode::Implicit => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
            }
            TlsMode::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(
                    &settings.host,
                )?
            }
        };
        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self { transport, sender })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(email.to.parse::<Mailbox>()?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// Stands in when no SMTP credentials are configured; every send fails with
/// an explanatory message.
pub struct UnconfiguredMailer {
    reason: String,
}

impl UnconfiguredMailer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Unconfigured(self.reason.clone()))
    }
}
