use crate::config::MailSettings;
use crate::domain::service::{Email, Mailer};
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

/// Delivers email through an SMTP relay with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &MailSettings) -> anyhow::Result<SmtpMailer> {
        let (Some(server), Some(username), Some(password), Some(sender)) = (
            settings.server.as_deref(),
            settings.username.as_deref(),
            settings.password.as_deref(),
            settings.sender(),
        ) else {
            bail!("SMTP is not fully configured");
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(server)?
            .port(settings.port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(SmtpMailer {
            transport,
            from: sender.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email.to.parse()?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)?;

        self.transport.send(message).await?;
        log::info!(to = email.to.as_str(); "Email sent");
        Ok(())
    }
}

/// Stand-in used when SMTP settings are missing. Every send fails.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        log::warn!(to = email.to.as_str(), subject = email.subject.as_str(); "SMTP not configured");
        Err(anyhow!("SMTP not configured"))
    }
}

/// Picks [`SmtpMailer`] when the settings allow it, [`LogMailer`] otherwise.
pub fn from_settings(settings: &MailSettings) -> anyhow::Result<Arc<dyn Mailer>> {
    if settings.is_configured() {
        Ok(Arc::new(SmtpMailer::new(settings)?))
    } else {
        log::warn!("SMTP not configured, emails will be dropped");
        Ok(Arc::new(LogMailer))
    }
}
