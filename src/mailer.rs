use std::path::Path;

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::info;

use crate::config::{EmailConfig, MailCredentials};

const BODY: &str = "Attached is your news summary for today.";

/// Sends the digest as an attachment over an implicit-TLS SMTP relay.
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    subject: String,
}

impl Mailer {
    pub fn new(config: &EmailConfig, credentials: &MailCredentials) -> Result<Self> {
        let creds = Credentials::new(credentials.sender.clone(), credentials.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .with_context(|| format!("invalid SMTP host {}", config.smtp_host))?
            .credentials(creds)
            .build();

        let from = credentials
            .sender
            .parse::<Mailbox>()
            .with_context(|| format!("invalid sender address {}", credentials.sender))?;
        let to = credentials
            .receiver
            .parse::<Mailbox>()
            .with_context(|| format!("invalid receiver address {}", credentials.receiver))?;

        Ok(Self {
            transport,
            from,
            to,
            subject: config.subject.clone(),
        })
    }

    pub async fn send_digest(&self, path: &Path) -> Result<()> {
        let contents =
            std::fs::read(path).with_context(|| format!("read digest {}", path.display()))?;
        let message = compose(
            self.from.clone(),
            self.to.clone(),
            &self.subject,
            &attachment_name(path),
            contents,
        )?;

        self.transport.send(message).await.context("send email")?;
        info!("Digest emailed to {}", self.to);
        Ok(())
    }
}

fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "news_summary.md".to_string())
}

/// Build the single digest message: a short text body plus the file attached.
pub fn compose(
    from: Mailbox,
    to: Mailbox,
    subject: &str,
    file_name: &str,
    contents: Vec<u8>,
) -> Result<Message> {
    let attachment = Attachment::new(file_name.to_string()).body(contents, ContentType::TEXT_PLAIN);

    Message::builder()
        .from(from)
        .to(to)
        .subject(subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(BODY.to_string()))
                .singlepart(attachment),
        )
        .context("build email")
}
