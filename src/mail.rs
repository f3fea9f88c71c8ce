use crate::configuration::MailSettings;
use crate::data_models::ContactRecord;
use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::future::Future;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("invalid recipient address: {0}")]
    Address(#[from] AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Transport(#[from] SmtpError),
    #[error("relay rejected message with code {0}")]
    Rejected(String),
}

/// Sends the confirmation mail for a validated contact.
#[cfg_attr(test, mockall::automock)]
pub trait MailSender: Send + Sync + 'static {
    fn send(&self, record: ContactRecord) -> impl Future<Output = Result<(), MailError>> + Send;
}

/// Plain SMTP relay without TLS or authentication, like a local MTA.
#[derive(Debug, Clone)]
pub struct SmtpMailSender {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailSender {
    pub fn new(settings: &MailSettings) -> Self {
        let transport =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.relay_host.as_str())
                .port(settings.relay_port)
                .build();
        Self {
            from: Mailbox::new(None, settings.from.clone()),
            transport,
        }
    }

    pub fn message(&self, record: &ContactRecord) -> Result<Message, MailError> {
        let to: Mailbox = record.mail.parse()?;
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(record.title.as_str())
            .date_now()
            .header(ContentType::TEXT_PLAIN)
            .body(record.body.clone())?;
        Ok(message)
    }
}

impl MailSender for SmtpMailSender {
    async fn send(&self, record: ContactRecord) -> Result<(), MailError> {
        let message = self.message(&record)?;
        let response = self.transport.send(message).await?;
        if !response.is_positive() {
            return Err(MailError::Rejected(response.code().to_string()));
        }
        Ok(())
    }
}
