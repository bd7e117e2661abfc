//! Mail Service - order confirmations over SMTP

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::{DomainError, Order};
use crate::infrastructure::config::{Config, SmtpConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), DomainError>;
}

/// Used when SMTP is not configured; drops every message.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), DomainError> {
        tracing::debug!("Email disabled, not sending '{}' to {}", email.subject, email.to);
        Ok(())
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, DomainError> {
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| DomainError::Internal(format!("Invalid SMTP host: {}", e)))?
        .port(config.port);

        let builder = match (&config.username, &config.password) {
            (Some(user), Some(password)) => {
                builder.credentials(Credentials::new(user.clone(), password.clone()))
            }
            _ => builder,
        };

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| DomainError::Internal(format!("Invalid SMTP_FROM: {}", e)))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), DomainError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| DomainError::Validation(format!("Invalid recipient: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DomainError::External(e.to_string()))?;
        Ok(())
    }
}

pub fn mailer_from_config(config: &Config) -> Arc<dyn Mailer> {
    match &config.smtp {
        Some(smtp) => match SmtpMailer::new(smtp) {
            Ok(mailer) => {
                tracing::info!("Order emails will be sent through {}", smtp.host);
                Arc::new(mailer)
            }
            Err(e) => {
                tracing::error!("SMTP disabled: {}", e);
                Arc::new(DisabledMailer)
            }
        },
        None => Arc::new(DisabledMailer),
    }
}

/// Plain-text order confirmation.
pub fn order_confirmation(order: &Order, to: &str) -> OutgoingEmail {
    let mut body = String::new();
    let greeting = order.customer_name.as_deref().unwrap_or("לקוח יקר");
    body.push_str(&format!("שלום {},\n\n", greeting));
    body.push_str(&format!("הזמנתך מספר {} התקבלה.\n\n", order.id));

    for item in &order.items {
        body.push_str(&format!(
            "{} × {}: ₪{:.2}\n",
            item.quantity,
            item.title,
            item.price * f64::from(item.quantity)
        ));
    }

    body.push_str(&format!("\nמשלוח: ₪{:.2}\n", order.shipping_price));
    body.push_str(&format!("סה\"כ: ₪{:.2}\n", order.total));

    if let Some(address) = &order.address {
        let city = order.city.as_deref().unwrap_or_default();
        body.push_str(&format!("\nכתובת למשלוח: {} {}\n", address, city));
    }

    body.push_str("\nתודה שקניתם אצלנו!\n");

    OutgoingEmail {
        to: to.to_string(),
        subject: format!("אישור הזמנה #{}", order.id),
        body,
    }
}
