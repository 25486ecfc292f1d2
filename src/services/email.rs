//! Email service for late-return notices

use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use serde::Serialize;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};

/// One overdue borrower to notify
#[derive(Debug, Clone)]
pub struct LateNotice {
    pub email: String,
    pub name: String,
    pub title: String,
    pub due_date: String,
    pub days_late: i64,
}

/// Outcome of a batch of notices
#[derive(Debug, Serialize, ToSchema)]
pub struct NoticeSummary {
    pub sent: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send overdue notices to a batch of borrowers; failures for one
    /// recipient do not abort the rest
    pub async fn send_late_notices(&self, notices: &[LateNotice]) -> NoticeSummary {
        let mut summary = NoticeSummary {
            sent: Vec::new(),
            failed: Vec::new(),
        };

        for notice in notices {
            match self.send_late_notice(notice).await {
                Ok(()) => summary.sent.push(notice.email.clone()),
                Err(e) => {
                    tracing::warn!(recipient = %notice.email, error = %e, "late notice failed");
                    summary.failed.push(notice.email.clone());
                }
            }
        }

        summary
    }

    /// Send a single overdue notice
    pub async fn send_late_notice(&self, notice: &LateNotice) -> AppResult<()> {
        let subject = format!("LIBRARY NOTICE: Overdue Item - {}", notice.title);
        let body = format!(
            r#"
Dear {name},

Our records indicate that you have an item that is now {days} days overdue.

    Title:    {title}
    Due date: {due}

Please return this item to the library as soon as possible.
If you have already returned this item, please disregard this notice.

Best regards,
Library Staff
"#,
            name = notice.name,
            days = notice.days_late,
            title = notice.title,
            due = notice.due_date,
        );

        self.send_email(&notice.email, &subject, &body).await
    }

    /// Generic email sending function
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Libris");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;

        let to_mailbox = Mailbox::from_str(to)
            .map_err(|e| AppError::Email(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(format!(
                                r#"<html><body><pre>{}</pre></body></html>"#,
                                body.replace('\n', "<br>")
                            )),
                    ),
            )
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer_builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Email(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let mailer_builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            mailer_builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            mailer_builder
        };

        let mailer = mailer_builder.build();

        mailer
            .send(&email)
            .map_err(|e| AppError::Email(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
