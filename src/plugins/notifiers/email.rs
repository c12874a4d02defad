use crate::config::SmtpConfig;
use crate::plugins::notifiers::escape_html;
use crate::plugins::traits::{NotificationEvent, NotifierPlugin};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

const CHANNEL: &str = "email";

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig, timeout: Duration) -> Result<Self> {
        let from_address = config
            .from_address
            .parse::<Address>()
            .map_err(|e| AppError::Validation(format!("Invalid from_address: {}", e)))?;
        let from = Mailbox::new(Some(config.from_name.clone()), from_address);

        let recipients = config
            .recipients
            .iter()
            .map(|r| {
                r.parse::<Mailbox>()
                    .map_err(|e| AppError::Validation(format!("Invalid recipient '{}': {}", r, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let mailer = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| AppError::Validation(format!("Invalid SMTP relay '{}': {}", config.host, e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        }
        .port(config.port)
        .credentials(credentials)
        .timeout(Some(timeout))
        .build();

        Ok(Self {
            mailer,
            from,
            recipients,
        })
    }

    fn format_subject(event: &NotificationEvent) -> String {
        format!("New listing: {}", event.item.title)
    }

    fn format_text_body(event: &NotificationEvent) -> String {
        let mut text = String::new();

        text.push_str(&format!("{}\n", event.item.title));
        text.push_str(&format!("{}\n", event.formatted_price()));
        text.push_str(&format!("{}\n", event.item.url));
        text.push_str(&format!("{}\n\n", event.item.image_url));
        text.push_str(&format!("Search: {}\n", event.query));
        text.push_str(&format!("Found: {}\n", event.discovered_at.to_rfc2822()));

        text
    }

    fn format_html_body(event: &NotificationEvent) -> String {
        let title = escape_html(&event.item.title);
        let url = escape_html(&event.item.url);
        let image = escape_html(&event.item.image_url);

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; }}
        .title {{ font-size: 18px; font-weight: bold; }}
        .price {{ margin: 10px 0; font-size: 16px; }}
        .meta {{ color: #6c757d; font-size: 12px; }}
    </style>
</head>
<body>
    <div class="title"><a href="{url}">{title}</a></div>
    <div class="price">{price}</div>
    <div><a href="{url}"><img src="{image}" alt="{title}" width="300"></a></div>
    <p><a href="{url}">{url}</a></p>
    <div class="meta">Search: {query}</div>
</body>
</html>
"#,
            url = url,
            title = title,
            price = escape_html(&event.formatted_price()),
            image = image,
            query = escape_html(&event.query),
        )
    }

    fn build_message(&self, event: &NotificationEvent) -> Result<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(Self::format_subject(event));
        for recipient in &self.recipients {
            builder = builder.to(recipient.clone());
        }

        builder
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(Self::format_text_body(event)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(Self::format_html_body(event)),
                    ),
            )
            .map_err(|e| AppError::delivery(CHANNEL, format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl NotifierPlugin for EmailNotifier {
    fn name(&self) -> &str {
        "Email Notifier"
    }

    fn plugin_type(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<()> {
        let email = self.build_message(event)?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| AppError::delivery(CHANNEL, format!("SMTP send failed: {}", e)))?;

        tracing::info!(channel = CHANNEL, item_id = %event.item.id, "Email sent");
        Ok(())
    }
}
