use crate::configuration::EmailClientSettings;
use anyhow::Context;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use std::fmt::Formatter;

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// Implicit TLS, usually port 465.
    Tls,
    /// Plain connection upgraded with STARTTLS, usually port 587.
    StartTls,
    /// No encryption and no authentication. Local relays only.
    None,
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Invalid login: {0}")]
    Authentication(String),
    #[error("Could not reach the mail relay: {0}")]
    Network(String),
    #[error("Message rejected by the mail relay: {0}")]
    Rejected(String),
    #[error("Could not build the message: {0}")]
    Message(String),
}

impl SendError {
    fn from_smtp(e: lettre::transport::smtp::Error) -> Self {
        match e.status() {
            // 530, 534 and 535 are the authentication failures relays send back
            Some(code) if code.to_string().starts_with("53") => {
                SendError::Authentication(e.to_string())
            }
            Some(_) => SendError::Rejected(e.to_string()),
            None => SendError::Network(e.to_string()),
        }
    }
}

/// What the relay answered when it accepted a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt(String);

impl AsRef<str> for Receipt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Receipt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
enum Transport {
    Smtp {
        mailer: AsyncSmtpTransport<Tokio1Executor>,
        sender: Mailbox,
        recipient: Mailbox,
    },
    Http {
        http_client: Client,
        base_url: String,
        username: String,
        password: Secret<String>,
    },
}

/// Sends plain-text notifications from the relay account to a fixed recipient.
#[derive(Debug)]
pub struct EmailClient {
    sender: String,
    recipient: String,
    transport: Transport,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text_body: &'a str,
}

impl EmailClient {
    pub fn smtp(settings: &EmailClientSettings) -> Result<Self, anyhow::Error> {
        let sender: Mailbox = settings
            .username
            .parse()
            .with_context(|| format!("`{}` is not a valid sender address", settings.username))?;
        let recipient: Mailbox = settings
            .recipient()
            .parse()
            .with_context(|| format!("`{}` is not a valid recipient", settings.recipient()))?;

        let credentials = Credentials::new(
            settings.username.clone(),
            settings.password.expose_secret().clone(),
        );
        let builder = match settings.smtp_security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?
                .credentials(credentials),
            SmtpSecurity::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
                    .credentials(credentials)
            }
            SmtpSecurity::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_host)
            }
        };
        let mailer = builder
            .port(settings.smtp_port)
            .timeout(Some(settings.timeout()))
            .build();

        Ok(Self {
            sender: settings.username.clone(),
            recipient: settings.recipient().to_owned(),
            transport: Transport::Smtp {
                mailer,
                sender,
                recipient,
            },
        })
    }

    pub fn http(settings: &EmailClientSettings) -> Result<Self, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("Failed to build the HTTP client for the mail relay")?;
        Ok(Self {
            sender: settings.username.clone(),
            recipient: settings.recipient().to_owned(),
            transport: Transport::Http {
                http_client,
                base_url: settings.base_url.clone(),
                username: settings.username.clone(),
                password: settings.password.clone(),
            },
        })
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    #[tracing::instrument(
        name = "Sending a notification email",
        skip(self, body),
        fields(recipient = %self.recipient)
    )]
    pub async fn send_notification(&self, subject: &str, body: &str) -> Result<Receipt, SendError> {
        let result = match &self.transport {
            Transport::Smtp {
                mailer,
                sender,
                recipient,
            } => send_smtp(mailer, sender, recipient, subject, body).await,
            Transport::Http {
                http_client,
                base_url,
                username,
                password,
            } => {
                let request = SendEmailRequest {
                    from: &self.sender,
                    to: &self.recipient,
                    subject,
                    text_body: body,
                };
                send_http(http_client, base_url, username, password, &request).await
            }
        };
        match &result {
            Ok(receipt) => tracing::info!("Email sent: {}", receipt),
            Err(e) => tracing::error!("Error sending email: {}", e),
        }
        result
    }
}

async fn send_smtp(
    mailer: &AsyncSmtpTransport<Tokio1Executor>,
    sender: &Mailbox,
    recipient: &Mailbox,
    subject: &str,
    body: &str,
) -> Result<Receipt, SendError> {
    let message = Message::builder()
        .from(sender.clone())
        .to(recipient.clone())
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_owned())
        .map_err(|e| SendError::Message(e.to_string()))?;

    let response = mailer.send(message).await.map_err(SendError::from_smtp)?;
    let text = response.message().collect::<Vec<_>>().join(" ");
    Ok(Receipt(format!("{} {}", response.code(), text)))
}

async fn send_http(
    http_client: &Client,
    base_url: &str,
    username: &str,
    password: &Secret<String>,
    request: &SendEmailRequest<'_>,
) -> Result<Receipt, SendError> {
    let url = format!("{}/email", base_url);
    let response = http_client
        .post(&url)
        .basic_auth(username, Some(password.expose_secret()))
        .json(request)
        .send()
        .await
        .map_err(|e| SendError::Network(e.to_string()))?;

    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SendError::Authentication(
            format!("the relay answered {}", status),
        )),
        s if !s.is_success() => Err(SendError::Rejected(format!("the relay answered {}", s))),
        _ => {
            let text = response.text().await.unwrap_or_default();
            Ok(Receipt(format!("{} {}", status.as_u16(), text).trim_end().to_owned()))
        }
    }
}
