use crate::email_client::{EmailClient, SmtpSecurity};
use secrecy::Secret;
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_option_number_from_string,
};
use std::time::Duration;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub uri: Secret<String>,
    /// Used when the connection string does not name a database.
    pub database_name: String,
    pub collection: String,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub server_selection_timeout_milliseconds: Option<u64>,
}

impl DatabaseSettings {
    pub fn server_selection_timeout(&self) -> Option<Duration> {
        self.server_selection_timeout_milliseconds
            .map(Duration::from_millis)
    }
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MailTransportKind {
    Smtp,
    Http,
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub transport: MailTransportKind,
    /// Relay account. Notifications are sent from this address.
    pub username: String,
    pub password: Secret<String>,
    /// Falls back to `username` when unset.
    #[serde(default)]
    pub recipient: Option<String>,
    pub smtp_host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub smtp_port: u16,
    pub smtp_security: SmtpSecurity,
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn client(&self) -> Result<EmailClient, anyhow::Error> {
        match self.transport {
            MailTransportKind::Smtp => EmailClient::smtp(self),
            MailTransportKind::Http => EmailClient::http(self),
        }
    }

    pub fn recipient(&self) -> &str {
        self.recipient.as_deref().unwrap_or(&self.username)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

/// Flat variables of the original deployment, first name wins.
const FLAT_OVERRIDES: &[(&str, &[&str])] = &[
    ("database.uri", &["DB_URI", "MONGO_URI"]),
    ("email_client.username", &["MAIL_USER", "EMAIL_USER"]),
    ("email_client.password", &["MAIL_PASS", "EMAIL_PASS"]),
    ("application.port", &["PORT"]),
];

fn first_env_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let mut builder = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // E.g. `APP_APPLICATION__PORT=5001` sets `Settings.application.port`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        );

    for (key, names) in FLAT_OVERRIDES {
        builder = builder.set_override_option(*key, first_env_var(names))?;
    }

    builder.build()?.try_deserialize::<Settings>()
}
