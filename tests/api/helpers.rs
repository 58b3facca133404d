use enlightened_sage::configuration::{get_configuration, MailTransportKind, Settings};
use enlightened_sage::domain::RegistrationRecord;
use enlightened_sage::startup::Application;
use enlightened_sage::store::{PersistenceError, RegistrationStore};
use enlightened_sage::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

/// Keeps every saved registration in memory.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<RegistrationRecord>>,
}

impl InMemoryStore {
    pub fn records(&self) -> Vec<RegistrationRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RegistrationStore for InMemoryStore {
    async fn save(&self, record: &RegistrationRecord) -> Result<(), PersistenceError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Behaves like a database that cannot be reached.
pub struct UnavailableStore;

#[async_trait::async_trait]
impl RegistrationStore for UnavailableStore {
    async fn save(&self, _record: &RegistrationRecord) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable(
            "connection refused".to_string(),
        ))
    }
}

pub struct TestApp {
    pub address: String,
    pub email_server: MockServer,
    pub store: Arc<InMemoryStore>,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_submit(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_raw("/submit", body.to_string()).await
    }

    pub async fn post_review(&self, body: &serde_json::Value) -> reqwest::Response {
        self.post_raw("/submit-review", body.to_string()).await
    }

    pub async fn post_raw(&self, path: &str, body: String) -> reqwest::Response {
        self.post_with_content_type(path, "application/json", body)
            .await
    }

    pub async fn post_with_content_type(
        &self,
        path: &str,
        content_type: &str,
        body: String,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!("{}{}", &self.address, path))
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// JSON bodies of every request the mail relay received.
    pub async fn sent_emails(&self) -> Vec<serde_json::Value> {
        self.email_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect()
    }
}

fn test_settings(relay_url: String) -> Settings {
    let mut configuration = get_configuration().expect("Failed to read configuration");
    configuration.application.port = 0; // Random OS port
    configuration.email_client.transport = MailTransportKind::Http;
    configuration.email_client.base_url = relay_url;
    configuration.email_client.timeout_milliseconds = 2000;
    configuration
}

// Launch our application in the background ~somehow~
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(InMemoryStore::default());
    spawn(store.clone(), store, None).await
}

/// Every write fails; `TestApp::store` stays empty.
pub async fn spawn_app_with_failing_store() -> TestApp {
    spawn(
        Arc::new(UnavailableStore),
        Arc::new(InMemoryStore::default()),
        None,
    )
    .await
}

/// Points the email client at a port nobody listens on.
pub async fn spawn_app_with_unreachable_relay() -> TestApp {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let relay_url = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());
    drop(listener);

    let store = Arc::new(InMemoryStore::default());
    spawn(store.clone(), store, Some(relay_url)).await
}

async fn spawn(
    store: Arc<dyn RegistrationStore>,
    observed: Arc<InMemoryStore>,
    relay_url: Option<String>,
) -> TestApp {
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let settings = test_settings(relay_url.unwrap_or_else(|| email_server.uri()));

    let application = Application::build_with_store(settings, store)
        .expect("Failed to build application");
    let port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        email_server,
        store: observed,
        api_client: reqwest::Client::new(),
    }
}
