use crate::configuration::Settings;
use crate::email_client::EmailClient;
use crate::routes::{health_check, home, submit, submit_review};
use crate::store::{MongoRegistrationStore, RegistrationStore};
use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Builds the application against the configured MongoDB deployment.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let store = Arc::new(MongoRegistrationStore::connect(&configuration.database).await);
        // Requests fail on their own while the database is down
        let probe = store.clone();
        tokio::spawn(async move {
            if probe.ping().await.is_err() {
                tracing::warn!("Serving requests without a database connection");
            }
        });
        Self::build_with_store(configuration, store)
    }

    pub fn build_with_store(
        configuration: Settings,
        store: Arc<dyn RegistrationStore>,
    ) -> Result<Self, anyhow::Error> {
        let email_client = configuration.email_client.client()?;

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, store, email_client)?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn RegistrationStore>,
    email_client: EmailClient,
) -> Result<Server, anyhow::Error> {
    let store: Data<dyn RegistrationStore> = Data::from(store);
    let email_client = Data::new(email_client);
    let server = HttpServer::new(move || {
        App::new()
            // Middleware
            .wrap(Cors::permissive())
            .wrap(TracingLogger::default())
            .route("/", web::get().to(home))
            .route("/health_check", web::get().to(health_check))
            .route("/submit", web::post().to(submit))
            .route("/submit-review", web::post().to(submit_review))
            .app_data(store.clone())
            .app_data(email_client.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
