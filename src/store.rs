use crate::configuration::DatabaseSettings;
use crate::domain::RegistrationRecord;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use secrecy::ExposeSecret;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("The database is not available: {0}")]
    Unavailable(String),
    #[error("Failed to write the record")]
    Write(#[source] mongodb::error::Error),
}

/// Append-only storage for registrations.
#[async_trait::async_trait]
pub trait RegistrationStore: Send + Sync {
    async fn save(&self, record: &RegistrationRecord) -> Result<(), PersistenceError>;
}

struct Connection {
    client: Client,
    collection: Collection<RegistrationRecord>,
}

pub struct MongoRegistrationStore {
    connection: Result<Connection, String>,
}

impl MongoRegistrationStore {
    /// Never fails: a bad connection string leaves the store unavailable and
    /// every `save` reports it.
    pub async fn connect(settings: &DatabaseSettings) -> Self {
        let connection = match Self::client(settings).await {
            Ok(client) => {
                let database = client
                    .default_database()
                    .unwrap_or_else(|| client.database(&settings.database_name));
                let collection = database.collection::<RegistrationRecord>(&settings.collection);
                Ok(Connection { client, collection })
            }
            Err(e) => {
                tracing::error!("MongoDB connection error: {}", e);
                Err(e.to_string())
            }
        };
        Self { connection }
    }

    async fn client(settings: &DatabaseSettings) -> Result<Client, mongodb::error::Error> {
        let mut options = ClientOptions::parse(settings.uri.expose_secret()).await?;
        if let Some(timeout) = settings.server_selection_timeout() {
            options.server_selection_timeout = Some(timeout);
        }
        Client::with_options(options)
    }

    /// Round-trips to the server once and logs the outcome.
    #[tracing::instrument(name = "Checking the MongoDB connection", skip(self))]
    pub async fn ping(&self) -> Result<(), PersistenceError> {
        match self
            .connection()?
            .client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
        {
            Ok(_) => {
                tracing::info!("Connected to MongoDB");
                Ok(())
            }
            Err(e) => {
                tracing::error!("MongoDB connection error: {:?}", e);
                Err(PersistenceError::Unavailable(e.to_string()))
            }
        }
    }

    fn connection(&self) -> Result<&Connection, PersistenceError> {
        self.connection
            .as_ref()
            .map_err(|e| PersistenceError::Unavailable(e.clone()))
    }
}

#[async_trait::async_trait]
impl RegistrationStore for MongoRegistrationStore {
    #[tracing::instrument(name = "Saving a registration in the database", skip(self, record))]
    async fn save(&self, record: &RegistrationRecord) -> Result<(), PersistenceError> {
        self.connection()?
            .collection
            .insert_one(record)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert document: {:?}", e);
                PersistenceError::Write(e)
            })?;
        Ok(())
    }
}
