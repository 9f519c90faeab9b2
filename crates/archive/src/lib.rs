//! The archive sink: serialises accepted service records to a fixed JSON
//! document (with remarks pre-rendered in both languages) and pushes them
//! onto the head of a list on a remote Redis queue. A failed push is logged
//! and dropped; the dispatcher never stalls on the archive.

mod document;

pub use document::{archive_document, ArchivedService};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;

use receiver::ServiceSink;

/// Name of the list the archiver pushes to.
const QUEUE_KEY: &str = "services";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive queue error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Queue server address, e.g. `localhost:6379`.
    pub address: String,
    pub password: String,
    pub db: i64,
}

impl ArchiveConfig {
    fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}/{}", self.address, self.db)
        } else {
            format!("redis://:{}@{}/{}", self.password, self.address, self.db)
        }
    }
}

/// A connected archive queue client.
pub struct ArchiveClient {
    connection: ConnectionManager,
}

impl ArchiveClient {
    /// Connects to the queue server and verifies the connection with a ping.
    pub async fn connect(config: &ArchiveConfig) -> Result<Self, ArchiveError> {
        tracing::info!(address = %config.address, db = config.db, "connecting to archive queue");

        let client = redis::Client::open(config.url())?;
        let mut connection = client.get_connection_manager().await?;

        let _: String = redis::cmd("PING").query_async(&mut connection).await?;

        Ok(Self { connection })
    }

    /// Pushes one service onto the queue. Failures are logged, never
    /// propagated: losing an archive entry must not affect ingestion.
    pub async fn push(&self, service: &model::Service) {
        let document = match serde_json::to_string(&archive_document(service)) {
            Ok(document) => document,
            Err(error) => {
                tracing::error!(
                    service_id = service.id,
                    error = %error,
                    "archiver: could not serialise service"
                );
                return;
            }
        };

        let mut connection = self.connection.clone();
        let result: Result<(), _> = connection.lpush(QUEUE_KEY, document).await;

        if let Err(error) = result {
            tracing::error!(
                service_id = service.id,
                product_id = service.product_id,
                error = %error,
                "archiver: could not add service to queue"
            );
        }
    }
}

#[async_trait]
impl ServiceSink for ArchiveClient {
    async fn push(&self, service: &model::Service) {
        ArchiveClient::push(self, service).await;
    }
}
