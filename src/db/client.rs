use scylla::frame::response::result::CqlValue;
use scylla::{QueryResult, Session, SessionBuilder};
use std::sync::Arc;
use thiserror::Error;

use crate::config::ScyllaConfig;

use super::migration;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] scylla::transport::errors::NewSessionError),

    #[error("Query error: {0}")]
    QueryError(#[from] scylla::transport::errors::QueryError),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Not found")]
    NotFound,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    MigrationError(String),
}

#[derive(Clone)]
pub struct DbClient {
    session: Arc<Session>,
}

impl DbClient {
    pub async fn new(config: &ScyllaConfig) -> Result<Self, DbError> {
        tracing::info!("Initializing Scylla session with nodes {:?}", config.nodes);
        let mut builder = SessionBuilder::new().known_nodes(&config.nodes);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.user(username, password);
        }
        let session = builder.build().await?;

        tracing::info!("Scylla session established, starting migrations");
        migration::run_migrations(&session, config).await?;

        tracing::info!(
            "Migrations complete, selecting keyspace '{}'",
            config.keyspace
        );
        session.use_keyspace(&config.keyspace, false).await?;
        tracing::info!("Keyspace '{}' selected", config.keyspace);

        Ok(DbClient {
            session: Arc::new(session),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Read the `[applied]` flag a lightweight transaction returns as its first column.
pub fn lwt_applied(result: &QueryResult) -> Result<bool, DbError> {
    let row = result
        .rows
        .as_ref()
        .and_then(|rows| rows.first())
        .ok_or_else(|| {
            DbError::SerializationError("Conditional write returned no rows".to_string())
        })?;

    match row.columns.first() {
        Some(Some(CqlValue::Boolean(applied))) => Ok(*applied),
        other => Err(DbError::SerializationError(format!(
            "Unexpected [applied] column: {:?}",
            other
        ))),
    }
}
