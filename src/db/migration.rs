use scylla::Session;
use std::path::{Path, PathBuf};
use tokio::{
    fs,
    time::{Duration, sleep},
};
use tracing::{debug, error, info, warn};

use crate::config::ScyllaConfig;

use super::DbError;

const KEYSPACE_PLACEHOLDER: &str = "{keyspace}";
const KEYSPACE_SELECT_ATTEMPTS: usize = 6;

/// Apply every `.cql` file under `migrations/`, in file name order.
///
/// Statements are idempotent (`IF NOT EXISTS`); an "already exists" error is
/// logged and skipped so restarts against an initialised cluster succeed.
pub async fn run_migrations(session: &Session, config: &ScyllaConfig) -> Result<(), DbError> {
    let migrations_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let files = migration_files(&migrations_dir).await?;

    if files.is_empty() {
        warn!(
            "No migrations found in '{}'; skipping migration step",
            migrations_dir.display()
        );
        return Ok(());
    }

    info!("Applying {} migration file(s)", files.len());

    for path in files {
        let display_path = path.display().to_string();
        let source = fs::read_to_string(&path).await.map_err(|e| {
            DbError::MigrationError(format!("Failed to read {}: {}", display_path, e))
        })?;

        let statements = split_statements(&source.replace(KEYSPACE_PLACEHOLDER, &config.keyspace));
        info!(
            "Running {} statement(s) from {}",
            statements.len(),
            display_path
        );

        for (index, statement) in statements.iter().enumerate() {
            let creates_keyspace = statement.to_uppercase().starts_with("CREATE KEYSPACE");

            match session.query(statement.as_str(), &[]).await {
                Ok(_) => debug!("Statement {} applied from {}", index + 1, display_path),
                Err(err) if err.to_string().contains("already exists") => {
                    warn!("Statement {} skipped: {}", index + 1, err);
                }
                Err(err) => {
                    error!(
                        "Failed to execute statement {} from {}: {}",
                        index + 1,
                        display_path,
                        err
                    );
                    debug!("Statement {} content: {}", index + 1, statement);
                    return Err(DbError::MigrationError(format!(
                        "Statement {} in {} failed: {}",
                        index + 1,
                        display_path,
                        err
                    )));
                }
            }

            if creates_keyspace {
                if let Err(err) = session.await_schema_agreement().await {
                    warn!("Schema agreement wait failed: {}", err);
                }
                select_keyspace(session, &config.keyspace).await?;
            }
        }
    }

    info!("Database migrations applied successfully");
    Ok(())
}

async fn migration_files(dir: &Path) -> Result<Vec<PathBuf>, DbError> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| {
        DbError::MigrationError(format!(
            "Failed to read migrations directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DbError::MigrationError(format!("Failed to list migrations: {}", e)))?
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("cql") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Split a CQL script on `;`, dropping blank lines and `--` comments.
pub fn split_statements(source: &str) -> Vec<String> {
    source
        .split(';')
        .map(|chunk| {
            chunk
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with("--"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|statement| !statement.is_empty())
        .collect()
}

async fn select_keyspace(session: &Session, keyspace: &str) -> Result<(), DbError> {
    for attempt in 1..=KEYSPACE_SELECT_ATTEMPTS {
        match session.use_keyspace(keyspace, false).await {
            Ok(_) => {
                info!("Selected keyspace '{}'", keyspace);
                return Ok(());
            }
            Err(err) if attempt < KEYSPACE_SELECT_ATTEMPTS => {
                warn!(
                    "Attempt {} to select keyspace '{}' failed: {}",
                    attempt, keyspace, err
                );
                if let Err(refresh_err) = session.refresh_metadata().await {
                    warn!("Metadata refresh failed: {}", refresh_err);
                }
                sleep(Duration::from_millis(250 * attempt as u64)).await;
            }
            Err(err) => {
                return Err(DbError::MigrationError(format!(
                    "Unable to select keyspace '{}' after {} attempts: {}",
                    keyspace, attempt, err
                )));
            }
        }
    }

    Ok(())
}
