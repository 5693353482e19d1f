use labdesk::{
    api::{AppState, create_router},
    config::{Settings, StoreBackend},
    db::DbClient,
    repositories::{
        InvoiceRepository, MemoryStore, PatientRepository, ScyllaInvoiceRepository,
        ScyllaPatientRepository, ScyllaUserRepository, UserRepository,
    },
    services::TokenService,
};
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

type Stores = (
    Arc<dyn PatientRepository>,
    Arc<dyn InvoiceRepository>,
    Arc<dyn UserRepository>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "labdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::from_env().map_err(|e| format!("Failed to load settings: {}", e))?;

    tracing::info!("Starting labdesk service");

    let tokens = Arc::new(
        TokenService::new(&settings.jwt).map_err(|e| format!("Invalid JWT settings: {}", e))?,
    );

    let (patients, invoices, users) = open_stores(&settings).await?;

    let state = AppState::new(patients, invoices, users, tokens, settings.app.clone());

    if let Some(seed) = &settings.admin {
        state
            .auth_service
            .seed_admin(seed)
            .await
            .map_err(|e| format!("Failed to seed admin account: {}", e))?;
    }

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::new());

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check available at: http://{}/health", addr);
    tracing::info!("API endpoints available at: http://{}/api/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

async fn open_stores(settings: &Settings) -> Result<Stores, String> {
    match settings.app.store_backend {
        StoreBackend::Scylla => {
            tracing::info!("Connecting to ScyllaDB at: {:?}", settings.scylla.nodes);

            let db_client = DbClient::new(&settings.scylla)
                .await
                .map_err(|e| format!("Failed to connect to ScyllaDB: {}", e))?;

            tracing::info!("Successfully connected to ScyllaDB");

            let patients: Arc<dyn PatientRepository> =
                Arc::new(ScyllaPatientRepository::new(db_client.clone()));
            let invoices: Arc<dyn InvoiceRepository> =
                Arc::new(ScyllaInvoiceRepository::new(db_client.clone()));
            let users: Arc<dyn UserRepository> = Arc::new(ScyllaUserRepository::new(db_client));

            Ok((patients, invoices, users))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");

            let store = MemoryStore::new();
            let patients: Arc<dyn PatientRepository> = Arc::new(store.clone());
            let invoices: Arc<dyn InvoiceRepository> = Arc::new(store.clone());
            let users: Arc<dyn UserRepository> = Arc::new(store);

            Ok((patients, invoices, users))
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut terminate_signal = match signal(SignalKind::terminate()) {
            Ok(sig) => sig,
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl+C: {}", err);
                }
                return;
            }
        };

        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(err) = res {
                    tracing::error!("Failed to listen for Ctrl+C: {}", err);
                }
            },
            _ = terminate_signal.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
        }
    }

    tracing::info!("Shutdown signal received, commencing graceful shutdown");
}
