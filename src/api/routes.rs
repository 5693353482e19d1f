use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::middleware::require_bearer;
use crate::repositories::{InvoiceRepository, PatientRepository, UserRepository};
use crate::services::{AuthService, InvoiceService, PatientService, TokenService};

use super::handlers;

#[derive(Clone)]
pub struct AppState {
    pub patient_service: Arc<PatientService>,
    pub invoice_service: Arc<InvoiceService>,
    pub auth_service: Arc<AuthService>,
}

impl AppState {
    /// Wire every service over the given store handles.
    pub fn new(
        patients: Arc<dyn PatientRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        app_config: AppConfig,
    ) -> Self {
        Self {
            patient_service: Arc::new(PatientService::new(
                patients.clone(),
                invoices.clone(),
                app_config.clone(),
            )),
            invoice_service: Arc::new(InvoiceService::new(invoices, patients, app_config)),
            auth_service: Arc::new(AuthService::new(users, tokens)),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        // Patients
        .route(
            "/api/patients",
            get(handlers::list_patients)
                .post(handlers::create_patient)
                .with_state(state.patient_service.clone()),
        )
        .route(
            "/api/patients/{id}",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient)
                .with_state(state.patient_service.clone()),
        )
        // Invoices
        .route(
            "/api/invoices",
            get(handlers::list_invoices)
                .post(handlers::create_invoice)
                .with_state(state.invoice_service.clone()),
        )
        .route(
            "/api/invoices/{id}",
            get(handlers::get_invoice)
                .put(handlers::update_invoice)
                .delete(handlers::delete_invoice)
                .with_state(state.invoice_service.clone()),
        )
        // Identity
        .route("/api/auth/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.auth_service.tokens().clone(),
            require_bearer,
        ));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route(
            "/api/auth/login",
            post(handlers::login).with_state(state.auth_service.clone()),
        )
        .merge(protected)
}

async fn health_check() -> axum::Json<crate::api::dto::HealthResponse> {
    axum::Json(crate::api::dto::HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
    })
}
