use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{
    dto::{CreatePatientRequest, PatientQuery, PatientResponse, UpdatePatientRequest},
    error::ApiError,
    extract::{ApiPath, ApiQuery, JsonBody},
};
use crate::services::PatientService;
use crate::utils::PagedResult;

pub async fn list_patients(
    State(service): State<Arc<PatientService>>,
    ApiQuery(query): ApiQuery<PatientQuery>,
) -> Result<Json<PagedResult<PatientResponse>>, ApiError> {
    let page = service
        .list_patients(query.q.as_deref(), &query.list_params())
        .await?;

    Ok(Json(page.map_items(PatientResponse::from)))
}

pub async fn get_patient(
    State(service): State<Arc<PatientService>>,
    ApiPath(patient_id): ApiPath<Uuid>,
) -> Result<Json<PatientResponse>, ApiError> {
    let patient = service.get_patient(patient_id).await?;

    Ok(Json(patient.into()))
}

pub async fn create_patient(
    State(service): State<Arc<PatientService>>,
    JsonBody(payload): JsonBody<CreatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patient = service.create_patient(payload.into()).await?;
    let location = format!("/api/patients/{}", patient.patient_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PatientResponse::from(patient)),
    ))
}

pub async fn update_patient(
    State(service): State<Arc<PatientService>>,
    ApiPath(patient_id): ApiPath<Uuid>,
    JsonBody(payload): JsonBody<UpdatePatientRequest>,
) -> Result<StatusCode, ApiError> {
    service.update_patient(patient_id, payload.into()).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_patient(
    State(service): State<Arc<PatientService>>,
    ApiPath(patient_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    service.delete_patient(patient_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
