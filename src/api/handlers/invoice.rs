use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{
    dto::{CreateInvoiceRequest, InvoiceQuery, InvoiceResponse, UpdateInvoiceRequest},
    error::ApiError,
    extract::{ApiPath, ApiQuery, JsonBody},
};
use crate::services::InvoiceService;
use crate::utils::PagedResult;

pub async fn list_invoices(
    State(service): State<Arc<InvoiceService>>,
    ApiQuery(query): ApiQuery<InvoiceQuery>,
) -> Result<Json<PagedResult<InvoiceResponse>>, ApiError> {
    let page = service
        .list_invoices(&query.filter(), &query.list_params())
        .await?;

    Ok(Json(page.map_items(InvoiceResponse::from)))
}

pub async fn get_invoice(
    State(service): State<Arc<InvoiceService>>,
    ApiPath(invoice_id): ApiPath<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let invoice = service.get_invoice(invoice_id).await?;

    Ok(Json(invoice.into()))
}

pub async fn create_invoice(
    State(service): State<Arc<InvoiceService>>,
    JsonBody(payload): JsonBody<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let view = service.create_invoice(payload.into()).await?;
    let location = format!("/api/invoices/{}", view.invoice.invoice_id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(InvoiceResponse::from(view)),
    ))
}

pub async fn update_invoice(
    State(service): State<Arc<InvoiceService>>,
    ApiPath(invoice_id): ApiPath<Uuid>,
    JsonBody(payload): JsonBody<UpdateInvoiceRequest>,
) -> Result<StatusCode, ApiError> {
    service.update_invoice(invoice_id, payload.into()).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_invoice(
    State(service): State<Arc<InvoiceService>>,
    ApiPath(invoice_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    service.delete_invoice(invoice_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
