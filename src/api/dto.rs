use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Invoice, InvoiceChanges, InvoiceFilter, InvoiceView, NewInvoice, NewPatient, Patient,
    PatientChanges,
};
use crate::services::{Claims, IssuedToken};
use crate::utils::ListParams;

// Request DTOs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub full_name: String,
    pub document_id: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<CreatePatientRequest> for NewPatient {
    fn from(req: CreatePatientRequest) -> Self {
        NewPatient {
            full_name: req.full_name,
            document_id: req.document_id,
            birth_date: req.birth_date,
            email: req.email,
            phone: req.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<UpdatePatientRequest> for PatientChanges {
    fn from(req: UpdatePatientRequest) -> Self {
        PatientChanges {
            full_name: req.full_name,
            birth_date: req.birth_date,
            email: req.email,
            phone: req.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub patient_id: Uuid,
    pub number: String,
    pub amount: Decimal,
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paid: bool,
}

impl From<CreateInvoiceRequest> for NewInvoice {
    fn from(req: CreateInvoiceRequest) -> Self {
        NewInvoice {
            patient_id: req.patient_id,
            number: req.number,
            amount: req.amount,
            issued_at: req.issued_at,
            paid: req.paid,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceRequest {
    pub number: String,
    pub amount: Decimal,
    pub issued_at: DateTime<Utc>,
    #[serde(default)]
    pub paid: bool,
}

impl From<UpdateInvoiceRequest> for InvoiceChanges {
    fn from(req: UpdateInvoiceRequest) -> Self {
        InvoiceChanges {
            number: req.number,
            amount: req.amount,
            issued_at: req.issued_at,
            paid: req.paid,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// Query strings. Paging fields are spelled out per struct; serde_urlencoded
// cannot parse numbers through `#[serde(flatten)]`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientQuery {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl PatientQuery {
    pub fn list_params(&self) -> ListParams {
        ListParams {
            page: self.page,
            page_size: self.page_size,
            sort_by: self.sort_by.clone(),
            sort_dir: self.sort_dir.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    pub patient_id: Option<Uuid>,
    pub paid: Option<bool>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl InvoiceQuery {
    pub fn filter(&self) -> InvoiceFilter {
        InvoiceFilter {
            patient_id: self.patient_id,
            paid: self.paid,
            from: self.from,
            to: self.to,
        }
    }

    pub fn list_params(&self) -> ListParams {
        ListParams {
            page: self.page,
            page_size: self.page_size,
            sort_by: self.sort_by.clone(),
            sort_dir: self.sort_dir.clone(),
        }
    }
}

// Response DTOs
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id: Uuid,
    pub full_name: String,
    pub document_id: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        PatientResponse {
            id: patient.patient_id,
            full_name: patient.full_name,
            document_id: patient.document_id,
            birth_date: patient.birth_date,
            email: patient.email,
            phone: patient.phone,
            created_at: patient.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub number: String,
    pub amount: Decimal,
    pub issued_at: DateTime<Utc>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl From<InvoiceView> for InvoiceResponse {
    fn from(view: InvoiceView) -> Self {
        let InvoiceView {
            invoice,
            patient_name,
        } = view;
        let Invoice {
            invoice_id,
            patient_id,
            number,
            amount,
            issued_at,
            paid,
            created_at,
        } = invoice;

        InvoiceResponse {
            id: invoice_id,
            patient_id,
            patient_name,
            number,
            amount,
            issued_at,
            paid,
            created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for LoginResponse {
    fn from(token: IssuedToken) -> Self {
        LoginResponse {
            access_token: token.access_token,
            token_type: "Bearer".to_string(),
            expires_at: token.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<Claims> for MeResponse {
    fn from(claims: Claims) -> Self {
        MeResponse {
            user_id: claims.sub,
            username: claims.unique_name,
            email: claims.email,
            roles: claims.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
