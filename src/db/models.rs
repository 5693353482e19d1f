use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use scylla::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::{Invoice, Patient, User};

// Database row model for patients table
#[derive(Debug, Clone, FromRow)]
pub struct PatientRow {
    pub patient_id: Uuid,
    pub full_name: String,
    pub document_id: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PatientRow {
    pub fn from_patient(patient: &Patient) -> Self {
        PatientRow {
            patient_id: patient.patient_id,
            full_name: patient.full_name.clone(),
            document_id: patient.document_id.clone(),
            birth_date: patient.birth_date,
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            created_at: patient.created_at,
        }
    }

    pub fn to_patient(self) -> Patient {
        Patient {
            patient_id: self.patient_id,
            full_name: self.full_name,
            document_id: self.document_id,
            birth_date: self.birth_date,
            email: self.email,
            phone: self.phone,
            created_at: self.created_at,
        }
    }
}

// Database row model for invoices table; amount is kept as its decimal string
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub invoice_id: Uuid,
    pub patient_id: Uuid,
    pub number: String,
    pub amount: String,
    pub issued_at: DateTime<Utc>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

impl InvoiceRow {
    pub fn from_invoice(invoice: &Invoice) -> Self {
        InvoiceRow {
            invoice_id: invoice.invoice_id,
            patient_id: invoice.patient_id,
            number: invoice.number.clone(),
            amount: invoice.amount.to_string(),
            issued_at: invoice.issued_at,
            paid: invoice.paid,
            created_at: invoice.created_at,
        }
    }

    pub fn to_invoice(self) -> Result<Invoice, String> {
        let amount = Decimal::from_str(&self.amount)
            .map_err(|e| format!("Invalid amount '{}': {}", self.amount, e))?;

        Ok(Invoice {
            invoice_id: self.invoice_id,
            patient_id: self.patient_id,
            number: self.number,
            amount,
            issued_at: self.issued_at,
            paid: self.paid,
            created_at: self.created_at,
        })
    }
}

// Database row model for users table
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub username: String,
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub roles: Option<Vec<String>>,
}

impl UserRow {
    pub fn from_user(user: &User) -> Self {
        UserRow {
            username: user.username.clone(),
            user_id: user.user_id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            roles: Some(user.roles.clone()),
        }
    }

    pub fn to_user(self) -> User {
        User {
            user_id: self.user_id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            roles: self.roles.unwrap_or_default(),
        }
    }
}
