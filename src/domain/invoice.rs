use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::utils::paging::{Sortable, normalize_field_name};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub patient_id: Uuid,
    pub number: String,
    pub amount: Decimal,
    pub issued_at: DateTime<Utc>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub patient_id: Uuid,
    pub number: String,
    pub amount: Decimal,
    pub issued_at: Option<DateTime<Utc>>,
    pub paid: bool,
}

#[derive(Debug, Clone)]
pub struct InvoiceChanges {
    pub number: String,
    pub amount: Decimal,
    pub issued_at: DateTime<Utc>,
    pub paid: bool,
}

/// An invoice together with its owner's display name.
#[derive(Debug, Clone)]
pub struct InvoiceView {
    pub invoice: Invoice,
    pub patient_name: String,
}

impl Invoice {
    pub fn new(new: NewInvoice) -> Self {
        let now = Utc::now();
        Invoice {
            invoice_id: Uuid::new_v4(),
            patient_id: new.patient_id,
            number: new.number,
            amount: new.amount,
            issued_at: new.issued_at.unwrap_or(now),
            paid: new.paid,
            created_at: now,
        }
    }

    pub fn apply(&mut self, changes: InvoiceChanges) {
        self.number = changes.number;
        self.amount = changes.amount;
        self.issued_at = changes.issued_at;
        self.paid = changes.paid;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceSortField {
    Number,
    Amount,
    IssuedAt,
    Paid,
    PatientId,
    CreatedAt,
}

impl Sortable for Invoice {
    type Field = InvoiceSortField;

    fn parse_field(name: &str) -> Option<InvoiceSortField> {
        match normalize_field_name(name).as_str() {
            "number" => Some(InvoiceSortField::Number),
            "amount" => Some(InvoiceSortField::Amount),
            "issuedat" | "date" => Some(InvoiceSortField::IssuedAt),
            "paid" => Some(InvoiceSortField::Paid),
            "patientid" => Some(InvoiceSortField::PatientId),
            "createdat" => Some(InvoiceSortField::CreatedAt),
            _ => None,
        }
    }

    fn compare_by(&self, other: &Self, field: InvoiceSortField) -> Ordering {
        match field {
            InvoiceSortField::Number => self.number.cmp(&other.number),
            InvoiceSortField::Amount => self.amount.cmp(&other.amount),
            InvoiceSortField::IssuedAt => self.issued_at.cmp(&other.issued_at),
            InvoiceSortField::Paid => self.paid.cmp(&other.paid),
            InvoiceSortField::PatientId => self.patient_id.cmp(&other.patient_id),
            InvoiceSortField::CreatedAt => self.created_at.cmp(&other.created_at),
        }
    }

    fn default_order(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.invoice_id.cmp(&other.invoice_id))
    }
}

/// Exact-match invoice filters; `from`/`to` bound `issued_at` inclusively.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub patient_id: Option<Uuid>,
    pub paid: Option<bool>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.patient_id.is_none_or(|id| invoice.patient_id == id)
            && self.paid.is_none_or(|paid| invoice.paid == paid)
            && self.from.is_none_or(|from| invoice.issued_at >= from)
            && self.to.is_none_or(|to| invoice.issued_at <= to)
    }
}
