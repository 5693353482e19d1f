use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use crate::utils::paging::{Sortable, normalize_field_name};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub patient_id: Uuid,
    pub full_name: String,
    pub document_id: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields a caller supplies when registering a patient.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub full_name: String,
    pub document_id: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Mutable part of a patient. The document id is fixed once created.
#[derive(Debug, Clone)]
pub struct PatientChanges {
    pub full_name: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Patient {
    pub fn new(new: NewPatient) -> Self {
        Patient {
            patient_id: Uuid::new_v4(),
            full_name: new.full_name,
            document_id: new.document_id,
            birth_date: new.birth_date,
            email: new.email,
            phone: new.phone,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, changes: PatientChanges) {
        self.full_name = changes.full_name;
        self.birth_date = changes.birth_date;
        self.email = changes.email;
        self.phone = changes.phone;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientSortField {
    FullName,
    DocumentId,
    BirthDate,
    Email,
    CreatedAt,
}

impl Sortable for Patient {
    type Field = PatientSortField;

    fn parse_field(name: &str) -> Option<PatientSortField> {
        match normalize_field_name(name).as_str() {
            "fullname" | "name" => Some(PatientSortField::FullName),
            "documentid" | "document" => Some(PatientSortField::DocumentId),
            "birthdate" => Some(PatientSortField::BirthDate),
            "email" => Some(PatientSortField::Email),
            "createdat" => Some(PatientSortField::CreatedAt),
            _ => None,
        }
    }

    fn compare_by(&self, other: &Self, field: PatientSortField) -> Ordering {
        match field {
            PatientSortField::FullName => self.full_name.cmp(&other.full_name),
            PatientSortField::DocumentId => self.document_id.cmp(&other.document_id),
            PatientSortField::BirthDate => self.birth_date.cmp(&other.birth_date),
            PatientSortField::Email => self.email.cmp(&other.email),
            PatientSortField::CreatedAt => self.created_at.cmp(&other.created_at),
        }
    }

    fn default_order(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.patient_id.cmp(&other.patient_id))
    }
}

/// Free-text patient search. Matches name or document id, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct PatientFilter {
    needle: Option<String>,
}

impl PatientFilter {
    pub fn new(q: Option<&str>) -> Self {
        let needle = q
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        PatientFilter { needle }
    }

    pub fn matches(&self, patient: &Patient) -> bool {
        match &self.needle {
            None => true,
            Some(needle) => {
                patient.full_name.to_lowercase().contains(needle)
                    || patient.document_id.to_lowercase().contains(needle)
            }
        }
    }
}
