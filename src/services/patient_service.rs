use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::DbError;
use crate::domain::{NewPatient, Patient, PatientChanges, PatientFilter};
use crate::repositories::{InvoiceRepository, PatientRepository};
use crate::utils::{ListParams, PageRequest, PagedResult, paginate};

pub struct PatientService {
    patients: Arc<dyn PatientRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    app_config: AppConfig,
}

impl PatientService {
    pub fn new(
        patients: Arc<dyn PatientRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        app_config: AppConfig,
    ) -> Self {
        Self {
            patients,
            invoices,
            app_config,
        }
    }

    /// Search by name or document id, then sort and page the matches.
    pub async fn list_patients(
        &self,
        q: Option<&str>,
        params: &ListParams,
    ) -> Result<PagedResult<Patient>, DbError> {
        let filter = PatientFilter::new(q);
        let matches = self.patients.list_patients(&filter).await?;

        let request = PageRequest::new(
            params.page,
            params.page_size,
            self.app_config.default_page_size,
            self.app_config.max_page_size,
        );

        Ok(paginate(
            matches,
            params.sort_by.as_deref(),
            params.sort_dir.as_deref(),
            request,
        ))
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, DbError> {
        self.patients.get_patient(patient_id).await
    }

    pub async fn create_patient(&self, new: NewPatient) -> Result<Patient, DbError> {
        let new = NewPatient {
            full_name: required("Full name", &new.full_name)?,
            document_id: required("Document id", &new.document_id)?,
            birth_date: new.birth_date,
            email: optional(new.email),
            phone: optional(new.phone),
        };

        let patient = Patient::new(new);
        self.patients.insert_patient(&patient).await?;

        tracing::info!(
            "Registered patient {} ({})",
            patient.patient_id,
            patient.document_id
        );

        Ok(patient)
    }

    pub async fn update_patient(
        &self,
        patient_id: Uuid,
        changes: PatientChanges,
    ) -> Result<Patient, DbError> {
        let changes = PatientChanges {
            full_name: required("Full name", &changes.full_name)?,
            birth_date: changes.birth_date,
            email: optional(changes.email),
            phone: optional(changes.phone),
        };

        let mut patient = self.patients.get_patient(patient_id).await?;
        patient.apply(changes);
        self.patients.update_patient(&patient).await?;

        tracing::info!("Updated patient {}", patient_id);

        Ok(patient)
    }

    /// Remove the patient together with every invoice it owns.
    pub async fn delete_patient(&self, patient_id: Uuid) -> Result<(), DbError> {
        // Existence check first so an unknown id never touches invoices.
        self.patients.get_patient(patient_id).await?;

        let removed = self.invoices.delete_invoices_by_patient(patient_id).await?;
        self.patients.delete_patient(patient_id).await?;

        tracing::info!(
            "Deleted patient {} and {} invoice(s)",
            patient_id,
            removed
        );

        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<String, DbError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DbError::InvalidData(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
