use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::DbError;
use crate::domain::{Invoice, InvoiceChanges, InvoiceFilter, InvoiceView, NewInvoice};
use crate::repositories::{InvoiceRepository, PatientRepository};
use crate::utils::{ListParams, PageRequest, PagedResult, paginate};

pub struct InvoiceService {
    invoices: Arc<dyn InvoiceRepository>,
    patients: Arc<dyn PatientRepository>,
    app_config: AppConfig,
}

impl InvoiceService {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        patients: Arc<dyn PatientRepository>,
        app_config: AppConfig,
    ) -> Self {
        Self {
            invoices,
            patients,
            app_config,
        }
    }

    /// Filter, sort and page invoices, then attach the owning patient's name
    /// to each row of the page.
    pub async fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        params: &ListParams,
    ) -> Result<PagedResult<InvoiceView>, DbError> {
        let matches = self.invoices.list_invoices(filter).await?;

        let request = PageRequest::new(
            params.page,
            params.page_size,
            self.app_config.default_page_size,
            self.app_config.max_page_size,
        );
        let page = paginate(
            matches,
            params.sort_by.as_deref(),
            params.sort_dir.as_deref(),
            request,
        );

        let names = self.patient_names(&page.items).await?;

        Ok(page.map_items(|invoice| {
            let patient_name = names.get(&invoice.patient_id).cloned().unwrap_or_else(|| {
                tracing::warn!(
                    "Invoice {} references missing patient {}",
                    invoice.invoice_id,
                    invoice.patient_id
                );
                String::new()
            });
            InvoiceView {
                invoice,
                patient_name,
            }
        }))
    }

    pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<InvoiceView, DbError> {
        let invoice = self.invoices.get_invoice(invoice_id).await?;
        let patient_name = match self.patients.get_patient(invoice.patient_id).await {
            Ok(patient) => patient.full_name,
            Err(DbError::NotFound) => {
                tracing::warn!(
                    "Invoice {} references missing patient {}",
                    invoice.invoice_id,
                    invoice.patient_id
                );
                String::new()
            }
            Err(e) => return Err(e),
        };

        Ok(InvoiceView {
            invoice,
            patient_name,
        })
    }

    pub async fn create_invoice(&self, new: NewInvoice) -> Result<InvoiceView, DbError> {
        let number = validate_number(&new.number)?;
        validate_amount(new.amount)?;

        let patient = match self.patients.get_patient(new.patient_id).await {
            Ok(patient) => patient,
            Err(DbError::NotFound) => {
                return Err(DbError::InvalidData("Patient does not exist".to_string()));
            }
            Err(e) => return Err(e),
        };

        let invoice = Invoice::new(NewInvoice { number, ..new });
        self.invoices.insert_invoice(&invoice).await?;

        tracing::info!(
            "Issued invoice {} ({}) for patient {}",
            invoice.invoice_id,
            invoice.number,
            invoice.patient_id
        );

        Ok(InvoiceView {
            invoice,
            patient_name: patient.full_name,
        })
    }

    pub async fn update_invoice(
        &self,
        invoice_id: Uuid,
        changes: InvoiceChanges,
    ) -> Result<Invoice, DbError> {
        let number = validate_number(&changes.number)?;
        validate_amount(changes.amount)?;

        let mut invoice = self.invoices.get_invoice(invoice_id).await?;
        let previous_number = invoice.number.clone();

        invoice.apply(InvoiceChanges { number, ..changes });
        self.invoices.update_invoice(&invoice, &previous_number).await?;

        if invoice.number != previous_number {
            tracing::info!(
                "Renumbered invoice {} from {} to {}",
                invoice_id,
                previous_number,
                invoice.number
            );
        } else {
            tracing::info!("Updated invoice {}", invoice_id);
        }

        Ok(invoice)
    }

    pub async fn delete_invoice(&self, invoice_id: Uuid) -> Result<(), DbError> {
        let invoice = self.invoices.get_invoice(invoice_id).await?;
        self.invoices.delete_invoice(&invoice).await?;

        tracing::info!("Deleted invoice {} ({})", invoice_id, invoice.number);

        Ok(())
    }

    async fn patient_names(&self, invoices: &[Invoice]) -> Result<HashMap<Uuid, String>, DbError> {
        let ids: Vec<Uuid> = invoices
            .iter()
            .map(|i| i.patient_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let patients = self.patients.get_patients_by_ids(&ids).await?;

        Ok(patients
            .into_iter()
            .map(|p| (p.patient_id, p.full_name))
            .collect())
    }
}

fn validate_number(number: &str) -> Result<String, DbError> {
    let number = number.trim();
    if number.is_empty() {
        return Err(DbError::InvalidData("Invoice number is required".to_string()));
    }
    Ok(number.to_string())
}

fn validate_amount(amount: Decimal) -> Result<(), DbError> {
    if amount < Decimal::ZERO {
        return Err(DbError::InvalidData("Amount must not be negative".to_string()));
    }
    Ok(())
}
