use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::DbError;
use crate::domain::{Invoice, InvoiceFilter, Patient, PatientFilter, User};

use super::{InvoiceRepository, PatientRepository, UserRepository};

#[derive(Default)]
struct MemoryState {
    patients: HashMap<Uuid, Patient>,
    invoices: HashMap<Uuid, Invoice>,
    invoice_numbers: HashMap<String, Uuid>,
    users: HashMap<String, User>,
}

impl MemoryState {
    fn remove_invoice(&mut self, invoice_id: Uuid) -> Option<Invoice> {
        let invoice = self.invoices.remove(&invoice_id)?;
        if self.invoice_numbers.get(&invoice.number) == Some(&invoice_id) {
            self.invoice_numbers.remove(&invoice.number);
        }
        Some(invoice)
    }
}

fn modified_concurrently(invoice_id: Uuid) -> DbError {
    DbError::Conflict(format!(
        "Invoice {} was modified by another request",
        invoice_id
    ))
}

/// Process-local store backing every repository port.
///
/// Each conditional write runs under a single write guard, so number claims
/// behave like the lightweight transactions of the Scylla repositories.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientRepository for MemoryStore {
    async fn insert_patient(&self, patient: &Patient) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        state.patients.insert(patient.patient_id, patient.clone());
        Ok(())
    }

    async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, DbError> {
        let state = self.state.read().await;
        state
            .patients
            .get(&patient_id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn get_patients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Patient>, DbError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.patients.get(id).cloned())
            .collect())
    }

    async fn list_patients(&self, filter: &PatientFilter) -> Result<Vec<Patient>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .patients
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn update_patient(&self, patient: &Patient) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        let stored = state
            .patients
            .get_mut(&patient.patient_id)
            .ok_or(DbError::NotFound)?;

        stored.full_name = patient.full_name.clone();
        stored.birth_date = patient.birth_date;
        stored.email = patient.email.clone();
        stored.phone = patient.phone.clone();

        Ok(())
    }

    async fn delete_patient(&self, patient_id: Uuid) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        state
            .patients
            .remove(&patient_id)
            .map(|_| ())
            .ok_or(DbError::NotFound)
    }
}

#[async_trait]
impl InvoiceRepository for MemoryStore {
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), DbError> {
        let mut state = self.state.write().await;

        if state.invoice_numbers.contains_key(&invoice.number) {
            return Err(DbError::Conflict(format!(
                "Invoice number '{}' already exists",
                invoice.number
            )));
        }

        state
            .invoice_numbers
            .insert(invoice.number.clone(), invoice.invoice_id);
        state.invoices.insert(invoice.invoice_id, invoice.clone());

        Ok(())
    }

    async fn get_invoice(&self, invoice_id: Uuid) -> Result<Invoice, DbError> {
        let state = self.state.read().await;
        state
            .invoices
            .get(&invoice_id)
            .cloned()
            .ok_or(DbError::NotFound)
    }

    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .invoices
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect())
    }

    async fn update_invoice(
        &self,
        invoice: &Invoice,
        previous_number: &str,
    ) -> Result<(), DbError> {
        let mut state = self.state.write().await;

        let stored_number = match state.invoices.get(&invoice.invoice_id) {
            Some(stored) => stored.number.clone(),
            None => return Err(DbError::NotFound),
        };
        if stored_number != previous_number {
            return Err(modified_concurrently(invoice.invoice_id));
        }

        if invoice.number != previous_number {
            match state.invoice_numbers.get(&invoice.number) {
                Some(owner) if *owner != invoice.invoice_id => {
                    return Err(DbError::Conflict(format!(
                        "Invoice number '{}' already exists",
                        invoice.number
                    )));
                }
                _ => {}
            }

            state
                .invoice_numbers
                .insert(invoice.number.clone(), invoice.invoice_id);
            if state.invoice_numbers.get(previous_number) == Some(&invoice.invoice_id) {
                state.invoice_numbers.remove(previous_number);
            }
        }

        state.invoices.insert(invoice.invoice_id, invoice.clone());

        Ok(())
    }

    async fn delete_invoice(&self, invoice: &Invoice) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        match state.invoices.get(&invoice.invoice_id) {
            None => return Err(DbError::NotFound),
            Some(stored) if stored.number != invoice.number => {
                return Err(modified_concurrently(invoice.invoice_id));
            }
            Some(_) => {}
        }

        state.remove_invoice(invoice.invoice_id);
        Ok(())
    }

    async fn delete_invoices_by_patient(&self, patient_id: Uuid) -> Result<usize, DbError> {
        let mut state = self.state.write().await;
        let owned: Vec<Uuid> = state
            .invoices
            .values()
            .filter(|i| i.patient_id == patient_id)
            .map(|i| i.invoice_id)
            .collect();

        for invoice_id in &owned {
            state.remove_invoice(*invoice_id);
        }

        Ok(owned.len())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
        let state = self.state.read().await;
        Ok(state.users.get(username).cloned())
    }

    async fn insert_user_if_absent(&self, user: &User) -> Result<bool, DbError> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.username) {
            return Ok(false);
        }

        state.users.insert(user.username.clone(), user.clone());
        Ok(true)
    }
}
