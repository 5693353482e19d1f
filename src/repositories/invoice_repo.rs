use async_trait::async_trait;
use scylla::IntoTypedRows;
use scylla::query::Query;
use uuid::Uuid;

use crate::db::{DbClient, DbError, InvoiceRow, lwt_applied};
use crate::domain::{Invoice, InvoiceFilter};

use super::InvoiceRepository;

#[derive(Clone)]
pub struct ScyllaInvoiceRepository {
    client: DbClient,
}

impl ScyllaInvoiceRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    async fn select_rows(
        &self,
        statement: &str,
        values: impl scylla::serialize::row::SerializeRow + Send,
    ) -> Result<Vec<Invoice>, DbError> {
        let result = self
            .client
            .session()
            .query(Query::new(statement), values)
            .await?;

        let rows = result.rows.unwrap_or_default();
        let mut invoices = Vec::new();

        for row in rows.into_typed::<InvoiceRow>() {
            let row =
                row.map_err(|e| DbError::SerializationError(format!("Failed to parse row: {}", e)))?;
            invoices.push(row.to_invoice().map_err(DbError::SerializationError)?);
        }

        Ok(invoices)
    }

    /// Lightweight transaction on `invoice_numbers`; only one writer can win a number.
    async fn claim_number(&self, number: &str, invoice_id: Uuid) -> Result<(), DbError> {
        let query = Query::new(crate::db::queries::CLAIM_INVOICE_NUMBER);

        let result = self
            .client
            .session()
            .query(query, (number, invoice_id))
            .await?;

        if !lwt_applied(&result)? {
            return Err(DbError::Conflict(format!(
                "Invoice number '{}' already exists",
                number
            )));
        }

        Ok(())
    }

    async fn release_number(&self, number: &str, invoice_id: Uuid) -> Result<(), DbError> {
        let query = Query::new(crate::db::queries::RELEASE_INVOICE_NUMBER);

        let result = self
            .client
            .session()
            .query(query, (number, invoice_id))
            .await?;

        if !lwt_applied(&result)? {
            tracing::warn!(
                "Invoice number '{}' was not held by invoice {}",
                number,
                invoice_id
            );
        }

        Ok(())
    }

    /// Explain a conditional write on `invoices` that did not apply: the row is
    /// either gone or now carries a different number.
    async fn rejected_write(&self, invoice_id: Uuid) -> DbError {
        match self
            .select_rows(crate::db::queries::SELECT_INVOICE, (invoice_id,))
            .await
        {
            Ok(rows) if rows.is_empty() => DbError::NotFound,
            Ok(_) => DbError::Conflict(format!(
                "Invoice {} was modified by another request",
                invoice_id
            )),
            Err(err) => err,
        }
    }
}

#[async_trait]
impl InvoiceRepository for ScyllaInvoiceRepository {
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), DbError> {
        self.claim_number(&invoice.number, invoice.invoice_id)
            .await?;

        let row = InvoiceRow::from_invoice(invoice);
        let query = Query::new(crate::db::queries::INSERT_INVOICE);

        let inserted = self
            .client
            .session()
            .query(
                query,
                (
                    row.invoice_id,
                    row.patient_id,
                    row.number,
                    row.amount,
                    row.issued_at,
                    row.paid,
                    row.created_at,
                ),
            )
            .await;

        if let Err(err) = inserted {
            tracing::error!(
                "Insert of invoice {} failed, releasing its number: {}",
                invoice.invoice_id,
                err
            );
            self.release_number(&invoice.number, invoice.invoice_id)
                .await?;
            return Err(err.into());
        }

        Ok(())
    }

    async fn get_invoice(&self, invoice_id: Uuid) -> Result<Invoice, DbError> {
        self.select_rows(crate::db::queries::SELECT_INVOICE, (invoice_id,))
            .await?
            .into_iter()
            .next()
            .ok_or(DbError::NotFound)
    }

    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, DbError> {
        let mut invoices = match filter.patient_id {
            Some(patient_id) => {
                self.select_rows(crate::db::queries::SELECT_INVOICES_BY_PATIENT, (patient_id,))
                    .await?
            }
            None => {
                self.select_rows(crate::db::queries::SELECT_ALL_INVOICES, ())
                    .await?
            }
        };
        invoices.retain(|i| filter.matches(i));

        Ok(invoices)
    }

    async fn update_invoice(
        &self,
        invoice: &Invoice,
        previous_number: &str,
    ) -> Result<(), DbError> {
        let renumbered = invoice.number != previous_number;
        if renumbered {
            self.claim_number(&invoice.number, invoice.invoice_id)
                .await?;
        }

        let query = Query::new(crate::db::queries::UPDATE_INVOICE);
        let updated = self
            .client
            .session()
            .query(
                query,
                (
                    &invoice.number,
                    invoice.amount.to_string(),
                    invoice.issued_at,
                    invoice.paid,
                    invoice.invoice_id,
                    previous_number,
                ),
            )
            .await
            .map_err(DbError::from)
            .and_then(|result| lwt_applied(&result));

        if !matches!(updated, Ok(true)) {
            // Give the freshly claimed number back before reporting.
            if renumbered {
                self.release_number(&invoice.number, invoice.invoice_id)
                    .await?;
            }
            updated?;
            return Err(self.rejected_write(invoice.invoice_id).await);
        }

        if renumbered {
            self.release_number(previous_number, invoice.invoice_id)
                .await?;
        }

        Ok(())
    }

    async fn delete_invoice(&self, invoice: &Invoice) -> Result<(), DbError> {
        let query = Query::new(crate::db::queries::DELETE_INVOICE);

        let result = self
            .client
            .session()
            .query(query, (invoice.invoice_id, &invoice.number))
            .await?;

        if !lwt_applied(&result)? {
            return Err(self.rejected_write(invoice.invoice_id).await);
        }

        self.release_number(&invoice.number, invoice.invoice_id)
            .await
    }

    async fn delete_invoices_by_patient(&self, patient_id: Uuid) -> Result<usize, DbError> {
        let invoices = self
            .select_rows(crate::db::queries::SELECT_INVOICES_BY_PATIENT, (patient_id,))
            .await?;

        let mut removed = 0;
        for invoice in &invoices {
            match self.delete_invoice(invoice).await {
                Ok(()) => removed += 1,
                // Already gone through another request.
                Err(DbError::NotFound) => {}
                Err(err) => return Err(err),
            }
        }

        Ok(removed)
    }
}
