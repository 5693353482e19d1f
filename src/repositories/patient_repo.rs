use async_trait::async_trait;
use scylla::IntoTypedRows;
use scylla::query::Query;
use uuid::Uuid;

use crate::db::{DbClient, DbError, PatientRow, lwt_applied};
use crate::domain::{Patient, PatientFilter};

use super::PatientRepository;

#[derive(Clone)]
pub struct ScyllaPatientRepository {
    client: DbClient,
}

impl ScyllaPatientRepository {
    pub fn new(client: DbClient) -> Self {
        Self { client }
    }

    async fn select_rows(
        &self,
        statement: &str,
        values: impl scylla::serialize::row::SerializeRow + Send,
    ) -> Result<Vec<Patient>, DbError> {
        let result = self
            .client
            .session()
            .query(Query::new(statement), values)
            .await?;

        let rows = result.rows.unwrap_or_default();
        let mut patients = Vec::new();

        for row in rows.into_typed::<PatientRow>() {
            let row =
                row.map_err(|e| DbError::SerializationError(format!("Failed to parse row: {}", e)))?;
            patients.push(row.to_patient());
        }

        Ok(patients)
    }
}

#[async_trait]
impl PatientRepository for ScyllaPatientRepository {
    async fn insert_patient(&self, patient: &Patient) -> Result<(), DbError> {
        let row = PatientRow::from_patient(patient);
        let query = Query::new(crate::db::queries::INSERT_PATIENT);

        self.client
            .session()
            .query(
                query,
                (
                    row.patient_id,
                    row.full_name,
                    row.document_id,
                    row.birth_date,
                    row.email,
                    row.phone,
                    row.created_at,
                ),
            )
            .await?;

        Ok(())
    }

    async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, DbError> {
        self.select_rows(crate::db::queries::SELECT_PATIENT, (patient_id,))
            .await?
            .into_iter()
            .next()
            .ok_or(DbError::NotFound)
    }

    async fn get_patients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Patient>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        self.select_rows(crate::db::queries::SELECT_PATIENTS_BY_IDS, (ids,))
            .await
    }

    async fn list_patients(&self, filter: &PatientFilter) -> Result<Vec<Patient>, DbError> {
        let mut patients = self
            .select_rows(crate::db::queries::SELECT_ALL_PATIENTS, ())
            .await?;
        patients.retain(|p| filter.matches(p));

        Ok(patients)
    }

    async fn update_patient(&self, patient: &Patient) -> Result<(), DbError> {
        let query = Query::new(crate::db::queries::UPDATE_PATIENT);

        let result = self
            .client
            .session()
            .query(
                query,
                (
                    &patient.full_name,
                    patient.birth_date,
                    &patient.email,
                    &patient.phone,
                    patient.patient_id,
                ),
            )
            .await?;

        if !lwt_applied(&result)? {
            return Err(DbError::NotFound);
        }

        Ok(())
    }

    async fn delete_patient(&self, patient_id: Uuid) -> Result<(), DbError> {
        let query = Query::new(crate::db::queries::DELETE_PATIENT);

        let result = self
            .client
            .session()
            .query(query, (patient_id,))
            .await?;

        if !lwt_applied(&result)? {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
