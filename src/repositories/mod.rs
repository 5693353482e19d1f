pub mod invoice_repo;
pub mod memory;
pub mod patient_repo;
pub mod user_repo;

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::DbError;
use crate::domain::{Invoice, InvoiceFilter, Patient, PatientFilter, User};

pub use invoice_repo::ScyllaInvoiceRepository;
pub use memory::MemoryStore;
pub use patient_repo::ScyllaPatientRepository;
pub use user_repo::ScyllaUserRepository;

#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn insert_patient(&self, patient: &Patient) -> Result<(), DbError>;

    /// `DbError::NotFound` when no patient has this id.
    async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, DbError>;

    /// Patients among `ids`; unknown ids are skipped.
    async fn get_patients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Patient>, DbError>;

    /// Every patient accepted by `filter`, in no particular order.
    ///
    /// Listing reads the whole table: the Scylla backend scans `patients` and
    /// filters client side, and callers sort and page in memory. Cost grows
    /// with the table, not with the page size.
    async fn list_patients(&self, filter: &PatientFilter) -> Result<Vec<Patient>, DbError>;

    /// Overwrite the mutable columns. `DbError::NotFound` if the row is gone.
    async fn update_patient(&self, patient: &Patient) -> Result<(), DbError>;

    async fn delete_patient(&self, patient_id: Uuid) -> Result<(), DbError>;
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Claim the invoice number and store the row as one conditional write.
    /// `DbError::Conflict` when the number already belongs to another invoice.
    async fn insert_invoice(&self, invoice: &Invoice) -> Result<(), DbError>;

    async fn get_invoice(&self, invoice_id: Uuid) -> Result<Invoice, DbError>;

    /// Every invoice accepted by `filter`, in no particular order.
    ///
    /// Like patient listing this scans the whole `invoices` table (unless the
    /// filter names a patient) and leaves sorting and paging to the caller.
    async fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>, DbError>;

    /// Persist `invoice`. When its number differs from `previous_number` the new
    /// number is claimed first (`DbError::Conflict` if taken) and the old one released.
    /// The write only applies while the stored number still equals
    /// `previous_number`: `DbError::NotFound` if the row is gone,
    /// `DbError::Conflict` if another request changed its number.
    async fn update_invoice(&self, invoice: &Invoice, previous_number: &str)
    -> Result<(), DbError>;

    /// Remove the invoice and release its number. Fails like `update_invoice`
    /// when the stored number no longer matches `invoice.number`.
    async fn delete_invoice(&self, invoice: &Invoice) -> Result<(), DbError>;

    /// Remove every invoice owned by `patient_id`, returning how many were removed.
    async fn delete_invoices_by_patient(&self, patient_id: Uuid) -> Result<usize, DbError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    /// Returns `false` without writing when the username is taken.
    async fn insert_user_if_absent(&self, user: &User) -> Result<bool, DbError>;
}
