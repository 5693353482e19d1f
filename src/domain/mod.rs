pub mod invoice;
pub mod patient;
pub mod user;

pub use invoice::{
    Invoice, InvoiceChanges, InvoiceFilter, InvoiceSortField, InvoiceView, NewInvoice,
};
pub use patient::{NewPatient, Patient, PatientChanges, PatientFilter, PatientSortField};
pub use user::{User, UserSnapshot};
