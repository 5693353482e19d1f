pub mod auth_service;
pub mod invoice_service;
pub mod patient_service;
pub mod token_service;

pub use auth_service::{AuthError, AuthService};
pub use invoice_service::InvoiceService;
pub use patient_service::PatientService;
pub use token_service::{Claims, IssuedToken, TokenError, TokenService};
