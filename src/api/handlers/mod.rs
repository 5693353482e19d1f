pub mod auth;
pub mod invoice;
pub mod patient;

pub use auth::*;
pub use invoice::*;
pub use patient::*;
