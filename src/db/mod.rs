pub mod client;
pub mod migration;
pub mod models;
pub mod queries;

pub use client::{DbClient, DbError, lwt_applied};
pub use models::*;
