// Integration tests
// Run with: cargo test --test integration

mod common;
mod invoice_tests;
mod scylla_tests;
