//! fdbatch library: application logic for the fast-dm batch driver.

pub mod app;
pub mod config;
pub mod errors;
pub mod version;
