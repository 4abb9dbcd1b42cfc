// src/utils/validation.rs
pub mod common;

pub use common::{validate_service_name, validate_date_order};
