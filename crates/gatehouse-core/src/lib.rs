//! # gatehouse-core
//!
//! Core crate for Gatehouse. Contains the unified error system,
//! configuration schemas, list-query types (filters, sorting, paging)
//! and the generic repository trait.
//!
//! This crate has **no** internal dependencies on other Gatehouse crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
