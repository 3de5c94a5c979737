//! Core traits defined in `gatehouse-core` and implemented by other crates.

pub mod repository;

pub use repository::Repository;
