//! Core type definitions used across the Gatehouse workspace.

pub mod filter;
pub mod pagination;
pub mod sorting;

pub use filter::{FilterExpr, FilterField, FilterOp, FilterPayload, FilterValue};
pub use pagination::{ListQuery, ListResponse};
pub use sorting::{SortDirection, SortField, parse_sort_spec};
