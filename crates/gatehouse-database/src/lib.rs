//! # gatehouse-database
//!
//! PostgreSQL connection management, the query condition translator and
//! the identity/session store implementations (PostgreSQL and in-memory).

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod query;
pub mod stores;

pub use connection::DatabasePool;
pub use stores::Stores;
