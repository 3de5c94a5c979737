//! HTTP-level integration tests over the in-memory store driver.

mod helpers;

mod admin_test;
mod auth_test;
mod list_test;
mod permission_test;
