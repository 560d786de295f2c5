//! `TaskDesk` server library.
//!
//! An in-memory REST backend for tasks, exposed for tests and embedding.

pub mod config;
pub mod routes;
pub mod store;
