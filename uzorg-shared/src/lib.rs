//! # Uzorg Shared Library
//!
//! Core of the Uzorg account service: users, organisations, membership-based
//! access control and the bearer tokens that prove who is calling.
//!
//! ## Module Organization
//!
//! - `models`: Users, organisations and memberships
//! - `auth`: Password hashing, token service, bearer gate, membership checks
//! - `store`: Persistence traits with PostgreSQL and in-memory backends
//! - `accounts`: Account operations (register, login, organisations, members)
//! - `db`: Connection pool and migrations

pub mod accounts;
pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Uzorg shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
