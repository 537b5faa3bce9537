//! # Uzorg API Server Library
//!
//! HTTP front end for the account service: registration, login, and
//! organisation membership over JSON.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
