/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login (public)
/// - `users`: User profiles (authenticated)
/// - `organisations`: Organisations and their members (authenticated)
///
/// Successful responses share one envelope:
///
/// ```json
/// { "status": "success", "message": "Login successful", "data": { ... } }
/// ```

use axum::Json;
use serde::{Deserialize, Serialize};

pub mod auth;
pub mod health;
pub mod organisations;
pub mod users;

/// Envelope status for successful responses
pub const SUCCESS_STATUS: &str = "success";

/// Success envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Json<Self> {
        Json(Self {
            status: SUCCESS_STATUS.to_string(),
            message: message.to_string(),
            data,
        })
    }
}
