/// User endpoints
///
/// - `GET /api/users/:id` - Read a profile. Callers may read only their own.

use crate::{
    app::AppState,
    error::{ApiPath, ApiResult},
    routes::ApiResponse,
};
use axum::{extract::State, Extension, Json};
use uuid::Uuid;
use uzorg_shared::{auth::middleware::AuthContext, models::user::UserProfile};

/// Get a user profile
///
/// # Errors
///
/// - `400 Bad Request`: `id` is not a UUID
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: `id` is not the caller
/// - `404 Not Found`: User no longer exists
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<UserProfile>>> {
    let user = state.accounts.get_user(&auth, user_id).await?;

    Ok(ApiResponse::success("User retrieved successfully", user))
}
