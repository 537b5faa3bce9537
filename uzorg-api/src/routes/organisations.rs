/// Organisation endpoints
///
/// All routes sit behind the bearer gate, and every organisation-scoped route
/// requires the caller to be a member before anything about the organisation
/// is read.
///
/// # Endpoints
///
/// - `GET /api/organisations` - Organisations the caller belongs to
/// - `POST /api/organisations` - Create an organisation (caller joins it)
/// - `GET /api/organisations/:org_id` - Read one organisation
/// - `GET /api/organisations/:org_id/users` - List members
/// - `POST /api/organisations/:org_id/users` - Add a member

use crate::{
    app::AppState,
    error::{ApiError, ApiPath, ApiResult, ValidatedJson},
    routes::ApiResponse,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use uzorg_shared::{
    auth::middleware::AuthContext,
    models::{
        organisation::{NewOrganisation, Organisation},
        user::UserProfile,
    },
};
use validator::{Validate, ValidationError};

/// Create organisation request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateOrganisationRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Add member request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AddMemberRequest {
    #[validate(custom(function = "validate_uuid", message = "userId must be a valid UUID"))]
    pub user_id: String,
}

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid"))
}

/// `data` payload for the organisation list
#[derive(Debug, Serialize, Deserialize)]
pub struct OrganisationList {
    pub organisations: Vec<Organisation>,
}

/// `data` payload for an added member
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipAdded {
    pub org_id: Uuid,
    pub user_id: Uuid,
}

/// List the caller's organisations
pub async fn list_organisations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ApiResponse<OrganisationList>>> {
    let organisations = state.accounts.list_orgs(&auth).await?;

    Ok(ApiResponse::success(
        "Organisations retrieved successfully",
        OrganisationList { organisations },
    ))
}

/// Create an organisation
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_organisation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateOrganisationRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Organisation>>)> {
    let org = state
        .accounts
        .create_org(
            &auth,
            NewOrganisation {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success("Organisation created successfully", org),
    ))
}

/// Read one organisation
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: Organisation deleted after the membership check
pub async fn get_organisation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(org_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<Organisation>>> {
    let org = state.accounts.get_org(&auth, org_id).await?;

    Ok(ApiResponse::success("Organisation retrieved successfully", org))
}

/// List the members of an organisation
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member
pub async fn list_organisation_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(org_id): ApiPath<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let users = state.accounts.list_org_users(&auth, org_id).await?;

    Ok(ApiResponse::success("Users retrieved successfully", users))
}

/// Add a user to an organisation
///
/// # Errors
///
/// - `422 Unprocessable Entity`: `userId` missing or not a UUID
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: Target user does not exist
/// - `409 Conflict`: Target is already a member
pub async fn add_organisation_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(org_id): ApiPath<Uuid>,
    ValidatedJson(req): ValidatedJson<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<MembershipAdded>>)> {
    let user_id = Uuid::parse_str(&req.user_id)
        .map_err(|_| ApiError::BadRequest("userId must be a valid UUID".to_string()))?;

    state.accounts.add_member(&auth, org_id, user_id).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(
            "User added to organisation successfully",
            MembershipAdded { org_id, user_id },
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_requires_both_fields() {
        let req: CreateOrganisationRequest = serde_json::from_str(r#"{"name":"Acme"}"#).unwrap();
        let errors = req.validate().unwrap_err();

        assert!(errors.field_errors().contains_key("description"));
        assert!(!errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_add_member_request_requires_uuid() {
        let ok: AddMemberRequest =
            serde_json::from_str(&format!(r#"{{"userId":"{}"}}"#, Uuid::new_v4())).unwrap();
        assert!(ok.validate().is_ok());

        let missing: AddMemberRequest = serde_json::from_str("{}").unwrap();
        assert!(missing.validate().is_err());

        let garbage: AddMemberRequest =
            serde_json::from_str(r#"{"userId":"not-a-uuid"}"#).unwrap();
        assert!(garbage.validate().is_err());
    }

    #[test]
    fn test_organisation_list_key() {
        let json = serde_json::to_value(OrganisationList {
            organisations: vec![],
        })
        .unwrap();

        assert!(json["organisations"].is_array());
    }
}
