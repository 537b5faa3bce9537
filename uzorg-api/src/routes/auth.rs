/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a user and their default organisation
/// - `POST /auth/login` - Exchange credentials for an access token
///
/// Both return the same payload:
///
/// ```json
/// {
///   "status": "success",
///   "message": "Registration successful",
///   "data": {
///     "accessToken": "eyJ...",
///     "user": {
///       "userId": "uuid",
///       "firstName": "Ann",
///       "lastName": "Lee",
///       "email": "ann@example.com",
///       "phone": "+2348012345678"
///     }
///   }
/// }
/// ```

use crate::{
    app::AppState,
    error::{ApiResult, ValidatedJson},
    routes::ApiResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uzorg_shared::{accounts::AuthSession, models::user::NewUser};
use validator::{Validate, ValidationError};

/// Register request
///
/// Missing fields deserialize as empty strings so they surface as 422
/// validation errors rather than JSON decoding failures.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(custom(function = "validate_phone", message = "Phone must be in E.164 format"))]
    pub phone: String,
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// `+` followed by 2 to 15 digits, the first non-zero
fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone
        .strip_prefix('+')
        .ok_or_else(|| ValidationError::new("phone"))?;

    let valid = (2..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0');

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("phone"))
    }
}

/// Register a new user
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Email already registered
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AuthSession>>)> {
    let profile = NewUser {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        phone: req.phone,
    };

    let session = state.accounts.register(profile, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success("Registration successful", session),
    ))
}

/// Log in with email and password
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<AuthSession>>> {
    let session = state.accounts.login(&req.email, &req.password).await?;

    Ok(ApiResponse::success("Login successful", session))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_register() -> RegisterRequest {
        RegisterRequest {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
            password: "password123".to_string(),
            phone: "+2348012345678".to_string(),
        }
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+2348012345678").is_ok());
        assert!(validate_phone("+15551234567").is_ok());

        assert!(validate_phone("08012345678").is_err());
        assert!(validate_phone("+0123456789").is_err());
        assert!(validate_phone("+234-801-234").is_err());
        assert!(validate_phone("+1").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_register_request_validation() {
        assert!(valid_register().validate().is_ok());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..valid_register()
        };
        let errors = short_password.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));

        let missing_names = RegisterRequest {
            first_name: String::new(),
            last_name: String::new(),
            ..valid_register()
        };
        let errors = missing_names.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("first_name"));
        assert!(errors.field_errors().contains_key("last_name"));
    }

    #[test]
    fn test_register_request_accepts_camel_case() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"firstName":"Ann","lastName":"Lee","email":"ann@example.com","password":"password123","phone":"+2348012345678"}"#,
        )
        .unwrap();

        assert_eq!(req.first_name, "Ann");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_fail_validation_not_decoding() {
        let req: RegisterRequest = serde_json::from_str("{}").unwrap();
        let errors = req.validate().unwrap_err();

        assert_eq!(errors.field_errors().len(), 5);
    }

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "ann@example.com".to_string(),
            password: "x".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }
}
