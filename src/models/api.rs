// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Response envelope and request payloads shared by every endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Role, User};

/// Standard response envelope: `{status, message?, data?, results?, errors?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub results: Option<u32>,
    #[serde(default)]
    pub errors: Option<Vec<serde_json::Value>>,
}

impl<T> ApiResponse<T> {
    /// Unwrap `data`, naming the endpoint when it is absent.
    pub fn into_data(self, what: &str) -> Result<T, crate::error::ClientError> {
        self.data
            .ok_or_else(|| crate::error::ClientError::MalformedResponse(format!("missing {what}")))
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}

/// `data` of responses that carry a single user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub user: Option<User>,
    /// Some deployments nest the token here instead of at the top level
    #[serde(default)]
    pub token: Option<String>,
}

/// Login/register response: the token sits beside the envelope's `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<UserPayload>,
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthResponse {
    /// Split into `(user, token)`, treating blank tokens as absent.
    pub fn into_parts(self) -> (Option<User>, Option<String>) {
        let (user, nested_token) = match self.data {
            Some(payload) => (payload.user, payload.token),
            None => (None, None),
        };
        let token = self
            .token
            .or(nested_token)
            .filter(|t| !t.trim().is_empty());
        (user, token)
    }
}

/// Payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginCredentials {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Payload for `POST /auth/register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    pub phone: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<serde_json::Value>,
}

/// Payload for `POST /users` (admin-created accounts).
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub phone: String,
    pub role: Role,
}

/// Payload for `PATCH /users/change-password`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_password_change"))]
pub struct PasswordChange {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

fn validate_password_change(change: &PasswordChange) -> Result<(), validator::ValidationError> {
    if change.current_password == change.new_password {
        return Err(validator::ValidationError::new("unchanged")
            .with_message("New password must be different from current password".into()));
    }
    Ok(())
}

/// Payload for `POST /auth/reset-password/{token}`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct PasswordReset {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Query parameters for `GET /users`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Flatten validator errors into the first human-readable message.
pub fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| errs.iter().map(move |e| (field.clone(), e)))
        .map(|(field, e)| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value for {field}"))
        })
        .next()
        .unwrap_or_else(|| "Please fill in all required fields".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_prefers_top_level_token() {
        let resp: AuthResponse = serde_json::from_value(serde_json::json!({
            "status": "success",
            "data": {"user": {"id": "1", "firstName": "A", "email": "a@x.com"}},
            "token": "tok123"
        }))
        .unwrap();
        let (user, token) = resp.into_parts();
        assert_eq!(user.unwrap().id, "1");
        assert_eq!(token.as_deref(), Some("tok123"));
    }

    #[test]
    fn blank_token_is_absent() {
        let resp: AuthResponse = serde_json::from_value(serde_json::json!({
            "data": {"user": {"id": "1"}},
            "token": "  "
        }))
        .unwrap();
        assert_eq!(resp.into_parts().1, None);
    }

    #[test]
    fn error_body_text_falls_back_to_error_field() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"nope"}"#).unwrap();
        assert_eq!(body.text(), Some("nope"));
        let body: ErrorBody = serde_json::from_str(r#"{"message":""}"#).unwrap();
        assert_eq!(body.text(), None);
    }

    #[test]
    fn register_validation_messages() {
        let data = RegisterData {
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: "a@x.com".to_string(),
            password: "short".to_string(),
            ..Default::default()
        };
        let errors = data.validate().unwrap_err();
        assert_eq!(
            first_validation_message(&errors),
            "Password must be at least 8 characters"
        );
    }

    #[test]
    fn password_change_must_differ() {
        let change = PasswordChange {
            current_password: "same-password".to_string(),
            new_password: "same-password".to_string(),
        };
        assert!(change.validate().is_err());
    }
}
