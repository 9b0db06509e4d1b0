// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential exchange and current-user endpoints.

use super::http::ApiClient;
use crate::error::ClientError;
use crate::models::api::{first_validation_message, ApiResponse, PasswordReset, UserPayload};
use crate::models::{AuthResponse, LoginCredentials, RegisterData, User, UserChanges};
use serde::Serialize;
use validator::Validate;

#[derive(Serialize)]
struct ForgotPassword<'a> {
    email: &'a str,
}

/// Service for `/auth/*`.
#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/login`. Returns the raw response; the session store
    /// decides whether it carries a usable pair.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ClientError> {
        validate(credentials)?;
        tracing::info!(email = %credentials.email, "Logging in");
        self.client.post("/auth/login", credentials).await
    }

    /// `POST /auth/register`.
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, ClientError> {
        validate(data)?;
        tracing::info!(email = %data.email, role = ?data.role, "Registering account");
        self.client.post("/auth/register", data).await
    }

    /// `GET /auth/me`.
    pub async fn me(&self) -> Result<User, ClientError> {
        let response: ApiResponse<UserPayload> = self.client.get("/auth/me").await?;
        user_from(response)
    }

    /// `PATCH /auth/me`.
    pub async fn update_me(&self, changes: &UserChanges) -> Result<User, ClientError> {
        let response: ApiResponse<UserPayload> = self.client.patch("/auth/me", changes).await?;
        user_from(response)
    }

    /// `POST /auth/forgot-password`. Returns the server's confirmation text.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>, ClientError> {
        if email.trim().is_empty() {
            return Err(ClientError::Validation("Email is required".to_string()));
        }
        let response: ApiResponse<serde_json::Value> = self
            .client
            .post("/auth/forgot-password", &ForgotPassword { email })
            .await?;
        Ok(response.message)
    }

    /// `POST /auth/reset-password/{token}`.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        reset: &PasswordReset,
    ) -> Result<Option<String>, ClientError> {
        validate(reset)?;
        if reset_token.is_empty() || !reset_token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ClientError::Validation("Invalid reset link".to_string()));
        }
        let path = format!("/auth/reset-password/{}", reset_token);
        let response: ApiResponse<serde_json::Value> = self.client.post(&path, reset).await?;
        Ok(response.message)
    }
}

/// Run derive validation and surface the first message.
pub(crate) fn validate<T: Validate>(payload: &T) -> Result<(), ClientError> {
    payload
        .validate()
        .map_err(|e| ClientError::Validation(first_validation_message(&e)))
}

pub(crate) fn user_from(response: ApiResponse<UserPayload>) -> Result<User, ClientError> {
    let user = response
        .into_data("user")?
        .user
        .ok_or_else(|| ClientError::MalformedResponse("missing user".to_string()))?;
    if let Some(field) = user.missing_identity_field() {
        return Err(ClientError::MalformedResponse(format!("user missing {}", field)));
    }
    Ok(user)
}
