// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request pipeline for the DriverXP REST API.
//!
//! Handles:
//! - Bearer token attachment from the credential vault
//! - Session teardown on 401 from protected endpoints
//! - Error categorisation (transport, validation, status, body)
//!
//! Every request is sent exactly once. Nothing is retried or queued.

use crate::config::Config;
use crate::error::ClientError;
use crate::events::{AuthEvent, EventBus};
use crate::models::api::ErrorBody;
use crate::storage::CredentialVault;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Endpoints whose 401 means "wrong credentials", not "session expired".
const AUTH_ENDPOINTS: &[&str] = &[
    "/auth/login",
    "/auth/register",
    "/auth/forgot-password",
    "/auth/reset-password",
];

/// Whether `path` is a credential-exchange endpoint (query string ignored).
pub fn is_auth_endpoint(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    let path = path.trim_end_matches('/');
    AUTH_ENDPOINTS.iter().any(|endpoint| {
        path == *endpoint
            || path
                .strip_prefix(endpoint)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Whether `path` is the login endpoint, where any 4xx is a rejected sign-in.
fn is_login_endpoint(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    path.trim_end_matches('/') == "/auth/login"
}

/// DriverXP API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    vault: CredentialVault,
    events: EventBus,
}

impl ApiClient {
    /// Create a client that reads its token from `vault` and reports dead
    /// sessions on `events`.
    pub fn new(config: &Config, vault: CredentialVault, events: EventBus) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            vault,
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET with JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let builder = self.request(Method::GET, path);
        self.execute(Method::GET, path, builder).await
    }

    /// GET with query parameters.
    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).query(query);
        self.execute(Method::GET, path, builder).await
    }

    /// POST a JSON body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).json(body);
        self.execute(Method::POST, path, builder).await
    }

    /// PATCH a JSON body.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PATCH, path).json(body);
        self.execute(Method::PATCH, path, builder).await
    }

    /// PATCH without a body (state transitions such as cancel).
    pub async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let builder = self.request(Method::PATCH, path);
        self.execute(Method::PATCH, path, builder).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let builder = self.request(Method::DELETE, path);
        self.execute(Method::DELETE, path, builder).await
    }

    /// Build a request with the bearer token attached when one is persisted.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);

        match self.vault.token() {
            Ok(Some(token)) => builder.bearer_auth(token),
            Ok(None) => builder,
            Err(e) => {
                tracing::warn!(error = %e, path, "Could not read token, sending unauthenticated");
                builder
            }
        }
    }

    /// Send once and classify the outcome.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        tracing::debug!(%method, path, "Sending API request");

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "API request failed without response");
            ClientError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(self.classify_failure(&method, path, status, &body));
        }

        tracing::debug!(%method, path, status = status.as_u16(), "API request succeeded");

        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(body)
            .map_err(|e| ClientError::MalformedResponse(format!("JSON parse error: {}", e)))
    }

    /// Map a non-success response to an error, tearing down the session on
    /// 401 from protected endpoints.
    fn classify_failure(
        &self,
        method: &Method,
        path: &str,
        status: StatusCode,
        body: &str,
    ) -> ClientError {
        let server_message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.text().map(str::to_string));

        tracing::warn!(
            %method,
            path,
            status = status.as_u16(),
            message = server_message.as_deref().unwrap_or(""),
            "API error"
        );

        match status {
            _ if status.is_client_error() && is_login_endpoint(path) => {
                ClientError::InvalidCredentials(
                    server_message.unwrap_or_else(|| ClientError::LOGIN_FAILED.to_string()),
                )
            }
            StatusCode::UNAUTHORIZED if is_auth_endpoint(path) => ClientError::InvalidCredentials(
                server_message.unwrap_or_else(|| ClientError::LOGIN_FAILED.to_string()),
            ),
            StatusCode::UNAUTHORIZED => {
                self.invalidate_session(path);
                ClientError::SessionInvalidated
            }
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(
                    server_message.unwrap_or_else(|| ClientError::REQUEST_FAILED.to_string()),
                )
            }
            _ => ClientError::Http {
                status: status.as_u16(),
                message: server_message.unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("Unknown error").to_string()
                }),
            },
        }
    }

    /// Delete the durable pair, then tell the rest of the process.
    fn invalidate_session(&self, path: &str) {
        tracing::info!(path, "Clearing credentials after 401 on protected endpoint");
        if let Err(e) = self.vault.clear() {
            tracing::error!(error = %e, "Failed to clear credentials after 401");
        }
        self.events.publish(AuthEvent::SessionInvalidated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_endpoints_are_recognised() {
        assert!(is_auth_endpoint("/auth/login"));
        assert!(is_auth_endpoint("/auth/register/"));
        assert!(is_auth_endpoint("/auth/forgot-password"));
        assert!(is_auth_endpoint("/auth/reset-password/abc123"));
        assert!(is_auth_endpoint("/auth/login?next=/dashboard"));
    }

    #[test]
    fn protected_endpoints_are_not_auth_endpoints() {
        assert!(!is_auth_endpoint("/auth/me"));
        assert!(!is_auth_endpoint("/auth/loginx"));
        assert!(!is_auth_endpoint("/bookings/my-bookings"));
        assert!(!is_auth_endpoint("/users/change-password"));
    }

    #[test]
    fn login_endpoint_is_distinguished() {
        assert!(is_login_endpoint("/auth/login"));
        assert!(is_login_endpoint("/auth/login/?next=/dashboard"));
        assert!(!is_login_endpoint("/auth/register"));
        assert!(!is_login_endpoint("/auth/me"));
    }
}
