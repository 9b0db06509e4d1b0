// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User administration endpoints.

use super::auth::{user_from, validate};
use super::http::ApiClient;
use crate::error::ClientError;
use crate::models::api::{ApiResponse, UserPayload};
use crate::models::{NewUser, PasswordChange, User, UserChanges, UserQuery};
use serde::Deserialize;

#[derive(Deserialize)]
struct UserList {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Deserialize)]
struct InstructorList {
    #[serde(default)]
    instructors: Vec<User>,
}

#[derive(Deserialize)]
struct StatsPayload {
    #[serde(default)]
    stats: serde_json::Value,
}

/// Service for `/users/*`.
#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /users` with optional filters.
    pub async fn list(&self, query: &UserQuery) -> Result<Vec<User>, ClientError> {
        let response: ApiResponse<UserList> = self.client.get_with_query("/users", query).await?;
        Ok(response.into_data("users")?.users)
    }

    pub async fn get(&self, id: &str) -> Result<User, ClientError> {
        let response: ApiResponse<UserPayload> = self.client.get(&user_path(id)?).await?;
        user_from(response)
    }

    /// `POST /users` (admin).
    pub async fn create(&self, user: &NewUser) -> Result<User, ClientError> {
        validate(user)?;
        let response: ApiResponse<UserPayload> = self.client.post("/users", user).await?;
        user_from(response)
    }

    pub async fn update(&self, id: &str, changes: &UserChanges) -> Result<User, ClientError> {
        let response: ApiResponse<UserPayload> =
            self.client.patch(&user_path(id)?, changes).await?;
        user_from(response)
    }

    /// `DELETE /users/{id}`. The backend deactivates rather than deletes.
    pub async fn deactivate(&self, id: &str) -> Result<(), ClientError> {
        let _: ApiResponse<serde_json::Value> = self.client.delete(&user_path(id)?).await?;
        tracing::info!(user_id = id, "User deactivated");
        Ok(())
    }

    /// `GET /users/instructors` (active instructors only).
    pub async fn instructors(&self) -> Result<Vec<User>, ClientError> {
        let response: ApiResponse<InstructorList> = self.client.get("/users/instructors").await?;
        Ok(response.into_data("instructors")?.instructors)
    }

    /// `GET /users/stats`. Shape is left to the backend.
    pub async fn stats(&self) -> Result<serde_json::Value, ClientError> {
        let response: ApiResponse<StatsPayload> = self.client.get("/users/stats").await?;
        Ok(response.into_data("stats")?.stats)
    }

    /// `PATCH /users/change-password`.
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ClientError> {
        validate(change)?;
        let _: ApiResponse<serde_json::Value> =
            self.client.patch("/users/change-password", change).await?;
        Ok(())
    }
}

/// Path for a single resource, rejecting ids that would change the route.
pub(crate) fn resource_path(collection: &str, id: &str) -> Result<String, ClientError> {
    if id.is_empty() || id.contains(['/', '?', '#']) {
        return Err(ClientError::Validation(format!("Invalid id: {id:?}")));
    }
    Ok(format!("/{}/{}", collection, id))
}

fn user_path(id: &str) -> Result<String, ClientError> {
    resource_path("users", id)
}
