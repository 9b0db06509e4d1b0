// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fleet endpoints.

use super::http::ApiClient;
use super::users::resource_path;
use crate::error::ClientError;
use crate::models::{ApiResponse, Car, CarInput, CarQuery};
use serde::Deserialize;

#[derive(Deserialize)]
struct CarList {
    #[serde(default)]
    cars: Vec<Car>,
}

#[derive(Deserialize)]
struct CarPayload {
    car: Option<Car>,
}

/// Service for `/cars/*`.
#[derive(Clone)]
pub struct CarService {
    client: ApiClient,
}

impl CarService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /cars` with optional filters.
    pub async fn list(&self, query: &CarQuery) -> Result<Vec<Car>, ClientError> {
        let response: ApiResponse<CarList> = self.client.get_with_query("/cars", query).await?;
        Ok(response.into_data("cars")?.cars)
    }

    pub async fn get(&self, id: &str) -> Result<Car, ClientError> {
        let response: ApiResponse<CarPayload> =
            self.client.get(&resource_path("cars", id)?).await?;
        car_from(response)
    }

    /// `GET /cars/available`: active cars with status `available`.
    pub async fn available(&self) -> Result<Vec<Car>, ClientError> {
        let response: ApiResponse<CarList> = self.client.get("/cars/available").await?;
        Ok(response.into_data("cars")?.cars)
    }

    /// `POST /cars` (admin). Make, model, year and plate are required.
    pub async fn create(&self, car: &CarInput) -> Result<Car, ClientError> {
        let missing = [
            ("Make", car.make.as_deref()),
            ("Model", car.model.as_deref()),
            ("License plate", car.license_plate.as_deref()),
        ]
        .into_iter()
        .find(|(_, v)| v.map_or(true, |v| v.trim().is_empty()));
        if let Some((field, _)) = missing {
            return Err(ClientError::Validation(format!("{} is required", field)));
        }
        if car.year.is_none() {
            return Err(ClientError::Validation("Year is required".to_string()));
        }

        let response: ApiResponse<CarPayload> = self.client.post("/cars", car).await?;
        let car = car_from(response)?;
        tracing::info!(car_id = %car.id, plate = car.plate(), "Car added");
        Ok(car)
    }

    pub async fn update(&self, id: &str, changes: &CarInput) -> Result<Car, ClientError> {
        let response: ApiResponse<CarPayload> =
            self.client.patch(&resource_path("cars", id)?, changes).await?;
        car_from(response)
    }

    /// `DELETE /cars/{id}`.
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let _: ApiResponse<serde_json::Value> =
            self.client.delete(&resource_path("cars", id)?).await?;
        tracing::info!(car_id = id, "Car removed");
        Ok(())
    }
}

fn car_from(response: ApiResponse<CarPayload>) -> Result<Car, ClientError> {
    response
        .into_data("car")?
        .car
        .ok_or_else(|| ClientError::MalformedResponse("missing car".to_string()))
}
