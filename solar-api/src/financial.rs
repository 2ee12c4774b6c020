//! Client of the financial projection endpoint (`POST /calcular`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use solar_core::{FinancialParameters, ScenarioSet};
use tracing::{info, instrument};

use crate::client::{self, endpoint};
use crate::error::{ApiError, Service, truncate_body};

pub const DEFAULT_CALC_BASE_URL: &str = "https://cash-48v3.onrender.com";

/// Anything that can turn parameters into a four-scenario result set.
#[async_trait]
pub trait ScenarioSource: Send + Sync {
    async fn project(
        &self,
        params: &FinancialParameters,
    ) -> Result<ScenarioSet, ApiError>;
}

pub struct FinancialClient {
    client: Client,
    url: String,
}

impl FinancialClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: client::try_new(timeout)?,
            url: endpoint(base_url, "calcular"),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    #[instrument(skip_all, fields(horizon = params.horizon_years))]
    pub async fn calculate(
        &self,
        params: &FinancialParameters,
    ) -> Result<ScenarioSet, ApiError> {
        info!(url = %self.url, "requesting projection…");
        let response = self.client.post(&self.url).json(params).send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_response(status, &body)
    }
}

#[async_trait]
impl ScenarioSource for FinancialClient {
    async fn project(
        &self,
        params: &FinancialParameters,
    ) -> Result<ScenarioSet, ApiError> {
        self.calculate(params).await
    }
}

/// Maps a raw response of the endpoint to a result set or an error.
pub fn parse_response(
    status: StatusCode,
    body: &str,
) -> Result<ScenarioSet, ApiError> {
    if !status.is_success() {
        return Err(ApiError::Status {
            service: Service::Calculation,
            status: status.as_u16(),
            body: truncate_body(body),
        });
    }
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}
