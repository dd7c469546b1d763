//! HTTP client for the GoBarber API
//!
//! - GET  /providers
//! - GET  /providers/{id}/day-availability?year=&month=&day=
//! - POST /appointments

use crate::api::types::{AvailabilitySlot, CreateAppointmentBody, CreatedAppointment, Provider};
use crate::api::{AppointmentApi, AvailabilitySource, ProviderDirectory};
use crate::config::Config;
use crate::errors::{GoBarberError, Result};
use crate::scheduling::AppointmentRequest;
use crate::session::SessionContext;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default API endpoint
pub const DEFAULT_API_URL: &str = "http://localhost:3333";

/// Default request timeout (30 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GoBarber API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl ApiClient {
    /// Create client with default settings and no session
    pub fn new() -> Result<Self> {
        Self::with_config(
            DEFAULT_API_URL,
            REQUEST_TIMEOUT,
            Arc::new(SessionContext::anonymous()),
        )
    }

    /// Create client with custom configuration
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        session: Arc<SessionContext>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GoBarberError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Create client from loaded configuration
    pub fn from_config(config: &Config, session: Arc<SessionContext>) -> Result<Self> {
        Self::with_config(
            &config.api_url(),
            Duration::from_secs(config.api.timeout_secs),
            session,
        )
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the API answers at all
    pub async fn health_check(&self) -> bool {
        let url = self.url("providers");
        self.authorize(self.client.get(&url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .is_ok()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `providers/{id}/day-availability` with the id as one encoded segment
    fn availability_url(&self, provider_id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            GoBarberError::Config(format!("Invalid API URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| GoBarberError::Config(format!("Invalid API URL '{}'", self.base_url)))?
            .pop_if_empty()
            .push("providers")
            .push(provider_id)
            .push("day-availability");
        Ok(url)
    }

    fn availability_request(&self, provider_id: &str, date: NaiveDate) -> Result<RequestBuilder> {
        let request = self.client.get(self.availability_url(provider_id)?).query(&[
            ("year", date.year()),
            ("month", date.month() as i32),
            ("day", date.day() as i32),
        ]);
        Ok(self.authorize(request))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(operation: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| GoBarberError::remote(operation, format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GoBarberError::remote(
                operation,
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| GoBarberError::remote(operation, format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl ProviderDirectory for ApiClient {
    async fn list_providers(&self) -> Result<Vec<Provider>> {
        const OP: &str = "list_providers";
        let url = self.url("providers");
        debug!(%url, "GET providers");

        let response = Self::send(OP, self.authorize(self.client.get(&url))).await?;
        Self::decode(OP, response).await
    }
}

#[async_trait]
impl AvailabilitySource for ApiClient {
    async fn day_availability(
        &self,
        provider_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>> {
        const OP: &str = "day_availability";
        debug!(provider_id, %date, "GET day availability");

        let response = Self::send(OP, self.availability_request(provider_id, date)?).await?;
        Self::decode(OP, response).await
    }
}

#[async_trait]
impl AppointmentApi for ApiClient {
    async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<CreatedAppointment> {
        const OP: &str = "create_appointment";
        let url = self.url("appointments");
        let body = CreateAppointmentBody {
            provider_id: &request.provider_id,
            date: request.to_rfc3339()?,
        };
        debug!(%url, provider_id = body.provider_id, date = %body.date, "POST appointments");

        let response = Self::send(OP, self.authorize(self.client.post(&url).json(&body))).await?;
        let status = response.status();

        // 2xx means created; the body only carries the id
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(%status, "appointment created, response body unreadable: {}", e);
                return Ok(CreatedAppointment::default());
            }
        };
        match serde_json::from_str(&text) {
            Ok(created) => Ok(created),
            Err(e) => {
                warn!(%status, body = %text, "appointment created, response body not understood: {}", e);
                Ok(CreatedAppointment::default())
            }
        }
    }
}
