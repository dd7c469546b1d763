//! Remote GoBarber API
//!
//! The scheduling flow talks to three collaborators. Each one is a trait so
//! the view-model can be driven by the HTTP client in production and by
//! in-memory fakes in tests.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{AvailabilitySlot, CreatedAppointment, Provider};

use crate::errors::Result;
use crate::scheduling::AppointmentRequest;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of the bookable provider list
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    async fn list_providers(&self) -> Result<Vec<Provider>>;
}

/// Per-day availability of a provider
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    async fn day_availability(
        &self,
        provider_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<AvailabilitySlot>>;
}

/// Appointment creation
#[async_trait]
pub trait AppointmentApi: Send + Sync {
    async fn create_appointment(&self, request: &AppointmentRequest)
        -> Result<CreatedAppointment>;
}
