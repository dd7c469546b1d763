//! Wire types for the GoBarber API

use crate::session::avatar_or_placeholder;
use serde::{Deserialize, Serialize};

/// A bookable service professional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Provider {
    pub fn avatar_or_placeholder(&self) -> &str {
        avatar_or_placeholder(self.avatar_url.as_deref())
    }
}

/// One hour of a provider's day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub hour: u8,
    pub available: bool,
}

impl AvailabilitySlot {
    pub fn new(hour: u8, available: bool) -> Self {
        Self { hour, available }
    }
}

/// Body of `POST appointments`
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateAppointmentBody<'a> {
    pub provider_id: &'a str,
    pub date: String,
}

/// Appointment as returned by the API after creation.
///
/// Only the id is read; everything else is kept opaque. An empty value
/// stands for a created appointment whose body could not be read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedAppointment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
