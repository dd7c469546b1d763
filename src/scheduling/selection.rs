//! Selection state and the appointment request built from it

use crate::errors::{GoBarberError, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Last bookable hour of a day
pub const MAX_HOUR: u8 = 23;

/// The user's in-progress choice of provider, date and hour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    pub provider_id: String,
    pub date: NaiveDate,
    /// `None` until the user picks an hour; midnight is `Some(0)`
    pub hour: Option<u8>,
}

impl SelectionState {
    pub fn new(provider_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            provider_id: provider_id.into(),
            date,
            hour: None,
        }
    }

    /// Replace the date; any previous hour choice no longer applies
    pub fn change_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.hour = None;
    }

    /// Build the request to submit, or explain why it can't be built
    pub fn to_request(&self) -> Result<AppointmentRequest> {
        if self.provider_id.trim().is_empty() {
            return Err(GoBarberError::Validation(
                "no provider selected".to_string(),
            ));
        }

        let hour = self
            .hour
            .ok_or_else(|| GoBarberError::Validation("no hour selected".to_string()))?;

        AppointmentRequest::new(self.provider_id.clone(), self.date, hour)
    }
}

/// Normalized (provider, timestamp) payload sent to create a booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentRequest {
    pub provider_id: String,
    /// Local wall-clock time, minute and second zeroed
    pub timestamp: NaiveDateTime,
}

impl AppointmentRequest {
    pub fn new(provider_id: impl Into<String>, date: NaiveDate, hour: u8) -> Result<Self> {
        let time = NaiveTime::from_hms_opt(u32::from(hour), 0, 0).ok_or_else(|| {
            GoBarberError::Validation(format!("hour {} is outside 0-{}", hour, MAX_HOUR))
        })?;

        Ok(Self {
            provider_id: provider_id.into(),
            timestamp: date.and_time(time),
        })
    }

    /// The timestamp placed in the local time zone.
    ///
    /// Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant.
    pub fn local_datetime(&self) -> Result<DateTime<Local>> {
        Local
            .from_local_datetime(&self.timestamp)
            .earliest()
            .ok_or_else(|| {
                GoBarberError::Validation(format!(
                    "{} does not exist in the local time zone",
                    self.timestamp
                ))
            })
    }

    /// ISO-8601 rendering sent to the API
    pub fn to_rfc3339(&self) -> Result<String> {
        Ok(self.local_datetime()?.to_rfc3339())
    }

    /// Epoch milliseconds handed to the confirmation screen
    pub fn timestamp_millis(&self) -> Result<i64> {
        Ok(self.local_datetime()?.timestamp_millis())
    }
}
