//! Events published by the scheduling view-model
//!
//! The screen subscribes to these to navigate, show alerts and refresh lists.

use chrono::NaiveDate;
use tokio::sync::mpsc;

/// Channel capacity; a screen drains events as fast as it renders
const EVENT_CAPACITY: usize = 100;

/// View-model notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingEvent {
    /// Provider list replaced
    ProvidersLoaded { count: usize },

    /// Availability replaced for the current selection
    AvailabilityLoaded {
        provider_id: String,
        date: NaiveDate,
        slots: usize,
    },

    /// Appointment created; open the confirmation screen
    NavigateToConfirmation { timestamp_millis: i64 },

    /// Appointment creation failed; show an alert
    SubmitFailed { title: String, message: String },
}

/// Sender side of the view-model's event channel
#[derive(Clone)]
pub struct EventBus {
    sender: mpsc::Sender<SchedulingEvent>,
}

impl EventBus {
    /// Create new event bus with bounded channel
    pub fn new() -> (Self, mpsc::Receiver<SchedulingEvent>) {
        let (sender, receiver) = mpsc::channel(EVENT_CAPACITY);
        (EventBus { sender }, receiver)
    }

    /// Publish without waiting; dropped if the screen is gone or not draining
    pub fn emit(&self, event: SchedulingEvent) {
        if let Err(e) = self.sender.try_send(event) {
            tracing::debug!("scheduling event dropped: {}", e);
        }
    }
}
