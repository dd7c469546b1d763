//! Appointment scheduling flow
//!
//! Provider, date and hour selection, availability-derived slot groupings and
//! appointment submission for the appointment-creation screen.

pub mod events;
pub mod selection;
pub mod slots;
pub mod view_model;

pub use events::{EventBus, SchedulingEvent};
pub use selection::{AppointmentRequest, SelectionState};
pub use slots::{
    derive_afternoon_slots, derive_morning_slots, format_hour, DayPeriod, DaySchedule, SlotView,
};
pub use view_model::{
    Collaborators, SchedulingViewModel, SubmitOutcome, SUBMIT_FAILED_MESSAGE, SUBMIT_FAILED_TITLE,
};
