//! Scheduling view-model
//!
//! Owns the selection (provider, date, hour), the provider list and the
//! current day's availability for the appointment-creation screen.
//!
//! Availability is a dependent fetch: every provider or date change issues a
//! new request. Requests are numbered; a response is applied only if no newer
//! request was issued in the meantime, and the previous in-flight task is
//! aborted when a new one starts.
//!
//! Background fetches run on the tokio runtime that was current when the
//! view-model was created, so the setters may be called from any thread.

use crate::api::{
    ApiClient, AppointmentApi, AvailabilitySlot, AvailabilitySource, Provider, ProviderDirectory,
};
use crate::errors::{GoBarberError, Result};
use crate::scheduling::events::{EventBus, SchedulingEvent};
use crate::scheduling::selection::{AppointmentRequest, SelectionState, MAX_HOUR};
use crate::scheduling::slots::{format_hour, DaySchedule, SlotMemo, SlotView};
use crate::session::SessionContext;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Alert title shown when an appointment can't be created
pub const SUBMIT_FAILED_TITLE: &str = "Appointment creation failed";

/// Alert body shown when an appointment can't be created
pub const SUBMIT_FAILED_MESSAGE: &str = "Could not create the appointment, please try again";

/// The three remote collaborators of the screen
#[derive(Clone)]
pub struct Collaborators {
    pub directory: Arc<dyn ProviderDirectory>,
    pub availability: Arc<dyn AvailabilitySource>,
    pub appointments: Arc<dyn AppointmentApi>,
}

impl Collaborators {
    /// All three backed by the same HTTP client
    pub fn from_client(client: ApiClient) -> Self {
        let client = Arc::new(client);
        Self {
            directory: client.clone(),
            availability: client.clone(),
            appointments: client,
        }
    }
}

/// Result of pressing "book"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created {
        request: AppointmentRequest,
        timestamp_millis: i64,
        appointment_id: Option<String>,
    },
    /// The API rejected or never answered; selection is untouched
    Failed { message: String },
}

struct ScreenState {
    selection: SelectionState,
    providers: Arc<[Provider]>,
    availability: Arc<[AvailabilitySlot]>,
    generation: u64,
    memo: SlotMemo,
}

struct Shared {
    state: Mutex<ScreenState>,
    collaborators: Collaborators,
    events: EventBus,
    telemetry: TelemetryCollector,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number a new availability request for the current selection
    fn begin_availability_request(&self) -> AvailabilityRequest {
        let mut state = self.state();
        state.generation += 1;
        let request = AvailabilityRequest {
            generation: state.generation,
            provider_id: state.selection.provider_id.clone(),
            date: state.selection.date,
        };
        drop(state);

        debug!(
            generation = request.generation,
            provider_id = %request.provider_id,
            date = %request.date,
            "availability requested"
        );
        self.telemetry.record(TelemetryEvent::AvailabilityRequested {
            generation: request.generation,
            timestamp: Instant::now(),
        });
        request
    }

    async fn load_availability(&self, request: AvailabilityRequest) {
        let result = self
            .collaborators
            .availability
            .day_availability(&request.provider_id, request.date)
            .await;

        let mut state = self.state();
        if state.generation != request.generation {
            debug!(
                generation = request.generation,
                current = state.generation,
                "stale availability response discarded"
            );
            self.telemetry.record(TelemetryEvent::AvailabilityDiscarded {
                generation: request.generation,
                current: state.generation,
                timestamp: Instant::now(),
            });
            return;
        }

        match result {
            Ok(slots) => {
                let count = slots.len();
                state.availability = slots.into();
                drop(state);

                debug!(generation = request.generation, slots = count, "availability applied");
                self.telemetry.record(TelemetryEvent::AvailabilityApplied {
                    generation: request.generation,
                    slots: count,
                    timestamp: Instant::now(),
                });
                self.events.emit(SchedulingEvent::AvailabilityLoaded {
                    provider_id: request.provider_id,
                    date: request.date,
                    slots: count,
                });
            }
            Err(e) => {
                drop(state);
                warn!(
                    provider_id = %request.provider_id,
                    date = %request.date,
                    "availability fetch failed, keeping previous slots: {}",
                    e
                );
                self.telemetry.record(TelemetryEvent::FetchFailed {
                    operation: "day_availability".to_string(),
                    timestamp: Instant::now(),
                });
            }
        }
    }
}

struct AvailabilityRequest {
    generation: u64,
    provider_id: String,
    date: NaiveDate,
}

/// State holder for the appointment-creation screen
pub struct SchedulingViewModel {
    shared: Arc<Shared>,
    session: Arc<SessionContext>,
    runtime: Option<Handle>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl SchedulingViewModel {
    /// Create the view-model for a screen opened on `initial_provider_id`.
    ///
    /// Nothing is fetched until [`mount`](Self::mount) is awaited. When called
    /// inside a tokio runtime, that runtime is kept for background fetches.
    pub fn new(
        collaborators: Collaborators,
        session: Arc<SessionContext>,
        initial_provider_id: impl Into<String>,
        initial_date: NaiveDate,
    ) -> (Self, mpsc::Receiver<SchedulingEvent>) {
        let (events, receiver) = EventBus::new();
        let state = ScreenState {
            selection: SelectionState::new(initial_provider_id, initial_date),
            providers: Arc::from(Vec::<Provider>::new()),
            availability: Arc::from(Vec::<AvailabilitySlot>::new()),
            generation: 0,
            memo: SlotMemo::new(),
        };

        let view_model = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                collaborators,
                events,
                telemetry: TelemetryCollector::new(),
            }),
            session,
            runtime: Handle::try_current().ok(),
            in_flight: Mutex::new(None),
        };

        (view_model, receiver)
    }

    /// Initial load: provider list, then availability for the initial selection
    pub async fn mount(&self) {
        self.fetch_providers().await;
        self.fetch_availability().await;
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.shared.telemetry
    }

    pub fn selection(&self) -> SelectionState {
        self.shared.state().selection.clone()
    }

    pub fn providers(&self) -> Arc<[Provider]> {
        Arc::clone(&self.shared.state().providers)
    }

    pub fn availability(&self) -> Arc<[AvailabilitySlot]> {
        Arc::clone(&self.shared.state().availability)
    }

    /// Select a provider and reload availability in the background.
    ///
    /// Without a runtime (none at creation and none current now) the
    /// selection changes but nothing is fetched.
    pub fn set_provider(&self, provider_id: impl Into<String>) {
        self.shared.state().selection.provider_id = provider_id.into();
        self.refresh_availability();
    }

    /// Select a date, clear the hour, and reload availability in the background.
    ///
    /// Same runtime rules as [`set_provider`](Self::set_provider).
    pub fn set_date(&self, date: NaiveDate) {
        self.shared.state().selection.change_date(date);
        self.refresh_availability();
    }

    /// Select an hour. Only hours listed as available for the current day
    /// can be chosen; anything else leaves the selection unchanged.
    pub fn set_hour(&self, hour: u8) -> Result<()> {
        if hour > MAX_HOUR {
            return Err(GoBarberError::Validation(format!(
                "hour {} is outside 0-{}",
                hour, MAX_HOUR
            )));
        }

        let mut state = self.shared.state();
        let bookable = state
            .availability
            .iter()
            .any(|slot| slot.hour == hour && slot.available);
        if !bookable {
            return Err(GoBarberError::Validation(format!(
                "{} is not available",
                format_hour(hour)
            )));
        }

        state.selection.hour = Some(hour);
        Ok(())
    }

    /// Whether `hour` can be picked right now
    pub fn is_hour_selectable(&self, hour: u8) -> bool {
        self.shared
            .state()
            .availability
            .iter()
            .any(|slot| slot.hour == hour && slot.available)
    }

    /// Replace the provider list. Failures are logged and the old list kept.
    pub async fn fetch_providers(&self) {
        match self.shared.collaborators.directory.list_providers().await {
            Ok(providers) => {
                let count = providers.len();
                self.shared.state().providers = providers.into();

                info!(count, "providers loaded");
                self.shared.telemetry.record(TelemetryEvent::ProvidersFetched {
                    count,
                    timestamp: Instant::now(),
                });
                self.shared.events.emit(SchedulingEvent::ProvidersLoaded { count });
            }
            Err(e) => {
                warn!("provider fetch failed, keeping previous list: {}", e);
                self.shared.telemetry.record(TelemetryEvent::FetchFailed {
                    operation: "list_providers".to_string(),
                    timestamp: Instant::now(),
                });
            }
        }
    }

    /// Load availability for the current selection and wait for it.
    ///
    /// Supersedes any background fetch still running.
    pub async fn fetch_availability(&self) {
        let request = self.shared.begin_availability_request();
        if let Some(previous) = self.take_in_flight() {
            previous.abort();
        }
        self.shared.load_availability(request).await;
    }

    /// Wait for the background availability fetch, if any, to finish
    pub async fn settled(&self) {
        if let Some(handle) = self.take_in_flight() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("availability task failed: {}", e);
                }
            }
        }
    }

    /// Morning/afternoon grouping of the current availability
    pub fn day_schedule(&self) -> Arc<DaySchedule> {
        let mut state = self.shared.state();
        let availability = Arc::clone(&state.availability);
        state.memo.get(&availability)
    }

    pub fn morning_slots(&self) -> Vec<SlotView> {
        self.day_schedule().morning.clone()
    }

    pub fn afternoon_slots(&self) -> Vec<SlotView> {
        self.day_schedule().afternoon.clone()
    }

    /// Create the appointment for the current selection.
    ///
    /// Local precondition failures return `Err` without touching the network.
    /// Remote failures are reported once through [`SchedulingEvent::SubmitFailed`]
    /// and returned as [`SubmitOutcome::Failed`]; the selection stays as it was.
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let request = self.shared.state().selection.to_request()?;
        let timestamp_millis = request.timestamp_millis()?;
        let started = Instant::now();

        let result = self
            .shared
            .collaborators
            .appointments
            .create_appointment(&request)
            .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(created) => {
                info!(
                    provider_id = %request.provider_id,
                    timestamp = %request.timestamp,
                    "appointment created"
                );
                self.shared.telemetry.record(TelemetryEvent::SubmitCompleted {
                    success: true,
                    duration_ms,
                    timestamp: Instant::now(),
                });
                self.shared
                    .events
                    .emit(SchedulingEvent::NavigateToConfirmation { timestamp_millis });

                Ok(SubmitOutcome::Created {
                    request,
                    timestamp_millis,
                    appointment_id: created.id,
                })
            }
            Err(e) => {
                warn!(provider_id = %request.provider_id, "appointment creation failed: {}", e);
                self.shared.telemetry.record(TelemetryEvent::SubmitCompleted {
                    success: false,
                    duration_ms,
                    timestamp: Instant::now(),
                });
                self.shared.events.emit(SchedulingEvent::SubmitFailed {
                    title: SUBMIT_FAILED_TITLE.to_string(),
                    message: SUBMIT_FAILED_MESSAGE.to_string(),
                });

                Ok(SubmitOutcome::Failed {
                    message: SUBMIT_FAILED_MESSAGE.to_string(),
                })
            }
        }
    }

    /// Start a background availability fetch for the current selection
    fn refresh_availability(&self) {
        let runtime = match self.runtime.clone().or_else(|| Handle::try_current().ok()) {
            Some(runtime) => runtime,
            None => {
                warn!("no tokio runtime available, availability not refreshed");
                return;
            }
        };

        let request = self.shared.begin_availability_request();
        let shared = Arc::clone(&self.shared);
        let handle = runtime.spawn(async move {
            shared.load_availability(request).await;
        });

        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn take_in_flight(&self) -> Option<JoinHandle<()>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl Drop for SchedulingViewModel {
    fn drop(&mut self) {
        if let Some(handle) = self.take_in_flight() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CreatedAppointment;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::oneshot;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn slots(entries: &[(u8, bool)]) -> Vec<AvailabilitySlot> {
        entries
            .iter()
            .map(|&(hour, available)| AvailabilitySlot::new(hour, available))
            .collect()
    }

    /// Availability source whose answers are released by the test
    #[derive(Default)]
    struct GatedAvailability {
        gates: Mutex<HashMap<NaiveDate, oneshot::Receiver<Vec<AvailabilitySlot>>>>,
    }

    impl GatedAvailability {
        fn gate(&self, date: NaiveDate) -> oneshot::Sender<Vec<AvailabilitySlot>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(date, rx);
            tx
        }
    }

    #[async_trait]
    impl AvailabilitySource for GatedAvailability {
        async fn day_availability(
            &self,
            _provider_id: &str,
            date: NaiveDate,
        ) -> Result<Vec<AvailabilitySlot>> {
            let gate = self.gates.lock().unwrap().remove(&date);
            match gate {
                Some(rx) => rx
                    .await
                    .map_err(|_| GoBarberError::remote("day_availability", "gate dropped")),
                None => Ok(Vec::new()),
            }
        }
    }

    struct NoProviders;

    #[async_trait]
    impl ProviderDirectory for NoProviders {
        async fn list_providers(&self) -> Result<Vec<Provider>> {
            Err(GoBarberError::remote("list_providers", "offline"))
        }
    }

    struct RejectingAppointments;

    #[async_trait]
    impl AppointmentApi for RejectingAppointments {
        async fn create_appointment(
            &self,
            _request: &AppointmentRequest,
        ) -> Result<CreatedAppointment> {
            Err(GoBarberError::remote("create_appointment", "HTTP 500"))
        }
    }

    fn gated_view_model(
        availability: Arc<GatedAvailability>,
    ) -> (SchedulingViewModel, mpsc::Receiver<SchedulingEvent>) {
        let collaborators = Collaborators {
            directory: Arc::new(NoProviders),
            availability,
            appointments: Arc::new(RejectingAppointments),
        };
        SchedulingViewModel::new(
            collaborators,
            Arc::new(SessionContext::anonymous()),
            "p1",
            date(2024, 3, 10),
        )
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let source = Arc::new(GatedAvailability::default());
        let (vm, _events) = gated_view_model(source.clone());

        let newer_date = date(2024, 3, 11);
        let older_gate = source.gate(date(2024, 3, 10));
        let newer_gate = source.gate(newer_date);

        // a refresh of the opening day is still pending when another day is picked
        let refresh = vm.fetch_availability();
        let pick_day = async {
            tokio::task::yield_now().await;
            vm.set_date(newer_date);
            newer_gate.send(slots(&[(14, true)])).unwrap();
            vm.settled().await;
            older_gate.send(slots(&[(9, true)])).unwrap();
        };
        tokio::join!(refresh, pick_day);

        let hours: Vec<u8> = vm.availability().iter().map(|s| s.hour).collect();
        assert_eq!(hours, vec![14]);
        assert_eq!(vm.selection().date, newer_date);
        assert_eq!(vm.telemetry().get_stats().availability_discarded, 1);
    }

    #[test]
    fn test_setters_use_runtime_captured_at_creation() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = Arc::new(GatedAvailability::default());
        let (vm, _events) = runtime.block_on(async { gated_view_model(source.clone()) });

        source
            .gate(date(2024, 3, 11))
            .send(slots(&[(10, true)]))
            .unwrap();
        // called from a thread that is not inside the runtime
        vm.set_date(date(2024, 3, 11));
        runtime.block_on(vm.settled());

        let hours: Vec<u8> = vm.availability().iter().map(|s| s.hour).collect();
        assert_eq!(hours, vec![10]);
    }

    #[test]
    fn test_setters_without_runtime_only_update_selection() {
        let source = Arc::new(GatedAvailability::default());
        let (vm, _events) = gated_view_model(source);

        vm.set_provider("p2");
        vm.set_date(date(2024, 3, 12));

        let selection = vm.selection();
        assert_eq!(selection.provider_id, "p2");
        assert_eq!(selection.date, date(2024, 3, 12));
        assert_eq!(selection.hour, None);
        assert_eq!(vm.telemetry().get_stats().availability_requests, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_availability() {
        let source = Arc::new(GatedAvailability::default());
        let (vm, _events) = gated_view_model(source.clone());

        let gate = source.gate(date(2024, 3, 10));
        gate.send(slots(&[(9, true)])).unwrap();
        vm.fetch_availability().await;
        assert_eq!(vm.availability().len(), 1);

        // dropped sender makes the source fail
        drop(source.gate(date(2024, 3, 10)));
        vm.fetch_availability().await;
        assert_eq!(vm.availability().len(), 1);
        assert_eq!(vm.telemetry().get_stats().fetch_failures, 1);
    }

    #[tokio::test]
    async fn test_provider_fetch_failure_is_not_fatal() {
        let source = Arc::new(GatedAvailability::default());
        let (vm, _events) = gated_view_model(source);

        vm.fetch_providers().await;
        assert!(vm.providers().is_empty());
        assert_eq!(vm.telemetry().get_stats().fetch_failures, 1);
    }

    #[tokio::test]
    async fn test_set_hour_rejects_unlisted_and_unavailable() {
        let source = Arc::new(GatedAvailability::default());
        let (vm, _events) = gated_view_model(source.clone());

        source
            .gate(date(2024, 3, 10))
            .send(slots(&[(0, true), (9, true), (15, false)]))
            .unwrap();
        vm.fetch_availability().await;

        assert!(vm.set_hour(15).is_err());
        assert!(vm.set_hour(10).is_err());
        assert!(vm.set_hour(24).is_err());
        assert_eq!(vm.selection().hour, None);

        vm.set_hour(0).unwrap();
        assert_eq!(vm.selection().hour, Some(0));
        assert!(vm.is_hour_selectable(9));
        assert!(!vm.is_hour_selectable(15));
    }

    #[tokio::test]
    async fn test_submit_without_hour_is_validation_error() {
        let source = Arc::new(GatedAvailability::default());
        let (vm, mut events) = gated_view_model(source);

        let err = vm.submit().await.unwrap_err();
        assert!(matches!(err, GoBarberError::Validation(_)));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_memo_follows_new_availability() {
        let source = Arc::new(GatedAvailability::default());
        let (vm, _events) = gated_view_model(source.clone());

        source
            .gate(date(2024, 3, 10))
            .send(slots(&[(9, true), (13, true)]))
            .unwrap();
        vm.fetch_availability().await;
        let first = vm.day_schedule();
        assert!(Arc::ptr_eq(&first, &vm.day_schedule()));

        source
            .gate(date(2024, 3, 10))
            .send(slots(&[(16, true)]))
            .unwrap();
        vm.fetch_availability().await;
        let second = vm.day_schedule();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.morning.is_empty());
        assert_eq!(vm.afternoon_slots()[0].hour_formatted, "16:00");
    }
}
