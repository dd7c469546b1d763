//! Telemetry for the scheduling flow
//!
//! Counts what the view-model did with the network (fetches issued, applied,
//! discarded as stale, failed; submissions) and sets up `tracing` output.

use crate::cli::Verbosity;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Raw events kept for inspection; older ones are dropped, counters are not
pub const MAX_EVENTS: usize = 256;

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    ProvidersFetched {
        count: usize,
        timestamp: Instant,
    },
    AvailabilityRequested {
        generation: u64,
        timestamp: Instant,
    },
    AvailabilityApplied {
        generation: u64,
        slots: usize,
        timestamp: Instant,
    },
    /// A response arrived after a newer request was issued
    AvailabilityDiscarded {
        generation: u64,
        current: u64,
        timestamp: Instant,
    },
    FetchFailed {
        operation: String,
        timestamp: Instant,
    },
    SubmitCompleted {
        success: bool,
        duration_ms: u64,
        timestamp: Instant,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryStats {
    pub provider_fetches: usize,
    pub availability_requests: usize,
    pub availability_applied: usize,
    pub availability_discarded: usize,
    pub fetch_failures: usize,
    pub submits_succeeded: usize,
    pub submits_failed: usize,
}

/// Telemetry collector
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<VecDeque<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_EVENTS))),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = lock(&self.stats);
            match &event {
                TelemetryEvent::ProvidersFetched { .. } => stats.provider_fetches += 1,
                TelemetryEvent::AvailabilityRequested { .. } => stats.availability_requests += 1,
                TelemetryEvent::AvailabilityApplied { .. } => stats.availability_applied += 1,
                TelemetryEvent::AvailabilityDiscarded { .. } => stats.availability_discarded += 1,
                TelemetryEvent::FetchFailed { .. } => stats.fetch_failures += 1,
                TelemetryEvent::SubmitCompleted { success, .. } => {
                    if *success {
                        stats.submits_succeeded += 1;
                    } else {
                        stats.submits_failed += 1;
                    }
                }
            }
        }

        let mut events = lock(&self.events);
        if events.len() == MAX_EVENTS {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        lock(&self.stats).clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Number of retained events, at most [`MAX_EVENTS`]
    pub fn event_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = lock(&self.events);
        let start = events.len().saturating_sub(n);
        events.iter().skip(start).cloned().collect()
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple telemetry display
pub struct TelemetryDisplay {
    collector: TelemetryCollector,
    verbosity: Verbosity,
}

impl TelemetryDisplay {
    pub fn new(collector: TelemetryCollector, verbosity: Verbosity) -> Self {
        Self {
            collector,
            verbosity,
        }
    }

    /// Summary lines for the session
    pub fn summary(&self) -> Vec<String> {
        let stats = self.collector.get_stats();
        vec![
            format!("Duration:               {:?}", self.collector.elapsed()),
            format!("Provider fetches:       {}", stats.provider_fetches),
            format!("Availability requests:  {}", stats.availability_requests),
            format!("  applied:              {}", stats.availability_applied),
            format!("  discarded (stale):    {}", stats.availability_discarded),
            format!("Fetch failures:         {}", stats.fetch_failures),
            format!(
                "Submissions:            {} ok / {} failed",
                stats.submits_succeeded, stats.submits_failed
            ),
        ]
    }

    /// Print the summary when running verbose
    pub fn display_summary(&self) {
        if !self.verbosity.show_events() {
            return;
        }
        println!();
        println!("Session summary");
        println!("─────────────────────────────────────");
        for line in self.summary() {
            println!("{}", line);
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level follows the CLI verbosity.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gobarber={}", verbosity.log_level())));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
