use chrono::{Duration, NaiveDateTime};
use tracing::info;
use uuid::Uuid;

use crate::geo;
use crate::models::stop_event::AUTO_STOP_NAME;
use crate::models::{LocationSample, StopEvent, VisitType};
use crate::store::{LocationStore, StopStore, StoreError};

/// Tuning for the stop detector. The defaults encode the nominal rule:
/// a vehicle that stayed within 50 m of the oldest sample of its trailing
/// 10-minute window, across at least 5 samples spanning at least 5 minutes,
/// is stopped.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub window_minutes: i64,
    pub min_samples: usize,
    pub max_drift_km: f64,
    pub min_dwell_minutes: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_minutes: 10,
            min_samples: 5,
            max_drift_km: 0.05,
            min_dwell_minutes: 5.0,
        }
    }
}

/// A window that qualified as a stop, before dedup.
#[derive(Debug, Clone, PartialEq)]
pub struct StopCandidate {
    pub latitude: f64,
    pub longitude: f64,
    /// Timestamp of the window anchor: when the stay began.
    pub started_at: NaiveDateTime,
    pub duration_minutes: i32,
}

/// Decides whether the window around `current` qualifies as a stop.
///
/// `window` must come from `LocationStore::recent_samples` (descending by
/// timestamp then id), so its last element is the oldest sample: the anchor.
/// A late-arriving `current` older than the anchor yields a negative dwell
/// and falls out at the dwell check, so out-of-order ingestion degrades to
/// "no detection" rather than a bogus event.
pub fn evaluate_window(
    window: &[LocationSample],
    current: &LocationSample,
    config: &DetectorConfig,
) -> Option<StopCandidate> {
    if window.len() < config.min_samples {
        return None;
    }

    let anchor = window.last()?;
    let drift_km = geo::haversine_distance_km(
        anchor.latitude,
        anchor.longitude,
        current.latitude,
        current.longitude,
    );
    if drift_km >= config.max_drift_km {
        return None;
    }

    let dwell_minutes = (current.timestamp - anchor.timestamp).num_seconds() as f64 / 60.0;
    if dwell_minutes < config.min_dwell_minutes {
        return None;
    }

    Some(StopCandidate {
        latitude: current.latitude,
        longitude: current.longitude,
        started_at: anchor.timestamp,
        duration_minutes: dwell_minutes as i32,
    })
}

/// Online stop detection over injected stores. Holds no per-vehicle state of
/// its own: every decision is recomputed from the sample log and the
/// recorded stops, which is what makes replay idempotent.
pub struct StopDetector<L, S> {
    locations: L,
    stops: S,
    config: DetectorConfig,
}

impl<L: LocationStore, S: StopStore> StopDetector<L, S> {
    pub fn new(locations: L, stops: S, config: DetectorConfig) -> Self {
        Self {
            locations,
            stops,
            config,
        }
    }

    /// Runs detection for a just-persisted sample. Returns the stop event it
    /// created, if any.
    ///
    /// "Now" is the sample's own timestamp, for the window fetch and the
    /// dedup check alike. The dedup window therefore trails the newest
    /// sample, not the recorded stop's anchor; a qualifying sample arriving
    /// right after an earlier stop leaves the window can open a second,
    /// overlapping stop.
    pub async fn on_new_sample(
        &self,
        sample: &LocationSample,
    ) -> Result<Option<StopEvent>, StoreError> {
        let since = sample.timestamp - Duration::minutes(self.config.window_minutes);

        let window = self.locations.recent_samples(sample.vehicle_id, since).await?;
        let candidate = match evaluate_window(&window, sample, &self.config) {
            Some(c) => c,
            None => return Ok(None),
        };

        // Any stop in the window suppresses, manual saves included.
        if self.stops.stop_in_window(sample.vehicle_id, since).await?.is_some() {
            return Ok(None);
        }

        let event = StopEvent {
            id: Uuid::new_v4(),
            vehicle_id: sample.vehicle_id,
            name: AUTO_STOP_NAME.to_string(),
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            duration_minutes: candidate.duration_minutes,
            visit_type: VisitType::AutoDetected,
            timestamp: candidate.started_at,
            notes: None,
        };
        self.stops.insert_stop(&event).await?;
        info!(
            "Recorded stop for vehicle {} at ({}, {}), {} min",
            event.vehicle_id, event.latitude, event.longitude, event.duration_minutes
        );

        Ok(Some(event))
    }
}
