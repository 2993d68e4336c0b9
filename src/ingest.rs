use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::error;
use uuid::Uuid;

use crate::detector::StopDetector;
use crate::models::{NewLocationSample, StopEvent};
use crate::store::{LocationStore, StopStore, StoreError, VehicleRegistry};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("invalid speed: {0}")]
    InvalidSpeed(f64),
    #[error("no active vehicle registered for device {0}")]
    VehicleNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A validated-on-entry ingestion request: one fix from one device.
#[derive(Debug, Clone)]
pub struct FixRequest {
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub timestamp: NaiveDateTime,
    pub correlation_id: Option<Uuid>,
}

impl FixRequest {
    /// Rejects non-finite or out-of-range values before anything touches
    /// storage or the detector.
    pub fn validate(&self) -> Result<(), IngestError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if !lat_ok || !lon_ok {
            return Err(IngestError::InvalidCoordinate {
                lat: self.latitude,
                lon: self.longitude,
            });
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(IngestError::InvalidSpeed(self.speed));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct IngestOutcome {
    pub vehicle_id: i32,
    pub location_id: i64,
    pub stop_event: Option<StopEvent>,
}

/// Single entry point for incoming fixes: validate, resolve the vehicle,
/// persist, then run stop detection before acknowledging. Stores are
/// injected; the coordinator owns no connection of its own.
pub struct IngestionCoordinator<R, L, S> {
    vehicles: R,
    locations: L,
    detector: StopDetector<L, S>,
    // One lock per vehicle, created on first sight. Grows with the fleet,
    // which is bounded and small next to the sample volume.
    vehicle_locks: Mutex<HashMap<i32, Arc<AsyncMutex<()>>>>,
}

impl<R, L, S> IngestionCoordinator<R, L, S>
where
    R: VehicleRegistry,
    L: LocationStore,
    S: StopStore,
{
    pub fn new(vehicles: R, locations: L, detector: StopDetector<L, S>) -> Self {
        Self {
            vehicles,
            locations,
            detector,
            vehicle_locks: Mutex::new(HashMap::new()),
        }
    }

    fn vehicle_lock(&self, vehicle_id: i32) -> Arc<AsyncMutex<()>> {
        let mut locks = self.vehicle_locks.lock().unwrap();
        locks
            .entry(vehicle_id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Processes one fix end to end. The sample write is fatal on failure;
    /// detection is best-effort and never rolls the write back.
    pub async fn handle_new_fix(&self, request: FixRequest) -> Result<IngestOutcome, IngestError> {
        request.validate()?;

        let vehicle = self
            .vehicles
            .find_by_device_id(&request.device_id)
            .await?
            .filter(|v| v.is_active)
            .ok_or_else(|| IngestError::VehicleNotFound(request.device_id.clone()))?;

        // Serialize persist+detect per vehicle: two concurrent fixes for the
        // same vehicle must not both pass the dedup check before either
        // records its stop.
        let lock = self.vehicle_lock(vehicle.id);
        let _guard = lock.lock().await;

        let new_sample = NewLocationSample {
            vehicle_id: vehicle.id,
            latitude: request.latitude,
            longitude: request.longitude,
            speed: request.speed,
            timestamp: request.timestamp,
            correlation_id: request.correlation_id,
        };
        let location_id = self.locations.insert_sample(new_sample.clone()).await?;
        let sample = new_sample.into_sample(location_id);

        let stop_event = match self.detector.on_new_sample(&sample).await {
            Ok(event) => event,
            Err(e) => {
                error!(
                    "Stop detection unavailable for vehicle {}: {} (sample {} already committed)",
                    vehicle.id, e, location_id
                );
                None
            }
        };

        Ok(IngestOutcome {
            vehicle_id: vehicle.id,
            location_id,
            stop_event,
        })
    }
}
