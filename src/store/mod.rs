use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{LocationSample, NewLocationSample, StopEvent, Vehicle};

pub mod postgres;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unknown visit_type value in row: {0}")]
    UnknownVisitType(String),
}

/// Read-only view of the device_id -> vehicle mapping.
#[allow(async_fn_in_trait)]
pub trait VehicleRegistry {
    async fn find_by_device_id(&self, device_id: &str) -> Result<Option<Vehicle>, StoreError>;
}

/// Append-only log of GPS fixes per vehicle with windowed range queries.
#[allow(async_fn_in_trait)]
pub trait LocationStore {
    async fn insert_sample(&self, sample: NewLocationSample) -> Result<i64, StoreError>;

    /// Samples with `timestamp >= since`, strictly ordered by
    /// `(timestamp DESC, id DESC)`. The detector relies on the last element
    /// being the oldest sample in the window, so the id tiebreak is part of
    /// the contract, not a nicety.
    async fn recent_samples(
        &self,
        vehicle_id: i32,
        since: NaiveDateTime,
    ) -> Result<Vec<LocationSample>, StoreError>;

    /// Ascending variant used for history views and stats.
    async fn samples_since(
        &self,
        vehicle_id: i32,
        since: NaiveDateTime,
    ) -> Result<Vec<LocationSample>, StoreError>;

    async fn latest_sample(&self, vehicle_id: i32) -> Result<Option<LocationSample>, StoreError>;
}

/// Confirmed visits, auto-detected and manual alike. One table on purpose:
/// the dedup query matches both kinds, so a fresh manual save also holds off
/// auto-detection for its window.
#[allow(async_fn_in_trait)]
pub trait StopStore {
    /// Any stop (regardless of visit_type) with `timestamp >= since`,
    /// newest first.
    async fn stop_in_window(
        &self,
        vehicle_id: i32,
        since: NaiveDateTime,
    ) -> Result<Option<StopEvent>, StoreError>;

    async fn insert_stop(&self, event: &StopEvent) -> Result<(), StoreError>;

    /// Edits name and/or notes of a stop belonging to the vehicle. Returns
    /// false when no such stop exists. Position and duration stay fixed.
    async fn update_stop(
        &self,
        vehicle_id: i32,
        id: Uuid,
        name: Option<&str>,
        notes: Option<&str>,
    ) -> Result<bool, StoreError>;

    async fn delete_stop(&self, vehicle_id: i32, id: Uuid) -> Result<bool, StoreError>;

    async fn stops_for_vehicle(&self, vehicle_id: i32) -> Result<Vec<StopEvent>, StoreError>;
}
