//! Deterministic in-memory store used by detector and coordinator tests.
//! Implements the exact ordering contract of the Postgres store, plus a
//! switch that makes stop reads fail for exercising the
//! detection-unavailable path.

use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::{LocationStore, StopStore, StoreError, VehicleRegistry};
use crate::models::{LocationSample, NewLocationSample, StopEvent, Vehicle};

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    vehicles: Vec<Vehicle>,
    samples: Vec<LocationSample>,
    stops: Vec<StopEvent>,
    next_vehicle_id: i32,
    next_sample_id: i64,
    fail_stop_reads: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vehicle(&self, name: &str, device_id: &str, is_active: bool) -> Vehicle {
        let mut inner = self.inner.lock().unwrap();
        inner.next_vehicle_id += 1;
        let vehicle = Vehicle {
            id: inner.next_vehicle_id,
            name: name.to_string(),
            device_id: device_id.to_string(),
            is_active,
            created_at: chrono::Utc::now().naive_utc(),
        };
        inner.vehicles.push(vehicle.clone());
        vehicle
    }

    /// When set, `stop_in_window` returns an error until cleared.
    pub fn fail_stop_reads(&self, fail: bool) {
        self.inner.lock().unwrap().fail_stop_reads = fail;
    }

    pub fn samples_snapshot(&self) -> Vec<LocationSample> {
        self.inner.lock().unwrap().samples.clone()
    }

    pub fn stops_snapshot(&self) -> Vec<StopEvent> {
        self.inner.lock().unwrap().stops.clone()
    }
}

impl VehicleRegistry for MemoryStore {
    async fn find_by_device_id(&self, device_id: &str) -> Result<Option<Vehicle>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .vehicles
            .iter()
            .find(|v| v.device_id == device_id)
            .cloned())
    }
}

impl LocationStore for MemoryStore {
    async fn insert_sample(&self, sample: NewLocationSample) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_sample_id += 1;
        let id = inner.next_sample_id;
        inner.samples.push(sample.into_sample(id));
        Ok(id)
    }

    async fn recent_samples(
        &self,
        vehicle_id: i32,
        since: NaiveDateTime,
    ) -> Result<Vec<LocationSample>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut samples: Vec<LocationSample> = inner
            .samples
            .iter()
            .filter(|s| s.vehicle_id == vehicle_id && s.timestamp >= since)
            .cloned()
            .collect();
        samples.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(samples)
    }

    async fn samples_since(
        &self,
        vehicle_id: i32,
        since: NaiveDateTime,
    ) -> Result<Vec<LocationSample>, StoreError> {
        let mut samples = self.recent_samples(vehicle_id, since).await?;
        samples.reverse();
        Ok(samples)
    }

    async fn latest_sample(&self, vehicle_id: i32) -> Result<Option<LocationSample>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .samples
            .iter()
            .filter(|s| s.vehicle_id == vehicle_id)
            .max_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)))
            .cloned())
    }
}

impl StopStore for MemoryStore {
    async fn stop_in_window(
        &self,
        vehicle_id: i32,
        since: NaiveDateTime,
    ) -> Result<Option<StopEvent>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_stop_reads {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(inner
            .stops
            .iter()
            .filter(|s| s.vehicle_id == vehicle_id && s.timestamp >= since)
            .max_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)))
            .cloned())
    }

    async fn insert_stop(&self, event: &StopEvent) -> Result<(), StoreError> {
        self.inner.lock().unwrap().stops.push(event.clone());
        Ok(())
    }

    async fn update_stop(
        &self,
        vehicle_id: i32,
        id: Uuid,
        name: Option<&str>,
        notes: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .stops
            .iter_mut()
            .find(|s| s.id == id && s.vehicle_id == vehicle_id)
        {
            Some(stop) => {
                if let Some(name) = name {
                    stop.name = name.to_string();
                }
                if let Some(notes) = notes {
                    stop.notes = Some(notes.to_string());
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_stop(&self, vehicle_id: i32, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.stops.len();
        inner.stops.retain(|s| !(s.id == id && s.vehicle_id == vehicle_id));
        Ok(inner.stops.len() < before)
    }

    async fn stops_for_vehicle(&self, vehicle_id: i32) -> Result<Vec<StopEvent>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut stops: Vec<StopEvent> = inner
            .stops
            .iter()
            .filter(|s| s.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        stops.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(stops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap()
    }

    fn fix(vehicle_id: i32, minute: u32) -> NewLocationSample {
        NewLocationSample {
            vehicle_id,
            latitude: 40.0,
            longitude: -74.0,
            speed: 0.0,
            timestamp: ts(minute),
            correlation_id: None,
        }
    }

    #[tokio::test]
    async fn recent_samples_are_descending_with_id_tiebreak() {
        let store = MemoryStore::new();
        let v = store.add_vehicle("Vehicle 1", "device_1", true);

        // Two samples share a timestamp; insertion order decides via id.
        store.insert_sample(fix(v.id, 3)).await.unwrap();
        store.insert_sample(fix(v.id, 1)).await.unwrap();
        store.insert_sample(fix(v.id, 1)).await.unwrap();
        store.insert_sample(fix(v.id, 2)).await.unwrap();

        let window = store.recent_samples(v.id, ts(0)).await.unwrap();
        let order: Vec<(NaiveDateTime, i64)> =
            window.iter().map(|s| (s.timestamp, s.id)).collect();
        assert_eq!(
            order,
            vec![(ts(3), 1), (ts(2), 4), (ts(1), 3), (ts(1), 2)]
        );
        // The detector anchors on the last element; it must be the oldest.
        assert_eq!(window.last().unwrap().timestamp, ts(1));
    }

    #[tokio::test]
    async fn manual_stop_edit_and_delete_round_trip() {
        let store = MemoryStore::new();
        let v = store.add_vehicle("Vehicle 1", "device_1", true);
        let stop = StopEvent::manual(v.id, Some("Depot".into()), 40.0, -74.0, None, ts(0));
        store.insert_stop(&stop).await.unwrap();

        assert!(store
            .update_stop(v.id, stop.id, None, Some("gate code 4711"))
            .await
            .unwrap());
        let stops = store.stops_for_vehicle(v.id).await.unwrap();
        assert_eq!(stops[0].name, "Depot");
        assert_eq!(stops[0].notes.as_deref(), Some("gate code 4711"));

        // Another vehicle's id never matches.
        assert!(!store
            .update_stop(v.id + 1, stop.id, Some("x"), None)
            .await
            .unwrap());
        assert!(!store.delete_stop(v.id + 1, stop.id).await.unwrap());

        assert!(store.delete_stop(v.id, stop.id).await.unwrap());
        assert!(store.stops_for_vehicle(v.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_ascending_and_latest_prefers_newest_insert() {
        let store = MemoryStore::new();
        let v = store.add_vehicle("Vehicle 1", "device_1", true);
        store.insert_sample(fix(v.id, 2)).await.unwrap();
        store.insert_sample(fix(v.id, 0)).await.unwrap();
        store.insert_sample(fix(v.id, 2)).await.unwrap();

        let history = store.samples_since(v.id, ts(0)).await.unwrap();
        let order: Vec<(NaiveDateTime, i64)> =
            history.iter().map(|s| (s.timestamp, s.id)).collect();
        assert_eq!(order, vec![(ts(0), 2), (ts(2), 1), (ts(2), 3)]);

        let latest = store.latest_sample(v.id).await.unwrap().unwrap();
        assert_eq!((latest.timestamp, latest.id), (ts(2), 3));
    }

    #[tokio::test]
    async fn window_filter_is_inclusive_and_scoped_by_vehicle() {
        let store = MemoryStore::new();
        let a = store.add_vehicle("Vehicle 1", "device_1", true);
        let b = store.add_vehicle("Vehicle 2", "device_2", true);

        store.insert_sample(fix(a.id, 0)).await.unwrap();
        store.insert_sample(fix(a.id, 5)).await.unwrap();
        store.insert_sample(fix(b.id, 5)).await.unwrap();

        let window = store.recent_samples(a.id, ts(5)).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].vehicle_id, a.id);
    }
}
