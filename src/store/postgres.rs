use chrono::NaiveDateTime;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::{LocationStore, StopStore, StoreError, VehicleRegistry};
use crate::db::{queries, DbPool};
use crate::models::{LocationSample, NewLocationSample, StopEvent, Vehicle, VisitType};

/// All three store contracts over one connection pool. Cloning shares the
/// pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn stop_from_row(row: &PgRow) -> Result<StopEvent, StoreError> {
    let visit_type_raw: String = row.try_get("visit_type")?;
    let visit_type = match VisitType::parse(&visit_type_raw) {
        Some(vt) => vt,
        None => return Err(StoreError::UnknownVisitType(visit_type_raw)),
    };

    Ok(StopEvent {
        id: row.try_get("id")?,
        vehicle_id: row.try_get("vehicle_id")?,
        name: row.try_get("name")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        duration_minutes: row.try_get("duration_minutes")?,
        visit_type,
        timestamp: row.try_get("timestamp")?,
        notes: row.try_get("notes")?,
    })
}

impl VehicleRegistry for PgStore {
    async fn find_by_device_id(&self, device_id: &str) -> Result<Option<Vehicle>, StoreError> {
        let vehicle = sqlx::query_as::<_, Vehicle>(queries::SELECT_VEHICLE_BY_DEVICE_ID)
            .bind(device_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }
}

impl LocationStore for PgStore {
    async fn insert_sample(&self, sample: NewLocationSample) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(queries::INSERT_LOCATION)
            .bind(sample.vehicle_id)
            .bind(sample.latitude)
            .bind(sample.longitude)
            .bind(sample.speed)
            .bind(sample.timestamp)
            .bind(sample.correlation_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn recent_samples(
        &self,
        vehicle_id: i32,
        since: NaiveDateTime,
    ) -> Result<Vec<LocationSample>, StoreError> {
        let samples = sqlx::query_as::<_, LocationSample>(queries::SELECT_RECENT_LOCATIONS)
            .bind(vehicle_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        Ok(samples)
    }

    async fn samples_since(
        &self,
        vehicle_id: i32,
        since: NaiveDateTime,
    ) -> Result<Vec<LocationSample>, StoreError> {
        let samples = sqlx::query_as::<_, LocationSample>(queries::SELECT_LOCATIONS_SINCE)
            .bind(vehicle_id)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;
        Ok(samples)
    }

    async fn latest_sample(&self, vehicle_id: i32) -> Result<Option<LocationSample>, StoreError> {
        let sample = sqlx::query_as::<_, LocationSample>(queries::SELECT_LATEST_LOCATION)
            .bind(vehicle_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(sample)
    }
}

impl StopStore for PgStore {
    async fn stop_in_window(
        &self,
        vehicle_id: i32,
        since: NaiveDateTime,
    ) -> Result<Option<StopEvent>, StoreError> {
        let row = sqlx::query(queries::SELECT_STOP_IN_WINDOW)
            .bind(vehicle_id)
            .bind(since)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(stop_from_row).transpose()
    }

    async fn insert_stop(&self, event: &StopEvent) -> Result<(), StoreError> {
        sqlx::query(queries::INSERT_STOP_EVENT)
            .bind(event.id)
            .bind(event.vehicle_id)
            .bind(&event.name)
            .bind(event.latitude)
            .bind(event.longitude)
            .bind(event.duration_minutes)
            .bind(event.visit_type.as_str())
            .bind(event.timestamp)
            .bind(&event.notes)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_stop(
        &self,
        vehicle_id: i32,
        id: Uuid,
        name: Option<&str>,
        notes: Option<&str>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(queries::UPDATE_STOP_EVENT)
            .bind(id)
            .bind(vehicle_id)
            .bind(name)
            .bind(notes)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_stop(&self, vehicle_id: i32, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(queries::DELETE_STOP_EVENT)
            .bind(id)
            .bind(vehicle_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn stops_for_vehicle(&self, vehicle_id: i32) -> Result<Vec<StopEvent>, StoreError> {
        let rows = sqlx::query(queries::SELECT_STOPS_FOR_VEHICLE)
            .bind(vehicle_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(stop_from_row).collect()
    }
}
