use chrono::NaiveDateTime;
use sqlx::FromRow;
use uuid::Uuid;

/// One stored GPS fix. Rows are append-only; timestamps are UTC and not
/// guaranteed monotonic per vehicle (units buffer and resend).
#[derive(Debug, Clone, FromRow)]
pub struct LocationSample {
    pub id: i64, // bigserial
    pub vehicle_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub timestamp: NaiveDateTime,
    pub correlation_id: Option<Uuid>,
}

/// Insert payload for a fix; the store assigns the row id.
#[derive(Debug, Clone)]
pub struct NewLocationSample {
    pub vehicle_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub timestamp: NaiveDateTime,
    pub correlation_id: Option<Uuid>,
}

impl NewLocationSample {
    pub fn into_sample(self, id: i64) -> LocationSample {
        LocationSample {
            id,
            vehicle_id: self.vehicle_id,
            latitude: self.latitude,
            longitude: self.longitude,
            speed: self.speed,
            timestamp: self.timestamp,
            correlation_id: self.correlation_id,
        }
    }
}
