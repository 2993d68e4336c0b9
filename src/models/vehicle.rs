use chrono::NaiveDateTime;
use sqlx::FromRow;

/// Registry entry mapping a GPS unit's device id to a tracked vehicle.
/// The ingestion path only ever reads this table.
#[derive(Debug, Clone, FromRow)]
pub struct Vehicle {
    pub id: i32,
    pub name: String,
    pub device_id: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}
