use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const AUTO_STOP_NAME: &str = "Auto-detected Stop";
pub const MANUAL_STOP_NAME: &str = "Saved Location";

/// How a stop record came to exist. Auto-detected stops are produced by the
/// detector; manual ones by the save-location action. Stored as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    AutoDetected,
    Manual,
}

impl VisitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitType::AutoDetected => "auto_detected",
            VisitType::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<VisitType> {
        match s {
            "auto_detected" => Some(VisitType::AutoDetected),
            "manual" => Some(VisitType::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for VisitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A confirmed visit: a place where a vehicle stayed put, either detected
/// from its sample stream or saved by hand. `timestamp` is the start of the
/// stay, not the moment of detection. Only name and notes are ever edited;
/// position and duration are fixed at creation.
#[derive(Debug, Clone)]
pub struct StopEvent {
    pub id: Uuid,
    pub vehicle_id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub duration_minutes: i32,
    pub visit_type: VisitType,
    pub timestamp: NaiveDateTime,
    pub notes: Option<String>,
}

impl StopEvent {
    /// A user-saved location. Duration is zero; the timestamp defaults to
    /// the moment of saving when the caller has nothing better.
    pub fn manual(
        vehicle_id: i32,
        name: Option<String>,
        latitude: f64,
        longitude: f64,
        notes: Option<String>,
        timestamp: NaiveDateTime,
    ) -> StopEvent {
        StopEvent {
            id: Uuid::new_v4(),
            vehicle_id,
            name: name.unwrap_or_else(|| MANUAL_STOP_NAME.to_string()),
            latitude,
            longitude,
            duration_minutes: 0,
            visit_type: VisitType::Manual,
            timestamp,
            notes,
        }
    }
}
