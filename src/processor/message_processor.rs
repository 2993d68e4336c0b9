use chrono::NaiveDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::ingest::{FixRequest, IngestError, IngestionCoordinator};
use crate::models::message::FixMessage;
use crate::store::{LocationStore, StopStore, VehicleRegistry};

/// Decodes one transport payload and hands it to the coordinator.
///
/// Bad data is not a processing failure: malformed payloads, incomplete
/// fixes, and fixes for unknown devices are logged and dropped so the
/// consumer keeps its offset moving. Only store failures propagate.
pub async fn process_payload<R, L, S>(
    coordinator: &IngestionCoordinator<R, L, S>,
    payload: &[u8],
) -> anyhow::Result<()>
where
    R: VehicleRegistry,
    L: LocationStore,
    S: StopStore,
{
    let message: FixMessage = match serde_json::from_slice(payload) {
        Ok(m) => m,
        Err(e) => {
            warn!("Failed to parse fix payload: {}", e);
            return Ok(());
        }
    };

    let (latitude, longitude) = match (message.latitude, message.longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => {
            warn!("Fix from device {} missing coordinates, skipping", message.device_id);
            return Ok(());
        }
    };

    let timestamp = match message.timestamp.as_deref() {
        Some(raw) => match parse_device_timestamp(raw) {
            Some(t) => t,
            None => {
                warn!(
                    "Invalid timestamp '{}' from device {}, skipping",
                    raw, message.device_id
                );
                return Ok(());
            }
        },
        // Units without a clock report on arrival, like the trackers that
        // only ever POST current position.
        None => chrono::Utc::now().naive_utc(),
    };

    let request = FixRequest {
        device_id: message.device_id,
        latitude,
        longitude,
        speed: message.speed.unwrap_or(0.0),
        timestamp,
        correlation_id: message
            .correlation_id
            .as_deref()
            .and_then(|s| Uuid::parse_str(s).ok()),
    };

    match coordinator.handle_new_fix(request).await {
        Ok(outcome) => {
            debug!(
                "Stored fix {} for vehicle {}",
                outcome.location_id, outcome.vehicle_id
            );
            Ok(())
        }
        Err(e @ (IngestError::InvalidCoordinate { .. } | IngestError::InvalidSpeed(_))) => {
            warn!("Rejected fix: {}", e);
            Ok(())
        }
        Err(IngestError::VehicleNotFound(device_id)) => {
            warn!("Dropping fix from unregistered device {}", device_id);
            Ok(())
        }
        Err(IngestError::Store(e)) => Err(e.into()),
    }
}

fn parse_device_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
