pub const SELECT_VEHICLE_BY_DEVICE_ID: &str = r#"
SELECT id, name, device_id, is_active, created_at
FROM vehicles
WHERE device_id = $1;
"#;

pub const INSERT_LOCATION: &str = r#"
INSERT INTO locations (vehicle_id, latitude, longitude, speed, timestamp, correlation_id)
VALUES ($1, $2, $3, $4, $5, $6)
RETURNING id;
"#;

// Descending with id tiebreak: the detector takes the last row as the window
// anchor, so ordering must be total even for equal timestamps.
pub const SELECT_RECENT_LOCATIONS: &str = r#"
SELECT id, vehicle_id, latitude, longitude, speed, timestamp, correlation_id
FROM locations
WHERE vehicle_id = $1 AND timestamp >= $2
ORDER BY timestamp DESC, id DESC;
"#;

pub const SELECT_LOCATIONS_SINCE: &str = r#"
SELECT id, vehicle_id, latitude, longitude, speed, timestamp, correlation_id
FROM locations
WHERE vehicle_id = $1 AND timestamp >= $2
ORDER BY timestamp ASC, id ASC;
"#;

pub const SELECT_LATEST_LOCATION: &str = r#"
SELECT id, vehicle_id, latitude, longitude, speed, timestamp, correlation_id
FROM locations
WHERE vehicle_id = $1
ORDER BY timestamp DESC, id DESC
LIMIT 1;
"#;

// Matches any visit_type: a recent manual save also suppresses
// auto-detection for its window.
pub const SELECT_STOP_IN_WINDOW: &str = r#"
SELECT id, vehicle_id, name, latitude, longitude, duration_minutes, visit_type, timestamp, notes
FROM stop_events
WHERE vehicle_id = $1 AND timestamp >= $2
ORDER BY timestamp DESC, id DESC
LIMIT 1;
"#;

pub const INSERT_STOP_EVENT: &str = r#"
INSERT INTO stop_events (id, vehicle_id, name, latitude, longitude, duration_minutes, visit_type, timestamp, notes)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9);
"#;

pub const UPDATE_STOP_EVENT: &str = r#"
UPDATE stop_events
SET name = COALESCE($3, name),
    notes = COALESCE($4, notes)
WHERE id = $1 AND vehicle_id = $2;
"#;

pub const DELETE_STOP_EVENT: &str = r#"
DELETE FROM stop_events WHERE id = $1 AND vehicle_id = $2;
"#;

pub const SELECT_STOPS_FOR_VEHICLE: &str = r#"
SELECT id, vehicle_id, name, latitude, longitude, duration_minutes, visit_type, timestamp, notes
FROM stop_events
WHERE vehicle_id = $1
ORDER BY timestamp DESC, id DESC;
"#;
