use serde::{Deserialize, Deserializer};

/// One GPS fix as it arrives on the wire. Everything numeric is accepted as
/// either a JSON number or a quoted string: tracker firmware disagrees on
/// this even within a single fleet. A payload without a device_id is not a
/// fix and fails deserialization outright.
#[derive(Debug, Deserialize)]
pub struct FixMessage {
    pub device_id: String,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub speed: Option<f64>,
    /// Device-side fix time, "YYYY-MM-DD HH:MM:SS" or ISO-8601 without zone.
    /// Absent on units that only report on arrival.
    pub timestamp: Option<String>,
    pub correlation_id: Option<String>,
}

fn parse_f64_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        String(String),
        Float(f64),
    }

    let v: Option<StringOrFloat> = Option::deserialize(deserializer)?;
    match v {
        Some(StringOrFloat::Float(f)) => Ok(Some(f)),
        Some(StringOrFloat::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                s.parse::<f64>().map(Some).map_err(serde::de::Error::custom)
            }
        }
        None => Ok(None),
    }
}
