use crate::geo;
use crate::models::LocationSample;

/// Summary of a vehicle's activity over a history window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleStats {
    pub total_points: usize,
    pub avg_speed: f64,
    pub max_speed: f64,
    pub distance_km: f64,
}

impl VehicleStats {
    /// Computes the summary from samples in ascending timestamp order (as
    /// returned by `LocationStore::samples_since`). Distance is the sum of
    /// haversine legs between consecutive samples, so GPS jitter inflates it
    /// slightly; good enough for fleet dashboards.
    pub fn compute(samples: &[LocationSample]) -> VehicleStats {
        if samples.is_empty() {
            return VehicleStats::default();
        }

        let avg_speed = samples.iter().map(|s| s.speed).sum::<f64>() / samples.len() as f64;
        let max_speed = samples.iter().map(|s| s.speed).fold(0.0, f64::max);

        let distance_km = samples
            .windows(2)
            .map(|pair| {
                geo::haversine_distance_km(
                    pair[0].latitude,
                    pair[0].longitude,
                    pair[1].latitude,
                    pair[1].longitude,
                )
            })
            .sum();

        VehicleStats {
            total_points: samples.len(),
            avg_speed: round2(avg_speed),
            max_speed: round2(max_speed),
            distance_km: round2(distance_km),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
