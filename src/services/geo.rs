//! Geographic calculations
//!
//! Great-circle distances only; no road network is consulted.

use crate::defaults::DEFAULT_AVERAGE_SPEED_KMH;
use crate::types::Coordinates;

/// Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate Haversine distance between two points in kilometers
pub fn haversine_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Distance in km, or `None` when either position is unknown
pub fn distance_km(from: Option<&Coordinates>, to: Option<&Coordinates>) -> Option<f64> {
    match (from, to) {
        (Some(from), Some(to)) => Some(haversine_distance(from, to)),
        _ => None,
    }
}

/// Travel time in whole minutes at the given average speed.
/// `None` exactly when `distance_km` is `None`.
pub fn travel_minutes(
    from: Option<&Coordinates>,
    to: Option<&Coordinates>,
    average_speed_kmh: f64,
) -> Option<i64> {
    distance_km(from, to).map(|km| minutes_at_speed(km, average_speed_kmh))
}

fn minutes_at_speed(distance_km: f64, average_speed_kmh: f64) -> i64 {
    (distance_km / average_speed_kmh * 60.0).round() as i64
}

/// Distance/time estimator bound to a configured average speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelEstimator {
    average_speed_kmh: f64,
}

impl Default for TravelEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_AVERAGE_SPEED_KMH)
    }
}

impl TravelEstimator {
    /// Non-finite or non-positive speeds fall back to the default.
    pub fn new(average_speed_kmh: f64) -> Self {
        let average_speed_kmh = if average_speed_kmh.is_finite() && average_speed_kmh > 0.0 {
            average_speed_kmh
        } else {
            DEFAULT_AVERAGE_SPEED_KMH
        };
        Self { average_speed_kmh }
    }

    pub fn average_speed_kmh(&self) -> f64 {
        self.average_speed_kmh
    }

    pub fn distance_km(&self, from: Option<&Coordinates>, to: Option<&Coordinates>) -> Option<f64> {
        distance_km(from, to)
    }

    pub fn travel_minutes(&self, from: Option<&Coordinates>, to: Option<&Coordinates>) -> Option<i64> {
        travel_minutes(from, to, self.average_speed_kmh)
    }
}
