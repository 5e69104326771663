//! Deltas de tiempo y distancia
//!
//! Diferencias en minutos entre horarios `HH:MM` y distancia haversine en
//! metros entre dos puntos. Todo es puro y devuelve `None` cuando falta
//! algún dato.

use crate::models::{Coordinates, RouteVisit, TimeClockEntry};

/// Radio medio de la Tierra en metros
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Minutos desde medianoche de un horario `HH:MM[:SS]`
pub fn minutes_of_day(time: &str) -> Option<i64> {
    let mut parts = time.trim().split(':');
    let hours: i64 = parts.next()?.trim().parse().ok()?;
    let minutes: i64 = parts.next()?.trim().parse().ok()?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// `a - b` en minutos
pub fn time_delta_minutes(a: Option<&str>, b: Option<&str>) -> Option<i64> {
    Some(minutes_of_day(a?)? - minutes_of_day(b?)?)
}

/// Ponto menos check-in realizado del roteiro. Positivo: el ponto se
/// marcó después que el roteiro.
pub fn actual_vs_actual(entry: &TimeClockEntry, visit: Option<&RouteVisit>) -> Option<i64> {
    time_delta_minutes(
        Some(entry.check_in_time.as_str()),
        visit.and_then(|v| v.actual_check_in.as_deref()),
    )
}

/// Check-in realizado menos previsto. Positivo: atraso.
pub fn actual_vs_predicted(visit: Option<&RouteVisit>) -> Option<i64> {
    let visit = visit?;
    time_delta_minutes(
        visit.actual_check_in.as_deref(),
        visit.predicted_check_in.as_deref(),
    )
}

/// Distancia haversine en metros entre dos pares lat/lng
pub fn haversine_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lng2 - lng1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Distancia entre dos puntos opcionales; `None` si falta alguno o no es finito
pub fn haversine_distance(a: Option<Coordinates>, b: Option<Coordinates>) -> Option<f64> {
    let (a, b) = (a?, b?);
    if !a.is_finite() || !b.is_finite() {
        return None;
    }
    Some(haversine_meters(a.lat, a.lng, b.lat, b.lng))
}
