use serde::Serialize;

use crate::models::AuditRecord;

/// Indicadores generales de una auditoría
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    /// Registros con retraso efectivo dentro de ±`time_limit`
    pub valid_time: usize,
    /// Registros con distancia medida por encima de `distance_limit`
    pub distance_errors: usize,
    pub valid_time_percent: f64,
    pub distance_error_percent: f64,
}

impl DashboardStats {
    pub fn compute(records: &[AuditRecord], distance_limit_m: f64, time_limit_minutes: i64) -> Self {
        let total = records.len();
        let valid_time = records
            .iter()
            .filter_map(|r| r.effective_delay_minutes())
            .filter(|delay| delay.abs() <= time_limit_minutes)
            .count();
        let distance_errors = records
            .iter()
            .filter_map(|r| r.distance_meters)
            .filter(|d| *d > distance_limit_m)
            .count();

        Self {
            total,
            valid_time,
            distance_errors,
            valid_time_percent: percent(valid_time, total),
            distance_error_percent: percent(distance_errors, total),
        }
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
