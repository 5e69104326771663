//! Clasificación final de un registro de auditoría
//!
//! Primero se evalúa el modo viaje (la casa del consultor queda lejos de
//! la loja asignada); si no aplica, se compara la distancia ponto → loja
//! con la tolerancia configurada.

use crate::config::AuditConfig;
use crate::models::{AuditRecord, AuditStatus, Coordinates};
use crate::services::delta_calculator::haversine_distance;

/// Distancias que involucran la casa del consultor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelContext {
    pub store_to_home_m: f64,
    pub check_in_to_home_m: f64,
}

impl TravelContext {
    /// Calcula el contexto sólo si los tres puntos existen
    pub fn from_points(
        check_in: Option<Coordinates>,
        store: Option<Coordinates>,
        home: Option<Coordinates>,
    ) -> Option<Self> {
        Some(Self {
            store_to_home_m: haversine_distance(store, home)?,
            check_in_to_home_m: haversine_distance(check_in, home)?,
        })
    }
}

/// Estado para una distancia ponto → loja ya medida
pub fn classify(distance_to_store_m: f64, travel: Option<TravelContext>, config: &AuditConfig) -> AuditStatus {
    if let Some(ctx) = travel {
        if ctx.store_to_home_m > config.travel.away_from_home_m {
            if ctx.check_in_to_home_m < config.travel.near_home_m {
                return AuditStatus::TravelOk;
            }
            if distance_to_store_m > config.travel.near_store_m {
                return AuditStatus::TravelError;
            }
        }
    }

    if distance_to_store_m > config.distance_tolerance_m {
        AuditStatus::DistanceError
    } else {
        AuditStatus::Ok
    }
}

/// Recalcula distancia y estado de un registro con las coordenadas que ya
/// tiene. Sin distancia el estado no cambia. Devuelve `true` si se clasificó.
pub fn classify_record(record: &mut AuditRecord, config: &AuditConfig) -> bool {
    let Some(distance) = record.update_distance() else {
        return false;
    };
    let travel = TravelContext::from_points(
        record.check_in_coordinates,
        record.store_coordinates,
        record.home_coordinates,
    );
    record.status = classify(distance, travel, config);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn travel(store_to_home_m: f64, check_in_to_home_m: f64) -> Option<TravelContext> {
        Some(TravelContext {
            store_to_home_m,
            check_in_to_home_m,
        })
    }

    #[test]
    fn test_standard_tolerance() {
        let config = AuditConfig::default();
        assert_eq!(classify(300.0, None, &config), AuditStatus::Ok);
        assert_eq!(classify(500.0, None, &config), AuditStatus::Ok);
        assert_eq!(classify(800.0, None, &config), AuditStatus::DistanceError);
    }

    #[test]
    fn test_travel_ok_near_home() {
        let config = AuditConfig::default();
        assert_eq!(classify(450_000.0, travel(500_000.0, 1_000.0), &config), AuditStatus::TravelOk);
        assert_eq!(classify(10.0, travel(500_000.0, 1_000.0), &config), AuditStatus::TravelOk);
    }

    #[test]
    fn test_travel_error_far_from_both() {
        let config = AuditConfig::default();
        assert_eq!(classify(5_000.0, travel(500_000.0, 10_000.0), &config), AuditStatus::TravelError);
    }

    #[test]
    fn test_travel_falls_through_when_near_store() {
        let config = AuditConfig::default();
        assert_eq!(classify(1_500.0, travel(500_000.0, 10_000.0), &config), AuditStatus::DistanceError);
        assert_eq!(classify(200.0, travel(500_000.0, 10_000.0), &config), AuditStatus::Ok);
    }

    #[test]
    fn test_home_close_to_store_is_not_travel() {
        let config = AuditConfig::default();
        assert_eq!(classify(800.0, travel(5_000.0, 100.0), &config), AuditStatus::DistanceError);
    }

    #[test]
    fn test_context_requires_all_points() {
        let p = Some(Coordinates::new(-23.5, -46.6));
        assert!(TravelContext::from_points(p, p, None).is_none());
        let ctx = TravelContext::from_points(p, p, p).unwrap();
        assert_eq!(ctx.store_to_home_m, 0.0);
    }
}
