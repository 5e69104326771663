//! Registro de auditoría
//!
//! Un `AuditRecord` por cada marcación de ponto deduplicada, con la visita
//! del roteiro que le corresponde (si existe), la loja resuelta, los deltas
//! de tiempo y, tras la pasada de geocodificación, la distancia y el estado.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::coordinates::Coordinates;
use super::route_visit::RouteVisit;
use super::store::StoreLocation;
use super::time_clock::TimeClockEntry;
use crate::services::delta_calculator::haversine_distance;

/// Estado de un registro de auditoría
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    /// Sin visita en el roteiro para esa fecha/consultor
    NoVisit,
    /// Visita encontrada pero la loja no está en el cadastro
    StoreNotFound,
    /// Loja resuelta, pendiente de geocodificación
    Matched,
    Ok,
    DistanceError,
    TravelOk,
    TravelError,
    /// Aprobación manual; sólo se usa para mostrar
    Approved,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::NoVisit => "NO_VISIT",
            AuditStatus::StoreNotFound => "STORE_NOT_FOUND",
            AuditStatus::Matched => "MATCHED",
            AuditStatus::Ok => "OK",
            AuditStatus::DistanceError => "DISTANCE_ERROR",
            AuditStatus::TravelOk => "TRAVEL_OK",
            AuditStatus::TravelError => "TRAVEL_ERROR",
            AuditStatus::Approved => "APPROVED",
        }
    }

    /// Estados que cuentan como cumplimiento geográfico
    pub fn is_geo_ok(&self) -> bool {
        matches!(self, AuditStatus::Ok | AuditStatus::TravelOk | AuditStatus::Approved)
    }

    pub fn is_geo_error(&self) -> bool {
        matches!(self, AuditStatus::DistanceError | AuditStatus::TravelError)
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clave estructurada de una aprobación manual
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApprovalKey {
    pub consultant: String,
    pub date: String,
    pub check_in_time: String,
}

/// Conjunto de aprobaciones manuales hechas por la auditoría
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualApprovals {
    approved: HashSet<ApprovalKey>,
}

impl ManualApprovals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alterna la aprobación y devuelve el nuevo estado
    pub fn toggle(&mut self, key: ApprovalKey) -> bool {
        if self.approved.remove(&key) {
            false
        } else {
            self.approved.insert(key);
            true
        }
    }

    pub fn is_approved(&self, key: &ApprovalKey) -> bool {
        self.approved.contains(key)
    }

    pub fn len(&self) -> usize {
        self.approved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.approved.is_empty()
    }

    /// Marca `manual_override` en cada registro según el conjunto actual
    pub fn apply(&self, records: &mut [AuditRecord]) {
        for record in records.iter_mut() {
            record.manual_override = self.is_approved(&record.approval_key());
        }
    }
}

/// Registro de auditoría
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub date: String,
    pub consultant: String,
    pub time_clock: TimeClockEntry,
    pub route_visit: Option<RouteVisit>,
    pub resolved_store: Option<StoreLocation>,
    pub actual_vs_actual_delta_minutes: Option<i64>,
    pub actual_vs_predicted_delta_minutes: Option<i64>,
    pub check_in_coordinates: Option<Coordinates>,
    /// Dirección del roteiro geocodificada (cuando el cadastro no tiene coords)
    pub route_address_coordinates: Option<Coordinates>,
    /// Coordenadas objetivo usadas para medir la distancia
    pub store_coordinates: Option<Coordinates>,
    pub home_coordinates: Option<Coordinates>,
    pub distance_meters: Option<f64>,
    /// Estado calculado; nunca `Approved`
    pub status: AuditStatus,
    pub manual_override: bool,
}

impl AuditRecord {
    pub fn approval_key(&self) -> ApprovalKey {
        ApprovalKey {
            consultant: self.consultant.clone(),
            date: self.date.clone(),
            check_in_time: self.time_clock.check_in_time.clone(),
        }
    }

    /// Estado a mostrar: la aprobación manual siempre gana
    pub fn displayed_status(&self) -> AuditStatus {
        if self.manual_override {
            AuditStatus::Approved
        } else {
            self.status
        }
    }

    pub fn toggle_override(&mut self) -> bool {
        self.manual_override = !self.manual_override;
        self.manual_override
    }

    /// Retraso usado en los indicadores: realizado vs previsto si existe,
    /// si no ponto vs realizado.
    pub fn effective_delay_minutes(&self) -> Option<i64> {
        self.actual_vs_predicted_delta_minutes
            .or(self.actual_vs_actual_delta_minutes)
    }

    /// Nombre de loja para mostrar
    pub fn store_name(&self) -> Option<&str> {
        self.resolved_store
            .as_ref()
            .map(|s| s.name.as_str())
            .or_else(|| self.route_visit.as_ref().and_then(|v| v.store_label.as_deref()))
    }

    pub fn store_brand(&self) -> Option<&str> {
        self.resolved_store.as_ref().and_then(|s| s.brand.as_deref())
    }

    /// Recalcula `distance_meters` a partir de las dos coordenadas; queda
    /// en `None` si falta alguna.
    pub fn update_distance(&mut self) -> Option<f64> {
        self.distance_meters = match (self.check_in_coordinates, self.store_coordinates) {
            (Some(check_in), Some(store)) => haversine_distance(Some(check_in), Some(store)),
            _ => None,
        };
        self.distance_meters
    }
}
