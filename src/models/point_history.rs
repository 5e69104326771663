//! Modelos del histórico de pontos (breadcrumbs GPS)

use serde::{Deserialize, Serialize};

use super::coordinates::Coordinates;

/// Clasificación de un breadcrumb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointStatus {
    /// Marcador de check-in (ancla de una ventana)
    CheckinMarker,
    InStore,
    DeviationCritical,
    Travel,
}

/// Una muestra GPS cruda
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub time: String,
    pub coordinates: Coordinates,
    pub info: String,
    pub store_name: Option<String>,
    pub capture_type: Option<String>,
    pub is_check_in: bool,
    /// Orden de llegada dentro del día, antes de ordenar por hora
    pub original_row_index: usize,
    pub status: PointStatus,
    pub distance_from_check_in: Option<f64>,
    pub related_check_in_time: Option<String>,
    pub related_store_name: Option<String>,
    pub check_in_coordinates: Option<Coordinates>,
}

/// Ventana de visita delimitada por un par de marcadores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitWindow {
    pub start_time: String,
    /// `None` = abierta hasta el final del día
    pub end_time: Option<String>,
    pub anchor: Coordinates,
    pub store_name: Option<String>,
}

/// Conteo por estado de un día
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointSummary {
    pub check_in_markers: usize,
    pub in_store: usize,
    pub deviation_critical: usize,
    pub travel: usize,
}

/// Reporte de desvíos de un consultor en un día
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPointHistory {
    pub consultant: String,
    pub date: String,
    pub points: Vec<Breadcrumb>,
    pub windows: Vec<VisitWindow>,
    pub summary: PointSummary,
}
