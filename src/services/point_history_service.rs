//! Histórico de pontos (breadcrumbs GPS)
//!
//! Pipeline independiente del cruce ponto/roteiro. Agrupa las muestras por
//! consultor y día, arma ventanas de visita con pares consecutivos de
//! marcadores de check-in y clasifica cada muestra respecto a la ventana
//! en la que cae.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::config::AuditConfig;
use crate::models::{
    Axis, Breadcrumb, Coordinates, DayPointHistory, PointStatus, PointSummary, VisitWindow,
};
use crate::services::coordinate_normalizer::CoordinateNormalizer;
use crate::services::csv_reader::{read_csv_file, CsvRow, TextEncoding};
use crate::services::delta_calculator::haversine_meters;
use crate::utils::errors::AppResult;
use crate::utils::text::fold_key;

/// Fin del día para ventanas abiertas
const END_OF_DAY_SECONDS: u32 = 86_400;

// Cabeceras ya plegadas (sin acentos, minúsculas)
const DATE_COLUMN: &str = "data";
const CONSULTANT_COLUMN: &str = "consultor";
const TIME_COLUMN: &str = "hora";
const LAT_COLUMN: &str = "latitude";
const LNG_COLUMN: &str = "longitude";
const INFO_COLUMN: &str = "informacoes adicionais da coleta";
const CAPTURE_COLUMN: &str = "forma de captura";

const STORE_COLUMNS: &[&str] = &[
    "local",
    "pdv",
    "ponto de venda",
    "nome do pdv",
    "nome da loja",
    "cliente",
    "estabelecimento",
    "unidade",
];
const STORE_KEYWORDS: &[&str] = &["loja", "pdv", "ponto", "cliente", "local"];

/// `HH:MM[:SS]` → segundos desde medianoche; lo inválido cuenta como 0
pub fn time_to_seconds(time: &str) -> u32 {
    let parts: Vec<&str> = time.trim().split(':').collect();
    let field = |i: usize| parts.get(i).and_then(|p| p.trim().parse::<u32>().ok());
    let seconds = match parts.get(2) {
        Some(_) => field(2),
        None => Some(0),
    };
    match (field(0), field(1), seconds) {
        (Some(h), Some(m), Some(s)) if h <= 24 && m <= 59 && s <= 59 => h * 3600 + m * 60 + s,
        _ => 0,
    }
}

/// Fila con las cabeceras plegadas
struct FoldedRow<'a> {
    fields: Vec<(String, &'a str)>,
}

impl<'a> FoldedRow<'a> {
    fn new(row: &'a CsvRow) -> Self {
        Self {
            fields: row
                .fields()
                .iter()
                .map(|(header, value)| (fold_key(header), value.as_str()))
                .collect(),
        }
    }

    fn get(&self, column: &str) -> Option<&'a str> {
        self.fields
            .iter()
            .find(|(header, _)| header == column)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn find_by_keyword(&self) -> Option<&'a str> {
        self.fields
            .iter()
            .filter(|(header, _)| STORE_KEYWORDS.iter().any(|kw| header.contains(kw)))
            .map(|(_, value)| value.trim())
            .find(|value| !value.is_empty())
    }
}

/// Ventanas de visita: pares consecutivos de marcadores; si el número es
/// impar la última queda abierta hasta el final del día.
pub fn build_windows(points: &[Breadcrumb]) -> Vec<VisitWindow> {
    let markers: Vec<&Breadcrumb> = points.iter().filter(|p| p.is_check_in).collect();
    markers
        .chunks(2)
        .map(|pair| VisitWindow {
            start_time: pair[0].time.clone(),
            end_time: pair.get(1).map(|end| end.time.clone()),
            anchor: pair[0].coordinates,
            store_name: pair[0].store_name.clone(),
        })
        .collect()
}

/// Clasifica cada muestra según la ventana que la contiene
pub fn classify_points(points: &mut [Breadcrumb], windows: &[VisitWindow], tolerance_m: f64) {
    for point in points.iter_mut() {
        if point.is_check_in {
            point.status = PointStatus::CheckinMarker;
            point.distance_from_check_in = Some(0.0);
            continue;
        }

        let t = time_to_seconds(&point.time);
        let active = windows.iter().find(|w| {
            let start = time_to_seconds(&w.start_time);
            let end = w.end_time.as_deref().map_or(END_OF_DAY_SECONDS, time_to_seconds);
            t >= start && t <= end
        });

        match active {
            Some(window) => {
                let distance = haversine_meters(
                    point.coordinates.lat,
                    point.coordinates.lng,
                    window.anchor.lat,
                    window.anchor.lng,
                );
                point.distance_from_check_in = Some(distance);
                point.related_check_in_time = Some(window.start_time.clone());
                point.related_store_name = window.store_name.clone();
                point.check_in_coordinates = Some(window.anchor);
                point.status = if distance > tolerance_m {
                    PointStatus::DeviationCritical
                } else {
                    PointStatus::InStore
                };
            }
            None => {
                point.status = PointStatus::Travel;
                point.distance_from_check_in = None;
            }
        }
    }
}

pub fn summarize(points: &[Breadcrumb]) -> PointSummary {
    points.iter().fold(PointSummary::default(), |mut acc, p| {
        match p.status {
            PointStatus::CheckinMarker => acc.check_in_markers += 1,
            PointStatus::InStore => acc.in_store += 1,
            PointStatus::DeviationCritical => acc.deviation_critical += 1,
            PointStatus::Travel => acc.travel += 1,
        }
        acc
    })
}

pub struct PointHistoryAnalyzer {
    normalizer: CoordinateNormalizer,
    tolerance_m: f64,
    marker: String,
    marker_key: String,
}

impl PointHistoryAnalyzer {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            normalizer: CoordinateNormalizer::new(config.bounds),
            tolerance_m: config.distance_tolerance_m,
            marker: config.checkin_marker.clone(),
            marker_key: fold_key(&config.checkin_marker),
        }
    }

    fn is_marker(&self, info: &str) -> bool {
        !self.marker_key.is_empty() && fold_key(info).contains(&self.marker_key)
    }

    /// Nombre de loja: columnas conocidas, cualquier columna con una palabra
    /// clave y, para marcadores, el texto de la actividad.
    fn store_name(&self, row: &FoldedRow<'_>, info: &str, is_check_in: bool) -> Option<String> {
        let direct = STORE_COLUMNS
            .iter()
            .find_map(|column| row.get(column))
            .or_else(|| row.find_by_keyword());
        if let Some(name) = direct {
            return Some(name.to_string());
        }
        if !is_check_in {
            return None;
        }
        info.split(['-', '–', '—', ':'])
            .map(str::trim)
            .find(|part| !part.is_empty() && fold_key(part) != self.marker_key)
            .map(str::to_string)
    }

    fn breadcrumb(&self, row: &FoldedRow<'_>, index: usize) -> Option<Breadcrumb> {
        let lat = self.normalizer.parse_breadcrumb(row.get(LAT_COLUMN)?, Axis::Lat)?;
        let lng = self.normalizer.parse_breadcrumb(row.get(LNG_COLUMN)?, Axis::Lng)?;
        let info = row.get(INFO_COLUMN).unwrap_or("").to_string();
        let is_check_in = self.is_marker(&info);

        Some(Breadcrumb {
            time: row.get(TIME_COLUMN).unwrap_or("").to_string(),
            coordinates: Coordinates::new(lat, lng),
            store_name: self.store_name(row, &info, is_check_in),
            capture_type: row.get(CAPTURE_COLUMN).map(str::to_string),
            is_check_in,
            original_row_index: index,
            status: PointStatus::Travel,
            distance_from_check_in: None,
            related_check_in_time: None,
            related_store_name: None,
            check_in_coordinates: None,
            info,
        })
    }

    /// Un reporte por (consultor, día), en orden de primera aparición
    pub fn analyze(&self, rows: &[CsvRow]) -> Vec<DayPointHistory> {
        let mut days: Vec<DayPointHistory> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();
        let mut discarded = 0usize;

        for row in rows {
            let folded = FoldedRow::new(row);
            let (Some(date), Some(consultant)) = (folded.get(DATE_COLUMN), folded.get(CONSULTANT_COLUMN)) else {
                discarded += 1;
                continue;
            };

            let key = (consultant.to_string(), date.to_string());
            let slot = *index.entry(key).or_insert_with(|| {
                days.push(DayPointHistory {
                    consultant: consultant.to_string(),
                    date: date.to_string(),
                    points: Vec::new(),
                    windows: Vec::new(),
                    summary: PointSummary::default(),
                });
                days.len() - 1
            });

            let day = &mut days[slot];
            match self.breadcrumb(&folded, day.points.len()) {
                Some(point) => day.points.push(point),
                None => discarded += 1,
            }
        }

        for day in days.iter_mut() {
            day.points.sort_by_key(|p| time_to_seconds(&p.time));
            day.windows = build_windows(&day.points);
            classify_points(&mut day.points, &day.windows, self.tolerance_m);
            day.summary = summarize(&day.points);
            debug!(
                "📍 {} {}: {} puntos, {} ventanas, {} desvíos",
                day.consultant,
                day.date,
                day.points.len(),
                day.windows.len(),
                day.summary.deviation_critical
            );
        }

        info!(
            "🛰️ Histórico de pontos: {} días analizados, {} filas descartadas (marcador '{}')",
            days.len(),
            discarded,
            self.marker
        );
        days
    }

    pub async fn analyze_file(&self, path: impl AsRef<Path>, encoding: TextEncoding) -> AppResult<Vec<DayPointHistory>> {
        let rows = read_csv_file(path, encoding).await?;
        Ok(self.analyze(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(time: &str, lat: &str, lng: &str, info: &str) -> CsvRow {
        CsvRow::from_pairs(&[
            ("Data", "01/02/2024"),
            ("Consultor", "Ana Silva"),
            ("Hora", time),
            ("Latitude", lat),
            ("Longitude", lng),
            ("Informações adicionais da coleta", info),
            ("Forma de captura", "GPS"),
        ])
    }

    #[test]
    fn test_time_to_seconds() {
        assert_eq!(time_to_seconds("01:02:03"), 3723);
        assert_eq!(time_to_seconds("10:00"), 36_000);
        assert_eq!(time_to_seconds("abc"), 0);
        assert_eq!(time_to_seconds("9999999:00:00"), 0);
        assert_eq!(time_to_seconds("10:75"), 0);
        assert_eq!(time_to_seconds("10:00:xx"), 0);
    }

    #[test]
    fn test_out_of_range_hour_does_not_abort_analysis() {
        let analyzer = PointHistoryAnalyzer::new(&AuditConfig::default());
        let rows = vec![
            row("09:00:00", "-235.500.000", "-466.000.000", "Execução de atividade"),
            row("9999999:00:00", "-235.500.000", "-466.000.000", "Coleta"),
        ];
        let days = analyzer.analyze(&rows);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].points.len(), 2);
        // la hora inválida cuenta como medianoche y queda antes del marcador
        assert_eq!(days[0].points[0].time, "9999999:00:00");
        assert_eq!(days[0].points[0].status, PointStatus::Travel);
    }

    #[test]
    fn test_windows_and_classification() {
        let analyzer = PointHistoryAnalyzer::new(&AuditConfig::default());
        let rows = vec![
            row("10:30:00", "-235.500.000", "-466.000.000", "Coleta"),
            row("09:00:00", "-235.500.000", "-466.000.000", "Execução de atividade - Loja X"),
            row("09:30:00", "-235.510.000", "-466.000.000", "Coleta"),
            row("10:00:00", "-235.500.000", "-466.000.000", "Execução de atividade"),
            row("09:45:00", "-236.000.000", "-466.000.000", "Coleta"),
            row("08:00:00", "-235.000.000", "-466.000.000", "Coleta"),
            row("12:00:00", "", "-466.000.000", "Coleta"),
        ];

        let days = analyzer.analyze(&rows);
        assert_eq!(days.len(), 1);
        let day = &days[0];

        assert_eq!(day.points.len(), 6);
        assert_eq!(day.windows.len(), 1);
        assert_eq!(day.windows[0].start_time, "09:00:00");
        assert_eq!(day.windows[0].end_time.as_deref(), Some("10:00:00"));
        assert_eq!(day.windows[0].store_name.as_deref(), Some("Loja X"));

        let times: Vec<&str> = day.points.iter().map(|p| p.time.as_str()).collect();
        assert_eq!(times, vec!["08:00:00", "09:00:00", "09:30:00", "09:45:00", "10:00:00", "10:30:00"]);

        let statuses: Vec<PointStatus> = day.points.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![
                PointStatus::Travel,
                PointStatus::CheckinMarker,
                PointStatus::InStore,
                PointStatus::DeviationCritical,
                PointStatus::CheckinMarker,
                PointStatus::Travel,
            ]
        );
        assert_eq!(day.points[2].related_check_in_time.as_deref(), Some("09:00:00"));
        assert_eq!(day.points[2].capture_type.as_deref(), Some("GPS"));
        assert_eq!(
            day.summary,
            PointSummary {
                check_in_markers: 2,
                in_store: 1,
                deviation_critical: 1,
                travel: 2,
            }
        );
    }

    #[test]
    fn test_odd_markers_leave_window_open() {
        let analyzer = PointHistoryAnalyzer::new(&AuditConfig::default());
        let rows = vec![
            row("14:00:00", "-235.500.000", "-466.000.000", "Execução de atividade"),
            row("23:50:00", "-235.500.000", "-466.000.000", "Coleta"),
        ];
        let days = analyzer.analyze(&rows);
        assert_eq!(days[0].windows[0].end_time, None);
        assert_eq!(days[0].points[1].status, PointStatus::InStore);
    }

    #[test]
    fn test_rows_without_consultant_are_ignored() {
        let analyzer = PointHistoryAnalyzer::new(&AuditConfig::default());
        let rows = vec![CsvRow::from_pairs(&[("Data", "01/02/2024"), ("Hora", "09:00")])];
        assert!(analyzer.analyze(&rows).is_empty());
    }
}
