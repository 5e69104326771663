//! Normalización de filas CSV
//!
//! Las dos exportaciones cambian de nombre de columna entre versiones
//! ("Entrada", "Hora Entrada", "Check-in"...). Cada campo canónico se
//! resuelve con una tabla declarativa de sinónimos y exclusiones evaluada
//! contra las cabeceras sin acentos ni mayúsculas.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::csv_reader::CsvRow;
use crate::models::{RouteVisit, TimeClockEntry};
use crate::utils::text::fold_key;

/// Formato de origen de una fila
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Exportación de ponto (Solides)
    TimeClock,
    /// Exportación de roteiro (Umovme)
    Route,
}

/// Campos canónicos de ambas exportaciones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    Date,
    CheckIn,
    CheckOut,
    PredictedCheckIn,
    LocationAddress,
    Street,
    StoreLabel,
    StoreCode,
    Address,
    Consultant,
}

/// Cómo se compara una cabecera con un sinónimo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderMatch {
    Exact,
    Contains,
}

struct FieldRule {
    field: CanonicalField,
    candidates: &'static [&'static str],
    exclusions: &'static [&'static str],
}

const fn rule(
    field: CanonicalField,
    candidates: &'static [&'static str],
    exclusions: &'static [&'static str],
) -> FieldRule {
    FieldRule { field, candidates, exclusions }
}

// Sinónimos ya sin acentos y en minúsculas
const TIME_CLOCK_RULES: &[FieldRule] = &[
    rule(CanonicalField::Date, &["data"], &[]),
    rule(CanonicalField::CheckIn, &["entrada", "hora entrada", "checkin"], &[]),
    rule(CanonicalField::CheckOut, &["saida", "hora saida"], &[]),
    rule(CanonicalField::LocationAddress, &["local entrada", "endereco entrada"], &[]),
    rule(CanonicalField::Street, &["logradouro", "endereco"], &[]),
    rule(CanonicalField::StoreLabel, &["local", "loja"], &[]),
    rule(
        CanonicalField::Consultant,
        &["colaborador", "consultor", "nome", "funcionario", "usuario"],
        &[],
    ),
];

const ROUTE_RULES: &[FieldRule] = &[
    rule(
        CanonicalField::CheckIn,
        &[
            "check in realizado",
            "check-in realizado",
            "realizado",
            "check in",
            "check-in",
            "horario",
            "hora",
        ],
        &["previsto", "prevista", "planejado", "planejada", "saida", "out"],
    ),
    rule(
        CanonicalField::PredictedCheckIn,
        &[
            "check in previsto",
            "check-in previsto",
            "hora prevista",
            "previsto",
            "planejado",
            "entrada prevista",
        ],
        &["realizado", "realizada", "saida"],
    ),
    rule(CanonicalField::Date, &["data prevista", "data planejada", "data"], &[]),
    rule(CanonicalField::StoreLabel, &["local", "loja", "cliente", "pdv"], &[]),
    rule(
        CanonicalField::StoreCode,
        &["codigo pdv", "codigo do pdv", "cod pdv", "codigo loja", "cod loja"],
        &[],
    ),
    rule(
        CanonicalField::Address,
        &["endereco", "enderecos", "logradouro", "rua"],
        &["local", "loja", "situacao", "total"],
    ),
    rule(
        CanonicalField::Consultant,
        &["usuario", "colaborador", "consultor", "nome"],
        &[],
    ),
];

impl SourceFormat {
    fn rules(&self) -> &'static [FieldRule] {
        match self {
            SourceFormat::TimeClock => TIME_CLOCK_RULES,
            SourceFormat::Route => ROUTE_RULES,
        }
    }

    fn header_match(&self) -> HeaderMatch {
        match self {
            SourceFormat::TimeClock => HeaderMatch::Exact,
            SourceFormat::Route => HeaderMatch::Contains,
        }
    }
}

/// Resuelve los campos canónicos presentes (y no vacíos) en una fila
pub fn resolve_fields(row: &CsvRow, format: SourceFormat) -> HashMap<CanonicalField, String> {
    let folded: Vec<(String, &str)> = row
        .fields()
        .iter()
        .map(|(header, value)| (fold_key(header), value.trim()))
        .collect();
    let mode = format.header_match();

    let mut resolved = HashMap::new();
    for rule in format.rules() {
        let found = rule.candidates.iter().find_map(|candidate| {
            folded
                .iter()
                .find(|(header, _)| {
                    let hit = match mode {
                        HeaderMatch::Exact => header == candidate,
                        HeaderMatch::Contains => header.contains(candidate),
                    };
                    hit && !rule.exclusions.iter().any(|ex| header.contains(ex))
                })
                .map(|(_, value)| *value)
                .filter(|value| !value.is_empty())
        });
        if let Some(value) = found {
            resolved.insert(rule.field, value.to_string());
        }
    }
    resolved
}

/// Normaliza una fecha a `DD/MM/YYYY` (años de dos dígitos pasan a 20YY);
/// si no se reconoce se devuelve recortada sin cambios.
pub fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit())) {
        let day: u32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let year: i32 = parts[2].parse().ok()?;
        let full_year = if parts[2].len() <= 2 { 2000 + year } else { year };

        if parts[0].len() <= 2 && parts[1].len() <= 2 && NaiveDate::from_ymd_opt(full_year, month, day).is_some() {
            return Some(format!("{:02}/{:02}/{:04}", day, month, full_year));
        }
    }

    Some(trimmed.to_string())
}

/// Extrae `HH:MM` de `"HH:MM[:SS]"` o de `"fecha hora"`
pub fn normalize_time(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if !trimmed.contains(':') {
        return None;
    }

    let token = trimmed
        .split_whitespace()
        .find(|part| part.contains(':'))?;
    // ISO: 2024-02-01T09:00:00
    let token = token.rsplit('T').next().unwrap_or(token);

    let mut pieces = token.split(':');
    let hours = pieces.next()?;
    let minutes: String = pieces.next()?.chars().take(2).collect();

    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let h: u32 = hours.parse().ok()?;
    let m: u32 = minutes.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }

    Some(format!("{:02}:{:02}", h, m))
}

/// Normaliza una fila de ponto; `None` si falta fecha o entrada
pub fn normalize_time_clock_row(row: &CsvRow) -> Option<TimeClockEntry> {
    let mut fields = resolve_fields(row, SourceFormat::TimeClock);

    let original_date = fields.remove(&CanonicalField::Date)?;
    let date = normalize_date(&original_date)?;
    let check_in_time = fields
        .get(&CanonicalField::CheckIn)
        .and_then(|v| normalize_time(v))?;

    Some(TimeClockEntry {
        original_date,
        date,
        check_in_time,
        check_out_time: fields
            .get(&CanonicalField::CheckOut)
            .and_then(|v| normalize_time(v)),
        location_address: fields.remove(&CanonicalField::LocationAddress),
        street: fields.remove(&CanonicalField::Street),
        store_label: fields.remove(&CanonicalField::StoreLabel),
        consultant: fields.remove(&CanonicalField::Consultant),
    })
}

/// Normaliza una fila de roteiro; `None` si falta la fecha planificada
pub fn normalize_route_row(row: &CsvRow) -> Option<RouteVisit> {
    let mut fields = resolve_fields(row, SourceFormat::Route);

    let original_date = fields.remove(&CanonicalField::Date)?;
    let planned_date = normalize_date(&original_date)?;
    let check_in_original = fields.remove(&CanonicalField::CheckIn);

    Some(RouteVisit {
        original_date,
        planned_date,
        consultant: fields.remove(&CanonicalField::Consultant),
        store_label: fields.remove(&CanonicalField::StoreLabel),
        store_code: fields.remove(&CanonicalField::StoreCode),
        address: fields.remove(&CanonicalField::Address),
        actual_check_in: check_in_original.as_deref().and_then(normalize_time),
        predicted_check_in: fields
            .get(&CanonicalField::PredictedCheckIn)
            .and_then(|v| normalize_time(v)),
        check_in_original,
    })
}

/// Fila normalizada de cualquiera de los dos formatos
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRow {
    TimeClock(TimeClockEntry),
    Route(RouteVisit),
}

/// Normaliza una fila según su formato de origen
pub fn normalize_row(row: &CsvRow, format: SourceFormat) -> Option<NormalizedRow> {
    match format {
        SourceFormat::TimeClock => normalize_time_clock_row(row).map(NormalizedRow::TimeClock),
        SourceFormat::Route => normalize_route_row(row).map(NormalizedRow::Route),
    }
}

/// Resultado de normalizar un archivo completo
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch<T> {
    pub kept: Vec<T>,
    /// Filas descartadas por falta de campos obligatorios
    pub skipped: usize,
}

fn normalize_batch<T, F>(rows: &[CsvRow], label: &str, normalize: F) -> NormalizedBatch<T>
where
    F: Fn(&CsvRow) -> Option<T>,
{
    let kept: Vec<T> = rows.iter().filter_map(normalize).collect();
    let skipped = rows.len() - kept.len();
    info!("🧹 {}: {} filas válidas, {} descartadas", label, kept.len(), skipped);
    NormalizedBatch { kept, skipped }
}

pub fn normalize_time_clock_rows(rows: &[CsvRow]) -> NormalizedBatch<TimeClockEntry> {
    normalize_batch(rows, "Ponto", normalize_time_clock_row)
}

pub fn normalize_route_rows(rows: &[CsvRow]) -> NormalizedBatch<RouteVisit> {
    normalize_batch(rows, "Roteiro", normalize_route_row)
}
