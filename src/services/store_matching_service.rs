use std::cmp::Ordering;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

use crate::config::BlankConsultantPolicy;
use crate::models::{AuditRecord, AuditStatus, RouteVisit, StoreLocation, TimeClockEntry};
use crate::repositories::LocationRegistry;
use crate::services::delta_calculator::{actual_vs_actual, actual_vs_predicted};
use crate::utils::text::{display_name, fold_key};

lazy_static! {
    // "123 - Loja X" o sólo "123"
    static ref LEADING_STORE_CODE: Regex = Regex::new(r"^\s*(\d+)\s*(?:-|$)").unwrap();
}

const MISSING_CONSULTANT: &str = "N/A";

/// Código numérico al inicio de la etiqueta de la loja
pub fn leading_store_code(label: &str) -> Option<&str> {
    LEADING_STORE_CODE
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Código explícito utilizable: no vacío y no convertido a notación
/// científica por la planilla (`1,23E+5`)
pub fn usable_store_code(code: &str) -> Option<&str> {
    let code = code.trim();
    if code.is_empty() || code.to_uppercase().contains("E+") {
        None
    } else {
        Some(code)
    }
}

/// Resuelve la loja de una visita: código en la etiqueta, código
/// explícito y por último nombre aproximado.
pub fn resolve_store<'a>(visit: &RouteVisit, registry: &'a dyn LocationRegistry) -> Option<&'a StoreLocation> {
    let label = visit.store_label.as_deref().unwrap_or("");

    if let Some(store) = leading_store_code(label).and_then(|code| registry.find_by_code(code)) {
        return Some(store);
    }

    if let Some(store) = visit
        .store_code
        .as_deref()
        .and_then(usable_store_code)
        .and_then(|code| registry.find_by_code(code))
    {
        return Some(store);
    }

    registry.find_by_fuzzy_name(label)
}

/// Fecha `DD/MM/YYYY` para ordenar; las no reconocidas van al final
fn date_sort_key(date: &str) -> (bool, Option<NaiveDate>) {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%d/%m/%Y").ok();
    (parsed.is_none(), parsed)
}

fn compare_entries(date_a: &str, who_a: Option<&str>, time_a: Option<&str>, date_b: &str, who_b: Option<&str>, time_b: Option<&str>) -> Ordering {
    date_sort_key(date_a)
        .cmp(&date_sort_key(date_b))
        .then_with(|| date_a.cmp(date_b))
        .then_with(|| who_a.map(fold_key).cmp(&who_b.map(fold_key)))
        .then_with(|| time_a.cmp(&time_b))
}

/// Servicio de cruce ponto ↔ roteiro ↔ cadastro de lojas
pub struct StoreMatchingService<'a> {
    registry: &'a dyn LocationRegistry,
    policy: BlankConsultantPolicy,
}

impl<'a> StoreMatchingService<'a> {
    pub fn new(registry: &'a dyn LocationRegistry, policy: BlankConsultantPolicy) -> Self {
        Self { registry, policy }
    }

    fn consultants_match(&self, entry: &TimeClockEntry, visit: &RouteVisit) -> bool {
        let a = entry.consultant.as_deref().map(fold_key).filter(|n| !n.is_empty());
        let b = visit.consultant.as_deref().map(fold_key).filter(|n| !n.is_empty());
        match (a, b) {
            (Some(a), Some(b)) => a == b,
            _ => self.policy == BlankConsultantPolicy::DateOnly,
        }
    }

    /// Primera visita (en el orden recibido) con la misma fecha y consultor
    pub fn find_visit<'v>(&self, entry: &TimeClockEntry, visits: &'v [RouteVisit]) -> Option<&'v RouteVisit> {
        visits
            .iter()
            .find(|visit| visit.planned_date == entry.date && self.consultants_match(entry, visit))
    }

    /// Construye un registro de auditoría por cada marcación de ponto.
    /// Ambas entradas se ordenan antes del cruce para que el resultado no
    /// dependa del orden de los archivos.
    pub fn build_records(&self, mut entries: Vec<TimeClockEntry>, mut visits: Vec<RouteVisit>) -> Vec<AuditRecord> {
        entries.sort_by(|a, b| {
            compare_entries(
                &a.date,
                a.consultant.as_deref(),
                Some(&a.check_in_time),
                &b.date,
                b.consultant.as_deref(),
                Some(&b.check_in_time),
            )
        });
        visits.sort_by(|a, b| {
            compare_entries(
                &a.planned_date,
                a.consultant.as_deref(),
                a.actual_check_in.as_deref(),
                &b.planned_date,
                b.consultant.as_deref(),
                b.actual_check_in.as_deref(),
            )
        });

        let mut records: Vec<AuditRecord> = entries
            .into_iter()
            .map(|entry| self.build_record(entry, &visits))
            .collect();

        records.sort_by(|a, b| {
            compare_entries(
                &a.date,
                Some(&a.consultant),
                Some(&a.time_clock.check_in_time),
                &b.date,
                Some(&b.consultant),
                Some(&b.time_clock.check_in_time),
            )
        });

        let matched = records.iter().filter(|r| r.route_visit.is_some()).count();
        let resolved = records.iter().filter(|r| r.resolved_store.is_some()).count();
        info!(
            "🔗 Cruce completado: {} registros, {} con visita, {} con loja resuelta",
            records.len(),
            matched,
            resolved
        );
        records
    }

    fn build_record(&self, entry: TimeClockEntry, visits: &[RouteVisit]) -> AuditRecord {
        let visit = self.find_visit(&entry, visits).cloned();
        let store = visit
            .as_ref()
            .and_then(|v| resolve_store(v, self.registry))
            .cloned();

        if let (Some(v), None) = (&visit, &store) {
            debug!("🔍 Loja no encontrada en el cadastro: {:?}", v.store_label);
        }

        let status = match (&visit, &store) {
            (None, _) => AuditStatus::NoVisit,
            (Some(_), Some(_)) => AuditStatus::Matched,
            (Some(_), None) => AuditStatus::StoreNotFound,
        };

        let consultant = entry
            .consultant
            .as_deref()
            .or_else(|| visit.as_ref().and_then(|v| v.consultant.as_deref()))
            .map(display_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| MISSING_CONSULTANT.to_string());

        AuditRecord {
            date: entry.date.clone(),
            consultant,
            actual_vs_actual_delta_minutes: actual_vs_actual(&entry, visit.as_ref()),
            actual_vs_predicted_delta_minutes: actual_vs_predicted(visit.as_ref()),
            time_clock: entry,
            route_visit: visit,
            resolved_store: store,
            check_in_coordinates: None,
            route_address_coordinates: None,
            store_coordinates: None,
            home_coordinates: None,
            distance_meters: None,
            status,
            manual_override: false,
        }
    }
}

/// Consultores únicos de una auditoría, ordenados
pub fn unique_consultants(records: &[AuditRecord]) -> Vec<String> {
    let mut names: Vec<String> = records
        .iter()
        .map(|r| r.consultant.clone())
        .filter(|c| !c.is_empty() && c != MISSING_CONSULTANT)
        .collect();
    names.sort();
    names.dedup();
    names
}
