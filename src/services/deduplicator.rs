//! Deduplicación por consultor y día
//!
//! Cada exportación puede traer varias marcaciones del mismo consultor en
//! el mismo día; sólo interesa el primer check-in. Las horas están en
//! `HH:MM` con ceros a la izquierda, así que la comparación lexicográfica
//! equivale a la cronológica.

use std::collections::HashMap;

use crate::models::{RouteVisit, TimeClockEntry};
use crate::utils::text::fold_key;

const UNKNOWN_CONSULTANT: &str = "UNKNOWN";

/// Acceso a los campos que participan en la deduplicación
pub trait DailyEntry {
    fn entry_date(&self) -> Option<&str>;
    fn entry_time(&self) -> Option<&str>;
    fn entry_consultant(&self) -> Option<&str>;
}

impl DailyEntry for TimeClockEntry {
    fn entry_date(&self) -> Option<&str> {
        Some(self.date.as_str())
    }

    fn entry_time(&self) -> Option<&str> {
        Some(self.check_in_time.as_str())
    }

    fn entry_consultant(&self) -> Option<&str> {
        self.consultant.as_deref()
    }
}

impl DailyEntry for RouteVisit {
    fn entry_date(&self) -> Option<&str> {
        Some(self.planned_date.as_str())
    }

    fn entry_time(&self) -> Option<&str> {
        self.actual_check_in.as_deref()
    }

    fn entry_consultant(&self) -> Option<&str> {
        self.consultant.as_deref()
    }
}

/// Clave `(consultor, fecha)`; consultor vacío cuenta como `UNKNOWN`
pub fn dedupe_key<T: DailyEntry>(entry: &T) -> Option<(String, String)> {
    let date = entry.entry_date().map(str::trim).filter(|d| !d.is_empty())?;
    let consultant = entry
        .entry_consultant()
        .map(fold_key)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| UNKNOWN_CONSULTANT.to_string());
    Some((consultant, date.to_string()))
}

/// La entrada tiene fecha y hora de check-in, es decir, participa en la
/// deduplicación
pub fn has_check_in<T: DailyEntry>(entry: &T) -> bool {
    let time_is_present = entry
        .entry_time()
        .map(|t| !t.trim().is_empty())
        .unwrap_or(false);
    time_is_present && dedupe_key(entry).is_some()
}

/// Conserva la entrada más temprana por `(consultor, fecha)`. Las entradas
/// sin fecha u hora se descartan. El resultado mantiene el orden de la
/// primera aparición de cada clave.
pub fn dedupe<T: DailyEntry>(records: Vec<T>) -> Vec<T> {
    let mut slots: Vec<T> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for record in records {
        if !has_check_in(&record) {
            continue;
        }
        let Some(key) = dedupe_key(&record) else {
            continue;
        };

        match index.get(&key).copied() {
            Some(slot) => {
                if record.entry_time() < slots[slot].entry_time() {
                    slots[slot] = record;
                }
            }
            None => {
                index.insert(key, slots.len());
                slots.push(record);
            }
        }
    }

    slots
}
