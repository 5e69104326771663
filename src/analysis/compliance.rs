//! Ranking de cumplimiento por consultor
//!
//! Puntaje 0-100: promedio entre puntualidad (un atraso moderado vale 0.6)
//! y cumplimiento geográfico según el estado mostrado.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::AuditRecord;

/// Orden del ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingOrder {
    #[default]
    BestFirst,
    WorstFirst,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsultantCompliance {
    pub name: String,
    pub total: usize,
    pub time_ok: usize,
    pub time_warning: usize,
    pub time_error: usize,
    pub geo_ok: usize,
    pub geo_error: usize,
    pub score: u32,
}

impl ConsultantCompliance {
    fn compute_score(&mut self) {
        let time_total = (self.time_ok + self.time_warning + self.time_error).max(1) as f64;
        let time_score = (self.time_ok as f64 + self.time_warning as f64 * 0.6) / time_total;

        let geo_total = (self.geo_ok + self.geo_error).max(1) as f64;
        let geo_score = self.geo_ok as f64 / geo_total;

        self.score = (((time_score + geo_score) / 2.0) * 100.0).round() as u32;
    }
}

pub fn compliance_ranking(
    records: &[AuditRecord],
    warning_minutes: i64,
    critical_minutes: i64,
    order: RankingOrder,
) -> Vec<ConsultantCompliance> {
    let mut grouped: BTreeMap<&str, ConsultantCompliance> = BTreeMap::new();

    for record in records {
        let name = record.consultant.trim();
        if name.is_empty() || name == "N/A" {
            continue;
        }
        let entry = grouped.entry(name).or_insert_with(|| ConsultantCompliance {
            name: name.to_string(),
            ..Default::default()
        });
        entry.total += 1;

        if let Some(delay) = record.effective_delay_minutes() {
            match delay.abs() {
                d if d <= warning_minutes => entry.time_ok += 1,
                d if d <= critical_minutes => entry.time_warning += 1,
                _ => entry.time_error += 1,
            }
        }

        let status = record.displayed_status();
        if status.is_geo_ok() {
            entry.geo_ok += 1;
        } else if status.is_geo_error() {
            entry.geo_error += 1;
        }
    }

    let mut ranking: Vec<ConsultantCompliance> = grouped
        .into_values()
        .map(|mut c| {
            c.compute_score();
            c
        })
        .collect();

    match order {
        RankingOrder::BestFirst => ranking.sort_by(|a, b| b.score.cmp(&a.score)),
        RankingOrder::WorstFirst => ranking.sort_by(|a, b| a.score.cmp(&b.score)),
    }
    ranking
}
