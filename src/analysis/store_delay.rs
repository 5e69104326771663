//! Ranking de atrasos por bandeira y loja

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::AuditRecord;

const UNKNOWN_BRAND: &str = "DESCONHECIDO";
const UNKNOWN_STORE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayMetric {
    #[default]
    Count,
    AverageDelay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreDelay {
    pub name: String,
    pub count: usize,
    pub average_delay_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandDelay {
    pub name: String,
    pub count: usize,
    pub total_delay_minutes: i64,
    pub average_delay_minutes: i64,
    pub stores: Vec<StoreDelay>,
}

impl BrandDelay {
    pub fn unique_stores(&self) -> usize {
        self.stores.len()
    }
}

#[derive(Default)]
struct Tally {
    count: usize,
    total: i64,
}

impl Tally {
    fn add(&mut self, delay: i64) {
        self.count += 1;
        self.total += delay;
    }

    fn average(&self) -> i64 {
        (self.total as f64 / self.count.max(1) as f64).round() as i64
    }
}

/// Visitas con |retraso efectivo| por encima de `threshold_minutes`,
/// agrupadas por bandeira.
pub fn store_delay_ranking(records: &[AuditRecord], threshold_minutes: i64, metric: DelayMetric) -> Vec<BrandDelay> {
    let mut brands: BTreeMap<String, (Tally, BTreeMap<String, Tally>)> = BTreeMap::new();

    for record in records {
        let delay = record.effective_delay_minutes().map(i64::abs).unwrap_or(0);
        if delay <= threshold_minutes {
            continue;
        }

        let brand = record.store_brand().unwrap_or(UNKNOWN_BRAND).to_string();
        let store = record.store_name().unwrap_or(UNKNOWN_STORE).to_string();

        let (tally, stores) = brands.entry(brand).or_default();
        tally.add(delay);
        stores.entry(store).or_default().add(delay);
    }

    let mut ranking: Vec<BrandDelay> = brands
        .into_iter()
        .map(|(name, (tally, stores))| {
            let mut stores: Vec<StoreDelay> = stores
                .into_iter()
                .map(|(name, t)| StoreDelay {
                    name,
                    count: t.count,
                    average_delay_minutes: t.average(),
                })
                .collect();
            stores.sort_by(|a, b| b.count.cmp(&a.count));

            BrandDelay {
                name,
                count: tally.count,
                total_delay_minutes: tally.total,
                average_delay_minutes: tally.average(),
                stores,
            }
        })
        .collect();

    match metric {
        DelayMetric::Count => ranking.sort_by(|a, b| b.count.cmp(&a.count)),
        DelayMetric::AverageDelay => ranking.sort_by(|a, b| b.average_delay_minutes.cmp(&a.average_delay_minutes)),
    }
    ranking
}
