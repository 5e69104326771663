//! Pipeline de auditoría
//!
//! CSV crudo → normalización → deduplicación → cruce con el roteiro y el
//! cadastro → (pasada de geocodificación) → clasificación.
//!
//! La construcción de registros es síncrona. Sólo la lectura de archivos,
//! la carga de cadastros y la geocodificación se suspenden.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::{GeocodeCache, GeocodeSource};
use crate::config::AuditConfig;
use crate::models::{AuditRecord, Coordinates};
use crate::repositories::{
    ConsultantDirectory, ConsultantSource, LocationSource, ReportReceipt, ReportStore, StoreCatalog,
};
use crate::services::csv_normalizer::{normalize_route_rows, normalize_time_clock_rows};
use crate::services::csv_reader::{read_csv_file, CsvRow, TextEncoding};
use crate::services::deduplicator::{dedupe, has_check_in};
use crate::services::geocoding_service::Geocoder;
use crate::services::store_matching_service::{unique_consultants, StoreMatchingService};
use crate::services::travel_classifier::classify_record;
use crate::utils::errors::AppResult;

/// Resultado de construir los registros de una auditoría
#[derive(Debug, Clone, Serialize)]
pub struct AuditRun {
    pub records: Vec<AuditRecord>,
    pub consultants: Vec<String>,
    pub time_clock_skipped: usize,
    pub route_skipped: usize,
    /// Entradas sin check-in, fuera de la deduplicación (ambos archivos)
    pub without_check_in: usize,
    /// Entradas descartadas por repetir consultor y día (ambos archivos)
    pub duplicates_removed: usize,
}

/// Resumen de una pasada de geocodificación
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeocodingSummary {
    pub records_visited: usize,
    pub coordinates_resolved: usize,
    pub lookups_failed: usize,
    pub records_classified: usize,
    /// Registros que siguen con una dirección sin coordenadas
    pub pending_with_address: usize,
}

impl GeocodingSummary {
    /// Nada se resolvió y aún hay direcciones pendientes: lo más probable
    /// es un token inválido o la cuota agotada.
    pub fn looks_like_api_failure(&self) -> bool {
        self.coordinates_resolved == 0 && self.pending_with_address > 0
    }
}

pub struct AuditPipeline {
    config: AuditConfig,
    stores: StoreCatalog,
    consultants: ConsultantDirectory,
    geocodes: Option<GeocodeCache>,
}

impl AuditPipeline {
    pub fn new(config: AuditConfig, stores: StoreCatalog, consultants: ConsultantDirectory) -> Self {
        Self {
            config,
            stores,
            consultants,
            geocodes: None,
        }
    }

    /// Carga los dos cadastros desde sus orígenes externos
    pub async fn load(
        config: AuditConfig,
        locations: &dyn LocationSource,
        consultants: &dyn ConsultantSource,
    ) -> AppResult<Self> {
        let stores = StoreCatalog::load(locations).await?;
        let consultants = ConsultantDirectory::load(consultants).await?;
        Ok(Self::new(config, stores, consultants))
    }

    /// Activa la geocodificación; la cache vive lo que viva el pipeline
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocodes = Some(GeocodeCache::new(geocoder));
        self
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn stores(&self) -> &StoreCatalog {
        &self.stores
    }

    pub fn geocode_cache(&self) -> Option<&GeocodeCache> {
        self.geocodes.as_ref()
    }

    /// Normaliza, deduplica y cruza las filas de ambos archivos
    pub fn build_records(&self, time_clock_rows: &[CsvRow], route_rows: &[CsvRow]) -> AuditRun {
        let time_clock = normalize_time_clock_rows(time_clock_rows);
        let route = normalize_route_rows(route_rows);

        let without_check_in = time_clock.kept.iter().filter(|e| !has_check_in(*e)).count()
            + route.kept.iter().filter(|v| !has_check_in(*v)).count();
        let before = time_clock.kept.len() + route.kept.len();
        let entries = dedupe(time_clock.kept);
        let visits = dedupe(route.kept);
        let duplicates_removed = before - without_check_in - entries.len() - visits.len();

        let matcher = StoreMatchingService::new(&self.stores, self.config.blank_consultant_policy);
        let records = matcher.build_records(entries, visits);
        let consultants = unique_consultants(&records);

        info!(
            "📋 Auditoría construida: {} registros, {} consultores, {} duplicados descartados, {} sin check-in",
            records.len(),
            consultants.len(),
            duplicates_removed,
            without_check_in
        );

        AuditRun {
            records,
            consultants,
            time_clock_skipped: time_clock.skipped,
            route_skipped: route.skipped,
            without_check_in,
            duplicates_removed,
        }
    }

    /// Igual que `build_records` pero leyendo los dos archivos. Un archivo
    /// ilegible aborta esta invocación.
    pub async fn build_records_from_files(
        &self,
        time_clock_path: impl AsRef<Path>,
        route_path: impl AsRef<Path>,
        encoding: TextEncoding,
    ) -> AppResult<AuditRun> {
        let time_clock_rows = read_csv_file(time_clock_path, encoding).await?;
        let route_rows = read_csv_file(route_path, encoding).await?;
        Ok(self.build_records(&time_clock_rows, &route_rows))
    }

    async fn lookup(&self, address: Option<&str>, summary: &mut GeocodingSummary) -> Option<Coordinates> {
        let cache = self.geocodes.as_ref()?;
        let address = address.map(str::trim).filter(|a| !a.is_empty())?;
        let lookup = cache.lookup(address).await;
        match (lookup.coordinates, lookup.source) {
            (Some(c), _) => {
                summary.coordinates_resolved += 1;
                Some(c)
            }
            (None, GeocodeSource::Skipped) => None,
            (None, _) => {
                summary.lookups_failed += 1;
                None
            }
        }
    }

    /// Direcciones que la pasada podría pedir al geocodificador
    fn pending_addresses(&self, records: &[AuditRecord]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut addresses = Vec::new();
        let mut push = |address: Option<&str>| {
            if let Some(a) = address.map(str::trim).filter(|a| !a.is_empty()) {
                if seen.insert(crate::cache::cache_key(a)) {
                    addresses.push(a.to_string());
                }
            }
        };

        for record in records.iter().filter(|r| r.route_visit.is_some()) {
            if record.check_in_coordinates.is_none() {
                push(check_in_address(record));
            }
            if record.store_coordinates.is_none()
                && record.resolved_store.as_ref().and_then(|s| s.coordinates()).is_none()
            {
                push(record.route_visit.as_ref().and_then(|v| v.address.as_deref()));
                push(record.resolved_store.as_ref().and_then(|s| s.address.as_deref()));
            }
            if record.home_coordinates.is_none() {
                if let Some(home) = self.consultants.find_home(&record.consultant) {
                    if home.coordinates().is_none() {
                        push(home.address.as_deref());
                    }
                }
            }
        }
        addresses
    }

    /// Pide por adelantado las direcciones únicas con concurrencia acotada.
    /// La cache garantiza una sola petición en vuelo por dirección.
    async fn prefetch(&self, records: &[AuditRecord]) {
        let (Some(cache), concurrency) = (self.geocodes.as_ref(), self.config.geocoding.concurrency) else {
            return;
        };
        if concurrency <= 1 {
            return;
        }

        let addresses = self.pending_addresses(records);
        info!("🚀 Prefetch de {} direcciones (concurrencia {})", addresses.len(), concurrency);
        stream::iter(addresses.iter())
            .map(|address| cache.lookup(address))
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>()
            .await;
    }

    /// Pasada de geocodificación y clasificación.
    ///
    /// Anota los registros en su lugar sin cambiar el orden. Los registros
    /// sin visita se saltan. Un fallo en un registro deja sus coordenadas en
    /// `None` y la pasada continúa.
    pub async fn geocode_records(&self, records: &mut [AuditRecord]) -> GeocodingSummary {
        let mut summary = GeocodingSummary::default();
        if self.geocodes.is_none() {
            warn!("⚠️ Sin geocodificador: sólo se usan coordenadas del cadastro");
        }

        self.prefetch(records).await;

        for record in records.iter_mut() {
            if record.route_visit.is_none() {
                continue;
            }
            summary.records_visited += 1;

            if record.check_in_coordinates.is_none() {
                let address = check_in_address(record).map(str::to_string);
                record.check_in_coordinates = self.lookup(address.as_deref(), &mut summary).await;
            }

            if record.store_coordinates.is_none() {
                record.store_coordinates = match record.resolved_store.as_ref().and_then(|s| s.coordinates()) {
                    Some(registry) => Some(registry),
                    None => {
                        let route_address = record.route_visit.as_ref().and_then(|v| v.address.clone());
                        let mut target = self.lookup(route_address.as_deref(), &mut summary).await;
                        record.route_address_coordinates = target;
                        if target.is_none() {
                            let store_address = record.resolved_store.as_ref().and_then(|s| s.address.clone());
                            target = self.lookup(store_address.as_deref(), &mut summary).await;
                        }
                        target
                    }
                };
            }

            if record.home_coordinates.is_none() {
                let home = self.consultants.find_home(&record.consultant);
                record.home_coordinates = match home {
                    Some(home) => match home.coordinates() {
                        Some(c) => Some(c),
                        None => self.lookup(home.address.as_deref(), &mut summary).await,
                    },
                    None => None,
                };
            }

            if classify_record(record, &self.config) {
                summary.records_classified += 1;
            } else if has_unresolved_address(record) {
                summary.pending_with_address += 1;
            }
        }

        info!(
            "🗺️ Geocodificación: {} registros, {} coordenadas resueltas, {} fallos, {} clasificados",
            summary.records_visited, summary.coordinates_resolved, summary.lookups_failed, summary.records_classified
        );
        if summary.looks_like_api_failure() {
            warn!("⚠️ Ninguna dirección se resolvió: revisar token o cuota del geocodificador");
        }
        summary
    }

    /// Guarda la foto de una auditoría
    pub async fn save_report(&self, store: &dyn ReportStore, records: &[AuditRecord]) -> AppResult<ReportReceipt> {
        let consultants = unique_consultants(records);
        store.save(records, &consultants).await
    }
}

fn check_in_address(record: &AuditRecord) -> Option<&str> {
    record
        .time_clock
        .location_address
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .or(record.time_clock.street.as_deref())
}

fn has_unresolved_address(record: &AuditRecord) -> bool {
    let check_in_pending = record.check_in_coordinates.is_none() && check_in_address(record).is_some();
    let target_pending = record.store_coordinates.is_none()
        && record
            .route_visit
            .as_ref()
            .and_then(|v| v.address.as_deref())
            .map_or(false, |a| !a.trim().is_empty());
    check_in_pending || target_pending
}
