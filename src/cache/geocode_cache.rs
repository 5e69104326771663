//! Cache de geocodificación
//!
//! Dirección → coordenadas, en memoria y por pasada. Cada dirección única
//! se pide como máximo una vez al geocodificador, aunque varias tareas la
//! pidan a la vez, y el resultado se guarda incluso si es `None`: un fallo
//! no se reintenta dentro de la misma pasada.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::models::Coordinates;
use crate::services::geocoding_service::Geocoder;
use crate::utils::text::fold_key;

/// De dónde salió el resultado de una consulta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeocodeSource {
    /// Ya estaba en cache (con o sin coordenadas)
    Memory,
    /// Pedido ahora y resuelto
    Geocoder,
    /// Pedido ahora, sin resultados
    NotFound,
    /// Pedido ahora, error de red/API
    Failed,
    /// Dirección vacía, no se pidió nada
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocodeLookup {
    pub coordinates: Option<Coordinates>,
    pub source: GeocodeSource,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GeocodeCacheStats {
    pub entries: usize,
    pub requests: usize,
    pub failures: usize,
}

type Slot = Arc<OnceCell<Option<Coordinates>>>;

pub struct GeocodeCache {
    geocoder: Arc<dyn Geocoder>,
    entries: Mutex<HashMap<String, Slot>>,
    requests: AtomicUsize,
    failures: AtomicUsize,
}

/// Clave de cache: sin mayúsculas, acentos ni espacios repetidos
pub fn cache_key(address: &str) -> String {
    fold_key(address)
}

impl GeocodeCache {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            entries: Mutex::new(HashMap::new()),
            requests: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    /// Lectura con relleno: consulta la cache y, si la dirección es nueva,
    /// el geocodificador.
    pub async fn lookup(&self, address: &str) -> GeocodeLookup {
        let key = cache_key(address);
        if key.is_empty() {
            return GeocodeLookup {
                coordinates: None,
                source: GeocodeSource::Skipped,
            };
        }

        let slot = {
            let mut entries = self.entries.lock().await;
            entries.entry(key).or_default().clone()
        };

        let mut fetched = None;
        let coordinates = *slot.get_or_init(|| self.fetch(address, &mut fetched)).await;

        GeocodeLookup {
            coordinates,
            source: fetched.unwrap_or(GeocodeSource::Memory),
        }
    }

    /// Atajo que sólo devuelve las coordenadas
    pub async fn coordinates(&self, address: &str) -> Option<Coordinates> {
        self.lookup(address).await.coordinates
    }

    async fn fetch(&self, address: &str, fetched: &mut Option<GeocodeSource>) -> Option<Coordinates> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        match self.geocoder.geocode(address.trim()).await {
            Ok(Some(coordinates)) => {
                *fetched = Some(GeocodeSource::Geocoder);
                Some(coordinates)
            }
            Ok(None) => {
                debug!("🔍 Sin resultados para: {}", address);
                *fetched = Some(GeocodeSource::NotFound);
                None
            }
            Err(e) => {
                warn!("⚠️ Fallo geocodificando '{}': {}", address, e);
                self.failures.fetch_add(1, Ordering::Relaxed);
                *fetched = Some(GeocodeSource::Failed);
                None
            }
        }
    }

    pub async fn stats(&self) -> GeocodeCacheStats {
        GeocodeCacheStats {
            entries: self.entries.lock().await.len(),
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::{AppError, AppResult};
    use async_trait::async_trait;
    use std::time::Duration;

    struct ScriptedGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for ScriptedGeocoder {
        async fn geocode(&self, address: &str) -> AppResult<Option<Coordinates>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            match address {
                a if a.contains("Paulista") => Ok(Some(Coordinates::new(-23.56, -46.65))),
                a if a.contains("quota") => Err(AppError::Geocoding("429 Too Many Requests".to_string())),
                _ => Ok(None),
            }
        }
    }

    fn cache() -> (Arc<ScriptedGeocoder>, GeocodeCache) {
        let geocoder = Arc::new(ScriptedGeocoder {
            calls: AtomicUsize::new(0),
        });
        let cache = GeocodeCache::new(geocoder.clone());
        (geocoder, cache)
    }

    #[tokio::test]
    async fn test_second_lookup_hits_memory() {
        let (geocoder, cache) = cache();
        let first = cache.lookup("Av. Paulista, 1000").await;
        let second = cache.lookup("  AV. PAULISTA,   1000 ").await;

        assert_eq!(first.source, GeocodeSource::Geocoder);
        assert_eq!(second.source, GeocodeSource::Memory);
        assert_eq!(first.coordinates, second.coordinates);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_cached_not_retried() {
        let (geocoder, cache) = cache();
        assert_eq!(cache.lookup("Rua quota").await.source, GeocodeSource::Failed);
        assert_eq!(cache.lookup("Rua quota").await.source, GeocodeSource::Memory);
        assert_eq!(cache.lookup("Rua inexistente").await.source, GeocodeSource::NotFound);
        assert_eq!(cache.lookup("").await.source, GeocodeSource::Skipped);

        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);
        let stats = cache.stats().await;
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.failures, 1);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_single_flight() {
        let (geocoder, cache) = cache();
        let lookups = (0..8).map(|_| cache.coordinates("Av. Paulista, 1000"));
        let results = futures::future::join_all(lookups).await;

        assert!(results.iter().all(|r| r.is_some()));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }
}
