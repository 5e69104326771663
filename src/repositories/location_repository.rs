//! Cadastro de lojas
//!
//! `LocationSource` es el viaje asíncrono al almacenamiento externo;
//! `StoreCatalog` es la foto en memoria que consulta el matcher sin
//! suspenderse.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::StoreLocation;
use crate::services::name_matching::contains_either_way;
use crate::utils::errors::{registry_error, AppResult};

/// Origen asíncrono del cadastro de lojas
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn fetch_locations(&self) -> AppResult<Vec<StoreLocation>>;
}

/// Consultas síncronas sobre el cadastro
pub trait LocationRegistry: Send + Sync {
    /// Código exacto
    fn find_by_code(&self, code: &str) -> Option<&StoreLocation>;
    /// Contención de nombre en cualquier dirección
    fn find_by_fuzzy_name(&self, text: &str) -> Option<&StoreLocation>;
    /// Todas las lojas, en el orden del cadastro
    fn snapshot(&self) -> &[StoreLocation];
}

/// Foto en memoria del cadastro
#[derive(Debug, Clone, Default)]
pub struct StoreCatalog {
    stores: Vec<StoreLocation>,
    // código → índice de la primera loja con ese código
    by_code: HashMap<String, usize>,
}

impl StoreCatalog {
    pub fn new(stores: Vec<StoreLocation>) -> Self {
        let mut by_code = HashMap::new();
        for (i, store) in stores.iter().enumerate() {
            let code = store.code.trim();
            if !code.is_empty() {
                by_code.entry(code.to_string()).or_insert(i);
            }
        }
        Self { stores, by_code }
    }

    /// Carga la foto desde un origen asíncrono
    pub async fn load(source: &dyn LocationSource) -> AppResult<Self> {
        let stores = source
            .fetch_locations()
            .await
            .map_err(|e| registry_error("Cadastro de lojas", &e.to_string()))?;
        info!("🏬 {} lojas cargadas del cadastro", stores.len());
        Ok(Self::new(stores))
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl LocationRegistry for StoreCatalog {
    fn find_by_code(&self, code: &str) -> Option<&StoreLocation> {
        self.by_code.get(code.trim()).map(|&i| &self.stores[i])
    }

    fn find_by_fuzzy_name(&self, text: &str) -> Option<&StoreLocation> {
        if text.trim().is_empty() {
            return None;
        }
        self.stores
            .iter()
            .find(|store| contains_either_way(&store.name, text))
    }

    fn snapshot(&self) -> &[StoreLocation] {
        &self.stores
    }
}

/// Origen en memoria (pruebas y reportes ya cargados)
#[derive(Debug, Default)]
pub struct InMemoryLocationSource {
    stores: RwLock<Vec<StoreLocation>>,
}

impl InMemoryLocationSource {
    pub fn new(stores: Vec<StoreLocation>) -> Self {
        Self {
            stores: RwLock::new(stores),
        }
    }

    pub async fn upsert(&self, store: StoreLocation) {
        let mut stores = self.stores.write().await;
        match stores.iter_mut().find(|s| s.code == store.code) {
            Some(existing) => *existing = store,
            None => stores.push(store),
        }
    }
}

#[async_trait]
impl LocationSource for InMemoryLocationSource {
    async fn fetch_locations(&self) -> AppResult<Vec<StoreLocation>> {
        Ok(self.stores.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(code: &str, name: &str) -> StoreLocation {
        StoreLocation {
            code: code.to_string(),
            name: name.to_string(),
            brand: Some("REDE".to_string()),
            address: None,
            latitude: Some(-23.5),
            longitude: Some(-46.6),
        }
    }

    #[test]
    fn test_find_by_code_is_exact() {
        let catalog = StoreCatalog::new(vec![store("123", "Loja X"), store("1234", "Loja Y")]);
        assert_eq!(catalog.find_by_code("123").map(|s| s.name.as_str()), Some("Loja X"));
        assert_eq!(catalog.find_by_code(" 1234 ").map(|s| s.name.as_str()), Some("Loja Y"));
        assert!(catalog.find_by_code("12").is_none());
    }

    #[test]
    fn test_find_by_fuzzy_name() {
        let catalog = StoreCatalog::new(vec![store("1", ""), store("2", "Atacadão Centro")]);
        assert_eq!(
            catalog.find_by_fuzzy_name("ATACADAO CENTRO - SP").map(|s| s.code.as_str()),
            Some("2")
        );
        assert!(catalog.find_by_fuzzy_name("  ").is_none());
    }

    #[tokio::test]
    async fn test_load_from_in_memory_source() {
        let source = InMemoryLocationSource::new(vec![store("1", "A")]);
        source.upsert(store("1", "A renamed")).await;
        source.upsert(store("2", "B")).await;

        let catalog = StoreCatalog::load(&source).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find_by_code("1").unwrap().name, "A renamed");
    }

    struct OfflineSource;

    #[async_trait]
    impl LocationSource for OfflineSource {
        async fn fetch_locations(&self) -> AppResult<Vec<StoreLocation>> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "lojas.csv").into())
        }
    }

    #[tokio::test]
    async fn test_unavailable_source_is_registry_error() {
        let err = StoreCatalog::load(&OfflineSource).await.unwrap_err();
        assert_eq!(err.code(), "REGISTRY_ERROR");
        assert!(err.to_string().contains("Cadastro de lojas"));
    }
}
