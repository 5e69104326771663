//! Cadastro de consultores (base/casa de cada uno)

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::ConsultantHome;
use crate::services::name_matching::person_names_match;
use crate::utils::errors::{registry_error, AppResult};

/// Origen asíncrono del cadastro de consultores
#[async_trait]
pub trait ConsultantSource: Send + Sync {
    async fn fetch_consultants(&self) -> AppResult<Vec<ConsultantHome>>;
}

/// Foto en memoria del cadastro de consultores
#[derive(Debug, Clone, Default)]
pub struct ConsultantDirectory {
    homes: Vec<ConsultantHome>,
}

impl ConsultantDirectory {
    pub fn new(homes: Vec<ConsultantHome>) -> Self {
        Self { homes }
    }

    pub async fn load(source: &dyn ConsultantSource) -> AppResult<Self> {
        let homes = source
            .fetch_consultants()
            .await
            .map_err(|e| registry_error("Cadastro de consultores", &e.to_string()))?;
        info!("🏠 {} consultores cargados del cadastro", homes.len());
        Ok(Self::new(homes))
    }

    /// Primer consultor cuyo nombre coincide con `name`
    pub fn find_home(&self, name: &str) -> Option<&ConsultantHome> {
        if name.trim().is_empty() {
            return None;
        }
        self.homes
            .iter()
            .find(|home| person_names_match(&home.name, name))
    }

    pub fn homes(&self) -> &[ConsultantHome] {
        &self.homes
    }
}

/// Origen en memoria
#[derive(Debug, Default)]
pub struct InMemoryConsultantSource {
    homes: RwLock<Vec<ConsultantHome>>,
}

impl InMemoryConsultantSource {
    pub fn new(homes: Vec<ConsultantHome>) -> Self {
        Self {
            homes: RwLock::new(homes),
        }
    }
}

#[async_trait]
impl ConsultantSource for InMemoryConsultantSource {
    async fn fetch_consultants(&self) -> AppResult<Vec<ConsultantHome>> {
        Ok(self.homes.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home(name: &str) -> ConsultantHome {
        ConsultantHome {
            name: name.to_string(),
            address: Some("Rua das Flores, 10".to_string()),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_find_home_by_tokens() {
        let directory = ConsultantDirectory::new(vec![home("Bruno Costa"), home("Maria dos Santos Oliveira")]);
        let found = directory.find_home("MARIA OLIVEIRA").unwrap();
        assert_eq!(found.name, "Maria dos Santos Oliveira");
        assert!(directory.find_home("Carlos Mendes").is_none());
        assert!(directory.find_home("").is_none());
    }

    #[tokio::test]
    async fn test_load_directory() {
        let source = InMemoryConsultantSource::new(vec![home("Ana Silva")]);
        let directory = ConsultantDirectory::load(&source).await.unwrap();
        assert_eq!(directory.homes().len(), 1);
    }

    struct OfflineSource;

    #[async_trait]
    impl ConsultantSource for OfflineSource {
        async fn fetch_consultants(&self) -> AppResult<Vec<ConsultantHome>> {
            Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "planilha").into())
        }
    }

    #[tokio::test]
    async fn test_unavailable_source_is_registry_error() {
        let err = ConsultantDirectory::load(&OfflineSource).await.unwrap_err();
        assert_eq!(err.code(), "REGISTRY_ERROR");
    }
}
