//! Sistema de manejo de errores
//!
//! Este módulo define los errores que el núcleo de auditoría puede
//! propagar al llamador. Los problemas de calidad de datos (filas
//! incompletas, coordenadas malformadas, lojas no encontradas) NO son
//! errores: se codifican como `None` y se resuelven en etapas posteriores.

use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Código corto y estable para mostrar en la UI
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Io(_) => "IO_ERROR",
            AppError::Csv(_) => "CSV_ERROR",
            AppError::Encoding(_) => "ENCODING_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::ExternalApi(_) => "EXTERNAL_API_ERROR",
            AppError::Geocoding(_) => "GEOCODING_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Registry(_) => "REGISTRY_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Geocoding(err.to_string())
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de configuración
pub fn config_error(key: &str, value: &str, expected: &str) -> AppError {
    AppError::Config(format!("{} has invalid value '{}' (expected {})", key, value, expected))
}

/// Función helper para crear errores de registro
pub fn registry_error(registry: &str, reason: &str) -> AppError {
    AppError::Registry(format!("{} unavailable: {}", registry, reason))
}
