//! Auditoría de visitas de consultores de campo
//!
//! Reconcilia la exportación de ponto (Solides) con la de roteiro
//! (Umovme), resuelve la loja visitada contra el cadastro y clasifica cada
//! visita por distancia, modo viaje y aprobación manual. Incluye además el
//! análisis independiente del histórico de pontos GPS.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod models;
pub mod repositories;
pub mod services;
pub mod telemetry;
pub mod utils;

pub use config::AuditConfig;
pub use models::{AuditRecord, AuditStatus};
pub use services::{AuditPipeline, GeocodingSummary, PointHistoryAnalyzer};
pub use utils::{AppError, AppResult};
