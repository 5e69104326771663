//! Indicadores sobre los registros de una auditoría

pub mod compliance;
pub mod dashboard;
pub mod store_delay;

pub use compliance::{compliance_ranking, ConsultantCompliance, RankingOrder};
pub use dashboard::DashboardStats;
pub use store_delay::{store_delay_ranking, BrandDelay, DelayMetric, StoreDelay};
