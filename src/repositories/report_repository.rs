//! Persistencia de reportes auditados
//!
//! El núcleo sólo necesita guardar una foto de los registros y recuperar
//! la más reciente. La implementación en memoria guarda el JSON igual que
//! lo haría un almacenamiento externo.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::models::AuditRecord;
use crate::utils::errors::{AppError, AppResult};

/// Comprobante de un reporte guardado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportReceipt {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Contenido de un reporte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedReport {
    pub audit_records: Vec<AuditRecord>,
    pub consultants: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn save(&self, records: &[AuditRecord], consultants: &[String]) -> AppResult<ReportReceipt>;
    async fn load_latest(&self) -> AppResult<Option<SavedReport>>;
}

/// Título con el que se publica un reporte
pub fn report_title(created_at: &DateTime<Utc>) -> String {
    format!("Relatório Auditado - {}", created_at.format("%d/%m/%Y %H:%M:%S"))
}

struct StoredReport {
    receipt: ReportReceipt,
    payload: String,
}

/// Almacén en memoria
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<Vec<StoredReport>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn receipts(&self) -> Vec<ReportReceipt> {
        self.reports
            .read()
            .await
            .iter()
            .map(|r| r.receipt.clone())
            .collect()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn save(&self, records: &[AuditRecord], consultants: &[String]) -> AppResult<ReportReceipt> {
        let created_at = Utc::now();
        let report = SavedReport {
            audit_records: records.to_vec(),
            consultants: consultants.to_vec(),
            generated_at: created_at,
        };
        let payload = serde_json::to_string(&report)?;

        let receipt = ReportReceipt {
            id: Uuid::new_v4(),
            title: report_title(&created_at),
            created_at,
        };
        self.reports.write().await.push(StoredReport {
            receipt: receipt.clone(),
            payload,
        });

        info!("💾 Reporte guardado: {} ({} registros)", receipt.title, records.len());
        Ok(receipt)
    }

    async fn load_latest(&self) -> AppResult<Option<SavedReport>> {
        let reports = self.reports.read().await;
        let latest = reports.iter().max_by_key(|r| r.receipt.created_at);
        match latest {
            Some(stored) => serde_json::from_str(&stored.payload)
                .map(Some)
                .map_err(|e| AppError::Storage(format!("report {} is unreadable: {}", stored.receipt.id, e))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_has_no_report() {
        let store = InMemoryReportStore::new();
        assert!(store.load_latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_report_wins() {
        let store = InMemoryReportStore::new();
        store.save(&[], &["ANA".to_string()]).await.unwrap();
        let second = store.save(&[], &["BRUNO".to_string()]).await.unwrap();

        let latest = store.load_latest().await.unwrap().unwrap();
        assert_eq!(latest.consultants, vec!["BRUNO".to_string()]);
        assert_eq!(latest.generated_at, second.created_at);
        assert!(second.title.starts_with("Relatório Auditado - "));
        assert_eq!(store.receipts().await.len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_storage_error() {
        let store = InMemoryReportStore::new();
        store.reports.write().await.push(StoredReport {
            receipt: ReportReceipt {
                id: Uuid::new_v4(),
                title: report_title(&Utc::now()),
                created_at: Utc::now(),
            },
            payload: "{\"audit_records\": [".to_string(),
        });

        let err = store.load_latest().await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(err.code(), "STORAGE_ERROR");
    }
}
