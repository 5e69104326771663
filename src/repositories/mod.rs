//! Repositorios
//!
//! Contratos estrechos con los colaboradores externos (cadastro de lojas,
//! cadastro de consultores, almacenamiento de reportes) y sus
//! implementaciones en memoria.

pub mod consultant_repository;
pub mod location_repository;
pub mod report_repository;

pub use consultant_repository::{ConsultantDirectory, ConsultantSource, InMemoryConsultantSource};
pub use location_repository::{InMemoryLocationSource, LocationRegistry, LocationSource, StoreCatalog};
pub use report_repository::{InMemoryReportStore, ReportReceipt, ReportStore, SavedReport};
