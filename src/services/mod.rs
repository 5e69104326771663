//! Services module
//!
//! Este módulo contiene la lógica de negocio de la auditoría. Las etapas
//! puras (normalización, deduplicación, cruce, deltas, clasificación) no
//! se suspenden nunca; sólo la lectura de archivos y la geocodificación
//! son asíncronas.

pub mod audit_pipeline;
pub mod coordinate_normalizer;
pub mod csv_normalizer;
pub mod csv_reader;
pub mod deduplicator;
pub mod delta_calculator;
pub mod geocoding_service;
pub mod name_matching;
pub mod point_history_service;
pub mod store_matching_service;
pub mod travel_classifier;

pub use audit_pipeline::{AuditPipeline, AuditRun, GeocodingSummary};
pub use coordinate_normalizer::{CoordinateNormalizer, ShiftStrategy};
pub use csv_reader::{CsvRow, TextEncoding};
pub use geocoding_service::{Geocoder, MapboxGeocoder};
pub use point_history_service::PointHistoryAnalyzer;
pub use store_matching_service::StoreMatchingService;
