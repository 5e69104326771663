//! Configuración del proyecto
//!
//! Este módulo contiene los umbrales de auditoría, el rango geográfico
//! válido y los parámetros del servicio de geocodificación.

pub mod environment;

pub use environment::*;
