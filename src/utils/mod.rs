//! Utilidades del sistema
//!
//! Este módulo contiene el tipo de error común y helpers de texto.

pub mod errors;
pub mod text;

pub use errors::{AppError, AppResult};
