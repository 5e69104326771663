//! Inicialización de logs

use tracing::Level;

/// Instala el subscriber `fmt` de tracing. Si ya hay uno instalado (tests,
/// aplicación anfitriona) no hace nada.
pub fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

/// Nivel desde texto (`debug`, `warn`...); `info` si no se reconoce
pub fn level_from_str(value: &str) -> Level {
    value.trim().parse().unwrap_or(Level::INFO)
}
