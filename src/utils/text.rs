//! Normalización de texto
//!
//! Helpers para comparar cabeceras CSV y nombres de consultores/lojas
//! sin depender de mayúsculas, acentos ni espacios repetidos.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Quita los acentos (NFD + eliminación de marcas combinantes)
pub fn strip_accents(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Clave de comparación: sin acentos, minúsculas, espacios colapsados
pub fn fold_key(value: &str) -> String {
    strip_accents(value)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Nombre canónico para mostrar: mayúsculas y sin espacios sobrantes
pub fn display_name(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .to_uppercase()
}

/// Devuelve `None` si el valor está vacío después de recortar
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
