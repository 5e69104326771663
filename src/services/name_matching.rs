//! Comparación difusa de nombres
//!
//! Misma política para lojas y consultores: igualdad o contención sin
//! importar mayúsculas/acentos. Para personas se añade solapamiento de
//! tokens, porque los cadastros abrevian o reordenan apellidos.

use crate::utils::text::fold_key;

// Preposiciones y artículos que no identifican a nadie
const NAME_STOPWORDS: &[&str] = &["dos", "das", "des", "del", "los", "las", "com"];

/// Contención en cualquier dirección, sin mayúsculas ni acentos
pub fn contains_either_way(a: &str, b: &str) -> bool {
    let a = fold_key(a);
    let b = fold_key(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Tokens significativos de un nombre (≥3 caracteres, sin stopwords)
pub fn name_tokens(name: &str) -> Vec<String> {
    fold_key(name)
        .split_whitespace()
        .filter(|t| t.chars().count() >= 3 && !NAME_STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// ¿Se refieren `a` y `b` a la misma persona?
pub fn person_names_match(a: &str, b: &str) -> bool {
    if contains_either_way(a, b) {
        return true;
    }

    let tokens_a = name_tokens(a);
    let tokens_b = name_tokens(b);
    let (shorter, longer) = if tokens_a.len() <= tokens_b.len() {
        (&tokens_a, &tokens_b)
    } else {
        (&tokens_b, &tokens_a)
    };
    if shorter.is_empty() {
        return false;
    }

    let overlap = shorter.iter().filter(|t| longer.contains(t)).count();
    overlap >= shorter.len().min(2)
}
