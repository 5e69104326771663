//! Lectura de CSV
//!
//! Las exportaciones vienen separadas por `;` y muchas veces en
//! ISO-8859-1. Este módulo decodifica los bytes y produce filas como
//! pares ordenados cabecera→valor; la interpretación de las cabeceras
//! queda para `csv_normalizer`.

use std::path::Path;

use tracing::{debug, info};

use crate::utils::errors::{AppError, AppResult};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Codificación esperada del archivo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8 si es válido, si no ISO-8859-1
    #[default]
    Auto,
    Utf8,
    Latin1,
}

/// Una fila del CSV: pares cabecera→valor en el orden del archivo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvRow {
    fields: Vec<(String, String)>,
}

impl CsvRow {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Valor por cabecera exacta
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// Decodifica los bytes del archivo según `encoding`
pub fn decode_csv_bytes(bytes: &[u8], encoding: TextEncoding) -> AppResult<String> {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    match encoding {
        TextEncoding::Utf8 => String::from_utf8(body.to_vec())
            .map_err(|e| AppError::Encoding(format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()))),
        TextEncoding::Latin1 => Ok(decode_latin1(body)),
        TextEncoding::Auto => match std::str::from_utf8(body) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => {
                debug!("🔤 Archivo no es UTF-8, decodificando como ISO-8859-1");
                Ok(decode_latin1(body))
            }
        },
    }
}

/// ISO-8859-1: cada byte es el code point del mismo valor
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Parsea texto CSV separado por `;` con fila de cabecera
pub fn parse_csv_text(text: &str) -> AppResult<Vec<CsvRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    debug!("📋 Cabeceras CSV detectadas: {:?}", headers);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, header)| (header.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        let row = CsvRow::new(fields);
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Lee y parsea un archivo CSV completo
pub async fn read_csv_file(path: impl AsRef<Path>, encoding: TextEncoding) -> AppResult<Vec<CsvRow>> {
    let path = path.as_ref();
    info!("📂 Leyendo CSV: {}", path.display());

    let bytes = tokio::fs::read(path).await?;
    let text = decode_csv_bytes(&bytes, encoding)?;
    let rows = parse_csv_text(&text)?;

    info!("✅ {} filas leídas de {}", rows.len(), path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_fallback() {
        // "Saída" en ISO-8859-1
        let bytes = b"Sa\xedda";
        assert_eq!(decode_csv_bytes(bytes, TextEncoding::Auto).unwrap(), "Saída");
        assert!(matches!(
            decode_csv_bytes(bytes, TextEncoding::Utf8),
            Err(AppError::Encoding(_))
        ));
    }

    #[test]
    fn test_bom_is_stripped() {
        let bytes = b"\xEF\xBB\xBFData;Entrada\n01/02/2024;09:00\n";
        let text = decode_csv_bytes(bytes, TextEncoding::Auto).unwrap();
        let rows = parse_csv_text(&text).unwrap();
        assert_eq!(rows[0].get("Data"), Some("01/02/2024"));
    }

    #[test]
    fn test_parse_semicolon_rows() {
        let text = " Data ;Colaborador;Entrada\n01/02/2024;Ana Silva;09:00\n;;\n02/02/2024;Ana Silva\n";
        let rows = parse_csv_text(text).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Data"), Some("01/02/2024"));
        assert_eq!(rows[0].get("Colaborador"), Some("Ana Silva"));
        // Fila corta: el valor que falta queda vacío
        assert_eq!(rows[1].get("Entrada"), Some(""));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = read_csv_file("/nonexistent/solides.csv", TextEncoding::Auto).await;
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
