//! Normalizador de coordenadas
//!
//! Las exportaciones traen latitudes/longitudes con el separador decimal
//! desplazado (p. ej. `"-211.768.262"` para `-21.1768262`). Se quitan todos
//! los separadores y se prueba dónde va la coma decimal hasta que el valor
//! cae dentro del rango válido del país.

use crate::config::GeoBounds;
use crate::models::coordinates::Axis;

/// Cómo se buscan las posiciones candidatas de la coma decimal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftStrategy {
    /// Prueba 2 dígitos enteros, luego 1, luego 3 (exportaciones de ponto/roteiro)
    LeadingDigits,
    /// Divide por 10 sucesivamente desde el entero completo
    /// (histórico de pontos, que trae una cantidad variable de dígitos)
    Descending { max_shift: u32 },
}

const LEADING_INTEGER_DIGITS: [usize; 3] = [2, 1, 3];

/// Parser determinista de coordenadas malformadas
#[derive(Debug, Clone, Copy)]
pub struct CoordinateNormalizer {
    bounds: GeoBounds,
}

impl CoordinateNormalizer {
    pub fn new(bounds: GeoBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &GeoBounds {
        &self.bounds
    }

    /// Coordenada de las exportaciones de ponto/roteiro
    pub fn parse(&self, raw: &str, axis: Axis) -> Option<f64> {
        parse_coordinate(raw, axis, &self.bounds, ShiftStrategy::LeadingDigits)
    }

    /// Coordenada del histórico de pontos
    pub fn parse_breadcrumb(&self, raw: &str, axis: Axis) -> Option<f64> {
        parse_coordinate(raw, axis, &self.bounds, ShiftStrategy::Descending { max_shift: 15 })
    }
}

impl Default for CoordinateNormalizer {
    fn default() -> Self {
        Self::new(GeoBounds::brazil())
    }
}

/// Interpreta `raw` como coordenada del eje `axis`. Devuelve `None` si está
/// vacía, no es numérica, es cero o ningún desplazamiento cae en el rango.
pub fn parse_coordinate(raw: &str, axis: Axis, bounds: &GeoBounds, strategy: ShiftStrategy) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Valor decimal ya bien formado
    if let Some(value) = parse_plain_decimal(trimmed) {
        if value != 0.0 && bounds.contains(axis, value) {
            return Some(value);
        }
    }

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = unsigned.chars().filter(|c| *c != '.' && *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let magnitude: f64 = digits.parse().ok()?;
    if magnitude == 0.0 || !magnitude.is_finite() {
        return None;
    }
    let sign = if negative { -1.0 } else { 1.0 };

    match strategy {
        ShiftStrategy::LeadingDigits => {
            let len = digits.len();
            LEADING_INTEGER_DIGITS
                .iter()
                .filter(|&&int_digits| int_digits <= len)
                .map(|&int_digits| sign * magnitude / 10f64.powi((len - int_digits) as i32))
                .find(|candidate| bounds.contains(axis, *candidate))
        }
        ShiftStrategy::Descending { max_shift } => (0..max_shift)
            .map(|shift| sign * magnitude / 10f64.powi(shift as i32))
            .find(|candidate| bounds.contains(axis, *candidate)),
    }
}

/// `"-21.17"` o `"-21,17"` con un solo separador
fn parse_plain_decimal(value: &str) -> Option<f64> {
    let separators = value.chars().filter(|c| *c == '.' || *c == ',').count();
    if separators > 1 {
        return None;
    }
    value.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_shifted_latitude() {
        let normalizer = CoordinateNormalizer::default();
        let lat = normalizer.parse("-211768262", Axis::Lat).unwrap();
        assert!(close(lat, -21.1768262));

        let lat = normalizer.parse("-211.768.262", Axis::Lat).unwrap();
        assert!(close(lat, -21.1768262));
    }

    #[test]
    fn test_shifted_longitude() {
        let normalizer = CoordinateNormalizer::default();
        let lng = normalizer.parse("-478.123.456", Axis::Lng).unwrap();
        assert!(close(lng, -47.8123456));
    }

    #[test]
    fn test_well_formed_value_kept() {
        let normalizer = CoordinateNormalizer::default();
        assert!(close(normalizer.parse("-1.2345", Axis::Lat).unwrap(), -1.2345));
        assert!(close(normalizer.parse("-23,5505", Axis::Lat).unwrap(), -23.5505));
    }

    #[test]
    fn test_single_integer_digit_fallback() {
        let normalizer = CoordinateNormalizer::default();
        // 52.345 queda fuera de [-35, 6]; 5.2345 entra
        assert!(close(normalizer.parse("52345", Axis::Lat).unwrap(), 5.2345));
    }

    #[test]
    fn test_rejects_garbage() {
        let normalizer = CoordinateNormalizer::default();
        assert_eq!(normalizer.parse("", Axis::Lat), None);
        assert_eq!(normalizer.parse("   ", Axis::Lat), None);
        assert_eq!(normalizer.parse("abc", Axis::Lat), None);
        assert_eq!(normalizer.parse("0", Axis::Lat), None);
        assert_eq!(normalizer.parse("0.000", Axis::Lng), None);
        // Ningún desplazamiento cabe en la longitud de Brasil
        assert_eq!(normalizer.parse("12345", Axis::Lng), None);
    }

    #[test]
    fn test_results_always_in_range() {
        let normalizer = CoordinateNormalizer::default();
        for raw in ["-211768262", "-9", "-99999999", "123", "-3", "5999", "-350001"] {
            if let Some(lat) = normalizer.parse(raw, Axis::Lat) {
                assert!((-35.0..=6.0).contains(&lat), "{} -> {}", raw, lat);
            }
        }
    }

    #[test]
    fn test_breadcrumb_strategy() {
        let normalizer = CoordinateNormalizer::default();
        let lat = normalizer.parse_breadcrumb("-211.768.362", Axis::Lat).unwrap();
        assert!(close(lat, -21.1768362));
        let lng = normalizer.parse_breadcrumb("-4781234", Axis::Lng).unwrap();
        assert!(close(lng, -47.81234));
    }

    #[test]
    fn test_custom_bounds() {
        let portugal = GeoBounds {
            lat_min: 36.0,
            lat_max: 42.5,
            lng_min: -9.6,
            lng_max: -6.1,
        };
        let normalizer = CoordinateNormalizer::new(portugal);
        assert!(close(normalizer.parse("387223", Axis::Lat).unwrap(), 38.7223));
        assert!(close(normalizer.parse("-91393", Axis::Lng).unwrap(), -9.1393));
    }
}
