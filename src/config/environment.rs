//! Configuración de variables de entorno
//!
//! Este módulo maneja los umbrales de la auditoría. Todas las claves son
//! opcionales: si no están definidas se usan los valores por defecto del
//! despliegue en Brasil.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::coordinates::Axis;
use crate::utils::errors::{config_error, AppError, AppResult};
use crate::utils::text::non_blank;

/// Rango válido de latitud/longitud para el país del despliegue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl GeoBounds {
    pub fn brazil() -> Self {
        Self {
            lat_min: -35.0,
            lat_max: 6.0,
            lng_min: -75.0,
            lng_max: -30.0,
        }
    }

    /// Rango `(min, max)` del eje pedido
    pub fn range(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::Lat => (self.lat_min, self.lat_max),
            Axis::Lng => (self.lng_min, self.lng_max),
        }
    }

    pub fn contains(&self, axis: Axis, value: f64) -> bool {
        let (min, max) = self.range(axis);
        value.is_finite() && value >= min && value <= max
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self::brazil()
    }
}

/// Qué hacer cuando uno de los lados del cruce no trae consultor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlankConsultantPolicy {
    /// Ambos nombres deben existir y coincidir
    RequireMatch,
    /// Cruce sólo por fecha cuando falta algún nombre
    DateOnly,
}

impl FromStr for BlankConsultantPolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "require" | "require_match" => Ok(Self::RequireMatch),
            "date_only" | "date" => Ok(Self::DateOnly),
            other => Err(config_error(
                "AUDIT_BLANK_CONSULTANT_POLICY",
                other,
                "'require' or 'date_only'",
            )),
        }
    }
}

/// Umbrales del modo viaje (metros)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelThresholds {
    /// Distancia loja→casa a partir de la cual se considera viaje
    pub away_from_home_m: f64,
    /// Check-in a menos de esta distancia de casa se acepta
    pub near_home_m: f64,
    /// Check-in a más de esta distancia de la loja es error de viaje
    pub near_store_m: f64,
}

impl Default for TravelThresholds {
    fn default() -> Self {
        Self {
            away_from_home_m: 20_000.0,
            near_home_m: 2_000.0,
            near_store_m: 2_000.0,
        }
    }
}

/// Parámetros del servicio de geocodificación
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub mapbox_token: Option<String>,
    pub country: String,
    pub timeout_secs: u64,
    /// 1 = secuencial
    pub concurrency: usize,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            mapbox_token: None,
            country: "br".to_string(),
            timeout_secs: 10,
            concurrency: 1,
        }
    }
}

/// Configuración completa de la auditoría
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    pub bounds: GeoBounds,
    pub distance_tolerance_m: f64,
    pub time_warning_minutes: i64,
    pub time_critical_minutes: i64,
    pub travel: TravelThresholds,
    pub blank_consultant_policy: BlankConsultantPolicy,
    pub checkin_marker: String,
    pub geocoding: GeocodingConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            bounds: GeoBounds::brazil(),
            distance_tolerance_m: 500.0,
            time_warning_minutes: 15,
            time_critical_minutes: 30,
            travel: TravelThresholds::default(),
            blank_consultant_policy: BlankConsultantPolicy::RequireMatch,
            checkin_marker: "Execução de atividade".to_string(),
            geocoding: GeocodingConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Carga `.env` (si existe) y lee las variables `AUDIT_*`
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda
    /// de claves; los valores ausentes usan el default.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bounds = GeoBounds {
            lat_min: parse_or("AUDIT_LAT_MIN", &lookup, defaults.bounds.lat_min)?,
            lat_max: parse_or("AUDIT_LAT_MAX", &lookup, defaults.bounds.lat_max)?,
            lng_min: parse_or("AUDIT_LNG_MIN", &lookup, defaults.bounds.lng_min)?,
            lng_max: parse_or("AUDIT_LNG_MAX", &lookup, defaults.bounds.lng_max)?,
        };

        let config = Self {
            bounds,
            distance_tolerance_m: parse_or(
                "AUDIT_DISTANCE_TOLERANCE_M",
                &lookup,
                defaults.distance_tolerance_m,
            )?,
            time_warning_minutes: parse_or(
                "AUDIT_TIME_WARNING_MIN",
                &lookup,
                defaults.time_warning_minutes,
            )?,
            time_critical_minutes: parse_or(
                "AUDIT_TIME_CRITICAL_MIN",
                &lookup,
                defaults.time_critical_minutes,
            )?,
            travel: TravelThresholds {
                away_from_home_m: parse_or(
                    "AUDIT_TRAVEL_AWAY_FROM_HOME_M",
                    &lookup,
                    defaults.travel.away_from_home_m,
                )?,
                near_home_m: parse_or(
                    "AUDIT_TRAVEL_NEAR_HOME_M",
                    &lookup,
                    defaults.travel.near_home_m,
                )?,
                near_store_m: parse_or(
                    "AUDIT_TRAVEL_NEAR_STORE_M",
                    &lookup,
                    defaults.travel.near_store_m,
                )?,
            },
            blank_consultant_policy: parse_or(
                "AUDIT_BLANK_CONSULTANT_POLICY",
                &lookup,
                defaults.blank_consultant_policy,
            )?,
            checkin_marker: non_blank(lookup("AUDIT_CHECKIN_MARKER").as_deref())
                .unwrap_or(defaults.checkin_marker),
            geocoding: GeocodingConfig {
                mapbox_token: non_blank(lookup("MAPBOX_TOKEN").as_deref()),
                country: non_blank(lookup("AUDIT_GEOCODING_COUNTRY").as_deref())
                    .unwrap_or(defaults.geocoding.country),
                timeout_secs: parse_or(
                    "AUDIT_GEOCODING_TIMEOUT_SECS",
                    &lookup,
                    defaults.geocoding.timeout_secs,
                )?,
                concurrency: parse_or(
                    "AUDIT_GEOCODING_CONCURRENCY",
                    &lookup,
                    defaults.geocoding.concurrency,
                )?,
            },
        };

        config.validate()?;
        debug!("⚙️ Configuración de auditoría cargada: {:?}", config.bounds);
        Ok(config)
    }

    /// Verifica la coherencia de los rangos y umbrales
    pub fn validate(&self) -> AppResult<()> {
        let b = &self.bounds;
        if ![b.lat_min, b.lat_max, b.lng_min, b.lng_max].iter().all(|v| v.is_finite()) {
            return Err(AppError::Config("AUDIT_LAT_*/AUDIT_LNG_* must be finite numbers".to_string()));
        }
        if self.bounds.lat_min >= self.bounds.lat_max {
            return Err(AppError::Config("AUDIT_LAT_MIN must be lower than AUDIT_LAT_MAX".to_string()));
        }
        if self.bounds.lng_min >= self.bounds.lng_max {
            return Err(AppError::Config("AUDIT_LNG_MIN must be lower than AUDIT_LNG_MAX".to_string()));
        }
        positive_distance("AUDIT_DISTANCE_TOLERANCE_M", self.distance_tolerance_m)?;
        positive_distance("AUDIT_TRAVEL_AWAY_FROM_HOME_M", self.travel.away_from_home_m)?;
        positive_distance("AUDIT_TRAVEL_NEAR_HOME_M", self.travel.near_home_m)?;
        positive_distance("AUDIT_TRAVEL_NEAR_STORE_M", self.travel.near_store_m)?;
        if self.time_warning_minutes > self.time_critical_minutes {
            return Err(AppError::Config(
                "AUDIT_TIME_WARNING_MIN must not exceed AUDIT_TIME_CRITICAL_MIN".to_string(),
            ));
        }
        if self.geocoding.concurrency == 0 {
            return Err(AppError::Config("AUDIT_GEOCODING_CONCURRENCY must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// `NaN` e infinitos no pasan: `NaN <= 0.0` es falso
fn positive_distance(key: &str, value: f64) -> AppResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(config_error(key, &value.to_string(), "a positive number of meters"))
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> AppResult<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| config_error(key, raw.trim(), std::any::type_name::<T>())),
        _ => Ok(default),
    }
}
