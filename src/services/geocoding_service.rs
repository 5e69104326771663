//! Geocodificación de direcciones
//!
//! `Geocoder` es el contrato que usa el pipeline. `MapboxGeocoder` lo
//! implementa con la API de forward geocoding v6 de Mapbox.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::config::GeocodingConfig;
use crate::models::Coordinates;
use crate::utils::errors::{AppError, AppResult};

const MAPBOX_FORWARD_URL: &str = "https://api.mapbox.com/search/geocode/v6/forward";

/// Geocodificador asíncrono y de mejor esfuerzo.
///
/// `Ok(None)` significa "sin resultados"; `Err` es un fallo de red o de la
/// API. Ninguno de los dos debe abortar una pasada completa.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> AppResult<Option<Coordinates>>;
}

#[derive(Debug, Deserialize)]
struct MapboxGeocodingResponse {
    features: Vec<MapboxFeature>,
}

#[derive(Debug, Deserialize)]
struct MapboxFeature {
    geometry: MapboxGeometry,
    properties: Option<MapboxProperties>,
}

#[derive(Debug, Deserialize)]
struct MapboxGeometry {
    coordinates: Vec<f64>, // [longitude, latitude]
}

#[derive(Debug, Deserialize)]
struct MapboxProperties {
    full_address: Option<String>,
    name: Option<String>,
}

/// Extrae las coordenadas de la primera feature de una respuesta de Mapbox
pub fn parse_mapbox_response(body: &str) -> Result<Option<Coordinates>> {
    let response: MapboxGeocodingResponse =
        serde_json::from_str(body).map_err(|e| anyhow!("Failed to parse geocoding response: {}", e))?;

    let Some(feature) = response.features.first() else {
        return Ok(None);
    };
    if feature.geometry.coordinates.len() < 2 {
        return Ok(None);
    }

    let longitude = feature.geometry.coordinates[0];
    let latitude = feature.geometry.coordinates[1];
    if let Some(props) = &feature.properties {
        debug!(
            "📍 Feature: {}",
            props.full_address.as_deref().or(props.name.as_deref()).unwrap_or("-")
        );
    }

    Ok(Coordinates::from_parts(Some(latitude), Some(longitude)))
}

pub struct MapboxGeocoder {
    mapbox_token: String,
    country: String,
    client: reqwest::Client,
}

impl MapboxGeocoder {
    pub fn new(mapbox_token: String, country: String, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::ExternalApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            mapbox_token,
            country,
            client,
        })
    }

    /// `None` cuando no hay token configurado
    pub fn from_config(config: &GeocodingConfig) -> AppResult<Option<Self>> {
        match config.mapbox_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(Some(Self::new(
                token.to_string(),
                config.country.clone(),
                Duration::from_secs(config.timeout_secs),
            )?)),
            _ => {
                warn!("⚠️ MAPBOX_TOKEN no configurado, geocodificación deshabilitada");
                Ok(None)
            }
        }
    }

    fn request_url(&self, address: &str) -> String {
        format!(
            "{}?q={}&access_token={}&country={}&limit=1",
            MAPBOX_FORWARD_URL,
            urlencoding::encode(address),
            self.mapbox_token,
            urlencoding::encode(&self.country)
        )
    }

    pub async fn geocode_address(&self, address: &str) -> Result<Option<Coordinates>> {
        info!("🗺️ Geocoding address: {}", address);

        let response = self
            .client
            .get(self.request_url(address))
            .header("User-Agent", "VisitAuditor/1.0")
            .send()
            .await?;

        let status = response.status();
        debug!("📡 Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("❌ Geocoding failed with status {}: {}", status, error_text);
            return Err(anyhow!("Geocoding failed: {}", status));
        }

        let body = response.text().await?;
        let coordinates = parse_mapbox_response(&body)?;
        match coordinates {
            Some(c) => info!("✅ Geocoding successful: {} -> ({}, {})", address, c.lat, c.lng),
            None => warn!("⚠️ No coordinates found for address: {}", address),
        }
        Ok(coordinates)
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn geocode(&self, address: &str) -> AppResult<Option<Coordinates>> {
        Ok(self.geocode_address(address).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_feature() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [-46.6333, -23.5505]},
                 "properties": {"full_address": "Praça da Sé, São Paulo"}},
                {"type": "Feature",
                 "geometry": {"type": "Point", "coordinates": [-43.1729, -22.9068]},
                 "properties": {}}
            ]
        }"#;
        let coords = parse_mapbox_response(body).unwrap().unwrap();
        assert_eq!(coords, Coordinates::new(-23.5505, -46.6333));
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert!(parse_mapbox_response(r#"{"features": []}"#).unwrap().is_none());
        assert!(parse_mapbox_response("not json").is_err());
    }

    #[test]
    fn test_request_url_encodes_address() {
        let geocoder = MapboxGeocoder::new("tok".to_string(), "br".to_string(), Duration::from_secs(10)).unwrap();
        let url = geocoder.request_url("Rua A, 10 - São Paulo");
        assert!(url.starts_with(MAPBOX_FORWARD_URL));
        assert!(url.contains("q=Rua%20A%2C%2010%20-%20S%C3%A3o%20Paulo"));
        assert!(url.contains("country=br&limit=1"));
    }

    #[test]
    fn test_from_config_without_token() {
        let config = GeocodingConfig::default();
        assert!(MapboxGeocoder::from_config(&config).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mapbox_geocoder_live() {
        // Requiere un token válido de Mapbox
        let token = std::env::var("MAPBOX_TOKEN").unwrap_or_default();
        if token.is_empty() {
            println!("⚠️ Skipping test: MAPBOX_TOKEN not set");
            return;
        }

        let geocoder = MapboxGeocoder::new(token, "br".to_string(), Duration::from_secs(10)).unwrap();
        match geocoder.geocode("Avenida Paulista, 1000, São Paulo").await {
            Ok(result) => println!("✅ Geocoding result: {:?}", result),
            Err(e) => println!("❌ Geocoding error: {}", e),
        }
    }
}
