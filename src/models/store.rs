use serde::{Deserialize, Serialize};

use super::coordinates::Coordinates;

/// Loja del cadastro de locais
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreLocation {
    pub code: String,
    pub name: String,
    /// Bandeira (rede) de la loja
    pub brand: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StoreLocation {
    /// Coordenadas del cadastro, si son utilizables
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }
}
