use serde::{Deserialize, Serialize};

use super::coordinates::Coordinates;

/// Base (casa) de un consultor, usada sólo para detectar viajes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultantHome {
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ConsultantHome {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }
}
