use serde::{Deserialize, Serialize};

/// Marcación de ponto exportada del sistema de asistencia (Solides)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeClockEntry {
    /// Fecha tal como vino en el CSV
    pub original_date: String,
    /// Fecha normalizada `DD/MM/YYYY`
    pub date: String,
    /// Hora de entrada `HH:MM`
    pub check_in_time: String,
    pub check_out_time: Option<String>,
    /// Dirección registrada en la entrada (la que se geocodifica)
    pub location_address: Option<String>,
    pub street: Option<String>,
    pub store_label: Option<String>,
    pub consultant: Option<String>,
}
