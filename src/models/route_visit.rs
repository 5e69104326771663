use serde::{Deserialize, Serialize};

/// Visita planificada/realizada exportada del sistema de roteiros (Umovme)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteVisit {
    pub original_date: String,
    /// Fecha planificada `DD/MM/YYYY`
    pub planned_date: String,
    pub consultant: Option<String>,
    /// Etiqueta de la loja, normalmente `"123 - Nombre"`
    pub store_label: Option<String>,
    /// Código explícito de la loja, cuando la exportación lo trae
    pub store_code: Option<String>,
    pub address: Option<String>,
    /// Check-in realizado `HH:MM`
    pub actual_check_in: Option<String>,
    /// Check-in previsto `HH:MM`
    pub predicted_check_in: Option<String>,
    /// Valor crudo del check-in realizado
    pub check_in_original: Option<String>,
}
