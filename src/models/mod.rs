//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos de la auditoría: entradas de
//! las dos exportaciones, cadastros externos, registros de auditoría y
//! breadcrumbs del histórico de pontos.

pub mod audit;
pub mod consultant;
pub mod coordinates;
pub mod point_history;
pub mod route_visit;
pub mod store;
pub mod time_clock;

pub use audit::{ApprovalKey, AuditRecord, AuditStatus, ManualApprovals};
pub use consultant::ConsultantHome;
pub use coordinates::{Axis, Coordinates};
pub use point_history::{Breadcrumb, DayPointHistory, PointStatus, PointSummary, VisitWindow};
pub use route_visit::RouteVisit;
pub use store::StoreLocation;
pub use time_clock::TimeClockEntry;
