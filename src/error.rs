use crate::config::ConfigError;
use crate::gviz::GvizError;
use crate::telemetry::TelemetryError;

/// Aggregate error for the binary and other embedders. The extraction
/// functions themselves stay total: data-shape anomalies degrade to empty
/// or zero values, and only structurally invalid input ends up here.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed gviz response: {0}")]
    Gviz(#[from] GvizError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
