use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid surface size: {width}x{height}")]
    InvalidSurfaceSize { width: f64, height: f64 },
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("observation event loop has shut down")]
    Disconnected,
}
