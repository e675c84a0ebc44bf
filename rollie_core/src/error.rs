use thiserror::Error;

/// Rejections surfaced by `ScaleObserver::update`.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ObserverError {
    #[error("invalid sample: {0} g is not a finite weight")]
    InvalidSample(f32),
}

#[derive(Debug, Error, Clone)]
pub enum RollieError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    #[error("invalid state: {0}")]
    State(String),
    #[error(transparent)]
    Observer(#[from] ObserverError),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing weight source")]
    MissingScale,
    #[error("missing tag link")]
    MissingTagLink,
    #[error("missing display")]
    MissingDisplay,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
