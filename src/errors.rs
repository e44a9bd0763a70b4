use gpshow_gp::GpError;
use thiserror::Error;

/// A result type for the showcase runner
pub type Result<T> = std::result::Result<T, ShowError>;

/// An error when configuring or running the showcase
#[derive(Error, Debug)]
pub enum ShowError {
    /// When a GP computation fails
    #[error("Gaussian process computation error: {0}")]
    GpError(#[from] GpError),
    /// When reading configuration or writing series fails
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// When (de)serializing JSON fails
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// When saving npy arrays fails
    #[error("Npy error: {0}")]
    NpyError(#[from] ndarray_npy::WriteNpyError),
    /// When error due to a bad configuration value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
}
