//! Centralized error handling for the dashboard.
//!
//! The library surfaces one error enum, [`DashboardError`], so that callers can
//! tell the fatal startup failures apart from the recoverable ones:
//!
//! ```
//! use pokedash::error::DashboardError;
//!
//! fn describe(err: &DashboardError) -> &'static str {
//!     match err {
//!         DashboardError::Load(_) | DashboardError::Io(_) | DashboardError::Polars(_) => "fatal",
//!         DashboardError::InvalidArgument { .. } => "shown in the chart panel",
//!         _ => "other",
//!     }
//! }
//! ```
//!
//! An empty or non-matching selection is never an error; it produces an empty
//! derived view.

use thiserror::Error;

/// Main error type for dashboard operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The dataset file is missing or malformed. Fatal at startup.
    #[error("Failed to load dataset: {0}")]
    Load(String),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors raised by polars while reading or casting columns.
    #[error("Data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// A statistic name that is not one of the dataset's statistic columns.
    #[error("Invalid argument: '{statistic}' is not a statistic column")]
    InvalidArgument { statistic: String },

    /// Binding registration or evaluation contract violated.
    #[error("Binding error: {0}")]
    Binding(String),

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn invalid_statistic(statistic: impl Into<String>) -> Self {
        Self::InvalidArgument {
            statistic: statistic.into(),
        }
    }

    /// Whether the error must abort startup rather than be shown in the UI.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Load(_) | Self::Io(_) | Self::Polars(_))
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
