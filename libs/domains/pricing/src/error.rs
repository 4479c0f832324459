use thiserror::Error;

/// Result type for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur in the pricing domain
#[derive(Debug, Error)]
pub enum PricingError {
    /// The requested service kind has no cost strategy
    #[error("Unsupported service kind: {0}")]
    UnsupportedServiceKind(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A pricing entry (or its documented default key) is missing from the table
    #[error("Price not found: {0}")]
    NotFound(String),

    /// Pricing table failed to deserialize
    #[error("Failed to parse pricing table: {0}")]
    Parse(#[from] serde_json::Error),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
