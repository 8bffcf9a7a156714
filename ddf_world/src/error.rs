//! Error types.

#[derive(thiserror::Error, Debug)]
pub enum DdfError {
    #[error("Wrapped anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
    #[error("Region code not found in region names: {0}")]
    RegionNotFound(String),
    #[error("Indicator not found in metadata: {0}")]
    MetadataNotFound(String),
    #[error("Duplicate concept id in catalogue: {0}")]
    DuplicateConcept(String),
    #[error("Missing column '{column}' in {table}")]
    MissingColumn { table: String, column: String },
    #[error("Geography code '{code}' in '{concept}' has no unified code")]
    UnmappedGeo { concept: String, code: String },
    #[error("Invalid source data: {0}")]
    InvalidSource(String),
    #[error("Wrapped polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
    #[error("Wrapped serde JSON error: {0}")]
    SerdeJSONError(#[from] serde_json::Error),
    #[error("std IO error: {0}")]
    IOError(#[from] std::io::Error),
}

pub type DdfResult<T> = Result<T, DdfError>;
