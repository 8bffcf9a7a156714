use ddf_world::error::DdfError;
use polars::error::PolarsError;

#[derive(thiserror::Error, Debug)]
pub enum DdfCliError {
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("ddf error: {0}")]
    DdfError(#[from] DdfError),
}

pub type DdfCliResult<T> = Result<T, DdfCliError>;
