use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Lookup of a price-line item by id or index matched nothing.
    ///
    /// Callers of `update_item`/`remove_item` are internal code that must
    /// know the key exists, so the failure is loud instead of a silent no-op.
    #[error("unable to find price line item `{key}`")]
    UnknownLineItem { key: String },
}
