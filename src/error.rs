#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// Category key with no entry in the palette while colors are strict.
    #[error("no color configured for usage category `{category}`")]
    UnknownCategoryColor { category: String },

    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ChartError>;
