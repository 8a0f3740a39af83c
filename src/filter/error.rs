use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid granularity '{0}', expected 'daily' or 'monthly'")]
    InvalidGranularity(String),

    #[error("Invalid operator data: {0}")]
    InvalidOperatorData(String),

    #[error("Unable to encode query plan: {0}")]
    Encoding(String),
}

impl FilterError {
    /// Short title used as the `message` of a field-level error
    pub fn title(&self) -> &'static str {
        match self {
            FilterError::InvalidGranularity(_) => "Wrong Granularity",
            FilterError::InvalidOperatorData(_) => "Malformed Parameter",
            FilterError::Encoding(_) => "Internal Error",
        }
    }
}
