use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Failed to reach the data provider: {0}")]
    Http(#[from] reqwest::Error),

    #[error("The data provider returned an error ({code}): {description}")]
    Api { code: String, description: String },

    #[error("Invalid data in provider response: {0}")]
    InvalidData(String),
}
