use shared::error::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid form endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
    #[error("unsupported endpoint scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("invalid selector: {0}")]
    Selector(#[from] dom::SelectorError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
