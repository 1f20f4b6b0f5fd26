use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("unable to build the request: {0}")]
    BuildError(String),
    #[error("the request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("the request failed with status code {status}: {body}")]
    RequestError {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("the response body could not be read: {0}")]
    ResponseBodyError(#[source] reqwest::Error),
    #[error("the API reported an error: {0}")]
    ApiError(String),
    #[error("unable to parse the response body: {0}")]
    ParseError(#[from] serde_json::Error),
    /// The body parsed as JSON but lacks a structure needed to produce any result.
    /// Together with `ParseError` this covers every unusable response.
    #[error("the response is missing `{0}`")]
    MissingField(&'static str),
    #[error("the search was cancelled")]
    Cancelled,
}

impl SearchError {
    /// Whether the search ended because cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid API root `{0}`")]
    InvalidApiRoot(String),
    #[error("the access token is missing")]
    MissingAccessToken,
    #[error("the user agent is missing")]
    MissingUserAgent,
    #[error("incomplete configuration: {0}")]
    Incomplete(String),
}
