use thiserror::Error;

/// Errors returned by the commerce platform client.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Client credentials were not configured.
    #[error("missing commerce credential: {0}")]
    MissingCredentials(&'static str),

    /// The token endpoint rejected the credentials or returned an unusable token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The API answered 401 to a request carrying our bearer token.
    #[error("bearer token rejected for {resource}")]
    Unauthorized { resource: String },

    /// The API answered 404 for a single-resource lookup.
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached for {resource}: exceeded {max_pages} pages")]
    PaginationLimit { resource: String, max_pages: usize },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
