use thiserror::Error;

/// Errors returned while downloading or parsing the supplier feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed host answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The feed URL could not be parsed.
    #[error("invalid feed URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The body is not well-formed CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("feed is missing required column \"{0}\"")]
    MissingColumn(String),

    /// A cell could not be interpreted.
    #[error("invalid {column} \"{value}\" at line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },
}
