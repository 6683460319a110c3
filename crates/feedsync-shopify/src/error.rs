use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {store} (retry after {retry_after_secs}s)")]
    RateLimited {
        store: String,
        retry_after_secs: u64,
    },

    #[error("query cost throttled by {store}: {message}")]
    Throttled { store: String, message: String },

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("GraphQL errors in {context}: {messages}")]
    Graphql { context: String, messages: String },

    #[error("pagination limit reached for {store}: exceeded {max_pages} pages")]
    PaginationLimit { store: String, max_pages: usize },

    #[error("invalid store \"{store}\": {reason}")]
    InvalidStoreUrl { store: String, reason: String },
}
