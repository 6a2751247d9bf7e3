//! Client for the dummy links GraphQL API.
//!
//! The [`Transport`] sends GraphQL documents, [`query`] describes the operations and decodes their
//! responses, and the [`loader`] and [`QueryCache`] track the resolution of queries that were issued
//! ahead of the code that reads them.

mod cache;
pub mod loader;
pub mod query;
mod response_types;
mod transport;

pub use cache::QueryCache;
pub use loader::{fetch_on_mount, preload, LoadState, PreloadHandle};
pub use query::{DummyLinksQuery, Query};
pub use response_types::{DummyLinksResponse, GraphQlError, GraphQlResponse, Link, User};
pub use transport::{
    GraphQlRequest, HttpTransport, Transport, Variables, GITHUB_URL, LOCAL_URL,
};

/// Errors that can occur using the API client.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error occurred while making a request.
    #[error("Reqwest error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The client is unauthorized.
    #[error("Unauthorized - is your GraphQL auth token correct?")]
    Unauthorized,
    /// The server answered with a non-success status.
    #[error("Server responded with {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    /// The response body was not the JSON we expected.
    #[error("Malformed response: {0}")]
    Parse(#[from] serde_json::Error),
    /// The server returned GraphQL errors and no data.
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    /// The response had neither data nor errors.
    #[error("Response contained no data")]
    MissingData,
    /// The task running the query went away before it finished.
    #[error("Query was dropped before completing")]
    Cancelled,
}
