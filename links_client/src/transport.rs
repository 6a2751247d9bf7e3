use std::future::Future;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};

use crate::Error;

/// Variables passed alongside a GraphQL document.
pub type Variables = serde_json::Map<String, serde_json::Value>;

/// The GraphQL endpoint of a locally running development server.
pub static LOCAL_URL: &str = "http://localhost:8080/query";

/// See <https://docs.github.com/en/graphql> for the API documentation.
pub static GITHUB_URL: &str = "https://api.github.com/graphql";

/// GitHub rejects requests without a user agent.
static USER_AGENT_VALUE: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The body of a GraphQL request.
#[derive(serde::Serialize, Debug)]
pub struct GraphQlRequest<'a> {
    /// The GraphQL document.
    pub query: &'a str,
    /// The variables referenced by the document.
    pub variables: &'a Variables,
}

/// Something that can send a GraphQL document and hand back the JSON it gets in return.
pub trait Transport {
    /// Send a query.
    ///
    /// The status of the response is checked but the body is returned as-is, decoding it is up to
    /// the caller.
    fn send(
        &self,
        query: &str,
        variables: &Variables,
    ) -> impl Future<Output = Result<serde_json::Value, Error>> + Send;
}

/// A transport that POSTs JSON over HTTP.
pub struct HttpTransport {
    /// The URL of the GraphQL endpoint.
    url: String,
    /// The bearer token to send, if any.
    token: Option<String>,
    /// The HTTP client to use.
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the local development server.
    #[must_use]
    pub fn local() -> Self {
        Self::new_with_url(LOCAL_URL.to_string(), None)
    }

    /// Create a transport for GitHub's GraphQL API.
    #[must_use]
    pub fn github(token: String) -> Self {
        Self::new_with_url(GITHUB_URL.to_string(), Some(token))
    }

    /// Create a transport for the given endpoint.
    #[must_use]
    pub fn new_with_url(url: String, token: Option<String>) -> Self {
        Self {
            url,
            token,
            client: reqwest::Client::new(),
        }
    }

    /// The endpoint this transport sends to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    async fn send(&self, query: &str, variables: &Variables) -> Result<serde_json::Value, Error> {
        let url = reqwest::Url::parse(&self.url)?;
        tracing::debug!("Sending {} byte GraphQL document to {}", query.len(), &url);

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE)
            .json(&GraphQlRequest { query, variables });
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("bearer {token}"));
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request to {} failed: {e}", &self.url);
            Error::Transport(e)
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} responded with {status}", &self.url);
            return Err(Error::Status { status, body });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
