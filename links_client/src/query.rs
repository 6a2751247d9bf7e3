//! Query descriptors and response decoding.

use crate::{DummyLinksResponse, Error, GraphQlResponse, Transport, Variables};

/// A GraphQL operation known ahead of time.
pub trait Query {
    /// The name of the operation, used to identify it in caches and logs.
    const OPERATION_NAME: &'static str;
    /// The GraphQL document.
    const TEXT: &'static str;
    /// The shape of the `data` field of the response.
    type Response: serde::de::DeserializeOwned + Send + Sync + 'static;
}

/// Fetch every dummy link along with its owner.
pub struct DummyLinksQuery;

impl Query for DummyLinksQuery {
    const OPERATION_NAME: &'static str = "AppDummyLinksQuery";
    const TEXT: &'static str = r#"query AppDummyLinksQuery {
  dummyLinks {
    title
    address
    user {
      name
      id
    }
    id
  }
}
"#;
    type Response = DummyLinksResponse;
}

/// Decode the raw JSON returned by a transport into the query's response type.
///
/// Partial responses with both `data` and `errors` keep the data and log the errors.
pub fn decode<Q: Query>(value: serde_json::Value) -> Result<Q::Response, Error> {
    let response: GraphQlResponse<Q::Response> = serde_json::from_value(value)?;
    for error in &response.errors {
        tracing::warn!("{} reported: {}", Q::OPERATION_NAME, &error.message);
    }
    match response.data {
        Some(data) => Ok(data),
        None if response.errors.is_empty() => Err(Error::MissingData),
        None => Err(Error::GraphQl(
            response.errors.into_iter().map(|e| e.message).collect(),
        )),
    }
}

/// Send a query and decode its response.
pub async fn execute<Q: Query, T: Transport>(
    transport: &T,
    variables: &Variables,
) -> Result<Q::Response, Error> {
    tracing::info!("Executing {}", Q::OPERATION_NAME);
    let value = transport.send(Q::TEXT, variables).await?;
    decode::<Q>(value)
}
