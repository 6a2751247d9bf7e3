/// The user a link belongs to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct User {
    /// The name of the user.
    pub name: String,
    /// The node ID of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A link.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Link {
    /// The title of the link.
    pub title: String,
    /// The target address of the link.
    pub address: String,
    /// The user who owns the link.
    pub user: User,
    /// The node ID of the link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// The data returned by a `dummyLinks` query.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct DummyLinksResponse {
    /// The links in the order the server returned them.
    #[serde(rename = "dummyLinks")]
    pub dummy_links: Vec<Link>,
}

impl DummyLinksResponse {
    /// The title of the first link, `None` if there are no links.
    #[must_use]
    pub fn first_title(&self) -> Option<&str> {
        self.dummy_links.first().map(|link| link.title.as_str())
    }
}

/// An error reported by a GraphQL server.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<serde_json::Value>,
}

/// The envelope every GraphQL response is wrapped in.
#[derive(Debug, serde::Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}
