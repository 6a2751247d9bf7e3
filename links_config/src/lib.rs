use anyhow::Context;

/// Environment variables checked for a GitHub token, in order.
static GITHUB_TOKEN_VARIABLES: [&str; 2] = ["GITHUB_AUTH_TOKEN", "REACT_APP_GITHUB_AUTH_TOKEN"];

/// The GraphQL endpoints the tools know about.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// A development server on this machine.
    #[default]
    Local,
    /// GitHub's public GraphQL API, requires a token.
    Github,
}

impl Endpoint {
    /// The default URL of the endpoint.
    #[must_use]
    pub fn default_url(self) -> &'static str {
        match self {
            Self::Local => links_client::LOCAL_URL,
            Self::Github => links_client::GITHUB_URL,
        }
    }
}

/// Configuration for the links tools.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
pub struct Config {
    /// Which endpoint to query.
    #[serde(default)]
    pub endpoint: Option<Endpoint>,
    /// Overrides the endpoint's URL.
    #[serde(default)]
    pub url: Option<String>,
    /// The token to send to GitHub.
    #[serde(default)]
    pub github_token: Option<String>,
}

impl Config {
    /// Get the config using the XDG directories structure.
    pub fn get_or_default() -> anyhow::Result<Self> {
        let Some(project_dirs) = directories::ProjectDirs::from("bot", "bucket", "links") else {
            anyhow::bail!("Could not find project directories");
        };
        Self::load_or_create(project_dirs.config_dir().join("config.json"))
    }

    /// Load the configuration at `path`, writing out the defaults if there isn't one yet.
    pub fn load_or_create<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Creating config directory")?;
        }
        let config = Self::default();
        config.save(path).context("Writing default config")?;
        Ok(config)
    }

    /// Load the configuration from the given path.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path).context("Opening config file for reading")?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader).context("Reading config file")
    }

    /// Save the configuration to the given path.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let file = std::fs::File::create(path).context("Opening config file for writing")?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).context("Writing config file")?;
        Ok(())
    }

    /// Get the GitHub token to use.
    #[must_use]
    pub fn get_github_token(&self) -> Option<String> {
        self.github_token_with(|name| std::env::var(name).ok())
    }

    /// Get the GitHub token, reading environment variables through `var`.
    fn github_token_with<F: Fn(&str) -> Option<String>>(&self, var: F) -> Option<String> {
        self.github_token
            .clone()
            .or_else(|| GITHUB_TOKEN_VARIABLES.iter().find_map(|name| var(*name)))
    }

    /// Get the endpoint to query.
    #[must_use]
    pub fn get_endpoint(&self) -> Endpoint {
        self.endpoint.unwrap_or_default()
    }

    /// Get the URL of the endpoint to query.
    #[must_use]
    pub fn get_url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| self.get_endpoint().default_url().to_string())
    }
}
