use anyhow::{anyhow, Context, Result};

pub const SERVER_URL_VAR: &str = "SERVER_URL";
pub const MAX_CONCURRENT_TABLES_VAR: &str = "MAX_CONCURRENT_TABLES";

/// Process-level configuration, resolved once at startup and passed to the syncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Base URL of the JSON API with trailing slashes removed.
    pub base_url: String,
    /// Upper bound on tables fetched at once. `None` fans out to every table.
    pub max_concurrency: Option<usize>,
}

impl ServerConfig {
    /// Read `SERVER_URL` and `MAX_CONCURRENT_TABLES` from the environment.
    pub fn from_env() -> Result<Self> {
        let server_url = std::env::var(SERVER_URL_VAR).ok();
        let max_concurrency = std::env::var(MAX_CONCURRENT_TABLES_VAR).ok();
        Self::from_values(server_url.as_deref(), max_concurrency.as_deref())
    }

    pub fn from_values(server_url: Option<&str>, max_concurrency: Option<&str>) -> Result<Self> {
        let server_url = server_url.map(str::trim).unwrap_or_default();
        if server_url.is_empty() {
            return Err(anyhow!("{} not set", SERVER_URL_VAR));
        }
        let base_url = server_url.trim_end_matches('/').to_string();

        let max_concurrency = match max_concurrency.map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let n: usize = raw
                    .parse()
                    .with_context(|| format!("invalid {}: {raw}", MAX_CONCURRENT_TABLES_VAR))?;
                (n > 0).then_some(n)
            }
        };

        Ok(Self { base_url, max_concurrency })
    }
}
