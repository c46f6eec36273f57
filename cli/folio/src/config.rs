use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use config::{Config as HierarchicalConfig, Environment, File, FileFormat};
use folio_catalog::{AuthClientConfig, CatalogClientConfig};
use serde::Deserialize;
use tracing::debug;
use url::Url;

const FOLIO_DIR_NAME: &str = "folio";
const FOLIO_CONFIG_FILE: &str = "folio.toml";
const FOLIO_ENV_PREFIX: &str = "FOLIO_";
/// Variables with the prefix that are read directly, not as config keys.
const RESERVED_VARS: [&str; 2] = ["PASSWORD", "USERNAME"];

fn default_connect_timeout_secs() -> u64 {
    folio_catalog::DEFAULT_CONNECT_TIMEOUT.as_secs()
}

fn default_request_timeout_secs() -> u64 {
    folio_catalog::DEFAULT_REQUEST_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// The top-level catalog feed
    pub catalog_url: Option<String>,
    /// Search endpoint used when `folio search` is not given `--base`,
    /// falls back to `catalog_url`
    pub search_url: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Extra headers sent with every catalog request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub auth: Option<AuthConfig>,
}

#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    pub token_url: Url,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
}

impl Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("scope", &self.scope)
            .finish()
    }
}

impl Config {
    /// Read the config from the user config file, `explicit_file` and `FOLIO_*` variables,
    /// later sources taking precedence.
    pub fn parse(explicit_file: Option<&Path>) -> Result<Config> {
        let user_file =
            dirs::config_dir().map(|dir| dir.join(FOLIO_DIR_NAME).join(FOLIO_CONFIG_FILE));
        Self::from_sources(user_file, explicit_file, env::vars())
    }

    fn from_sources(
        user_file: Option<PathBuf>,
        explicit_file: Option<&Path>,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Config> {
        let mut builder = HierarchicalConfig::builder();

        if let Some(user_file) = user_file {
            debug!(path = %user_file.display(), "looking for user config");
            builder = builder.add_source(
                File::from(user_file)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        if let Some(explicit_file) = explicit_file {
            builder = builder.add_source(
                File::from(explicit_file)
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        let folio_vars = vars
            .into_iter()
            .filter_map(|(key, value)| {
                let key = key.strip_prefix(FOLIO_ENV_PREFIX)?;
                (!RESERVED_VARS.contains(&key)).then(|| (key.to_owned(), value))
            })
            .collect::<HashMap<_, _>>();

        let final_config = builder
            .add_source(
                Environment::default()
                    .source(Some(folio_vars))
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Could not read config")?;

        final_config
            .try_deserialize()
            .context("Could not parse config")
    }

    /// The configured catalog URL, required when no URL is given on the command line.
    pub fn catalog_url(&self) -> Result<&str> {
        self.catalog_url.as_deref().ok_or_else(|| {
            anyhow!(
                "No catalog configured. Set 'catalog_url' in {FOLIO_CONFIG_FILE} or {FOLIO_ENV_PREFIX}CATALOG_URL."
            )
        })
    }

    /// The search endpoint, falling back to the catalog URL.
    pub fn search_url(&self) -> Result<&str> {
        match &self.search_url {
            Some(url) => Ok(url),
            None => self.catalog_url(),
        }
    }

    pub fn catalog_client_config(&self, catalog_url: impl Into<String>) -> CatalogClientConfig {
        CatalogClientConfig {
            extra_headers: self.headers.clone(),
            user_agent: self.user_agent.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..CatalogClientConfig::new(catalog_url)
        }
    }

    pub fn auth_client_config(&self) -> Result<AuthClientConfig> {
        let auth = self.auth.as_ref().ok_or_else(|| {
            anyhow!("No token endpoint configured. Add an [auth] section to {FOLIO_CONFIG_FILE}.")
        })?;
        Ok(AuthClientConfig {
            token_url: auth.token_url.clone(),
            client_id: auth.client_id.clone(),
            client_secret: auth.client_secret.clone(),
            scope: auth.scope.clone(),
        })
    }
}
