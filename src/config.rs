use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default ingestion connector registered in Data Cloud.
pub const DEFAULT_CONNECTOR_NAME: &str = "mem0";
/// Default data lake object memories are ingested into.
pub const DEFAULT_OBJECT_NAME: &str = "AgentMemory";
/// Default vector index data model object.
pub const DEFAULT_VECTOR_INDEX_NAME: &str = "AgentMemory_index_dlm";
/// Default chunk data model object.
pub const DEFAULT_CHUNK_NAME: &str = "AgentMemory_chunk_dlm";

#[derive(Parser, Debug)]
#[command(name = "dcmem", author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Data Cloud instance URL (e.g. https://<tenant>.c360a.salesforce.com)
    #[arg(long, env = "DATACLOUD_INSTANCE_URL", global = true)]
    pub instance_url: Option<String>,

    /// Data Cloud access token
    #[arg(long, env = "DATACLOUD_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "DATACLOUD_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ingest a single memory
    Insert {
        /// Memory text
        text: String,
        /// Memory id (a UUID is generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Run a vector search against the memory index
    Search {
        /// Query text
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// List the configured collections
    Collections,
    /// Show the configured collection layout
    Info,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub datacloud: DataCloudSettings,
    pub store: StoreSettings,
}

#[derive(Deserialize, Clone)]
pub struct DataCloudSettings {
    pub instance_url: String,
    pub access_token: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for DataCloudSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCloudSettings")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl DataCloudSettings {
    /// Check the settings and return the parsed instance URL.
    pub fn validate(&self) -> crate::Result<Url> {
        if self.instance_url.trim().is_empty() {
            return Err(crate::Error::Config(
                "datacloud.instance_url cannot be empty".to_string(),
            ));
        }
        if self.access_token.trim().is_empty() {
            return Err(crate::Error::Config(
                "datacloud.access_token cannot be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::Config(
                "datacloud.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(Url::parse(self.instance_url.trim())?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Names of the Data Cloud objects backing the memory store.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StoreSettings {
    /// Vector store implementation to use.
    pub provider: String,
    /// Ingestion API connector name.
    pub connector_name: String,
    /// Data lake object receiving ingested memories.
    pub object_name: String,
    /// Vector index DMO searched with `vector_search`.
    pub vector_index_name: String,
    /// Chunk DMO holding the memory text.
    pub chunk_name: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            provider: "datacloud".to_string(),
            connector_name: DEFAULT_CONNECTOR_NAME.to_string(),
            object_name: DEFAULT_OBJECT_NAME.to_string(),
            vector_index_name: DEFAULT_VECTOR_INDEX_NAME.to_string(),
            chunk_name: DEFAULT_CHUNK_NAME.to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(&cli)
    }

    /// Build the configuration from already parsed CLI arguments.
    ///
    /// Priority: CLI flag > CLI env var > `DCMEM_` env var > config file > defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let defaults = StoreSettings::default();

        let mut builder = Config::builder()
            .set_default("datacloud.instance_url", "")?
            .set_default("datacloud.access_token", "")?
            .set_default("datacloud.timeout_secs", 30)?
            .set_default("store.provider", defaults.provider)?
            .set_default("store.connector_name", defaults.connector_name)?
            .set_default("store.object_name", defaults.object_name)?
            .set_default("store.vector_index_name", defaults.vector_index_name)?
            .set_default("store.chunk_name", defaults.chunk_name)?;

        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("dcmem").required(false)),
        };

        // E.g. DCMEM_STORE__OBJECT_NAME=TeamMemory
        builder = builder.add_source(
            Environment::with_prefix("DCMEM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(url) = &cli.instance_url {
            builder = builder.set_override("datacloud.instance_url", url.as_str())?;
        }
        if let Some(token) = &cli.access_token {
            builder = builder.set_override("datacloud.access_token", token.as_str())?;
        }
        if let Some(timeout) = cli.timeout_secs {
            builder = builder.set_override("datacloud.timeout_secs", timeout)?;
        }

        builder.build()?.try_deserialize()
    }
}
