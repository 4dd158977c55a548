//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `QUARRY_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CORPUS_LIMIT, DEFAULT_EMBED_TIMEOUT_MS, DEFAULT_EMBEDDING_DIM,
    DEFAULT_GENERATE_TIMEOUT_MS, DEFAULT_STORE_TIMEOUT_MS, DEFAULT_SUMMARY_CONCURRENCY,
    DEFAULT_TOP_M,
};

/// Default Qdrant URL used when `QUARRY_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default chat model for category summaries.
pub const DEFAULT_GENERATOR_MODEL: &str = "gemma3:1b";

/// Per-collaborator call deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTimeouts {
    pub embed: Duration,
    pub store: Duration,
    pub generate: Duration,
}

impl Default for CallTimeouts {
    fn default() -> Self {
        Self {
            embed: Duration::from_millis(DEFAULT_EMBED_TIMEOUT_MS),
            store: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            generate: Duration::from_millis(DEFAULT_GENERATE_TIMEOUT_MS),
        }
    }
}

/// Service and ingest configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `QUARRY_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `3001`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Qdrant endpoint URL. `mock:` URLs select the in-memory store.
    pub qdrant_url: String,

    pub qdrant_api_key: Option<String>,

    /// BGE model directory. `None` runs the stub embedder.
    pub model_path: Option<PathBuf>,

    /// Vector dimensionality of every namespace. Default: `384`.
    pub embedding_dim: usize,

    /// Chat model used for summaries. Default: `gemma3:1b`.
    pub generator_model: String,

    /// Answer generation requests offline instead of calling a model.
    pub mock_generator: bool,

    /// Concurrent summary requests. Default: `4`.
    pub summary_concurrency: usize,

    /// Documents kept per category. Default: `20`.
    pub top_m: usize,

    /// Documents selected from the corpus (anchors included). Default: `200`.
    pub corpus_limit: usize,

    /// QASPER-style corpus JSON.
    pub corpus_path: PathBuf,

    /// Anchor list JSON (`[{category, document_id}]`).
    pub anchors_path: PathBuf,

    /// Where the clustered dataset is written.
    pub output_path: PathBuf,

    pub timeouts: CallTimeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3001,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            qdrant_api_key: None,
            model_path: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            generator_model: DEFAULT_GENERATOR_MODEL.to_string(),
            mock_generator: false,
            summary_concurrency: DEFAULT_SUMMARY_CONCURRENCY,
            top_m: DEFAULT_TOP_M,
            corpus_limit: DEFAULT_CORPUS_LIMIT,
            corpus_path: PathBuf::from("./data/qasper.json"),
            anchors_path: PathBuf::from("./data/anchors.json"),
            output_path: PathBuf::from("./clustered_dataset.json"),
            timeouts: CallTimeouts::default(),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "QUARRY_PORT";
    const ENV_BIND_ADDR: &'static str = "QUARRY_BIND_ADDR";
    const ENV_QDRANT_URL: &'static str = "QUARRY_QDRANT_URL";
    const ENV_QDRANT_API_KEY: &'static str = "QUARRY_QDRANT_API_KEY";
    const ENV_MODEL_PATH: &'static str = "QUARRY_MODEL_PATH";
    const ENV_EMBEDDING_DIM: &'static str = "QUARRY_EMBEDDING_DIM";
    const ENV_GENERATOR_MODEL: &'static str = "QUARRY_GENERATOR_MODEL";
    const ENV_MOCK_GENERATOR: &'static str = "QUARRY_MOCK_GENERATOR";
    const ENV_SUMMARY_CONCURRENCY: &'static str = "QUARRY_SUMMARY_CONCURRENCY";
    const ENV_TOP_M: &'static str = "QUARRY_TOP_M";
    const ENV_CORPUS_LIMIT: &'static str = "QUARRY_CORPUS_LIMIT";
    const ENV_CORPUS_PATH: &'static str = "QUARRY_CORPUS_PATH";
    const ENV_ANCHORS_PATH: &'static str = "QUARRY_ANCHORS_PATH";
    const ENV_OUTPUT_PATH: &'static str = "QUARRY_OUTPUT_PATH";
    const ENV_EMBED_TIMEOUT_MS: &'static str = "QUARRY_EMBED_TIMEOUT_MS";
    const ENV_STORE_TIMEOUT_MS: &'static str = "QUARRY_STORE_TIMEOUT_MS";
    const ENV_GENERATE_TIMEOUT_MS: &'static str = "QUARRY_GENERATE_TIMEOUT_MS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let timeouts = CallTimeouts {
            embed: Self::parse_millis_from_env(Self::ENV_EMBED_TIMEOUT_MS, defaults.timeouts.embed)?,
            store: Self::parse_millis_from_env(Self::ENV_STORE_TIMEOUT_MS, defaults.timeouts.store)?,
            generate: Self::parse_millis_from_env(
                Self::ENV_GENERATE_TIMEOUT_MS,
                defaults.timeouts.generate,
            )?,
        };

        Ok(Self {
            port: Self::parse_port_from_env(defaults.port)?,
            bind_addr: Self::parse_bind_addr_from_env(defaults.bind_addr)?,
            qdrant_url: Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url),
            qdrant_api_key: Self::parse_optional_string_from_env(Self::ENV_QDRANT_API_KEY),
            model_path: Self::parse_optional_string_from_env(Self::ENV_MODEL_PATH)
                .map(PathBuf::from),
            embedding_dim: Self::parse_positive_from_env(
                Self::ENV_EMBEDDING_DIM,
                defaults.embedding_dim,
            )?,
            generator_model: Self::parse_string_from_env(
                Self::ENV_GENERATOR_MODEL,
                defaults.generator_model,
            ),
            mock_generator: Self::parse_flag_from_env(Self::ENV_MOCK_GENERATOR),
            summary_concurrency: Self::parse_positive_from_env(
                Self::ENV_SUMMARY_CONCURRENCY,
                defaults.summary_concurrency,
            )?,
            top_m: Self::parse_positive_from_env(Self::ENV_TOP_M, defaults.top_m)?,
            corpus_limit: Self::parse_positive_from_env(
                Self::ENV_CORPUS_LIMIT,
                defaults.corpus_limit,
            )?,
            corpus_path: Self::parse_path_from_env(Self::ENV_CORPUS_PATH, defaults.corpus_path),
            anchors_path: Self::parse_path_from_env(Self::ENV_ANCHORS_PATH, defaults.anchors_path),
            output_path: Self::parse_path_from_env(Self::ENV_OUTPUT_PATH, defaults.output_path),
            timeouts,
        })
    }

    /// Validates paths that must exist for the server to start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }
        Ok(())
    }

    /// Ingest additionally needs readable corpus and anchor files.
    pub fn validate_ingest(&self) -> Result<(), ConfigError> {
        self.validate()?;
        for path in [&self.corpus_path, &self.anchors_path] {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }
        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        match self.bind_addr {
            IpAddr::V4(addr) => format!("{}:{}", addr, self.port),
            IpAddr::V6(addr) => format!("[{}]:{}", addr, self.port),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        Self::parse_optional_string_from_env(var_name)
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_flag_from_env(var_name: &str) -> bool {
        Self::parse_optional_string_from_env(var_name)
            .is_some_and(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
    }

    fn parse_positive_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        let Some(value) = Self::parse_optional_string_from_env(var_name) else {
            return Ok(default);
        };
        match value.parse::<usize>() {
            Ok(0) => Err(ConfigError::InvalidNumber {
                name: var_name,
                value,
                reason: "must be greater than zero".to_string(),
            }),
            Ok(n) => Ok(n),
            Err(e) => Err(ConfigError::InvalidNumber {
                name: var_name,
                value,
                reason: e.to_string(),
            }),
        }
    }

    fn parse_millis_from_env(var_name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        let default_ms = default.as_millis() as usize;
        Self::parse_positive_from_env(var_name, default_ms).map(|ms| Duration::from_millis(ms as u64))
    }
}
