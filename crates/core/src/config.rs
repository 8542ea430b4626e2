use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub search: SearchConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Number of user/assistant exchanges kept in the rolling chat window.
    pub history_window: usize,
    /// Upper bound on LLM round-trips per incoming message.
    pub max_steps: usize,
}

#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Base URL of the property source HTTP endpoint.
    pub source_base_url: String,
    pub timeout_secs: u64,
    /// Radius in miles applied when a search does not specify one.
    pub default_radius: f64,
    /// Listings rendered into one digest, at most.
    pub max_results: usize,
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub enabled: bool,
    pub data_dir: PathBuf,
    pub filename: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub source_base_url: Option<String>,
    pub max_results: Option<usize>,
    pub export_enabled: Option<bool>,
    pub export_filename: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: None,
                base_url: Some("http://localhost:11434/v1".to_string()),
                model: "llama3.1".to_string(),
                timeout_secs: 30,
                max_retries: 2,
            },
            agent: AgentConfig { history_window: 5, max_steps: 4 },
            search: SearchConfig {
                source_base_url: "http://localhost:8901".to_string(),
                timeout_secs: 60,
                default_radius: 5.0,
                max_results: 5,
            },
            export: ExportConfig {
                enabled: false,
                data_dir: PathBuf::from("./data"),
                filename: "listings.csv".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|anthropic|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    /// Load configuration in precedence order: defaults, then an optional
    /// `homescout.toml`, then `HOMESCOUT_*` environment variables, then
    /// programmatic overrides. Validated before being returned.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("homescout.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
            if let Some(max_retries) = llm.max_retries {
                self.llm.max_retries = max_retries;
            }
        }

        if let Some(agent) = patch.agent {
            if let Some(history_window) = agent.history_window {
                self.agent.history_window = history_window;
            }
            if let Some(max_steps) = agent.max_steps {
                self.agent.max_steps = max_steps;
            }
        }

        if let Some(search) = patch.search {
            if let Some(source_base_url) = search.source_base_url {
                self.search.source_base_url = source_base_url;
            }
            if let Some(timeout_secs) = search.timeout_secs {
                self.search.timeout_secs = timeout_secs;
            }
            if let Some(default_radius) = search.default_radius {
                self.search.default_radius = default_radius;
            }
            if let Some(max_results) = search.max_results {
                self.search.max_results = max_results;
            }
        }

        if let Some(export) = patch.export {
            if let Some(enabled) = export.enabled {
                self.export.enabled = enabled;
            }
            if let Some(data_dir) = export.data_dir {
                self.export.data_dir = data_dir;
            }
            if let Some(filename) = export.filename {
                self.export.filename = filename;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("HOMESCOUT_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("HOMESCOUT_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("HOMESCOUT_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("HOMESCOUT_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("HOMESCOUT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("HOMESCOUT_LLM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("HOMESCOUT_LLM_MAX_RETRIES") {
            self.llm.max_retries = parse_u32("HOMESCOUT_LLM_MAX_RETRIES", &value)?;
        }

        if let Some(value) = read_env("HOMESCOUT_AGENT_HISTORY_WINDOW") {
            self.agent.history_window = parse_usize("HOMESCOUT_AGENT_HISTORY_WINDOW", &value)?;
        }
        if let Some(value) = read_env("HOMESCOUT_AGENT_MAX_STEPS") {
            self.agent.max_steps = parse_usize("HOMESCOUT_AGENT_MAX_STEPS", &value)?;
        }

        if let Some(value) = read_env("HOMESCOUT_SEARCH_SOURCE_BASE_URL") {
            self.search.source_base_url = value;
        }
        if let Some(value) = read_env("HOMESCOUT_SEARCH_TIMEOUT_SECS") {
            self.search.timeout_secs = parse_u64("HOMESCOUT_SEARCH_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("HOMESCOUT_SEARCH_DEFAULT_RADIUS") {
            self.search.default_radius = parse_f64("HOMESCOUT_SEARCH_DEFAULT_RADIUS", &value)?;
        }
        if let Some(value) = read_env("HOMESCOUT_SEARCH_MAX_RESULTS") {
            self.search.max_results = parse_usize("HOMESCOUT_SEARCH_MAX_RESULTS", &value)?;
        }

        if let Some(value) = read_env("HOMESCOUT_EXPORT_ENABLED") {
            self.export.enabled = parse_bool("HOMESCOUT_EXPORT_ENABLED", &value)?;
        }
        if let Some(value) = read_env("HOMESCOUT_EXPORT_DATA_DIR") {
            self.export.data_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("HOMESCOUT_EXPORT_FILENAME") {
            self.export.filename = value;
        }

        let log_level =
            read_env("HOMESCOUT_LOGGING_LEVEL").or_else(|| read_env("HOMESCOUT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("HOMESCOUT_LOGGING_FORMAT").or_else(|| read_env("HOMESCOUT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(source_base_url) = overrides.source_base_url {
            self.search.source_base_url = source_base_url;
        }
        if let Some(max_results) = overrides.max_results {
            self.search.max_results = max_results;
        }
        if let Some(enabled) = overrides.export_enabled {
            self.export.enabled = enabled;
        }
        if let Some(filename) = overrides.export_filename {
            self.export.filename = filename;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_llm(&self.llm)?;
        validate_agent(&self.agent)?;
        validate_search(&self.search)?;
        validate_export(&self.export)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("homescout.toml"), PathBuf::from("config/homescout.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    match llm.provider {
        LlmProvider::OpenAi | LlmProvider::Anthropic => {
            let missing = llm
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for openai/anthropic providers".to_string(),
                ));
            }
        }
        LlmProvider::Ollama => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for ollama provider".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_agent(agent: &AgentConfig) -> Result<(), ConfigError> {
    if agent.history_window == 0 || agent.history_window > 50 {
        return Err(ConfigError::Validation(
            "agent.history_window must be in range 1..=50".to_string(),
        ));
    }
    if agent.max_steps == 0 || agent.max_steps > 16 {
        return Err(ConfigError::Validation("agent.max_steps must be in range 1..=16".to_string()));
    }
    Ok(())
}

fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    let url = search.source_base_url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "search.source_base_url must start with http:// or https://".to_string(),
        ));
    }

    if search.timeout_secs == 0 || search.timeout_secs > 600 {
        return Err(ConfigError::Validation(
            "search.timeout_secs must be in range 1..=600".to_string(),
        ));
    }

    if !search.default_radius.is_finite() || search.default_radius <= 0.0 {
        return Err(ConfigError::Validation(
            "search.default_radius must be a positive number of miles".to_string(),
        ));
    }

    if search.max_results == 0 || search.max_results > 50 {
        return Err(ConfigError::Validation(
            "search.max_results must be in range 1..=50".to_string(),
        ));
    }

    Ok(())
}

fn validate_export(export: &ExportConfig) -> Result<(), ConfigError> {
    let filename = export.filename.trim();
    if filename.is_empty() {
        return Err(ConfigError::Validation("export.filename must not be empty".to_string()));
    }
    if filename.contains('/') || filename.contains('\\') {
        return Err(ConfigError::Validation(
            "export.filename must be a bare file name, not a path".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    agent: Option<AgentPatch>,
    search: Option<SearchPatch>,
    export: Option<ExportPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct AgentPatch {
    history_window: Option<usize>,
    max_steps: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    source_base_url: Option<String>,
    timeout_secs: Option<u64>,
    default_radius: Option<f64>,
    max_results: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportPatch {
    enabled: Option<bool>,
    data_dir: Option<PathBuf>,
    filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
