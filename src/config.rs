use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Reads `PORT`, `AQUAFLOW_DATA_DIR` and the `AQUAFLOW_LLM_*` variables.
    /// Anything missing or unparsable falls back to its default.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_dir = env::var("AQUAFLOW_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let defaults = LlmConfig::default();
        let llm = LlmConfig {
            api_key: env::var("AQUAFLOW_LLM_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            model: env::var("AQUAFLOW_LLM_MODEL").unwrap_or(defaults.model),
            base_url: env::var("AQUAFLOW_LLM_BASE_URL").unwrap_or(defaults.base_url),
            timeout: env::var("AQUAFLOW_LLM_TIMEOUT_SECS")
                .ok()
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        Self {
            port,
            data_dir,
            llm,
        }
    }
}
