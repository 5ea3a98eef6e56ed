use hte_core::HteError;
use std::time::Duration;

/// LLM client configuration, read from the environment variables named in
/// the external-interfaces contract: `OPENAI_API_KEY` (required),
/// `OPENAI_BASE_URL`, `OPENAI_API_MODEL`, `LLM_TIMEOUT`, `LLM_MAX_RETRIES`,
/// `LLM_MAX_CONCURRENT`, `OPENAI_EMBED_MODEL`, `EMBEDDING_DIM`.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub embed_model: String,
    pub embedding_dim: Option<usize>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_concurrent: usize,
}

impl LlmConfig {
    pub fn from_env() -> Result<Self, HteError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| HteError::Config("OPENAI_API_KEY is required".to_string()))?;
        if api_key.trim().is_empty() {
            return Err(HteError::Config("OPENAI_API_KEY must not be empty".to_string()));
        }

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = std::env::var("OPENAI_API_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let embed_model =
            std::env::var("OPENAI_EMBED_MODEL").unwrap_or_else(|_| "text-embedding-3-small".to_string());

        let embedding_dim = match std::env::var("EMBEDDING_DIM") {
            Ok(raw) => Some(
                raw.parse::<usize>()
                    .map_err(|_| HteError::Config(format!("EMBEDDING_DIM is not a valid integer: {raw}")))?,
            ),
            Err(_) => None,
        };

        let timeout_secs = env_parse_or("LLM_TIMEOUT", 300u64)?;
        let max_retries = env_parse_or("LLM_MAX_RETRIES", 3u32)?;
        let max_concurrent = env_parse_or("LLM_MAX_CONCURRENT", 10usize)?;

        Ok(Self {
            api_key,
            base_url,
            model,
            embed_model,
            embedding_dim,
            timeout: Duration::from_secs(timeout_secs),
            max_retries,
            max_concurrent,
        })
    }
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, HteError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|_| HteError::Config(format!("{key} is not a valid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn missing_api_key_is_a_config_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var("OPENAI_API_KEY");
        }
        let err = LlmConfig::from_env().expect_err("should fail without an api key");
        assert!(matches!(err, HteError::Config(_)));
    }

    #[test]
    fn defaults_are_applied_when_optional_vars_absent() {
        let _guard = ENV_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("OPENAI_API_KEY", "sk-test");
            std::env::remove_var("OPENAI_BASE_URL");
            std::env::remove_var("LLM_MAX_CONCURRENT");
        }
        let config = LlmConfig::from_env().expect("should succeed with only the api key set");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.max_concurrent, 10);
        unsafe {
            std::env::remove_var("OPENAI_API_KEY");
        }
    }
}
