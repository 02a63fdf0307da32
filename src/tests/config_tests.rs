use crate::config::{Config, ConfigError, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::error::ChatError;
use std::collections::HashMap;
use std::time::Duration;

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let err = config_from(&[("OPENAI_MODEL", "gpt-4o")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()));
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: OPENAI_API_KEY"
        );
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        assert!(matches!(
            config_from(&[("OPENAI_API_KEY", "   ")]),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-test")]).unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 0);
        assert_eq!(
            config.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
            ("OPENAI_MODEL", "llama-3"),
            ("OPENAI_TIMEOUT_SECS", "5"),
            ("OPENAI_MAX_RETRIES", "2"),
        ])
        .unwrap();

        assert_eq!(config.completions_url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(config.model, "llama-3");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.with_model("gpt-4o").model, "gpt-4o");
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = config_from(&[("OPENAI_API_KEY", "sk-test"), ("OPENAI_TIMEOUT_SECS", "soon")])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue("OPENAI_TIMEOUT_SECS".to_string(), "soon".to_string())
        );
    }

    #[test]
    fn test_config_error_converts_into_chat_error() {
        let err: ChatError = ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()).into();
        assert!(matches!(err, ChatError::Config(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retry_classification() {
        let api = |status| ChatError::Api {
            status,
            message: String::new(),
        };
        assert!(api(429).is_retryable());
        assert!(api(500).is_retryable());
        assert!(api(503).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(!api(401).is_retryable());
        assert!(!ChatError::MalformedResponse("x".to_string()).is_retryable());
        assert!(!ChatError::SchemaViolation("x".to_string()).is_retryable());
    }
}
