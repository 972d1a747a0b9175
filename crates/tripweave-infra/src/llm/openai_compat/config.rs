//! Configuration for the OpenAI-compatible completion service.

use secrecy::SecretString;

use tripweave_types::config::ProviderConfig;

/// Configuration for an [`super::OpenAiCompatibleService`].
///
/// Any endpoint speaking the chat completions protocol works: OpenAI itself,
/// or a compatible gateway or local server at a different base URL.
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    /// Human-readable provider name used in logs (e.g., "openai").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

/// OpenAI defaults: `https://api.openai.com/v1`, 4096 output tokens.
pub fn openai_defaults(api_key: SecretString, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: "https://api.openai.com/v1".into(),
        api_key,
        model: model.into(),
        temperature: None,
        max_tokens: 4096,
    }
}

/// Configuration from the `[provider]` table of `config.toml`.
///
/// The provider name is "openai" for the default base URL and
/// "openai-compatible" for anything else.
pub fn from_provider_config(provider: &ProviderConfig, api_key: SecretString) -> OpenAiCompatConfig {
    let base_url = provider.base_url.trim_end_matches('/').to_string();
    let provider_name = if base_url == "https://api.openai.com/v1" {
        "openai"
    } else {
        "openai-compatible"
    };
    OpenAiCompatConfig {
        provider_name: provider_name.into(),
        base_url,
        api_key,
        model: provider.model.clone(),
        temperature: provider.temperature,
        max_tokens: provider.max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_defaults() {
        let config = openai_defaults(SecretString::from("sk-test"), "gpt-4.1");
        assert_eq!(config.provider_name, "openai");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.max_tokens, 4096);
    }

    #[test]
    fn test_from_provider_config_custom_base_url() {
        let provider = ProviderConfig {
            base_url: "http://localhost:11434/v1/".into(),
            model: "llama3.1".into(),
            temperature: Some(0.2),
            max_tokens: 2048,
        };
        let config = from_provider_config(&provider, SecretString::from("unused"));
        assert_eq!(config.provider_name, "openai-compatible");
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model, "llama3.1");
        assert_eq!(config.temperature, Some(0.2));
    }

    #[test]
    fn test_from_provider_config_default_is_openai() {
        let config = from_provider_config(&ProviderConfig::default(), SecretString::from("sk"));
        assert_eq!(config.provider_name, "openai");
        assert_eq!(config.model, "gpt-4.1");
    }
}
