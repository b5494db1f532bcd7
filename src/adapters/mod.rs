//! LLM adapters for OpenAI-compatible endpoints and Anthropic.
//!
//! Implement the `LLMProvider` trait to add support for other models.

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicAdapter;
pub use openai::OpenAIAdapter;

use crate::agent::{DummyLLMProvider, LLMProvider};
use crate::config::{AgentSettings, ProviderKind};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Build the provider selected by `settings`.
pub fn provider_from_settings(settings: &AgentSettings) -> Result<Arc<dyn LLMProvider>> {
    match settings.provider {
        ProviderKind::OpenAI => {
            let model = settings
                .model
                .clone()
                .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string());
            let adapter = OpenAIAdapter::new(settings.openai_api_key.clone(), model);
            match (&settings.openai_base_url, &settings.openai_api_key) {
                (Some(base_url), _) => Ok(Arc::new(adapter.with_base_url(base_url.clone()))),
                (None, Some(_)) => Ok(Arc::new(adapter)),
                (None, None) => Err(Error::ConfigError(
                    "OPENAI_API_KEY or OPENAI_BASE_URL must be set".to_string(),
                )),
            }
        }
        ProviderKind::Anthropic => {
            let api_key = settings
                .anthropic_api_key
                .clone()
                .ok_or_else(|| Error::ConfigError("ANTHROPIC_API_KEY not set".to_string()))?;
            let model = settings
                .model
                .clone()
                .unwrap_or_else(|| anthropic::DEFAULT_MODEL.to_string());
            Ok(Arc::new(AnthropicAdapter::new(api_key, model)))
        }
        ProviderKind::Dummy => Ok(Arc::new(DummyLLMProvider)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> AgentSettings {
        AgentSettings::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn test_openai_needs_key_or_base_url() {
        assert!(provider_from_settings(&settings(&[])).is_err());
        assert!(provider_from_settings(&settings(&[("OPENAI_API_KEY", "sk-test")])).is_ok());
        assert!(
            provider_from_settings(&settings(&[("OPENAI_BASE_URL", "http://localhost:11434")]))
                .is_ok()
        );
    }

    #[test]
    fn test_anthropic_needs_key() {
        assert!(provider_from_settings(&settings(&[("LLM_PROVIDER", "anthropic")])).is_err());
        assert!(provider_from_settings(&settings(&[
            ("LLM_PROVIDER", "anthropic"),
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
        ]))
        .is_ok());
    }

    #[test]
    fn test_dummy_provider() {
        assert!(provider_from_settings(&settings(&[("LLM_PROVIDER", "dummy")])).is_ok());
    }
}
