/*!
 * Tests for app configuration
 */

use std::time::Duration;

use livetrans::app_config::{Config, TranslationProvider};
use livetrans::{DomainTag, LanguageSelector, OrchestratorSettings};

#[test]
fn test_config_serialization_shouldRoundTrip() {
    let mut config = Config::default();
    config.domain = Some("technical".to_string());
    config.live.retry_count = 2;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.domain_tag().unwrap(), Some(DomainTag::Technical));
    assert_eq!(parsed.live.retry_count, 2);
    assert_eq!(parsed.translation.provider, TranslationProvider::Gemini);
}

#[test]
fn test_config_withEmptyJson_shouldUseDefaults() {
    let config: Config = serde_json::from_str("{}").unwrap();
    assert_eq!(config.source_selector().unwrap(), LanguageSelector::Auto);
    assert_eq!(config.domain_tag().unwrap(), None);
    assert!(config.cache.enabled);
}

#[test]
fn test_config_withInvalidValues_shouldFailValidation() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;

    config.target_language = "xx".to_string();
    assert!(config.validate().is_err());

    config.target_language = "vi".to_string();
    config.domain = Some("astrology".to_string());
    assert!(config.validate().is_err());

    config.domain = Some("daily".to_string());
    assert!(config.validate().is_ok());
    assert_eq!(config.domain_tag().unwrap(), Some(DomainTag::General));

    config.cache.capacity = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_activeProviderConfigMut_withMissingProvider_shouldCreateEntry() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::OpenAI;

    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();

    assert_eq!(config.translation.get_api_key(), "sk-test");
    assert_eq!(config.translation.get_model(), "gpt-4o-mini");
    assert_eq!(config.translation.get_endpoint(), "https://api.openai.com/v1");
}

#[test]
fn test_orchestratorSettings_fromConfig_shouldCopyLimits() {
    let mut config = Config::default();
    config.live.debounce_ms = 250;
    config.live.retry_count = 3;
    config.history.record_live_failures = true;

    let settings = OrchestratorSettings::from_config(&config);

    assert_eq!(settings.debounce, Duration::from_millis(250));
    assert_eq!(settings.request_timeout, Duration::from_secs(30));
    assert_eq!(settings.live_retry_count, 3);
    assert!(settings.record_live_failures);
    assert_eq!(settings.cache_capacity, 100);
}
