use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::language_utils::{validate_language_code, LanguageSelector, LanguageTag};
use crate::translation::DomainTag;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language selector: "auto" or an ISO 639-1 code
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO 639-1)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Language assumed when detection finds nothing
    #[serde(default = "default_default_language")]
    pub default_language: String,

    /// Primary locale, the second keyword list checked during detection
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Domain selected by default, none when absent
    #[serde(default)]
    pub domain: Option<String>,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Live typing mode
    #[serde(default)]
    pub live: LiveConfig,

    /// Translation cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// History store
    #[serde(default)]
    pub history: HistoryConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: OpenAI
    OpenAI,
    // @provider: Offline echo backend
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }

    /// Whether the provider needs an API key
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Mock)
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        let (model, endpoint) = match provider_type {
            TranslationProvider::Gemini => (default_gemini_model(), default_gemini_endpoint()),
            TranslationProvider::OpenAI => (default_openai_model(), default_openai_endpoint()),
            TranslationProvider::Mock => (String::new(), String::new()),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
        }
    }
}

/// Live typing mode settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LiveConfig {
    /// Quiet period after the last edit before a request is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Minimum trimmed length, in characters, for a live request
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,

    /// Live results are recorded only when the input is longer than this
    #[serde(default = "default_history_min_chars")]
    pub history_min_chars: usize,

    /// Extra attempts after a transient failure
    #[serde(default)]
    pub retry_count: u32,

    /// Backoff before the first retry, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_chars: default_min_chars(),
            history_min_chars: default_history_min_chars(),
            retry_count: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Translation cache settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            enabled: true,
        }
    }
}

/// History store settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Database file, defaults to the user data directory
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Record failed live translations
    #[serde(default)]
    pub record_live_failures: bool,

    /// Record failed manual translations as "[Error] ..." entries
    #[serde(default = "default_true")]
    pub record_manual_failures: bool,

    /// Number of records listed by default
    #[serde(default = "default_display_limit")]
    pub display_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            record_live_failures: false,
            record_manual_failures: true,
            display_limit: default_display_limit(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "auto".to_string()
}

fn default_target_language() -> String {
    "vi".to_string()
}

fn default_default_language() -> String {
    "en".to_string()
}

fn default_locale() -> String {
    "vi".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.2
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_min_chars() -> usize {
    2
}

fn default_history_min_chars() -> usize {
    5
}

fn default_retry_backoff_ms() -> u64 {
    500 // doubled on each retry
}

fn default_cache_capacity() -> usize {
    100
}

fn default_display_limit() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.source_selector()?;
        self.target()?;
        self.default_language_tag()?;
        self.locale_tag()?;
        self.domain_tag()?;

        if self.translation.provider.requires_api_key() && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} provider",
                self.translation.provider.display_name()
            ));
        }

        if self.live.min_chars == 0 {
            return Err(anyhow!("live.min_chars must be at least 1"));
        }

        if self.cache.capacity == 0 {
            return Err(anyhow!("cache.capacity must be at least 1"));
        }

        Ok(())
    }

    pub fn source_selector(&self) -> Result<LanguageSelector> {
        self.source_language
            .parse()
            .with_context(|| format!("Invalid source language: {}", self.source_language))
    }

    pub fn target(&self) -> Result<LanguageTag> {
        validate_language_code(&self.target_language)
    }

    pub fn default_language_tag(&self) -> Result<LanguageTag> {
        validate_language_code(&self.default_language)
    }

    pub fn locale_tag(&self) -> Result<LanguageTag> {
        validate_language_code(&self.locale)
    }

    pub fn domain_tag(&self) -> Result<Option<DomainTag>> {
        self.domain
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(str::parse::<DomainTag>)
            .transpose()
    }

    /// Database path from config, or the default under the user data directory
    pub fn history_db_path(&self) -> Result<PathBuf> {
        match &self.history.db_path {
            Some(path) => Ok(path.clone()),
            None => crate::history::connection::DatabaseConnection::default_database_path(),
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            default_language: default_default_language(),
            locale: default_locale(),
            domain: None,
            translation: TranslationConfig::default(),
            live: LiveConfig::default(),
            cache: CacheConfig::default(),
            history: HistoryConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider, created when missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::Gemini => default_gemini_model(),
            TranslationProvider::OpenAI => default_openai_model(),
            TranslationProvider::Mock => String::new(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::Gemini => default_gemini_endpoint(),
            TranslationProvider::OpenAI => default_openai_endpoint(),
            TranslationProvider::Mock => String::new(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Gemini),
                ProviderConfig::new(TranslationProvider::OpenAI),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
