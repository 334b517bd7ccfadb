use super::config::Config;
use crate::util::i18n::LocalizationManager;
use std::sync::{Arc, RwLock as StdRwLock};
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    /// Shared internationalization manager; replaced in place when the
    /// language setting changes so every surface re-renders localized
    pub i18n: Arc<StdRwLock<LocalizationManager>>,
}

impl AppState {
    /// Create LocalizationManager with fallback to English
    fn create_i18n(language: &str) -> LocalizationManager {
        LocalizationManager::new(language).unwrap_or_else(|e| {
            tracing::error!("Failed to load translations for '{}': {}", language, e);
            tracing::info!("Falling back to English");
            LocalizationManager::new("en").expect("Failed to load fallback locale")
        })
    }

    pub fn new(config: Config) -> Self {
        let language = config.general.language.clone();
        Self {
            config: Arc::new(RwLock::new(config)),
            i18n: Arc::new(StdRwLock::new(Self::create_i18n(&language))),
        }
    }

    /// Get translated string by key
    pub fn t(&self, key: &str) -> String {
        self.i18n.read().unwrap().get(key)
    }

    /// Get translated string with arguments
    pub fn t_with_args(&self, key: &str, args: Option<&fluent_bundle::FluentArgs>) -> String {
        self.i18n.read().unwrap().get_with_args(key, args)
    }

    /// Swap the translation bundles for a new language without a restart
    pub fn reload_language(&self, language: &str) {
        let manager = Self::create_i18n(language);
        *self.i18n.write().unwrap() = manager;
        tracing::info!("Switched UI language to '{}'", language);
    }

    /// Clone of the current configuration
    pub async fn config_snapshot(&self) -> Config {
        self.config.read().await.clone()
    }
}
