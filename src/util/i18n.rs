use fluent::FluentResource;
use fluent_bundle::FluentArgs;
use fluent_bundle::bundle::FluentBundle;
use intl_memoizer::concurrent::IntlLangMemoizer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use unic_langid::LanguageIdentifier;

/// Bundle variant usable from any task; the manager is shared behind a lock.
type ConcurrentBundle = FluentBundle<Arc<FluentResource>, IntlLangMemoizer>;

/// Manages localization resources and provides translation API
pub struct LocalizationManager {
    bundle: ConcurrentBundle,
    fallback_bundle: Option<ConcurrentBundle>,
    current_locale: String,
}

impl LocalizationManager {
    /// Create a new LocalizationManager for the specified locale
    ///
    /// # Arguments
    /// * `locale` - Language code ("en" or "pl")
    ///
    /// # Returns
    /// * `Ok(LocalizationManager)` on success
    /// * `Err` if locale files cannot be loaded
    pub fn new(locale: &str) -> anyhow::Result<Self> {
        // Map short codes to full locale identifiers
        let locale_lower = locale.to_lowercase();
        let locale_id = match locale_lower.as_str() {
            "en" => "en-US",
            "pl" => "pl-PL",
            other => other,
        };

        tracing::info!("Loading translations for locale: {}", locale_id);

        let locale_id_owned = locale_id.to_string();
        let bundle = Self::load_locale_bundle(&locale_id_owned)?;

        // Load fallback locale (en-US) if not already loaded
        let fallback_bundle = if locale_id != "en-US" {
            match Self::load_locale_bundle("en-US") {
                Ok(fallback) => {
                    tracing::debug!("Loaded fallback locale: en-US");
                    Some(fallback)
                }
                Err(e) => {
                    tracing::warn!("Failed to load fallback locale en-US: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            bundle,
            fallback_bundle,
            current_locale: locale.to_string(),
        })
    }

    /// Load all .ftl files for a locale into a single bundle
    fn load_locale_bundle(locale_id: &str) -> anyhow::Result<ConcurrentBundle> {
        let locale_dir = Self::get_locale_dir(locale_id)?;

        let lang_id: LanguageIdentifier = locale_id
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid locale ID '{}': {:?}", locale_id, e))?;

        let mut bundle = FluentBundle::new_concurrent(vec![lang_id]);

        let resources = Self::load_ftl_files(&locale_dir)?;
        if resources.is_empty() {
            anyhow::bail!("No .ftl files found in {}", locale_dir.display());
        }

        for resource in resources {
            if let Err(errors) = bundle.add_resource(resource) {
                for error in errors {
                    tracing::error!("Failed to add resource to bundle: {:?}", error);
                }
            }
        }

        tracing::debug!("Loaded locale bundle for {}", locale_id);

        Ok(bundle)
    }

    /// Get the path to the locale directory
    fn get_locale_dir(locale_id: &str) -> anyhow::Result<PathBuf> {
        let locales_dir = super::paths::find_resource_directory("locales")?;
        let locale_path = locales_dir.join(locale_id);
        if locale_path.is_dir() {
            tracing::debug!("Found locale directory: {}", locale_path.display());
            Ok(locale_path)
        } else {
            anyhow::bail!("Locale directory not found for '{}'", locale_id)
        }
    }

    /// Load all .ftl files from a directory, sorted for a stable merge order
    fn load_ftl_files(dir: &Path) -> anyhow::Result<Vec<Arc<FluentResource>>> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("ftl"))
            .collect();
        entries.sort_by_key(|e| e.path());

        let mut resources = Vec::new();
        for entry in entries {
            let path = entry.path();
            match Self::load_ftl_file(&path) {
                Ok(resource) => {
                    tracing::debug!("Loaded translation file: {}", path.display());
                    resources.push(resource);
                }
                Err(e) => {
                    // Skip the broken file, keep the rest of the locale usable
                    tracing::error!("Failed to load translation file {}: {}", path.display(), e);
                }
            }
        }

        Ok(resources)
    }

    fn load_ftl_file(path: &Path) -> anyhow::Result<Arc<FluentResource>> {
        let content = std::fs::read_to_string(path)?;
        let resource = FluentResource::try_new(content)
            .map_err(|(_, errors)| anyhow::anyhow!("Failed to parse {}: {:?}", path.display(), errors))?;
        Ok(Arc::new(resource))
    }

    /// Get a translated string by key
    pub fn get(&self, key: &str) -> String {
        self.get_with_args(key, None)
    }

    /// Get a translated string with arguments
    ///
    /// Lookup order: current locale, then en-US, then the key itself.
    /// Returning the raw key keeps the UI readable when a translation is
    /// missing instead of surfacing an error.
    pub fn get_with_args(&self, key: &str, args: Option<&FluentArgs>) -> String {
        if let Some(message) = self.bundle.get_message(key) {
            if let Some(pattern) = message.value() {
                let mut errors = vec![];
                let value = self.bundle.format_pattern(pattern, args, &mut errors);

                if !errors.is_empty() {
                    tracing::warn!("Translation errors for key '{}': {:?}", key, errors);
                }

                return value.to_string();
            }
        }

        if let Some(fallback) = &self.fallback_bundle {
            if let Some(message) = fallback.get_message(key) {
                if let Some(pattern) = message.value() {
                    let mut errors = vec![];
                    let value = fallback.format_pattern(pattern, args, &mut errors);

                    if !errors.is_empty() {
                        tracing::warn!("Translation errors for fallback key '{}': {:?}", key, errors);
                    }

                    tracing::debug!("Using fallback translation for key: {}", key);
                    return value.to_string();
                }
            }
        }

        tracing::warn!("Missing translation key: {}", key);
        key.to_string()
    }

    /// Get the current locale code
    pub fn current_locale(&self) -> &str {
        &self.current_locale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluent::fluent_args;

    // Tests resolve locales/ relative to the crate root (cargo sets CWD there).

    #[test]
    fn test_locale_mapping() {
        let manager = LocalizationManager::new("en").unwrap();
        assert_eq!(manager.current_locale(), "en");

        let manager = LocalizationManager::new("pl").unwrap();
        assert_eq!(manager.current_locale(), "pl");
    }

    #[test]
    fn test_missing_key_returns_key_itself() {
        let manager = LocalizationManager::new("en").unwrap();
        let result = manager.get("nonexistent-key");
        assert_eq!(result, "nonexistent-key");
    }

    #[test]
    fn test_polish_falls_back_to_english_then_key() {
        let manager = LocalizationManager::new("pl").unwrap();
        // Key present in both locales resolves in Polish
        assert_ne!(manager.get("status-connected"), "status-connected");
        // Unknown key falls through both bundles
        assert_eq!(manager.get("does-not-exist"), "does-not-exist");
    }

    #[test]
    fn test_arguments_are_interpolated() {
        let manager = LocalizationManager::new("en").unwrap();
        let args = fluent_args!["id" => 7];
        let text = manager.get_with_args("download-added", Some(&args));
        assert!(text.contains('7'), "expected id in '{}'", text);
    }
}
