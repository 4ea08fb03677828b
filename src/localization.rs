use anyhow::Result;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::FluentResource;
use std::collections::HashMap;
use std::fs;
use std::sync::OnceLock;
use unic_langid::LanguageIdentifier;

/// Localization manager for user-facing ledger messages
pub struct LocalizationManager {
    bundle: FluentBundle<FluentResource>,
}

impl LocalizationManager {
    /// Create a manager loaded with the Thai message bundle
    pub fn new() -> Result<Self> {
        let locale: LanguageIdentifier = "th".parse()?;
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Skip Unicode isolation marks; messages embed Thai text directly
        bundle.set_use_isolating(false);

        let resource_path = concat!(env!("CARGO_MANIFEST_DIR"), "/locales/th/main.ftl");
        if let Ok(content) = fs::read_to_string(resource_path) {
            if let Ok(resource) = FluentResource::try_new(content) {
                let _ = bundle.add_resource(resource);
            }
        }

        Ok(Self { bundle })
    }

    /// Get a localized message
    pub fn get_message(&self, key: &str, args: Option<&HashMap<&str, String>>) -> String {
        let msg = match self.bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let mut value = String::new();

        if let Some(args) = args {
            let fluent_args = fluent_bundle::FluentArgs::from_iter(
                args.iter()
                    .map(|(k, v)| (*k, fluent_bundle::FluentValue::from(v.as_str()))),
            );
            let _ = self
                .bundle
                .write_pattern(&mut value, pattern, Some(&fluent_args), &mut vec![]);
        } else {
            let _ = self
                .bundle
                .write_pattern(&mut value, pattern, None, &mut vec![]);
        }

        value
    }

    /// Get a localized message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, String> = args
            .iter()
            .map(|(k, v)| (*k, (*v).to_string()))
            .collect();
        self.get_message(key, Some(&args_map))
    }
}

static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

fn manager() -> &'static LocalizationManager {
    LOCALIZATION_MANAGER.get_or_init(|| {
        LocalizationManager::new().unwrap_or_else(|_| LocalizationManager {
            bundle: FluentBundle::new_concurrent(vec![]),
        })
    })
}

/// Convenience function to get a localized message
pub fn t(key: &str) -> String {
    manager().get_message(key, None)
}

/// Convenience function to get a localized message with arguments
pub fn t_args(key: &str, args: &[(&str, &str)]) -> String {
    manager().get_message_with_args(key, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_key_resolves_to_thai_text() {
        let message = t("unknown-command");
        assert!(!message.starts_with("Missing translation"));
        assert!(!message.is_empty());
    }

    #[test]
    fn test_missing_key_degrades_gracefully() {
        let message = t("no-such-key-ever");
        assert_eq!(message, "Missing translation: no-such-key-ever");
    }

    #[test]
    fn test_args_are_interpolated() {
        let message = t_args("purchase-recorded", &[("name", "กุ้ง"), ("quantity", "5"), ("unit", "กิโลกรัม"), ("price", "500")]);
        assert!(message.contains("กุ้ง"));
        assert!(message.contains("500"));
    }
}
