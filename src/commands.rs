//! User-invoked administrative commands and the notifications they produce.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::translate::{TranslationBackend, TranslationService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }
}

pub struct Commands<B> {
    translator: Arc<TranslationService<B>>,
    enabled: Arc<AtomicBool>,
}

impl<B: TranslationBackend> Commands<B> {
    pub fn new(translator: Arc<TranslationService<B>>, enabled: Arc<AtomicBool>) -> Self {
        Self {
            translator,
            enabled,
        }
    }

    /// Flip hover translation on or off.
    pub fn toggle(&self) -> Notification {
        let enabled = !self.enabled.fetch_xor(true, Ordering::Relaxed);
        info!(enabled, "hover_toggled");
        let state = if enabled { "Enabled" } else { "Disabled" };
        Notification::info(format!("Korean Translator: {state}"))
    }

    pub fn cache_status(&self) -> Notification {
        let entries = self.translator.log_cache_status();
        Notification::info(format!("Cache status logged ({entries} entries)"))
    }

    pub fn clear_cache(&self) -> Notification {
        self.translator.clear_cache();
        Notification::info("Translation cache cleared!")
    }

    /// Report whether a usable API key is configured.
    pub fn setup_credential(&self) -> Notification {
        if self.translator.is_configured() {
            Notification::info("✅ DeepL API 키가 설정되었습니다.")
        } else {
            Notification::warning("⚠️ DeepL API 키가 설정되지 않았습니다.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::cache::TranslationCache;
    use crate::translate::testing::ScriptedBackend;

    fn commands(backend: ScriptedBackend) -> Commands<ScriptedBackend> {
        let service = Arc::new(TranslationService::new(backend, TranslationCache::new(None)));
        Commands::new(service, Arc::new(AtomicBool::new(true)))
    }

    #[test]
    fn toggle_flips_flag() {
        let cmds = commands(ScriptedBackend::echo());
        assert_eq!(cmds.toggle().message, "Korean Translator: Disabled");
        assert!(!cmds.enabled.load(Ordering::Relaxed));
        assert_eq!(cmds.toggle().message, "Korean Translator: Enabled");
        assert!(cmds.enabled.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn cache_status_and_clear() {
        let cmds = commands(ScriptedBackend::echo());
        cmds.translator.translate("alpha").await;
        cmds.translator.translate("beta").await;
        assert_eq!(cmds.cache_status().message, "Cache status logged (2 entries)");
        assert_eq!(cmds.clear_cache().message, "Translation cache cleared!");
        assert_eq!(cmds.translator.cache_len(), 0);
    }

    #[test]
    fn setup_credential_warns_without_key() {
        let cmds = commands(ScriptedBackend::unconfigured());
        assert_eq!(cmds.setup_credential().level, NotificationLevel::Warning);
        let cmds = commands(ScriptedBackend::echo());
        assert_eq!(cmds.setup_credential().level, NotificationLevel::Info);
    }
}
