//! Translation client: exact-match cache in front of a single remote
//! translation backend.
//!
//! `TranslationService::translate` never fails. Every error is folded into the
//! string shown to the user, and only successful translations are cached.

pub mod cache;
pub mod deepl;

use std::future::Future;

use tracing::{debug, info, warn};

use cache::TranslationCache;

/// Shown when no usable API key is configured.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "DeepL API 키가 설정되지 않았습니다 (DEEPL_API_KEY 확인 필요)";
/// Shown when the backend rejects the API key (HTTP 403).
pub const CREDENTIAL_ERROR_MESSAGE: &str = "API 키 오류 (DEEPL_API_KEY 확인)";
/// Appended to the original text on any other failure.
pub const FAILURE_MARKER: &str = " (번역 실패)";

/// Values that ship in sample configs and must not be sent as real keys.
const PLACEHOLDER_KEYS: &[&str] = &["여기에_발급받은", "YOUR_DEEPL_API_KEY", "your-api-key"];

/// True when `key` is non-blank and not a sample placeholder.
pub fn is_usable_credential(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !PLACEHOLDER_KEYS.iter().any(|p| key.contains(p))
}

#[derive(Debug)]
pub enum TranslateError {
    NotConfigured,
    Unauthorized,
    Status(u16),
    Timeout,
    Transport(String),
    Decode(String),
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::NotConfigured => write!(f, "translation API key not configured"),
            TranslateError::Unauthorized => write!(f, "translation API rejected the key (403)"),
            TranslateError::Status(code) => write!(f, "unexpected status {code}"),
            TranslateError::Timeout => write!(f, "translation timeout"),
            TranslateError::Transport(msg) => write!(f, "transport error: {msg}"),
            TranslateError::Decode(msg) => write!(f, "invalid response body: {msg}"),
        }
    }
}

impl std::error::Error for TranslateError {}

/// Remote translation backend (adapter for different services).
pub trait TranslationBackend: Send + Sync {
    /// Whether a usable credential is present. Checked before any request.
    fn is_configured(&self) -> bool;

    /// Issue exactly one request. `Ok(None)` means the response parsed but
    /// carried no translation.
    fn translate(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Option<String>, TranslateError>> + Send;
}

/// Outcome of resolving one text. Keeps "the backend answered without a
/// translation" apart from a real translation until it is displayed.
#[derive(Debug)]
pub enum Resolution {
    /// Blank input; nothing was looked up.
    Empty,
    Translated { text: String, cached: bool },
    /// The response had no translation in it.
    Untranslated,
    Failed(TranslateError),
}

impl Resolution {
    /// Collapse into the text presented for `original`.
    pub fn into_display(self, original: &str) -> String {
        match self {
            Resolution::Empty => String::new(),
            Resolution::Translated { text, .. } => text,
            Resolution::Untranslated => original.to_string(),
            Resolution::Failed(TranslateError::NotConfigured) => NOT_CONFIGURED_MESSAGE.to_string(),
            Resolution::Failed(TranslateError::Unauthorized) => CREDENTIAL_ERROR_MESSAGE.to_string(),
            Resolution::Failed(_) => format!("{original}{FAILURE_MARKER}"),
        }
    }
}

pub struct TranslationService<B> {
    backend: B,
    cache: TranslationCache,
}

impl<B: TranslationBackend> TranslationService<B> {
    pub fn new(backend: B, cache: TranslationCache) -> Self {
        Self { backend, cache }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_configured()
    }

    /// Resolve `text` through the cache, then the backend. Single attempt,
    /// no retry. Concurrent misses for the same text both reach the backend;
    /// the last one to finish owns the cache entry.
    pub async fn resolve(&self, text: &str) -> Resolution {
        if text.trim().is_empty() {
            return Resolution::Empty;
        }

        if let Some(hit) = self.cache.get(text) {
            debug!(chars = text.chars().count(), "translation_cache_hit");
            return Resolution::Translated {
                text: hit,
                cached: true,
            };
        }

        if !self.backend.is_configured() {
            return Resolution::Failed(TranslateError::NotConfigured);
        }

        match self.backend.translate(text).await {
            Ok(Some(translated)) => {
                self.cache.insert(text.to_string(), translated.clone());
                Resolution::Translated {
                    text: translated,
                    cached: false,
                }
            }
            Ok(None) => {
                warn!("translation response carried no translation");
                Resolution::Untranslated
            }
            Err(e) => {
                warn!(error = %e, "translation failed");
                Resolution::Failed(e)
            }
        }
    }

    /// Translate `text` for display. Never fails; see [`Resolution::into_display`].
    pub async fn translate(&self, text: &str) -> String {
        self.resolve(text).await.into_display(text)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("translation_cache_cleared");
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Log the number of cached entries and return it.
    pub fn log_cache_status(&self) -> usize {
        let entries = self.cache.len();
        info!(entries, "translation_cache_status");
        entries
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;

    fn service(backend: ScriptedBackend) -> TranslationService<ScriptedBackend> {
        TranslationService::new(backend, TranslationCache::new(None))
    }

    #[tokio::test]
    async fn blank_input_short_circuits() {
        let svc = service(ScriptedBackend::echo());
        assert_eq!(svc.translate("").await, "");
        assert_eq!(svc.translate("  \n\t").await, "");
        assert_eq!(svc.backend().calls(), 0);
        assert_eq!(svc.cache_len(), 0);
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let svc = service(ScriptedBackend::new(vec![Ok(Some("데이터".into()))]));
        assert_eq!(svc.translate("data").await, "데이터");
        assert_eq!(svc.translate("data").await, "데이터");
        assert_eq!(svc.backend().calls(), 1);
        assert!(matches!(
            svc.resolve("data").await,
            Resolution::Translated { cached: true, .. }
        ));
    }

    #[tokio::test]
    async fn failure_is_not_cached_and_retried_next_call() {
        let svc = service(ScriptedBackend::new(vec![
            Err(TranslateError::Timeout),
            Ok(Some("값".into())),
        ]));
        assert_eq!(svc.translate("value").await, "value (번역 실패)");
        assert_eq!(svc.cache_len(), 0);
        assert_eq!(svc.translate("value").await, "값");
        assert_eq!(svc.backend().calls(), 2);
        assert_eq!(svc.cache_len(), 1);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_credential_message() {
        let svc = service(ScriptedBackend::new(vec![Err(TranslateError::Unauthorized)]));
        assert_eq!(svc.translate("value").await, CREDENTIAL_ERROR_MESSAGE);
        assert_eq!(svc.cache_len(), 0);
    }

    #[tokio::test]
    async fn missing_translation_returns_input_uncached() {
        let svc = service(ScriptedBackend::new(vec![Ok(None)]));
        assert!(matches!(svc.resolve("value").await, Resolution::Untranslated));
        assert_eq!(svc.cache_len(), 0);
        assert_eq!(svc.translate("value").await, "value-ko");
    }

    #[tokio::test]
    async fn unconfigured_backend_is_never_called() {
        let svc = service(ScriptedBackend::unconfigured());
        assert_eq!(svc.translate("value").await, NOT_CONFIGURED_MESSAGE);
        assert_eq!(svc.backend().calls(), 0);
    }

    #[tokio::test]
    async fn clear_cache_forces_new_request() {
        let svc = service(ScriptedBackend::echo());
        svc.translate("value").await;
        assert_eq!(svc.log_cache_status(), 1);
        svc.clear_cache();
        assert_eq!(svc.cache_len(), 0);
        svc.translate("value").await;
        assert_eq!(svc.backend().calls(), 2);
    }

    #[test]
    fn placeholder_credentials_are_rejected() {
        assert!(!is_usable_credential(""));
        assert!(!is_usable_credential("   "));
        assert!(!is_usable_credential("여기에_발급받은_키"));
        assert!(is_usable_credential("0f1e2d3c-aaaa-bbbb-cccc-000000000000:fx"));
    }
}
