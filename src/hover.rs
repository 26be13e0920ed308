//! Hover path: classify the span under the pointer, debounce, translate,
//! and build the hover payload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::debounce::DebounceGate;
use crate::span::{SpanClassifier, SpanKind};
use crate::translate::{TranslationBackend, TranslationService};

/// Translated text ready to show in a hover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverContent {
    pub original: String,
    pub translation: String,
    pub kind: SpanKind,
}

impl HoverContent {
    pub fn label(&self) -> &'static str {
        match self.kind {
            SpanKind::Comment => "주석/Docstring",
            SpanKind::Identifier => "변수/함수명",
        }
    }

    pub fn markdown(&self) -> String {
        format!("**🇰🇷 {} 번역**\n\n{}\n\n", self.label(), self.translation)
    }
}

pub struct HoverProvider<B> {
    classifier: SpanClassifier,
    translator: Arc<TranslationService<B>>,
    gate: DebounceGate,
    enabled: Arc<AtomicBool>,
    comment_window: Duration,
    identifier_window: Duration,
}

impl<B: TranslationBackend> HoverProvider<B> {
    pub fn new(
        translator: Arc<TranslationService<B>>,
        enabled: Arc<AtomicBool>,
        config: &Config,
    ) -> Self {
        Self {
            classifier: SpanClassifier::new(),
            translator,
            gate: DebounceGate::new(),
            enabled,
            comment_window: config.comment_debounce(),
            identifier_window: config.identifier_debounce(),
        }
    }

    pub fn gate(&self) -> &DebounceGate {
        &self.gate
    }

    /// Hover at byte `offset` of `document`. `None` means nothing to show.
    pub async fn provide_hover(&self, document: &str, offset: usize) -> Option<HoverContent> {
        if !self.enabled.load(Ordering::Relaxed) {
            return None;
        }

        let span = self.classifier.classify(document, offset)?;
        let text = span.normalized_text();
        if text.is_empty() {
            return None;
        }

        let window = match span.kind {
            SpanKind::Comment => self.comment_window,
            SpanKind::Identifier => self.identifier_window,
        };
        if !self.gate.admit(&text, window) {
            debug!(kind = ?span.kind, "hover_debounced");
            return None;
        }

        let translation = self.translator.translate(&text).await;
        // An identifier that comes back unchanged was not translated.
        if span.kind == SpanKind::Identifier && translation == text {
            return None;
        }

        Some(HoverContent {
            original: text,
            translation,
            kind: span.kind,
        })
    }
}
