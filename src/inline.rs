//! Command path: translate the selection (or the word at the cursor) and show
//! it as an inline decoration that removes itself after a fixed delay.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;

use crate::config::Config;
use crate::span::word_range_at;
use crate::translate::{TranslationBackend, TranslationService};

/// Byte range in document text. `start == end` is a bare cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineDecoration {
    pub id: String,
    pub range: TextRange,
    pub content_text: String,
}

/// Where decorations are drawn. Implemented by the host.
pub trait DecorationSink: Send + Sync + 'static {
    fn show(&self, decoration: &InlineDecoration);
    fn remove(&self, id: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineTranslation {
    pub range: TextRange,
    pub original: String,
    pub translation: String,
    pub decoration_id: String,
}

/// Text the command acts on: the selection when it is non-empty, otherwise
/// the word touching the selection start.
pub fn resolve_target(document: &str, selection: TextRange) -> Option<(TextRange, String)> {
    if !selection.is_empty() {
        if let Some(text) = document.get(selection.start..selection.end) {
            return Some((selection, text.to_string()));
        }
    }
    let word = word_range_at(document, selection.start)?;
    let range = TextRange {
        start: word.start,
        end: word.end,
    };
    Some((range, document[word].to_string()))
}

pub struct InlineTranslator<B> {
    translator: Arc<TranslationService<B>>,
    ttl: Duration,
    shutdown: CancellationToken,
    removals: TaskTracker,
}

impl<B: TranslationBackend> InlineTranslator<B> {
    pub fn new(translator: Arc<TranslationService<B>>, config: &Config) -> Self {
        Self {
            translator,
            ttl: config.decoration_ttl(),
            shutdown: CancellationToken::new(),
            removals: TaskTracker::new(),
        }
    }

    /// Not debounced. Returns `None` when there is nothing under the cursor.
    pub async fn translate_selection(
        &self,
        document: &str,
        selection: TextRange,
        sink: Arc<dyn DecorationSink>,
    ) -> Option<InlineTranslation> {
        let (range, original) = resolve_target(document, selection)?;
        let translation = self.translator.translate(&original).await;

        let decoration = InlineDecoration {
            id: uuid::Uuid::new_v4().to_string(),
            range,
            content_text: format!(" → {translation}"),
        };
        sink.show(&decoration);
        self.schedule_removal(decoration.id.clone(), sink);

        Some(InlineTranslation {
            range,
            original,
            translation,
            decoration_id: decoration.id,
        })
    }

    /// The decoration is removed after the TTL whatever happens in the
    /// meantime, or immediately on shutdown.
    fn schedule_removal(&self, id: String, sink: Arc<dyn DecorationSink>) {
        let ttl = self.ttl;
        let token = self.shutdown.child_token();
        self.removals.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(ttl) => {}
                _ = token.cancelled() => {}
            }
            sink.remove(&id);
            debug!(decoration = %id, "inline_decoration_removed");
        });
    }

    /// Remove every live decoration and wait for the removals to finish.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.removals.close();
        self.removals.wait().await;
    }
}
