//! Line-delimited JSON protocol between the editor and the translator.
//!
//! One request object per input line, one reply or event object per output
//! line. Each request runs on its own task, so a slow translation does not
//! hold up the hovers queued behind it.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::inline::{DecorationSink, InlineDecoration, TextRange};
use crate::translate::TranslationBackend;
use crate::AppContext;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum Request {
    Hover { text: String, offset: usize },
    TranslateSelection { text: String, selection: TextRange },
    Toggle,
    CacheStatus,
    ClearCache,
    SetupCredential,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Value,
    #[serde(flatten)]
    request: Request,
}

#[derive(Debug)]
pub enum HostError {
    Io(std::io::Error),
    Writer(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::Io(e) => write!(f, "host IO error: {e}"),
            HostError::Writer(msg) => write!(f, "output writer failed: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

impl From<std::io::Error> for HostError {
    fn from(e: std::io::Error) -> Self {
        HostError::Io(e)
    }
}

/// Decorations are forwarded to the editor as `decorate`/`undecorate` events.
struct EventSink {
    tx: mpsc::UnboundedSender<String>,
}

impl DecorationSink for EventSink {
    fn show(&self, decoration: &InlineDecoration) {
        let event = json!({
            "event": "decorate",
            "id": decoration.id,
            "range": decoration.range,
            "contentText": decoration.content_text,
        });
        let _ = self.tx.send(event.to_string());
    }

    fn remove(&self, id: &str) {
        let _ = self.tx.send(json!({ "event": "undecorate", "id": id }).to_string());
    }
}

/// Serve requests from `input` until EOF, writing replies to `output`.
/// Lines that are not UTF-8 or not a valid request get an `error` reply.
/// A read failure also ends the loop, but pending requests still finish,
/// live decorations are removed and queued output is flushed before return.
pub async fn serve<B, R, W>(
    ctx: Arc<AppContext<B>>,
    mut input: R,
    output: W,
) -> Result<(), HostError>
where
    B: TranslationBackend + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_lines(rx, output));
    let sink: Arc<dyn DecorationSink> = Arc::new(EventSink { tx: tx.clone() });
    let requests = TaskTracker::new();

    let mut buf = Vec::new();
    let read_result = loop {
        buf.clear();
        match input.read_until(b'\n', &mut buf).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "reading input failed");
                break Err(HostError::Io(e));
            }
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!(error = %e, "input line is not UTF-8");
                let _ = tx.send(json!({ "error": format!("invalid request: {e}") }).to_string());
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        let envelope = match serde_json::from_str::<Envelope>(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "invalid request line");
                let _ = tx.send(json!({ "error": format!("invalid request: {e}") }).to_string());
                continue;
            }
        };

        let ctx = Arc::clone(&ctx);
        let tx = tx.clone();
        let sink = Arc::clone(&sink);
        requests.spawn(async move {
            let mut reply = handle(&ctx, envelope.request, sink).await;
            reply["id"] = envelope.id;
            let _ = tx.send(reply.to_string());
        });
    };

    debug!("input closed, draining");
    requests.close();
    requests.wait().await;
    ctx.inline.shutdown().await;
    drop(sink);
    drop(tx);

    let written = match writer.await {
        Ok(result) => result.map_err(HostError::Io),
        Err(e) => Err(HostError::Writer(e.to_string())),
    };
    read_result.and(written)
}

/// Run one request against the pipeline and build its reply object.
pub async fn handle<B: TranslationBackend>(
    ctx: &AppContext<B>,
    request: Request,
    sink: Arc<dyn DecorationSink>,
) -> Value {
    match request {
        Request::Hover { text, offset } => {
            let result = ctx.hover.provide_hover(&text, offset).await.map(|hover| {
                json!({
                    "original": hover.original,
                    "translation": hover.translation,
                    "category": hover.label(),
                    "markdown": hover.markdown(),
                })
            });
            json!({ "result": result })
        }
        Request::TranslateSelection { text, selection } => {
            let result = ctx.inline.translate_selection(&text, selection, sink).await;
            json!({ "result": result })
        }
        Request::Toggle => json!({ "notification": ctx.commands.toggle() }),
        Request::CacheStatus => json!({ "notification": ctx.commands.cache_status() }),
        Request::ClearCache => json!({ "notification": ctx.commands.clear_cache() }),
        Request::SetupCredential => json!({ "notification": ctx.commands.setup_credential() }),
    }
}

async fn write_lines<W>(mut rx: mpsc::UnboundedReceiver<String>, mut output: W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        output.write_all(line.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_requests() {
        let env: Envelope =
            serde_json::from_str(r##"{"id":7,"method":"hover","text":"# hi","offset":2}"##).unwrap();
        assert_eq!(env.id, json!(7));
        assert_eq!(
            env.request,
            Request::Hover {
                text: "# hi".into(),
                offset: 2
            }
        );

        let env: Envelope = serde_json::from_str(
            r#"{"method":"translateSelection","text":"abc","selection":{"start":0,"end":3}}"#,
        )
        .unwrap();
        assert_eq!(env.id, Value::Null);
        assert!(matches!(env.request, Request::TranslateSelection { .. }));

        let env: Envelope = serde_json::from_str(r#"{"method":"clearCache"}"#).unwrap();
        assert_eq!(env.request, Request::ClearCache);
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(serde_json::from_str::<Envelope>(r#"{"method":"reload"}"#).is_err());
    }
}
