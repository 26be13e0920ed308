//! DeepL REST client. One POST per call, bounded timeout, no retry.
//! The key suffix picks the endpoint: `:fx` keys belong to the free tier.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::{is_usable_credential, TranslateError, TranslationBackend};
use crate::config::Config;

const FREE_TIER_SUFFIX: &str = ":fx";

pub struct DeepLClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    target_lang: String,
}

#[derive(Serialize)]
struct TranslateBody<'a> {
    text: [&'a str; 1],
    target_lang: &'a str,
}

pub fn is_free_tier(api_key: &str) -> bool {
    api_key.trim_end().ends_with(FREE_TIER_SUFFIX)
}

impl DeepLClient {
    pub fn new(config: &Config) -> Result<Self, TranslateError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout())
            .build()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        let endpoint = if is_free_tier(&config.api_key) {
            config.free_endpoint.clone()
        } else {
            config.paid_endpoint.clone()
        };

        Ok(Self {
            http,
            api_key: config.api_key.trim().to_string(),
            endpoint,
            target_lang: config.target_lang.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, text: &str) -> Result<Option<String>, TranslateError> {
        let body = TranslateBody {
            text: [text],
            target_lang: &self.target_lang,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(TranslateError::Unauthorized);
        }
        if !status.is_success() {
            return Err(TranslateError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        let payload: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| TranslateError::Decode(e.to_string()))?;
        debug!(endpoint = %self.endpoint, "deepl_response_received");

        Ok(first_translation(&payload))
    }
}

impl TranslationBackend for DeepLClient {
    fn is_configured(&self) -> bool {
        is_usable_credential(&self.api_key)
    }

    async fn translate(&self, text: &str) -> Result<Option<String>, TranslateError> {
        self.post(text).await
    }
}

/// `translations[0].text`, if the payload has that shape.
fn first_translation(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("translations")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

fn transport_error(e: reqwest::Error) -> TranslateError {
    if e.is_timeout() {
        TranslateError::Timeout
    } else {
        TranslateError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn free_tier_suffix_selects_free_endpoint() {
        let mut config = Config::default();
        config.api_key = "abc:fx".into();
        let client = DeepLClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "https://api-free.deepl.com/v2/translate");

        config.api_key = "abc".into();
        let client = DeepLClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "https://api.deepl.com/v2/translate");
    }

    #[test]
    fn body_is_single_element_batch() {
        let body = TranslateBody {
            text: ["hello"],
            target_lang: "KO",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "text": ["hello"], "target_lang": "KO" })
        );
    }

    #[test]
    fn first_translation_requires_full_shape() {
        let ok = json!({ "translations": [{ "detected_source_language": "EN", "text": "안녕" }] });
        assert_eq!(first_translation(&ok).as_deref(), Some("안녕"));
        assert_eq!(first_translation(&json!({})), None);
        assert_eq!(first_translation(&json!({ "translations": [] })), None);
        assert_eq!(first_translation(&json!({ "translations": [{ "text": 3 }] })), None);
    }
}
