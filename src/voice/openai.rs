use std::{path::Path, sync::OnceLock, thread, time::Duration};

use anyhow::{Context as _, bail};
use base64::Engine as _;
use sha2::Digest as _;

use crate::{
    foundation::error::{TavoxError, TavoxResult},
    voice::provider::{VoiceProvider, preview},
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(10);

/// Remote synthesis backend for OpenAI-compatible `audio/speech` endpoints.
#[derive(Debug)]
pub struct OpenAiVoice {
    voice: String,
    model: String,
    instructions: String,
    base_url: Option<String>,
    api_key: Option<String>,
    service_name: String,
    id: String,
    client: OnceLock<reqwest::blocking::Client>,
}

/// Options for [`OpenAiVoice::with_options`].
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OpenAiVoiceOpts {
    /// Free-form speaking instructions (only honoured by some models).
    pub instructions: Option<String>,
    /// Base URL of a compatible service; `None` targets the official API.
    pub base_url: Option<String>,
    /// API key; falls back to `OPENAI_API_KEY` for the official API.
    pub api_key: Option<String>,
}

impl OpenAiVoice {
    /// Voice `voice` of model `model` on the official API.
    pub fn new(voice: impl Into<String>, model: impl Into<String>) -> Self {
        let voice = voice.into();
        let model = model.into();
        Self::build(
            voice,
            model,
            String::new(),
            None,
            None,
            "openai".to_string(),
            "OpenAI".to_string(),
        )
    }

    /// Voice with instructions and/or a custom service.
    pub fn with_options(
        voice: impl Into<String>,
        model: impl Into<String>,
        opts: OpenAiVoiceOpts,
    ) -> TavoxResult<Self> {
        let instructions = opts
            .instructions
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let (id_base, service_name) = match &opts.base_url {
            None => ("openai".to_string(), "OpenAI".to_string()),
            Some(raw) => {
                let url = reqwest::Url::parse(raw).map_err(|e| {
                    TavoxError::configuration(format!("invalid base_url '{raw}': {e}"))
                })?;
                let host = url
                    .host_str()
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| {
                        TavoxError::configuration(format!("invalid base_url '{raw}': no host"))
                    })?
                    .to_string();
                let id_base = format!("{host}{}", url.path()).trim_matches('/').to_string();
                (id_base, host)
            }
        };

        Ok(Self::build(
            voice.into(),
            model.into(),
            instructions,
            opts.base_url,
            opts.api_key,
            id_base,
            service_name,
        ))
    }

    fn build(
        voice: String,
        model: String,
        instructions: String,
        base_url: Option<String>,
        api_key: Option<String>,
        id_base: String,
        service_name: String,
    ) -> Self {
        let suffix = if instructions.is_empty() {
            String::new()
        } else {
            format!("_{}", instructions_tag(&instructions))
        };
        Self {
            id: format!("{id_base}/{model}/{voice}{suffix}"),
            voice,
            model,
            instructions,
            base_url,
            api_key,
            service_name,
            client: OnceLock::new(),
        }
    }

    fn endpoint(&self) -> String {
        let base = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        format!("{}/audio/speech", base.trim_end_matches('/'))
    }

    fn api_key(&self) -> anyhow::Result<Option<String>> {
        if let Some(key) = &self.api_key {
            return Ok(Some(key.clone()));
        }
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) => Ok(Some(key)),
            Err(_) if self.base_url.is_some() => Ok(None),
            Err(_) => bail!("OPENAI_API_KEY is not set"),
        }
    }

    fn client(&self) -> &reqwest::blocking::Client {
        self.client.get_or_init(reqwest::blocking::Client::new)
    }

    pub(crate) fn request_body(&self, text: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "voice": self.voice,
            "input": text,
            "response_format": "wav",
        });
        if !self.instructions.is_empty() {
            body["instructions"] = serde_json::Value::String(self.instructions.clone());
        }
        body
    }
}

impl VoiceProvider for OpenAiVoice {
    fn synthesize(&self, text: &str, scratch_dir: &Path) -> anyhow::Result<()> {
        let api_key = self.api_key()?;
        let body = self.request_body(text);
        let audio = loop {
            tracing::info!("[{}] generating: {}", self.service_name, preview(text, 40));
            let mut req = self.client().post(self.endpoint()).json(&body);
            if let Some(key) = &api_key {
                req = req.bearer_auth(key);
            }
            let resp = req
                .send()
                .with_context(|| format!("[{}] request failed", self.service_name))?;

            let status = resp.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!(
                    "[{}] rate limit exceeded, waiting {} seconds...",
                    self.service_name,
                    RATE_LIMIT_BACKOFF.as_secs()
                );
                thread::sleep(RATE_LIMIT_BACKOFF);
                continue;
            }
            if !status.is_success() {
                let detail = resp.text().unwrap_or_default();
                bail!(
                    "[{}] speech request returned {status}: {}",
                    self.service_name,
                    detail.trim()
                );
            }
            break resp
                .bytes()
                .with_context(|| format!("[{}] failed to read audio body", self.service_name))?;
        };

        let out = scratch_dir.join("sample.wav");
        std::fs::write(&out, &audio).with_context(|| format!("write '{}'", out.display()))?;
        Ok(())
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> Option<String> {
        if self.instructions.is_empty() {
            return None;
        }
        Some(serde_json::json!({ "instructions": self.instructions }).to_string())
    }
}

/// Short, filesystem-safe tag that distinguishes voices with different instructions.
fn instructions_tag(instructions: &str) -> String {
    let digest = sha2::Sha256::digest(instructions.as_bytes());
    let mut tag = base64::engine::general_purpose::URL_SAFE.encode(digest);
    tag.truncate(24);
    tag
}

#[cfg(test)]
#[path = "../../tests/unit/voice/openai.rs"]
mod tests;
