use std::{path::Path, process::Command};

use anyhow::{Context as _, bail};

use crate::voice::provider::{VoiceProvider, preview};

/// Local synthesis backend driving the Coqui TTS command line tool (`tts`).
#[derive(Clone, Debug)]
pub struct CoquiTts {
    model: String,
    id: String,
}

impl CoquiTts {
    /// Use the Coqui model `model` (e.g. `tts_models/en/ljspeech/tacotron2-DDC`).
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            id: format!("coquiTTS/{model}"),
            model,
        }
    }

    /// Model name passed to `tts --model_name`.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn command(&self, text: &str, scratch_dir: &Path) -> Command {
        let mut cmd = Command::new("tts");
        cmd.arg("--text")
            .arg(text)
            .arg("--model_name")
            .arg(&self.model)
            .arg("--out_path")
            .arg(scratch_dir.join("sample.wav"));
        cmd
    }
}

impl VoiceProvider for CoquiTts {
    fn synthesize(&self, text: &str, scratch_dir: &Path) -> anyhow::Result<()> {
        tracing::info!("[coquiTTS] generating: {}", preview(text, 40));
        let out = self
            .command(text, scratch_dir)
            .output()
            .context("failed to run `tts` (is Coqui TTS installed and on PATH?)")?;
        if !out.status.success() {
            bail!(
                "[coquiTTS] unable to generate sample ({}): {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            );
        }
        Ok(())
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/voice/coqui.rs"]
mod tests;
