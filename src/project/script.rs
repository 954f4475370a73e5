//! JSON presentation scripts.
//!
//! A script is a JSON array of commands, each applied to a [`ProjectBuilder`] in order:
//!
//! ```json
//! [
//!   {"set_pdf": "slides.pdf"},
//!   {"show_slide": 1},
//!   {"speak": "Welcome."},
//!   "show_next_slide",
//!   {"delay": 0.5},
//!   {"show_slide_range": [3, 5]},
//!   {"speak": "Three slides, one sentence."}
//! ]
//! ```
//!
//! Relative paths are resolved against the directory containing the script.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::error::{TavoxError, TavoxResult},
    project::builder::ProjectBuilder,
    voice::{
        coqui::CoquiTts,
        provider::Voice,
        registry::VoiceEntry,
    },
};

/// One script command.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptCommand {
    SetPdf(PathBuf),
    ShowSlide(u32),
    ShowNextSlide,
    ShowSlideRange(u32, u32),
    SetVoice(String),
    Speak(String),
    Delay(f64),
    PlayAudio(PathBuf),
    SetResolution(u32, u32),
    RegisterVoice { name: String, voice: VoiceSpec },
    DeregisterVoice(String),
}

/// Voice definition inside a `register_voice` command.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceSpec {
    /// Another registered name.
    Alias(String),
    /// Local Coqui TTS model name.
    Coqui(String),
    /// OpenAI-compatible speech endpoint.
    OpenAi {
        voice: String,
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instructions: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
    },
}

impl ScriptCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetPdf(_) => "set_pdf",
            Self::ShowSlide(_) => "show_slide",
            Self::ShowNextSlide => "show_next_slide",
            Self::ShowSlideRange(..) => "show_slide_range",
            Self::SetVoice(_) => "set_voice",
            Self::Speak(_) => "speak",
            Self::Delay(_) => "delay",
            Self::PlayAudio(_) => "play_audio",
            Self::SetResolution(..) => "set_resolution",
            Self::RegisterVoice { .. } => "register_voice",
            Self::DeregisterVoice(_) => "deregister_voice",
        }
    }

    /// Apply this command to `builder`.
    pub fn apply(&self, builder: &mut ProjectBuilder) -> TavoxResult<()> {
        match self {
            Self::SetPdf(p) => builder.set_pdf(p),
            Self::ShowSlide(n) => builder.show_slide(*n),
            Self::ShowNextSlide => builder.show_next_slide(),
            Self::ShowSlideRange(a, b) => builder.show_slide_range(*a, *b),
            Self::SetVoice(name) => builder.set_voice(name),
            Self::Speak(text) => builder.speak(text.clone()),
            Self::Delay(secs) => builder.delay(*secs),
            Self::PlayAudio(p) => builder.play_audio(p),
            Self::SetResolution(w, h) => builder.set_resolution(*w, *h),
            Self::RegisterVoice { name, voice } => {
                let entry = voice.to_entry()?;
                builder.registry_mut().register(name.clone(), entry)
            }
            Self::DeregisterVoice(name) => builder.registry_mut().deregister(name),
        }
    }
}

impl VoiceSpec {
    fn to_entry(&self) -> TavoxResult<VoiceEntry> {
        match self {
            Self::Alias(target) => Ok(VoiceEntry::Alias(target.clone())),
            Self::Coqui(model) => Ok(VoiceEntry::Provider(Voice::new(CoquiTts::new(model)))),
            #[cfg(feature = "openai")]
            Self::OpenAi {
                voice,
                model,
                instructions,
                base_url,
                api_key,
            } => {
                let opts = crate::voice::openai::OpenAiVoiceOpts {
                    instructions: instructions.clone(),
                    base_url: base_url.clone(),
                    api_key: api_key.clone(),
                };
                let v = crate::voice::openai::OpenAiVoice::with_options(voice, model, opts)?;
                Ok(VoiceEntry::Provider(Voice::new(v)))
            }
            #[cfg(not(feature = "openai"))]
            Self::OpenAi { .. } => Err(TavoxError::configuration(
                "OpenAI voices require the `openai` feature",
            )),
        }
    }
}

/// Parse the command list of a script.
pub fn parse_script(source: &str) -> TavoxResult<Vec<ScriptCommand>> {
    serde_json::from_str(source)
        .map_err(|e| TavoxError::configuration(format!("invalid script: {e}")))
}

/// Read `path` and apply every command to `builder`.
///
/// The builder's base directory points at the script's directory while the script runs and is
/// restored afterwards, also when a command fails.
pub fn run_script(path: &Path, builder: &mut ProjectBuilder) -> TavoxResult<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("read script '{}'", path.display()))?;
    let commands = parse_script(&source).map_err(|e| in_script(e, path, None))?;

    let script_dir = std::path::absolute(path)
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| builder.base_dir().to_path_buf());
    let previous = builder.set_base_dir(script_dir);

    tracing::debug!("running script {} ({} commands)", path.display(), commands.len());
    let result = commands.iter().enumerate().try_for_each(|(i, cmd)| {
        cmd.apply(builder)
            .map_err(|e| in_script(e, path, Some((i, cmd.name()))))
    });

    builder.set_base_dir(previous);
    result
}

fn in_script(err: TavoxError, path: &Path, command: Option<(usize, &str)>) -> TavoxError {
    let location = match command {
        Some((idx, name)) => format!("{}: command #{idx} ({name})", path.display()),
        None => path.display().to_string(),
    };
    match err {
        TavoxError::Configuration(msg) => {
            TavoxError::Configuration(format!("{location}: {msg}"))
        }
        TavoxError::Integrity(msg) => TavoxError::Integrity(format!("{location}: {msg}")),
        TavoxError::Timing(msg) => TavoxError::Timing(format!("{location}: {msg}")),
        TavoxError::Structural(msg) => TavoxError::Structural(format!("{location}: {msg}")),
        TavoxError::Tool(msg) => TavoxError::Tool(format!("{location}: {msg}")),
        TavoxError::Synthesis { voice, source } => TavoxError::Synthesis {
            voice,
            source: source.context(location),
        },
        TavoxError::Other(e) => TavoxError::Other(e.context(location)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/script.rs"]
mod tests;
