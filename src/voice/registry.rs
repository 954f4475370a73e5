use std::collections::BTreeMap;

use crate::{
    foundation::error::{TavoxError, TavoxResult},
    voice::{coqui::CoquiTts, provider::Voice},
};

/// What a registry name points at.
#[derive(Clone, Debug)]
pub enum VoiceEntry {
    /// A concrete provider.
    Provider(Voice),
    /// Another registered name.
    Alias(String),
}

/// Name → voice table, owned by the caller and handed to the project builder.
#[derive(Clone, Debug, Default)]
pub struct VoiceRegistry {
    entries: BTreeMap<String, VoiceEntry>,
}

#[cfg(feature = "openai")]
const OPENAI_VOICES: [&str; 9] = [
    "alloy", "ash", "coral", "echo", "fable", "nova", "onyx", "sage", "shimmer",
];
#[cfg(feature = "openai")]
const OPENAI_MODELS: [&str; 3] = ["tts-1", "tts-1-hd", "gpt-4o-mini-tts"];

impl VoiceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the stock voices and a `default` alias.
    pub fn with_builtin_voices() -> TavoxResult<Self> {
        let mut reg = Self::new();
        reg.register_builtins()?;
        Ok(reg)
    }

    fn register_builtins(&mut self) -> TavoxResult<()> {
        #[cfg(feature = "openai")]
        for v in OPENAI_VOICES {
            for model in OPENAI_MODELS {
                self.register_provider(
                    format!("{v}_{model}"),
                    Voice::new(crate::voice::openai::OpenAiVoice::new(v, model)),
                )?;
            }
            self.register_alias(v, format!("{v}_tts-1"))?;
        }

        self.register_provider(
            "tacotron2-DDC",
            Voice::new(CoquiTts::new("tts_models/en/ljspeech/tacotron2-DDC")),
        )?;
        self.register_provider(
            "tacotron2",
            Voice::new(CoquiTts::new("tts_models/en/ek1/tacotron2")),
        )?;
        self.register_alias("default", "tacotron2-DDC")
    }

    /// Register `entry` under `name`.
    ///
    /// Names are unique, a provider id may only be registered once, and aliases must point at an
    /// existing name other than themselves.
    pub fn register(&mut self, name: impl Into<String>, entry: VoiceEntry) -> TavoxResult<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(TavoxError::configuration(format!(
                "there already is a voice with the name '{name}'; deregister it or choose a different name"
            )));
        }

        match &entry {
            VoiceEntry::Provider(voice) => {
                let clash = self.entries.iter().find(|(_, e)| {
                    matches!(e, VoiceEntry::Provider(existing) if existing == voice)
                });
                if let Some((other, _)) = clash {
                    return Err(TavoxError::configuration(format!(
                        "a voice with id '{}' is already registered as '{other}'",
                        voice.id()
                    )));
                }
            }
            VoiceEntry::Alias(target) => {
                if *target == name {
                    return Err(TavoxError::configuration(format!(
                        "voice '{name}' cannot reference itself"
                    )));
                }
                if !self.entries.contains_key(target) {
                    return Err(TavoxError::configuration(format!(
                        "there is no voice with the name '{target}'"
                    )));
                }
            }
        }

        self.entries.insert(name, entry);
        Ok(())
    }

    /// Shorthand for registering a provider.
    pub fn register_provider(&mut self, name: impl Into<String>, voice: Voice) -> TavoxResult<()> {
        self.register(name, VoiceEntry::Provider(voice))
    }

    /// Shorthand for registering an alias.
    pub fn register_alias(
        &mut self,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> TavoxResult<()> {
        self.register(name, VoiceEntry::Alias(target.into()))
    }

    /// Remove `name`. Aliases pointing at it become dangling and fail on lookup.
    pub fn deregister(&mut self, name: &str) -> TavoxResult<()> {
        self.entries.remove(name).map(|_| ()).ok_or_else(|| {
            TavoxError::configuration(format!("there is no voice with the name '{name}'"))
        })
    }

    /// Resolve `name`, following aliases.
    pub fn get(&self, name: &str) -> TavoxResult<Voice> {
        let mut current = name;
        for _ in 0..=self.entries.len() {
            match self.entries.get(current) {
                Some(VoiceEntry::Provider(v)) => return Ok(v.clone()),
                Some(VoiceEntry::Alias(target)) => current = target,
                None => {
                    return Err(TavoxError::configuration(format!(
                        "voice '{name}' does not exist"
                    )));
                }
            }
        }
        Err(TavoxError::configuration(format!(
            "voice '{name}' is part of an alias cycle"
        )))
    }

    /// Registered names in sorted order.
    pub fn available_voices(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/voice/registry.rs"]
mod tests;
