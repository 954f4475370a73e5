//! tavox compiles narrated slide presentations into MLT video projects.
//!
//! A presentation is authored as a sequence of commands (show a PDF page, speak some text,
//! pause, play an audio file) through a [`ProjectBuilder`], typically driven by a JSON script.
//! [`compile_project`] then:
//!
//! - rasterizes the referenced PDFs,
//! - synthesizes speech through a content-addressed [`SampleCache`],
//! - times every slide by the audio that follows it,
//! - writes a three-track MLT document that `melt` or Shotcut can render.
#![forbid(unsafe_code)]

mod foundation;

pub mod cache;
pub mod compile;
pub mod mlt;
pub mod project;
pub mod timeline;
pub mod tools;
pub mod voice;

pub use crate::foundation::core::{Fps, Resolution, Timecode};
pub use crate::foundation::error::{TavoxError, TavoxResult};

pub use crate::cache::sample_cache::{SampleCache, hash_text};
pub use crate::compile::opts::{CompileOpts, RemainderPlacement};
pub use crate::compile::pipeline::{CompileReport, compile_project};
pub use crate::project::builder::{Project, ProjectBuilder};
pub use crate::project::script::{ScriptCommand, VoiceSpec, run_script};
pub use crate::timeline::event::{StillFrame, TimelineEvent};
pub use crate::tools::{
    Collaborators,
    pdf::{PdfRasterizer, Pdftoppm},
    probe::{AudioProbe, Ffprobe},
};
pub use crate::voice::coqui::CoquiTts;
#[cfg(feature = "openai")]
pub use crate::voice::openai::{OpenAiVoice, OpenAiVoiceOpts};
pub use crate::voice::provider::{Voice, VoiceProvider};
pub use crate::voice::registry::{VoiceEntry, VoiceRegistry};
