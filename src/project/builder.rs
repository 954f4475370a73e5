use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    foundation::{
        core::{Fps, Resolution},
        error::{TavoxError, TavoxResult},
    },
    timeline::event::TimelineEvent,
    voice::{provider::Voice, registry::VoiceRegistry},
};

/// A fully authored presentation, ready for compilation.
#[derive(Clone, Debug)]
pub struct Project {
    /// Output resolution.
    pub resolution: Resolution,
    /// Always [`Fps::PROJECT`].
    pub fps: Fps,
    /// Authored events in order.
    pub timeline: Vec<TimelineEvent>,
}

impl Project {
    /// Empty project at `resolution`.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            fps: Fps::PROJECT,
            timeline: Vec::new(),
        }
    }

    /// Distinct PDFs referenced by slide events, in order of first use.
    pub fn all_pdfs(&self) -> Vec<&Path> {
        let mut out: Vec<&Path> = Vec::new();
        for ev in &self.timeline {
            let pdf = match ev {
                TimelineEvent::ShowSlide { pdf, .. } | TimelineEvent::ShowSlideRange { pdf, .. } => {
                    pdf.as_path()
                }
                _ => continue,
            };
            if !out.contains(&pdf) {
                out.push(pdf);
            }
        }
        out
    }
}

/// Stateful authoring surface: tracks the current PDF, slide cursor and voice while appending
/// events to the timeline.
pub struct ProjectBuilder {
    registry: VoiceRegistry,
    base_dir: PathBuf,
    resolution: Resolution,
    current_pdf: Option<PathBuf>,
    current_slide: u32,
    current_voice: Option<Voice>,
    timeline: Vec<TimelineEvent>,
}

impl ProjectBuilder {
    /// Builder resolving relative paths against `base_dir`.
    ///
    /// The initial voice is whatever `default` resolves to in `registry`, if anything.
    pub fn new(registry: VoiceRegistry, base_dir: impl AsRef<Path>) -> TavoxResult<Self> {
        let base_dir = std::path::absolute(base_dir.as_ref()).map_err(|e| {
            TavoxError::configuration(format!(
                "cannot resolve base directory '{}': {e}",
                base_dir.as_ref().display()
            ))
        })?;
        let current_voice = registry.get("default").ok();
        Ok(Self {
            registry,
            base_dir,
            resolution: Resolution::default(),
            current_pdf: None,
            current_slide: 1,
            current_voice,
            timeline: Vec::new(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Change the directory relative paths are resolved against. Returns the previous one.
    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) -> PathBuf {
        std::mem::replace(&mut self.base_dir, dir.into())
    }

    pub fn registry(&self) -> &VoiceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut VoiceRegistry {
        &mut self.registry
    }

    pub fn timeline(&self) -> &[TimelineEvent] {
        &self.timeline
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn current_pdf(&self) -> TavoxResult<PathBuf> {
        self.current_pdf
            .clone()
            .ok_or_else(|| TavoxError::configuration("no PDF set"))
    }

    /// Select the PDF subsequent slide commands refer to.
    pub fn set_pdf(&mut self, path: impl AsRef<Path>) -> TavoxResult<()> {
        let abs = self.absolute(path.as_ref());
        if !abs.is_file() {
            return Err(TavoxError::configuration(format!(
                "PDF file '{}' does not exist",
                abs.display()
            )));
        }
        self.current_pdf = Some(abs);
        Ok(())
    }

    /// Show page `slide` (1-based) of the current PDF.
    pub fn show_slide(&mut self, slide: u32) -> TavoxResult<()> {
        let pdf = self.current_pdf()?;
        if slide == 0 {
            return Err(TavoxError::configuration("slide numbers start at 1"));
        }
        self.current_slide = slide;
        self.timeline.push(TimelineEvent::ShowSlide { pdf, slide });
        Ok(())
    }

    /// Show the page after the most recently shown one.
    pub fn show_next_slide(&mut self) -> TavoxResult<()> {
        let pdf = self.current_pdf()?;
        self.current_slide = self
            .current_slide
            .checked_add(1)
            .ok_or_else(|| TavoxError::configuration("no slide after page 4294967295"))?;
        self.timeline.push(TimelineEvent::ShowSlide {
            pdf,
            slide: self.current_slide,
        });
        Ok(())
    }

    /// Show pages `start..=end`; their screen time is split across the following audio.
    pub fn show_slide_range(&mut self, start: u32, end: u32) -> TavoxResult<()> {
        let pdf = self.current_pdf()?;
        if start == 0 || start > end {
            return Err(TavoxError::configuration(format!(
                "invalid slide range {start}..={end}"
            )));
        }
        self.current_slide = end;
        self.timeline
            .push(TimelineEvent::ShowSlideRange { pdf, start, end });
        Ok(())
    }

    /// Bind subsequent `speak` calls to the registered voice `name`.
    pub fn set_voice(&mut self, name: &str) -> TavoxResult<()> {
        self.current_voice = Some(self.registry.get(name)?);
        Ok(())
    }

    pub fn set_voice_handle(&mut self, voice: Voice) {
        self.current_voice = Some(voice);
    }

    pub fn speak(&mut self, text: impl Into<String>) -> TavoxResult<()> {
        let voice = self
            .current_voice
            .clone()
            .ok_or_else(|| TavoxError::configuration("no voice set"))?;
        self.timeline.push(TimelineEvent::Speak {
            text: text.into(),
            voice,
        });
        Ok(())
    }

    /// Pause for `seconds`. A zero delay adds nothing.
    pub fn delay(&mut self, seconds: f64) -> TavoxResult<()> {
        let duration = Duration::try_from_secs_f64(seconds).map_err(|_| {
            TavoxError::configuration(format!("invalid delay of {seconds} seconds"))
        })?;
        if !duration.is_zero() {
            self.timeline.push(TimelineEvent::Delay { duration });
        }
        Ok(())
    }

    pub fn play_audio(&mut self, path: impl AsRef<Path>) -> TavoxResult<()> {
        let abs = self.absolute(path.as_ref());
        if !abs.is_file() {
            return Err(TavoxError::configuration(format!(
                "audio file '{}' does not exist",
                abs.display()
            )));
        }
        self.timeline.push(TimelineEvent::PlayAudio { path: abs });
        Ok(())
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) -> TavoxResult<()> {
        self.resolution = Resolution::new(width, height)?;
        Ok(())
    }

    pub fn finish(self) -> Project {
        Project {
            resolution: self.resolution,
            fps: Fps::PROJECT,
            timeline: self.timeline,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/builder.rs"]
mod tests;
