use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::voice::provider::Voice;

/// One authored presentation command.
///
/// Order in the timeline is significant: audio events are attached to the visual event that
/// precedes them. Compiler stages rebuild the whole timeline; they never patch events in place.
#[derive(Clone, Debug, PartialEq)]
pub enum TimelineEvent {
    /// Show page `slide` (1-based) of `pdf`.
    ShowSlide {
        pdf: PathBuf,
        slide: u32,
    },
    /// Show pages `start..=end` of `pdf`, sharing the screen time of the following audio.
    ShowSlideRange {
        pdf: PathBuf,
        start: u32,
        end: u32,
    },
    /// Narrate `text` with `voice`.
    Speak {
        text: String,
        /// Voice bound when the command was authored.
        voice: Voice,
    },
    Delay {
        duration: Duration,
    },
    PlayAudio {
        path: PathBuf,
    },
    ShowImage {
        path: PathBuf,
    },
    ShowImageRange {
        frames: Vec<StillFrame>,
    },
}

impl TimelineEvent {
    /// True for events that occupy the video track.
    pub fn is_visual(&self) -> bool {
        matches!(self, Self::ShowImage { .. } | Self::ShowImageRange { .. })
    }

    /// Short variant name for log and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShowSlide { .. } => "ShowSlide",
            Self::ShowSlideRange { .. } => "ShowSlideRange",
            Self::Speak { .. } => "Speak",
            Self::Delay { .. } => "Delay",
            Self::PlayAudio { .. } => "PlayAudio",
            Self::ShowImage { .. } => "ShowImage",
            Self::ShowImageRange { .. } => "ShowImageRange",
        }
    }
}

impl fmt::Display for TimelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowSlide { pdf, slide } => {
                write!(f, "ShowSlide({}, {slide})", file_name(pdf))
            }
            Self::ShowSlideRange { pdf, start, end } => {
                write!(f, "ShowSlideRange({}, {start}..={end})", file_name(pdf))
            }
            Self::Speak { text, voice } => write!(f, "Speak({}, {text:?})", voice.id()),
            Self::Delay { duration } => write!(f, "Delay({duration:?})"),
            Self::PlayAudio { path } => write!(f, "PlayAudio({})", path.display()),
            Self::ShowImage { path } => write!(f, "ShowImage({})", path.display()),
            Self::ShowImageRange { frames } => {
                write!(f, "ShowImageRange[")?;
                for (i, fr) in frames.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", file_name(&fr.image))?;
                    if !fr.is_auto() {
                        write!(f, " ({:?})", fr.duration)?;
                    }
                }
                write!(f, "]")
            }
        }
    }
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| p.display().to_string())
}

/// One image inside a [`TimelineEvent::ShowImageRange`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StillFrame {
    pub image: PathBuf,
    /// Screen time; zero means "auto" (inferred from the accompanying audio).
    pub duration: Duration,
}

impl StillFrame {
    pub fn auto(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            duration: Duration::ZERO,
        }
    }

    pub fn timed(image: impl Into<PathBuf>, duration: Duration) -> Self {
        Self {
            image: image.into(),
            duration,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.duration.is_zero()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/event.rs"]
mod tests;
