//! Timeline rewriting stages. Each one consumes the whole timeline and returns a new one.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    cache::sample_cache::SampleCache,
    foundation::error::{TavoxError, TavoxResult},
    timeline::event::{StillFrame, TimelineEvent},
    tools::pdf::find_page,
    voice::provider::Voice,
};

/// Where the rasterized pages of each PDF live.
#[derive(Clone, Debug, Default)]
pub struct PageIndex {
    dirs: BTreeMap<PathBuf, PathBuf>,
}

impl PageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pdf: impl Into<PathBuf>, dir: impl Into<PathBuf>) {
        self.dirs.insert(pdf.into(), dir.into());
    }

    pub fn dir(&self, pdf: &Path) -> Option<&Path> {
        self.dirs.get(pdf).map(PathBuf::as_path)
    }

    /// Image of page `slide` of `pdf`.
    pub fn page(&self, pdf: &Path, slide: u32) -> TavoxResult<PathBuf> {
        let dir = self.dir(pdf).ok_or_else(|| {
            TavoxError::configuration(format!("PDF '{}' has not been rendered", pdf.display()))
        })?;
        find_page(dir, slide).ok_or_else(|| {
            TavoxError::configuration(format!(
                "slide {slide} of '{}' not found in '{}' (does the PDF have that many pages?)",
                pdf.display(),
                dir.display()
            ))
        })
    }
}

/// Replace slide references with the rendered page images.
pub fn expand_slides(
    timeline: Vec<TimelineEvent>,
    pages: &PageIndex,
) -> TavoxResult<Vec<TimelineEvent>> {
    tracing::info!("processing show slide events");
    timeline
        .into_iter()
        .map(|ev| match ev {
            TimelineEvent::ShowSlide { pdf, slide } => Ok(TimelineEvent::ShowImage {
                path: pages.page(&pdf, slide)?,
            }),
            TimelineEvent::ShowSlideRange { pdf, start, end } => {
                let frames = (start..=end)
                    .map(|slide| pages.page(&pdf, slide).map(StillFrame::auto))
                    .collect::<TavoxResult<Vec<_>>>()?;
                Ok(TimelineEvent::ShowImageRange { frames })
            }
            other => Ok(other),
        })
        .collect()
}

/// Drop a `ShowImage` that repeats the previously shown `ShowImage`.
///
/// Only standalone images are tracked; an image range does not reset or update the comparison,
/// so `ShowImage(x)` after a range ending on `x` is kept.
pub fn remove_redundant_cuts(timeline: Vec<TimelineEvent>) -> Vec<TimelineEvent> {
    tracing::info!("removing unnecessary video cuts");
    let mut last_image: Option<PathBuf> = None;
    let mut out = Vec::with_capacity(timeline.len());
    for ev in timeline {
        if let TimelineEvent::ShowImage { path } = &ev {
            if last_image.as_ref() == Some(path) {
                continue;
            }
            last_image = Some(path.clone());
        }
        out.push(ev);
    }
    out
}

/// Join consecutive `Speak` events of the same voice, separating texts with a single space.
pub fn merge_speech(timeline: Vec<TimelineEvent>) -> Vec<TimelineEvent> {
    tracing::info!("merging speak events");
    let mut out = Vec::with_capacity(timeline.len());
    let mut pending: Option<(String, Voice)> = None;
    for ev in timeline {
        match ev {
            TimelineEvent::Speak { text, voice } => match pending.as_mut() {
                Some((acc, v)) if *v == voice => {
                    acc.push(' ');
                    acc.push_str(&text);
                }
                _ => {
                    flush_speech(&mut pending, &mut out);
                    pending = Some((text, voice));
                }
            },
            other => {
                flush_speech(&mut pending, &mut out);
                out.push(other);
            }
        }
    }
    flush_speech(&mut pending, &mut out);
    out
}

fn flush_speech(pending: &mut Option<(String, Voice)>, out: &mut Vec<TimelineEvent>) {
    if let Some((text, voice)) = pending.take() {
        out.push(TimelineEvent::Speak { text, voice });
    }
}

/// Turn speech into audio playback through the sample cache. Blank speech disappears without
/// leaving a gap.
pub fn resolve_speech(
    timeline: Vec<TimelineEvent>,
    cache: &SampleCache,
) -> TavoxResult<Vec<TimelineEvent>> {
    tracing::info!("processing speak events");
    let mut out = Vec::with_capacity(timeline.len());
    for ev in timeline {
        match ev {
            TimelineEvent::Speak { text, voice } => {
                if text.trim().is_empty() {
                    continue;
                }
                let path = cache.resolve(&text, &voice)?;
                out.push(TimelineEvent::PlayAudio { path });
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/compile/stages.rs"]
mod tests;
