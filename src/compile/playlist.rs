//! Producer declaration and frame-accurate track synthesis.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    compile::opts::RemainderPlacement,
    foundation::{
        core::Fps,
        error::{TavoxError, TavoxResult},
    },
    timeline::event::{StillFrame, TimelineEvent},
    tools::probe::AudioProbe,
};

/// What a producer renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProducerKind {
    Image,
    Audio,
}

/// A named media resource of the project document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Producer {
    pub id: String,
    pub resource: PathBuf,
    pub kind: ProducerKind,
}

/// One producer per distinct resource, in order of first reference.
#[derive(Clone, Debug, Default)]
pub struct ProducerTable {
    producers: Vec<Producer>,
    by_path: HashMap<PathBuf, usize>,
}

impl ProducerTable {
    /// Declare a producer for every resource `timeline` references.
    ///
    /// Ids are `producer<event index>_<file name>` of the first referencing event.
    pub fn from_timeline(timeline: &[TimelineEvent]) -> TavoxResult<Self> {
        tracing::info!("creating producers");
        let mut table = Self::default();
        for (idx, ev) in timeline.iter().enumerate() {
            match ev {
                TimelineEvent::ShowImage { path } => table.declare(idx, path, ProducerKind::Image),
                TimelineEvent::ShowImageRange { frames } => {
                    for f in frames {
                        table.declare(idx, &f.image, ProducerKind::Image);
                    }
                }
                TimelineEvent::PlayAudio { path } => table.declare(idx, path, ProducerKind::Audio),
                TimelineEvent::Delay { .. } => {}
                other => {
                    return Err(TavoxError::structural(format!(
                        "{} event #{idx} reached producer creation unresolved",
                        other.kind()
                    )));
                }
            }
        }
        Ok(table)
    }

    fn declare(&mut self, idx: usize, path: &Path, kind: ProducerKind) {
        if self.by_path.contains_key(path) {
            return;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = format!("producer{idx}_{name}");
        let mut id = base.clone();
        let mut n = 1;
        while self.producers.iter().any(|p| p.id == id) {
            id = format!("{base}_{n}");
            n += 1;
        }
        self.by_path.insert(path.to_path_buf(), self.producers.len());
        self.producers.push(Producer {
            id,
            resource: path.to_path_buf(),
            kind,
        });
    }

    /// Id of the producer declared for `path`.
    pub fn id_of(&self, path: &Path) -> TavoxResult<&str> {
        self.by_path
            .get(path)
            .map(|&i| self.producers[i].id.as_str())
            .ok_or_else(|| {
                TavoxError::structural(format!("no producer declared for '{}'", path.display()))
            })
    }

    pub fn producers(&self) -> &[Producer] {
        &self.producers
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

/// A producer played for `frames` frames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub producer: String,
    pub frames: u64,
}

/// Audio track item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioItem {
    Blank { frames: u64 },
    Entry(PlaylistEntry),
}

/// Video and audio track contents plus the total project length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tracks {
    pub video: Vec<PlaylistEntry>,
    pub audio: Vec<AudioItem>,
    pub total_frames: u64,
}

/// Split `target` frames across a range whose frames have the given explicit lengths (`0` marks
/// an auto frame).
///
/// Auto frames share the time not claimed by explicit frames equally; the rounding remainder
/// goes where `placement` says. The result always sums to `target`.
pub fn distribute_frames(
    explicit: &[u64],
    target: u64,
    placement: RemainderPlacement,
) -> TavoxResult<Vec<u64>> {
    let claimed: u64 = explicit.iter().sum();
    let autos = explicit.iter().filter(|&&f| f == 0).count() as u64;

    if autos == 0 {
        if claimed != target {
            return Err(TavoxError::timing(format!(
                "explicit durations do not match target ({claimed} != {target} frames)"
            )));
        }
        return Ok(explicit.to_vec());
    }
    if claimed >= target {
        return Err(TavoxError::timing(format!(
            "no room left for auto frames ({claimed} of {target} frames already claimed)"
        )));
    }

    let base = (target - claimed) / autos;
    let remainder = target - claimed - base * autos;
    let mut out: Vec<u64> = explicit
        .iter()
        .map(|&f| if f == 0 { base } else { f })
        .collect();

    let slot = match placement {
        RemainderPlacement::LastFrame => out.len().checked_sub(1),
        RemainderPlacement::LastAutoFrame => explicit.iter().rposition(|&f| f == 0),
    };
    if let Some(i) = slot {
        out[i] += remainder;
    }
    Ok(out)
}

/// Compute both tracks.
///
/// Audio (speech, delays, audio files) following a visual event determines how long that visual
/// event stays on screen.
#[tracing::instrument(skip_all, fields(events = timeline.len()))]
pub fn synthesize_tracks(
    timeline: &[TimelineEvent],
    producers: &ProducerTable,
    probe: &dyn AudioProbe,
    fps: Fps,
    placement: RemainderPlacement,
) -> TavoxResult<Tracks> {
    tracing::info!("creating playlists");
    let Some((first, rest)) = timeline.split_first() else {
        return Err(TavoxError::structural("timeline is empty"));
    };
    if !first.is_visual() {
        return Err(TavoxError::structural(format!(
            "first timeline entry must be a visual event, found {}",
            first.kind()
        )));
    }

    let mut tracks = Tracks::default();
    let mut current = first;
    let mut held: u64 = 0;

    for ev in rest {
        match ev {
            TimelineEvent::Delay { duration } => {
                let frames = fps.duration_to_frames(*duration);
                held += frames;
                if frames == 0 {
                    tracing::warn!("skipping delay shorter than one frame ({duration:?})");
                } else {
                    tracks.audio.push(AudioItem::Blank { frames });
                }
            }
            TimelineEvent::PlayAudio { path } => {
                let frames = fps.secs_to_frames_floor(probe.duration_secs(path)?);
                held += frames;
                if frames == 0 {
                    tracing::warn!("skipping audio shorter than one frame: {}", path.display());
                } else {
                    tracks.audio.push(AudioItem::Entry(PlaylistEntry {
                        producer: producers.id_of(path)?.to_string(),
                        frames,
                    }));
                }
            }
            next if next.is_visual() => {
                finalize(current, held, producers, fps, placement, &mut tracks)?;
                current = next;
                held = 0;
            }
            other => {
                return Err(TavoxError::structural(format!(
                    "unexpected {} event while creating playlists",
                    other.kind()
                )));
            }
        }
    }
    finalize(current, held, producers, fps, placement, &mut tracks)?;

    if tracks.total_frames == 0 {
        return Err(TavoxError::structural(
            "project has a total length of zero frames; nothing to render",
        ));
    }
    Ok(tracks)
}

fn finalize(
    event: &TimelineEvent,
    target: u64,
    producers: &ProducerTable,
    fps: Fps,
    placement: RemainderPlacement,
    tracks: &mut Tracks,
) -> TavoxResult<()> {
    match event {
        TimelineEvent::ShowImage { path } => {
            push_video(tracks, producers.id_of(path)?, target, path);
        }
        TimelineEvent::ShowImageRange { frames } => {
            let explicit: Vec<u64> = frames
                .iter()
                .map(|f| fps.duration_to_frames(f.duration))
                .collect();
            let lengths = distribute_frames(&explicit, target, placement)?;
            for (StillFrame { image, .. }, len) in frames.iter().zip(lengths) {
                push_video(tracks, producers.id_of(image)?, len, image);
            }
        }
        other => {
            return Err(TavoxError::structural(format!(
                "{} is not a visual event",
                other.kind()
            )));
        }
    }
    tracks.total_frames += target;
    Ok(())
}

fn push_video(tracks: &mut Tracks, producer: &str, frames: u64, image: &Path) {
    if frames == 0 {
        tracing::warn!(
            "{} would be shown for zero frames; leaving it out",
            image.display()
        );
        return;
    }
    tracks.video.push(PlaylistEntry {
        producer: producer.to_string(),
        frames,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/compile/playlist.rs"]
mod tests;
