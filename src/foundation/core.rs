use std::{fmt, time::Duration};

use crate::foundation::error::{TavoxError, TavoxResult};

/// Integer frame rate. Projects are always compiled at [`Fps::PROJECT`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Fps(u32);

impl Fps {
    /// The fixed frame rate of every compiled project.
    pub const PROJECT: Fps = Fps(25);

    /// Build a frame rate; `0` is rejected.
    pub fn new(frames_per_sec: u32) -> TavoxResult<Self> {
        if frames_per_sec == 0 {
            return Err(TavoxError::configuration("fps must be > 0"));
        }
        Ok(Self(frames_per_sec))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn frame_duration(self) -> Duration {
        Duration::from_secs(1) / self.0
    }

    /// Whole frames covered by `secs` seconds (truncating). Negative or NaN input yields 0.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * f64::from(self.0)).floor().max(0.0) as u64
    }

    /// Whole frames covered by `d` (truncating), computed in integer nanoseconds.
    pub fn duration_to_frames(self, d: Duration) -> u64 {
        (d.as_nanos() * u128::from(self.0) / 1_000_000_000) as u64
    }

    pub fn frames_to_duration(self, frames: u64) -> Duration {
        let nanos = u128::from(frames) * 1_000_000_000 / u128::from(self.0);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    pub fn timecode(self, frames: u64) -> Timecode {
        Timecode { frames, fps: self }
    }
}

/// Frame offset rendered as `<whole-seconds>:<frame-within-second>`.
///
/// This is the notation the project renderer expects for playlist entry bounds; it is not an
/// hours:minutes:seconds clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timecode {
    frames: u64,
    fps: Fps,
}

impl Timecode {
    /// Inclusive end bound of an entry that lasts `duration` frames (`duration - 1`).
    ///
    /// Returns `None` for a zero-length entry, which has no inclusive end.
    pub fn inclusive_end(fps: Fps, duration: u64) -> Option<Self> {
        duration.checked_sub(1).map(|f| fps.timecode(f))
    }

    pub fn frames(self) -> u64 {
        self.frames
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = u64::from(self.fps.get());
        write!(f, "{}:{}", self.frames / fps, self.frames % fps)
    }
}

/// Output resolution in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Build a resolution; both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> TavoxResult<Self> {
        if width == 0 || height == 0 {
            return Err(TavoxError::configuration(
                "resolution width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Display aspect ratio in lowest terms, with 8:5 expressed as 16:10.
    pub fn aspect_ratio(self) -> (u32, u32) {
        crate::foundation::math::display_aspect_ratio(self.width, self.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
