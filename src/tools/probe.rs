use std::path::Path;

use crate::foundation::error::{TavoxError, TavoxResult};

/// Measures the playing time of an audio file.
pub trait AudioProbe {
    /// Duration of `path` in seconds.
    fn duration_secs(&self, path: &Path) -> TavoxResult<f64>;
}

/// `ffprobe` from FFmpeg.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ffprobe;

impl AudioProbe for Ffprobe {
    fn duration_secs(&self, path: &Path) -> TavoxResult<f64> {
        let ffprobe = super::render::find_tool("ffprobe")
            .ok_or_else(|| TavoxError::tool("ffprobe not found"))?;
        let out = std::process::Command::new(&ffprobe)
            .arg("-i")
            .arg(path)
            .args(["-show_entries", "format=duration", "-v", "quiet", "-of", "csv=p=0"])
            .output()
            .map_err(|e| TavoxError::tool(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(TavoxError::tool(format!(
                "ffprobe failed for '{}': {}",
                path.display(),
                super::stderr_excerpt(&out)
            )));
        }
        parse_duration(&String::from_utf8_lossy(&out.stdout)).map_err(|e| {
            TavoxError::tool(format!("ffprobe output for '{}': {e}", path.display()))
        })
    }
}

/// Parse ffprobe's `csv=p=0` duration output.
pub(crate) fn parse_duration(stdout: &str) -> TavoxResult<f64> {
    let s = stdout.trim();
    let secs: f64 = s
        .parse()
        .map_err(|_| TavoxError::tool(format!("not a duration: {s:?}")))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(TavoxError::tool(format!("not a duration: {s:?}")));
    }
    Ok(secs)
}

#[cfg(test)]
#[path = "../../tests/unit/tools/probe.rs"]
mod tests;
