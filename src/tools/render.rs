//! Rendering a finished project with MLT's `melt`.

use std::{
    collections::BTreeMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::foundation::error::{TavoxError, TavoxResult};

const MELT_NAMES: [&str; 2] = ["mlt-melt", "melt"];
const VIDEO_CODECS: [&str; 2] = ["libx264", "libopenh264"];

/// One line of `ffmpeg -encoders`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoder {
    pub flags: String,
    pub description: String,
}

/// Shotcut bundles melt together with the FFmpeg build it renders with.
const SHOTCUT_DIRS: [(&str, &str); 3] = [
    ("LOCALAPPDATA", "Programs/Shotcut"),
    ("PROGRAMFILES", "Shotcut"),
    ("PROGRAMFILES(X86)", "Shotcut"),
];

fn shotcut_dirs(var: impl Fn(&str) -> Option<OsString>) -> Vec<PathBuf> {
    SHOTCUT_DIRS
        .iter()
        .filter_map(|(name, sub)| var(name).map(|base| PathBuf::from(base).join(sub)))
        .collect()
}

fn find_in(dirs: impl IntoIterator<Item = PathBuf>, exe: &str) -> Option<PathBuf> {
    dirs.into_iter().map(|dir| dir.join(exe)).find(|p| p.is_file())
}

/// Locate an external program. On Windows the Shotcut install directories are searched
/// before `PATH`.
pub(crate) fn find_tool(name: &str) -> Option<PathBuf> {
    let exe = format!("{name}{}", std::env::consts::EXE_SUFFIX);
    if cfg!(windows)
        && let Some(found) = find_in(shotcut_dirs(|v| std::env::var_os(v)), &exe)
    {
        return Some(found);
    }
    let path = std::env::var_os("PATH")?;
    find_in(std::env::split_paths(&path), &exe)
}

/// The MLT command line tool; distributions ship it as `mlt-melt` or `melt`.
pub fn find_melt() -> TavoxResult<PathBuf> {
    let melt = MELT_NAMES.iter().find_map(|n| find_tool(n)).ok_or_else(|| {
        TavoxError::tool("melt not found (is the MLT framework or Shotcut installed?)")
    })?;
    tracing::debug!("using melt binary {}", melt.display());
    Ok(melt)
}

/// Encoders known to the local `ffmpeg`.
pub fn ffmpeg_encoders() -> TavoxResult<BTreeMap<String, Encoder>> {
    let ffmpeg = find_tool("ffmpeg").ok_or_else(|| TavoxError::tool("ffmpeg not found"))?;
    let out = std::process::Command::new(&ffmpeg)
        .args(["-v", "0", "-encoders"])
        .output()
        .map_err(|e| TavoxError::tool(format!("failed to run ffmpeg: {e}")))?;
    if !out.status.success() {
        return Err(TavoxError::tool(format!(
            "ffmpeg -encoders failed: {}",
            super::stderr_excerpt(&out)
        )));
    }
    Ok(parse_encoders(&String::from_utf8_lossy(&out.stdout)))
}

/// Parse the table printed by `ffmpeg -encoders`. Everything up to the `------` separator is
/// legend and skipped.
pub fn parse_encoders(listing: &str) -> BTreeMap<String, Encoder> {
    let mut out = BTreeMap::new();
    let mut in_table = false;
    for line in listing.lines() {
        let trimmed = line.trim();
        if !in_table {
            in_table = trimmed.starts_with('-') && trimmed.chars().all(|c| c == '-');
            continue;
        }
        let Some((flags, rest)) = trimmed.split_once(char::is_whitespace) else {
            continue;
        };
        let Some((name, description)) = rest.trim_start().split_once(char::is_whitespace) else {
            continue;
        };
        if flags.is_empty() || !flags.chars().all(|c| c.is_ascii_uppercase() || c == '.') {
            continue;
        }
        out.insert(
            name.to_string(),
            Encoder {
                flags: flags.to_string(),
                description: description.trim().to_string(),
            },
        );
    }
    out
}

/// Preferred H.264 encoder among `encoders`.
pub fn choose_video_codec(encoders: &BTreeMap<String, Encoder>) -> TavoxResult<&'static str> {
    VIDEO_CODECS
        .into_iter()
        .find(|c| encoders.contains_key(*c))
        .ok_or_else(|| {
            TavoxError::tool(format!(
                "no supported video encoder available (tried {})",
                VIDEO_CODECS.join(", ")
            ))
        })
}

pub(crate) fn melt_args(project: &Path, out: &Path, vcodec: &str) -> Vec<OsString> {
    let mut consumer = OsString::from("avformat:");
    consumer.push(out);
    vec![
        "-progress".into(),
        "-verbose".into(),
        project.into(),
        "-consumer".into(),
        consumer,
        "acodec=flac".into(),
        format!("vcodec={vcodec}").into(),
        "preset=slow".into(),
        "crf=16".into(),
    ]
}

/// Render `project` into the video file `out`.
pub fn render_video(project: &Path, out: &Path) -> TavoxResult<()> {
    let melt = find_melt()?;
    let vcodec = choose_video_codec(&ffmpeg_encoders()?)?;
    tracing::info!("rendering {} with {vcodec}", out.display());

    let status = std::process::Command::new(&melt)
        .args(melt_args(project, out, vcodec))
        .status()
        .map_err(|e| TavoxError::tool(format!("failed to run {}: {e}", melt.display())))?;
    if !status.success() {
        return Err(TavoxError::tool(format!(
            "melt exited with {status} while rendering '{}'",
            project.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/tools/render.rs"]
mod tests;
