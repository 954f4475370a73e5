//! MLT XML project documents, as read by `melt` and Shotcut.

use std::{fmt, io::Write as _, path::Path};

use anyhow::Context as _;

use crate::{
    compile::playlist::{AudioItem, PlaylistEntry, ProducerKind, ProducerTable, Tracks},
    foundation::{
        core::{Fps, Resolution, Timecode},
        error::{TavoxError, TavoxResult},
    },
};

/// Everything needed to print a project document.
pub struct MltDocument<'a> {
    pub resolution: Resolution,
    pub fps: Fps,
    pub producers: &'a ProducerTable,
    pub tracks: &'a Tracks,
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

impl MltDocument<'_> {
    fn write_entry(&self, f: &mut fmt::Formatter<'_>, entry: &PlaylistEntry) -> fmt::Result {
        // Entries are never empty; the synthesizer drops zero-length ones.
        let out = Timecode::inclusive_end(self.fps, entry.frames).unwrap_or(self.fps.timecode(0));
        writeln!(
            f,
            "      <entry producer=\"{}\" out=\"{out}\"/>",
            escape_xml(&entry.producer)
        )
    }
}

impl fmt::Display for MltDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Resolution { width, height } = self.resolution;
        let (dar_num, dar_den) = self.resolution.aspect_ratio();
        let total = self.tracks.total_frames;
        let last = total.saturating_sub(1);

        writeln!(f, "<?xml version=\"1.0\" standalone=\"no\"?>")?;
        writeln!(f, "<mlt LC_NUMERIC=\"C\" version=\"7.24.0\" producer=\"main_bin\">")?;
        writeln!(
            f,
            "  <profile description=\"Custom\" width=\"{width}\" height=\"{height}\" \
             progressive=\"1\" sample_aspect_num=\"1\" sample_aspect_den=\"1\" \
             display_aspect_num=\"{dar_num}\" display_aspect_den=\"{dar_den}\" \
             frame_rate_num=\"{}\" frame_rate_den=\"1\" colorspace=\"709\"/>",
            self.fps.get()
        )?;
        writeln!(f, "  <playlist id=\"main_bin\">")?;
        writeln!(f, "    <property name=\"xml_retain\">1</property>")?;
        writeln!(f, "  </playlist>")?;

        writeln!(f, "  <producer id=\"black\" in=\"00:00:00.000\" out=\"{last}\">")?;
        writeln!(f, "    <property name=\"length\">{total}</property>")?;
        writeln!(f, "    <property name=\"eof\">pause</property>")?;
        writeln!(f, "    <property name=\"resource\">0</property>")?;
        writeln!(f, "    <property name=\"aspect_ratio\">1</property>")?;
        writeln!(f, "    <property name=\"mlt_service\">color</property>")?;
        writeln!(f, "    <property name=\"mlt_image_format\">rgba</property>")?;
        writeln!(f, "    <property name=\"set.test_audio\">0</property>")?;
        writeln!(f, "  </producer>")?;
        writeln!(f, "  <playlist id=\"background\">")?;
        writeln!(
            f,
            "    <entry producer=\"black\" in=\"00:00:00.000\" out=\"{last}\"/>"
        )?;
        writeln!(f, "  </playlist>")?;

        for p in self.producers.producers() {
            let id = escape_xml(&p.id);
            let resource = escape_xml(&p.resource.to_string_lossy());
            match p.kind {
                // Stills get a long nominal length so any entry fits inside them.
                ProducerKind::Image => {
                    writeln!(
                        f,
                        "  <producer id=\"{id}\" in=\"00:00:00.000\" out=\"03:59:59.960\">"
                    )?;
                    writeln!(f, "    <property name=\"length\">04:00:00.000</property>")?;
                }
                ProducerKind::Audio => writeln!(f, "  <producer id=\"{id}\">")?,
            }
            writeln!(f, "    <property name=\"resource\">{resource}</property>")?;
            writeln!(f, "  </producer>")?;
        }

        writeln!(f, "  <playlist id=\"playlist0\">")?;
        writeln!(f, "    <property name=\"shotcut:video\">1</property>")?;
        writeln!(f, "    <property name=\"shotcut:name\">V1</property>")?;
        for entry in &self.tracks.video {
            self.write_entry(f, entry)?;
        }
        writeln!(f, "  </playlist>")?;

        writeln!(f, "  <playlist id=\"playlist1\">")?;
        writeln!(f, "    <property name=\"shotcut:audio\">1</property>")?;
        writeln!(f, "    <property name=\"shotcut:name\">A1</property>")?;
        for item in &self.tracks.audio {
            match item {
                AudioItem::Blank { frames } => {
                    writeln!(f, "      <blank length=\"{frames}\"/>")?
                }
                AudioItem::Entry(entry) => self.write_entry(f, entry)?,
            }
        }
        writeln!(f, "  </playlist>")?;

        writeln!(f, "  <tractor id=\"tractor0\">")?;
        writeln!(f, "    <property name=\"shotcut\">1</property>")?;
        writeln!(f, "    <property name=\"shotcut:projectAudioChannels\">2</property>")?;
        writeln!(f, "    <property name=\"shotcut:projectFolder\">0</property>")?;
        writeln!(f, "    <track producer=\"background\"/>")?;
        writeln!(f, "    <track producer=\"playlist0\"/>")?;
        writeln!(f, "    <track producer=\"playlist1\" hide=\"video\"/>")?;
        writeln!(f, "  </tractor>")?;
        writeln!(f, "</mlt>")
    }
}

/// Fail unless `path` is a fresh file name inside an existing directory.
pub fn check_destination(path: &Path) -> TavoxResult<()> {
    if path.exists() {
        return Err(TavoxError::configuration(format!(
            "'{}' already exists",
            path.display()
        )));
    }
    let parent = parent_dir(path);
    if !parent.is_dir() {
        return Err(TavoxError::configuration(format!(
            "directory '{}' does not exist",
            parent.display()
        )));
    }
    Ok(())
}

/// Directory `path` lives in; `.` for a bare file name.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Write `doc` to `path`. Never overwrites and never creates directories.
pub fn write_project(path: &Path, doc: &MltDocument<'_>) -> TavoxResult<()> {
    check_destination(path)?;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => {
                TavoxError::configuration(format!("'{}' already exists", path.display()))
            }
            _ => anyhow::Error::new(e)
                .context(format!("create '{}'", path.display()))
                .into(),
        })?;
    file.write_all(doc.to_string().as_bytes())
        .with_context(|| format!("write '{}'", path.display()))?;
    tracing::info!("wrote project file {}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/mlt/serialize.rs"]
mod tests;
