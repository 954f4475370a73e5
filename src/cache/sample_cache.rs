use std::{
    fs,
    io::Write as _,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::Context as _;
use sha2::Digest as _;

use crate::{
    foundation::error::{TavoxError, TavoxResult},
    voice::provider::{Voice, preview},
};

/// Extensions a provider may produce and the lookup recognises as audio.
pub const AUDIO_EXTENSIONS: [&str; 5] = ["wav", "flac", "mp3", "ogg", "opus"];

/// Function mapping sample text to its store key.
pub type TextHasher = fn(&str) -> String;

/// Hex SHA-256 of the UTF-8 text; the default store key.
pub fn hash_text(text: &str) -> String {
    let digest = sha2::Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// On-disk sample store.
///
/// Layout below the root:
///
/// ```text
/// <voice-id>.info              provider metadata, written once
/// <voice-id>/<hash>.<ext>      audio
/// <voice-id>/<hash>.text       original text, checked on every hit
/// <voice-id>/<hash>.last_used  timestamp of the last hit
/// ```
///
/// New samples are staged in a scratch directory under the root and renamed into place, so a
/// concurrent reader never sees a partial file. Entries are never deleted.
#[derive(Clone, Debug)]
pub struct SampleCache {
    root: PathBuf,
    hasher: TextHasher,
}

struct EntryPaths {
    dir: PathBuf,
    hash: String,
    text_file: PathBuf,
    last_used: PathBuf,
    info: PathBuf,
}

impl SampleCache {
    /// Open (and create if needed) the store at `root`.
    pub fn open(root: impl Into<PathBuf>) -> TavoxResult<Self> {
        Self::with_hasher(root, hash_text)
    }

    /// Open the store with a custom key function.
    pub fn with_hasher(root: impl Into<PathBuf>, hasher: TextHasher) -> TavoxResult<Self> {
        let root = root.into();
        // Sample paths end up verbatim in project documents, which melt resolves relative to
        // the document itself.
        let root = std::path::absolute(&root)
            .with_context(|| format!("resolve sample cache '{}'", root.display()))?;
        fs::create_dir_all(&root)
            .with_context(|| format!("create sample cache '{}'", root.display()))?;
        Ok(Self { root, hasher })
    }

    /// `~/.tavox_cache`, if a home directory is known.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".tavox_cache"))
    }

    /// Store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry(&self, text: &str, voice: &Voice) -> EntryPaths {
        let hash = (self.hasher)(text);
        let dir = self.root.join(voice.id());
        EntryPaths {
            text_file: dir.join(format!("{hash}.text")),
            last_used: dir.join(format!("{hash}.last_used")),
            info: self.root.join(format!("{}.info", voice.id())),
            dir,
            hash,
        }
    }

    /// Audio file for `(text, voice)`, synthesizing it on a miss.
    ///
    /// A stored entry whose text differs from `text` (hash collision) counts as a miss and is
    /// replaced.
    pub fn resolve(&self, text: &str, voice: &Voice) -> TavoxResult<PathBuf> {
        if let Some(hit) = self.lookup(text, voice)? {
            tracing::debug!("sample cache hit: {}", hit.display());
            return Ok(hit);
        }

        self.insert(text, voice)?;
        self.lookup(text, voice)?.ok_or_else(|| {
            TavoxError::integrity(format!(
                "sample \"{}\" for voice '{}' is missing from the store right after synthesis",
                preview(text, 40),
                voice.id()
            ))
        })
    }

    /// Cached audio for `(text, voice)` without synthesizing.
    pub fn lookup(&self, text: &str, voice: &Voice) -> TavoxResult<Option<PathBuf>> {
        let entry = self.entry(text, voice);
        let stored = match fs::read_to_string(&entry.text_file) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read '{}'", entry.text_file.display()))
                    .into());
            }
        };
        if stored != text {
            tracing::warn!(
                "hash collision in sample cache ({}): stored text differs, resynthesizing",
                entry.text_file.display()
            );
            return Ok(None);
        }

        let Some(audio) = newest_audio_file(&entry.dir, &entry.hash)? else {
            tracing::debug!("text without audio in sample cache: {}", entry.text_file.display());
            return Ok(None);
        };

        let stamp = chrono::Local::now().to_rfc3339();
        if let Err(e) = fs::write(&entry.last_used, stamp) {
            tracing::warn!(
                "failed to update '{}': {e}",
                entry.last_used.display()
            );
        }
        Ok(Some(audio))
    }

    fn insert(&self, text: &str, voice: &Voice) -> TavoxResult<PathBuf> {
        let entry = self.entry(text, voice);

        let scratch = tempfile::Builder::new()
            .prefix(".tavox_")
            .tempdir_in(&self.root)
            .with_context(|| format!("create scratch dir in '{}'", self.root.display()))?;

        if let Err(e) = voice.provider().synthesize(text, scratch.path()) {
            tracing::error!(
                "unable to synthesize sample \"{}\" with voice {}",
                preview(text, 40),
                voice.id()
            );
            return Err(TavoxError::synthesis(voice.id(), e));
        }

        let produced = fs::read_dir(scratch.path())
            .with_context(|| format!("list '{}'", scratch.path().display()))?
            .map(|e| e.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .context("list synthesized files")?;
        let [sample] = produced.as_slice() else {
            return Err(TavoxError::integrity(format!(
                "voice '{}' produced {} files, expected exactly one",
                voice.id(),
                produced.len()
            )));
        };

        let ext = full_extension(sample)
            .filter(|ext| {
                let last = ext.rsplit('.').next().unwrap_or_default();
                AUDIO_EXTENSIONS.contains(&last.to_ascii_lowercase().as_str())
            })
            .ok_or_else(|| {
                TavoxError::integrity(format!(
                    "voice '{}' produced '{}', which is not a recognised audio file",
                    voice.id(),
                    sample.display()
                ))
            })?;

        fs::create_dir_all(&entry.dir)
            .with_context(|| format!("create '{}'", entry.dir.display()))?;

        if let Some(meta) = voice.provider().metadata() {
            if !entry.info.exists() {
                write_atomic(&entry.info, meta.as_bytes())?;
            }
        }

        let dest = entry.dir.join(format!("{}{ext}", entry.hash));
        fs::rename(sample, &dest).with_context(|| {
            format!("move '{}' to '{}'", sample.display(), dest.display())
        })?;
        // The text file marks the entry as complete, so it goes in last.
        write_atomic(&entry.text_file, text.as_bytes())?;

        tracing::debug!("stored sample {}", dest.display());
        Ok(dest)
    }
}

/// Everything after the first `.` of the file name, including the dot (`.wav`, `.tar.gz`).
fn full_extension(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let idx = name.find('.')?;
    Some(name[idx..].to_string())
}

fn newest_audio_file(dir: &Path, hash: &str) -> TavoxResult<Option<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("list '{}'", dir.display()))
                .into());
        }
    };

    let prefix = format!("{hash}.");
    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.with_context(|| format!("list '{}'", dir.display()))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(&prefix) {
            continue;
        }
        let is_audio = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if !is_audio {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if best.as_ref().is_none_or(|(t, _)| modified >= *t) {
            best = Some((modified, path));
        }
    }
    Ok(best.map(|(_, p)| p))
}

fn write_atomic(dest: &Path, bytes: &[u8]) -> TavoxResult<()> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in '{}'", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("write '{}'", tmp.path().display()))?;
    tmp.persist(dest)
        .map_err(|e| anyhow::Error::new(e.error))
        .with_context(|| format!("persist '{}'", dest.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/cache/sample_cache.rs"]
mod tests;
