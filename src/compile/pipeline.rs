use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use sha2::{Digest as _, Sha256};

use crate::{
    cache::sample_cache::SampleCache,
    compile::{
        opts::CompileOpts,
        playlist::{ProducerTable, synthesize_tracks},
        stages::{self, PageIndex},
    },
    foundation::{
        core::Resolution,
        error::{TavoxError, TavoxResult},
    },
    mlt::serialize::{self, MltDocument},
    project::builder::Project,
    timeline::event::TimelineEvent,
    tools::{Collaborators, pdf::PdfRasterizer},
};

/// Summary of a finished compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileReport {
    /// The written project document.
    pub project_file: PathBuf,
    pub total_frames: u64,
    pub duration: Duration,
    /// Number of distinct media resources declared.
    pub producers: usize,
}

/// Compile `project` into an MLT document at `out_path`.
///
/// `out_path` must not exist and its directory must. The rasterized slides are stored next to
/// it, one directory per PDF. The document itself is written last, after every stage has
/// succeeded.
#[tracing::instrument(skip_all, fields(out = %out_path.display()))]
pub fn compile_project(
    project: &Project,
    out_path: &Path,
    tools: &Collaborators,
    cache: &SampleCache,
    opts: &CompileOpts,
) -> TavoxResult<CompileReport> {
    serialize::check_destination(out_path)?;
    let project_dir = std::path::absolute(serialize::parent_dir(out_path))
        .context("resolve project directory")?;
    tracing::info!("mlt project file: {}", out_path.display());

    let pages = render_pdfs(
        &project.all_pdfs(),
        &project_dir,
        project.resolution,
        tools.rasterizer.as_ref(),
    )?;

    let mut timeline = stages::expand_slides(project.timeline.clone(), &pages)?;
    dump_timeline("expand_slides", &timeline);
    timeline = stages::remove_redundant_cuts(timeline);
    dump_timeline("remove_redundant_cuts", &timeline);
    if opts.merge_speech {
        timeline = stages::merge_speech(timeline);
        dump_timeline("merge_speech", &timeline);
    }
    timeline = stages::resolve_speech(timeline, cache)?;
    dump_timeline("resolve_speech", &timeline);

    let producers = ProducerTable::from_timeline(&timeline)?;
    let tracks = synthesize_tracks(
        &timeline,
        &producers,
        tools.probe.as_ref(),
        project.fps,
        opts.remainder,
    )?;
    let duration = project.fps.frames_to_duration(tracks.total_frames);
    tracing::info!(
        "total length of video project: {} ({} frames)",
        humantime::format_duration(duration),
        tracks.total_frames
    );

    serialize::write_project(
        out_path,
        &MltDocument {
            resolution: project.resolution,
            fps: project.fps,
            producers: &producers,
            tracks: &tracks,
        },
    )?;

    Ok(CompileReport {
        project_file: out_path.to_path_buf(),
        total_frames: tracks.total_frames,
        duration,
        producers: producers.len(),
    })
}

fn dump_timeline(stage: &str, timeline: &[TimelineEvent]) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    tracing::debug!("timeline after {stage}:");
    for (i, ev) in timeline.iter().enumerate() {
        tracing::debug!("  {i:>4}: {ev}");
    }
}

/// Rasterize every PDF into its own directory under `project_dir`.
///
/// Directories are named after the PDF file; a second PDF with the same file name gets a suffix
/// derived from its full path. None of the directories may exist beforehand.
pub fn render_pdfs(
    pdfs: &[&Path],
    project_dir: &Path,
    resolution: Resolution,
    rasterizer: &dyn PdfRasterizer,
) -> TavoxResult<PageIndex> {
    tracing::info!("project contains {} PDF(s)", pdfs.len());

    let mut planned: Vec<(&Path, PathBuf)> = Vec::with_capacity(pdfs.len());
    for &pdf in pdfs {
        let name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pdf".to_string());
        let mut dest = project_dir.join(&name);
        let mut salt = 0u32;
        while planned.iter().any(|(_, d)| *d == dest) {
            dest = project_dir.join(format!("{name}_{}", path_tag(pdf, salt)));
            salt += 1;
        }
        if dest.exists() {
            return Err(TavoxError::configuration(format!(
                "'{}' already exists in the project directory; put the project file in an \
                 empty directory",
                dest.display()
            )));
        }
        planned.push((pdf, dest));
    }

    let mut pages = PageIndex::new();
    for (pdf, dest) in planned {
        std::fs::create_dir(&dest).with_context(|| format!("create '{}'", dest.display()))?;
        tracing::info!("rendering {} to {}", pdf.display(), dest.display());
        rasterizer.rasterize(pdf, resolution, &dest)?;
        check_page_sizes(&dest, resolution)?;
        pages.insert(pdf, dest);
    }
    Ok(pages)
}

fn path_tag(pdf: &Path, salt: u32) -> String {
    let mut h = Sha256::new();
    h.update(pdf.to_string_lossy().as_bytes());
    h.update(salt.to_le_bytes());
    let digest = h.finalize();
    digest[..6].iter().map(|b| format!("{b:02x}")).collect()
}

fn check_page_sizes(dir: &Path, resolution: Resolution) -> TavoxResult<()> {
    for entry in std::fs::read_dir(dir).with_context(|| format!("list '{}'", dir.display()))? {
        let path = entry.with_context(|| format!("list '{}'", dir.display()))?.path();
        match image::image_dimensions(&path) {
            Ok((w, h)) if (w, h) != (resolution.width, resolution.height) => {
                tracing::warn!(
                    "{} is {w}x{h}, project resolution is {}x{}",
                    path.display(),
                    resolution.width,
                    resolution.height
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("unable to read size of {}: {e}", path.display()),
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compile/pipeline.rs"]
mod tests;
