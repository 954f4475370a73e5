use std::path::{Path, PathBuf};

use crate::foundation::{
    core::Resolution,
    error::{TavoxError, TavoxResult},
};

/// Turns every page of a PDF into an image named `slide-<n>.<ext>` (1-based) inside `dest_dir`.
pub trait PdfRasterizer {
    fn rasterize(&self, pdf: &Path, resolution: Resolution, dest_dir: &Path) -> TavoxResult<()>;
}

/// `pdftoppm` from poppler.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pdftoppm;

impl Pdftoppm {
    pub(crate) fn command(pdf: &Path, resolution: Resolution, dest_dir: &Path) -> std::process::Command {
        let mut cmd = std::process::Command::new("pdftoppm");
        cmd.args(["-png", "-r", "600", "-scale-to-y"])
            .arg(resolution.height.to_string())
            .arg("-scale-to-x")
            .arg(resolution.width.to_string())
            .arg(pdf)
            .arg(dest_dir.join("slide"));
        cmd
    }
}

impl PdfRasterizer for Pdftoppm {
    fn rasterize(&self, pdf: &Path, resolution: Resolution, dest_dir: &Path) -> TavoxResult<()> {
        tracing::info!("rendering {}", pdf.display());
        let out = Self::command(pdf, resolution, dest_dir)
            .output()
            .map_err(|e| TavoxError::tool(format!("failed to run pdftoppm: {e}")))?;
        if !out.status.success() {
            return Err(TavoxError::tool(format!(
                "pdftoppm failed for '{}' ({}): {}",
                pdf.display(),
                out.status,
                super::stderr_excerpt(&out)
            )));
        }
        Ok(())
    }
}

const PAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Locate the rendered image of page `slide` in `dir`.
///
/// pdftoppm pads page numbers to the width of the page count (`slide-01.png` for a 10+ page
/// document), so padded names are accepted as well.
pub fn find_page(dir: &Path, slide: u32) -> Option<PathBuf> {
    let digits = slide.to_string().len();
    (digits..=digits.max(4))
        .flat_map(|width| {
            PAGE_EXTENSIONS
                .iter()
                .map(move |ext| dir.join(format!("slide-{slide:0width$}.{ext}")))
        })
        .find(|p| p.is_file())
}

#[cfg(test)]
#[path = "../../tests/unit/tools/pdf.rs"]
mod tests;
