//! Thin wrappers around the external programs tavox drives.

pub mod pdf;
pub mod probe;
pub mod render;

use self::{
    pdf::{PdfRasterizer, Pdftoppm},
    probe::{AudioProbe, Ffprobe},
};

/// External collaborators used while compiling a project.
pub struct Collaborators {
    pub rasterizer: Box<dyn PdfRasterizer>,
    pub probe: Box<dyn AudioProbe>,
}

impl Collaborators {
    /// `pdftoppm` and `ffprobe` from `PATH`.
    pub fn system() -> Self {
        Self {
            rasterizer: Box::new(Pdftoppm),
            probe: Box::new(Ffprobe),
        }
    }
}

fn stderr_excerpt(out: &std::process::Output) -> String {
    String::from_utf8_lossy(&out.stderr).trim().to_string()
}
