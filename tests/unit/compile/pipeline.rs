use std::cell::RefCell;

use super::*;

#[derive(Default)]
struct RecordingRasterizer {
    calls: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl PdfRasterizer for RecordingRasterizer {
    fn rasterize(&self, pdf: &Path, _resolution: Resolution, dest_dir: &Path) -> TavoxResult<()> {
        self.calls
            .borrow_mut()
            .push((pdf.to_path_buf(), dest_dir.to_path_buf()));
        std::fs::write(dest_dir.join("slide-1.png"), b"").map_err(anyhow::Error::from)?;
        Ok(())
    }
}

#[test]
fn each_pdf_gets_its_own_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let a = Path::new("/talks/one/deck.pdf");
    let b = Path::new("/talks/two/deck.pdf");
    let c = Path::new("/talks/intro.pdf");
    let r = RecordingRasterizer::default();

    let pages = render_pdfs(&[a, b, c], tmp.path(), Resolution::default(), &r).unwrap();

    let calls = r.calls.borrow();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0], (a.to_path_buf(), tmp.path().join("deck.pdf")));
    assert_eq!(calls[2], (c.to_path_buf(), tmp.path().join("intro.pdf")));

    let clash = pages.dir(b).unwrap();
    assert_ne!(clash, tmp.path().join("deck.pdf"));
    let name = clash.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("deck.pdf_"), "{name}");
    assert_eq!(name.len(), "deck.pdf_".len() + 12);

    assert_eq!(
        pages.page(a, 1).unwrap(),
        tmp.path().join("deck.pdf/slide-1.png")
    );
}

#[test]
fn existing_page_directory_is_refused() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir(tmp.path().join("deck.pdf")).unwrap();
    let r = RecordingRasterizer::default();

    let err = render_pdfs(
        &[Path::new("/talks/deck.pdf")],
        tmp.path(),
        Resolution::default(),
        &r,
    )
    .unwrap_err();
    assert!(matches!(err, TavoxError::Configuration(_)));
    assert!(r.calls.borrow().is_empty());
}

#[test]
fn path_tags_are_hex_and_salted() {
    let p = Path::new("/talks/deck.pdf");
    let t0 = path_tag(p, 0);
    assert_eq!(t0.len(), 12);
    assert!(t0.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(t0, path_tag(p, 0));
    assert_ne!(t0, path_tag(p, 1));
}
