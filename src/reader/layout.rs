//! Fixed-layout (PDF) documents
//!
//! Pages are rasterized on demand every time they are shown and are never
//! cached, so memory stays bounded by a single page bitmap. Rasterizing is
//! delegated to a [`LayoutBackend`]; the default [`PopplerBackend`] runs the
//! poppler command-line tools.

use std::path::{Path, PathBuf};
use std::process::Command;

use embedded_graphics::mono_font::MonoFont;
use image::imageops::{self, BiLevel};
use image::{GrayImage, ImageFormat};
use log::{debug, warn};

use super::Pager;
use super::text::{self, font_for_size};
use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::LoadError;
use crate::surface::Surface;

/// Oversampling factor relative to 72 dpi
pub const OVERSAMPLE: u32 = 2;

/// An opened fixed-layout document
pub trait PageSource {
    /// Number of pages, at least one
    fn page_count(&self) -> usize;

    /// Render page `index` (zero-based) to grayscale at `scale` × 72 dpi
    fn rasterize(&self, index: usize, scale: u32) -> Result<GrayImage, LoadError>;
}

/// Opens fixed-layout documents
pub trait LayoutBackend {
    /// Open `path`; the page count reported by the result is authoritative
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, LoadError>;
}

/// Backend using poppler's `pdfinfo` and `pdftoppm`
#[derive(Clone, Copy, Debug, Default)]
pub struct PopplerBackend;

impl LayoutBackend for PopplerBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PageSource>, LoadError> {
        let info = run(path, Command::new("pdfinfo").arg(path))?;
        let pages = parse_page_count(&String::from_utf8_lossy(&info)).ok_or_else(|| {
            LoadError::Backend {
                path: path.to_path_buf(),
                message: "no page count in pdfinfo output".into(),
            }
        })?;
        debug!("{} has {pages} pages", path.display());
        Ok(Box::new(PopplerDocument {
            path: path.to_path_buf(),
            pages,
        }))
    }
}

struct PopplerDocument {
    path: PathBuf,
    pages: usize,
}

impl PageSource for PopplerDocument {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn rasterize(&self, index: usize, scale: u32) -> Result<GrayImage, LoadError> {
        if index >= self.pages {
            return Err(LoadError::PageOutOfRange {
                index,
                count: self.pages,
            });
        }
        let page = (index + 1).to_string();
        let dpi = (72 * scale).to_string();
        // Without an output root pdftoppm writes the PGM to stdout.
        let pgm = run(
            &self.path,
            Command::new("pdftoppm")
                .args(["-f", &page, "-l", &page, "-r", &dpi, "-gray"])
                .arg(&self.path),
        )?;
        Ok(image::load_from_memory_with_format(&pgm, ImageFormat::Pnm)?.to_luma8())
    }
}

fn run(path: &Path, command: &mut Command) -> Result<Vec<u8>, LoadError> {
    let output = command.output().map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LoadError::Backend {
            path: path.to_path_buf(),
            message: match stderr.trim() {
                "" => format!("converter exited with {}", output.status),
                msg => msg.to_owned(),
            },
        });
    }
    Ok(output.stdout)
}

/// Extract `Pages: N` from `pdfinfo` output
fn parse_page_count(info: &str) -> Option<usize> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|count| count.trim().parse().ok())
        .filter(|count| *count > 0)
}

/// Dither a grayscale page to bi-level
pub fn to_canvas(mut gray: GrayImage) -> Canvas {
    imageops::dither(&mut gray, &BiLevel);
    let mut canvas = Canvas::new(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel.0[0] == 0 {
            canvas.set_pixel(x, y, Color::Black);
        }
    }
    canvas
}

/// Reader for fixed-layout documents
pub struct LayoutReader {
    source: Box<dyn PageSource>,
    pager: Pager,
    font: &'static MonoFont<'static>,
}

impl LayoutReader {
    /// Open `path` through `backend`
    pub fn load(
        path: &Path,
        backend: &dyn LayoutBackend,
        font_size: u32,
    ) -> Result<Self, LoadError> {
        let source = backend.open(path)?;
        Ok(Self {
            pager: Pager::new(source.page_count()),
            source,
            font: font_for_size(font_size),
        })
    }

    pub(crate) fn pager(&self) -> &Pager {
        &self.pager
    }

    pub(crate) fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    /// Rasterize the current page and present it
    ///
    /// A rasterization failure is shown as a text page instead.
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        let index = self.pager.cursor();
        match self.source.rasterize(index, OVERSAMPLE) {
            Ok(gray) => {
                let size = surface.size();
                let canvas = to_canvas(gray).resample(size.width, size.height);
                surface.present(&canvas)
            }
            Err(err) => {
                warn!("page {}: {err}", index + 1);
                let lines = text::diagnostic_page(&format!("Error rendering page: {err}"));
                text::render_page(surface, &lines, index + 1, self.pager.count(), self.font)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RecordingSurface;
    use image::Luma;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeDocument {
        pages: usize,
        fail_page: Option<usize>,
        calls: Rc<Cell<usize>>,
    }

    impl PageSource for FakeDocument {
        fn page_count(&self) -> usize {
            self.pages
        }

        fn rasterize(&self, index: usize, scale: u32) -> Result<GrayImage, LoadError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail_page == Some(index) {
                return Err(LoadError::Backend {
                    path: PathBuf::from("fake.pdf"),
                    message: "broken page".into(),
                });
            }
            // Left half black, right half white.
            Ok(GrayImage::from_fn(40 * scale, 24 * scale, |x, _| {
                if x < 20 * scale { Luma([0]) } else { Luma([255]) }
            }))
        }
    }

    struct FakeBackend {
        pages: usize,
        fail_page: Option<usize>,
        calls: Rc<Cell<usize>>,
    }

    impl LayoutBackend for FakeBackend {
        fn open(&self, _path: &Path) -> Result<Box<dyn PageSource>, LoadError> {
            Ok(Box::new(FakeDocument {
                pages: self.pages,
                fail_page: self.fail_page,
                calls: Rc::clone(&self.calls),
            }))
        }
    }

    fn backend(pages: usize, fail_page: Option<usize>) -> FakeBackend {
        FakeBackend {
            pages,
            fail_page,
            calls: Rc::new(Cell::new(0)),
        }
    }

    #[test]
    fn test_parse_page_count() {
        let info = "Title:          x\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(12));
        assert_eq!(parse_page_count("Pages: 0"), None);
        assert_eq!(parse_page_count("garbage"), None);
    }

    #[test]
    fn test_to_canvas_keeps_black_and_white() {
        let gray = GrayImage::from_fn(16, 2, |x, _| if x < 8 { Luma([0]) } else { Luma([255]) });
        let canvas = to_canvas(gray);
        assert_eq!(canvas.pixel(0, 0), Color::Black);
        assert_eq!(canvas.pixel(15, 1), Color::White);
        assert_eq!(canvas.ink_count(), 16);
    }

    #[test]
    fn test_page_count_comes_from_backend() {
        let reader = LayoutReader::load(Path::new("a.pdf"), &backend(7, None), 16).unwrap();
        assert_eq!(reader.pager().count(), 7);
    }

    #[test]
    fn test_render_rasterizes_and_resamples_every_time() {
        let backend = backend(2, None);
        let reader = LayoutReader::load(Path::new("a.pdf"), &backend, 16).unwrap();
        let mut surface = RecordingSurface::new(80, 48);
        reader.render(&mut surface).unwrap();
        reader.render(&mut surface).unwrap();

        assert_eq!(backend.calls.get(), 2);
        let canvas = surface.last();
        assert_eq!(canvas.width(), 80);
        assert_eq!(canvas.pixel(10, 10), Color::Black);
        assert_eq!(canvas.pixel(70, 10), Color::White);
    }

    #[test]
    fn test_render_failure_shows_text_page() {
        let reader =
            LayoutReader::load(Path::new("a.pdf"), &backend(3, Some(0)), 12).unwrap();
        let mut surface = RecordingSurface::new(800, 480);
        reader.render(&mut surface).unwrap();
        assert!(surface.last().ink_count() > 0);
    }

    #[test]
    fn test_poppler_rejects_non_pdf() {
        let dir = std::env::temp_dir().join(format!("lume-layout-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("corrupt.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        // Fails whether or not poppler is installed.
        assert!(PopplerBackend.open(&path).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
