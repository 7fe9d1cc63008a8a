//! Document readers
//!
//! Every supported format is one arm of the closed [`Reader`] enum. All arms
//! share the same navigation contract: a zero-based cursor below `page_count`,
//! [`advance`](Reader::advance) and [`retreat`](Reader::retreat) that are
//! no-ops at the ends, and [`render_current_page`](Reader::render_current_page)
//! that paints through a [`Surface`].
//!
//! Load failures never escape: a document that cannot be opened becomes a
//! one-page reader showing the error text.

pub mod flow;
pub mod layout;
pub mod markup;
pub mod text;

use std::path::Path;

use log::{info, warn};

use crate::error::UnsupportedFormat;
use crate::surface::Surface;

use flow::{EpubBackend, FlowBackend, FlowReader};
use layout::{LayoutBackend, LayoutReader, PopplerBackend};
use text::TextReader;

/// Cursor over a document's pages
///
/// Invariant: `count >= 1` and `cursor < count`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    cursor: usize,
    count: usize,
}

impl Pager {
    /// Cursor at page 0 of `count` pages (at least one)
    pub fn new(count: usize) -> Self {
        Self {
            cursor: 0,
            count: count.max(1),
        }
    }

    /// Zero-based current page
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of pages
    pub fn count(&self) -> usize {
        self.count
    }

    /// Move to `page`, clamped to the last page
    pub fn seek(&mut self, page: usize) -> usize {
        self.cursor = page.min(self.count - 1);
        self.cursor
    }

    /// Step forward; false at the last page
    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 < self.count {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Step back; false at the first page
    pub fn back(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }
}

/// Document format, chosen purely by file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// `.txt`
    Text,
    /// `.pdf`
    Layout,
    /// `.epub`
    Flow,
}

impl Format {
    /// Format for `path`, matching the extension case-insensitively
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("txt") {
            Some(Format::Text)
        } else if ext.eq_ignore_ascii_case("pdf") {
            Some(Format::Layout)
        } else if ext.eq_ignore_ascii_case("epub") {
            Some(Format::Flow)
        } else {
            None
        }
    }
}

/// Content converters used to open documents
pub struct Formats {
    /// Fixed-layout converter
    pub layout: Box<dyn LayoutBackend>,
    /// Flow-text converter
    pub flow: Box<dyn FlowBackend>,
}

impl Default for Formats {
    fn default() -> Self {
        Self {
            layout: Box::new(PopplerBackend),
            flow: Box::new(EpubBackend),
        }
    }
}

/// An open document
pub enum Reader {
    /// Plain text
    Text(TextReader),
    /// Fixed layout (PDF)
    Layout(LayoutReader),
    /// Flow text (EPUB)
    Flow(FlowReader),
}

impl Reader {
    /// Open `path` with the reader its extension selects
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedFormat`] for any extension other than `txt`,
    /// `pdf` or `epub`. Every other failure yields a diagnostic reader.
    pub fn open(
        path: &Path,
        formats: &Formats,
        font_size: u32,
    ) -> Result<Reader, UnsupportedFormat> {
        let format = Format::from_path(path).ok_or_else(|| UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let reader = match format {
            Format::Text => Reader::Text(TextReader::load(path, font_size)),
            Format::Layout => match LayoutReader::load(path, formats.layout.as_ref(), font_size) {
                Ok(reader) => Reader::Layout(reader),
                Err(err) => {
                    warn!("{err}");
                    Reader::Text(TextReader::diagnostic(&err, font_size))
                }
            },
            Format::Flow => Reader::Flow(FlowReader::load(path, formats.flow.as_ref(), font_size)),
        };
        info!(
            "opened {} ({} pages)",
            path.display(),
            reader.page_count()
        );
        Ok(reader)
    }

    fn pager(&self) -> &Pager {
        match self {
            Reader::Text(r) => r.pager(),
            Reader::Layout(r) => r.pager(),
            Reader::Flow(r) => r.pager(),
        }
    }

    fn pager_mut(&mut self) -> &mut Pager {
        match self {
            Reader::Text(r) => r.pager_mut(),
            Reader::Layout(r) => r.pager_mut(),
            Reader::Flow(r) => r.pager_mut(),
        }
    }

    /// Number of pages, at least one
    pub fn page_count(&self) -> usize {
        self.pager().count()
    }

    /// Zero-based current page
    pub fn cursor(&self) -> usize {
        self.pager().cursor()
    }

    /// Jump to `page` without rendering; clamps past the end
    pub fn seek(&mut self, page: usize) -> usize {
        self.pager_mut().seek(page)
    }

    /// Paint the current page through `surface`
    pub fn render_current_page<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        match self {
            Reader::Text(r) => r.render(surface),
            Reader::Layout(r) => r.render(surface),
            Reader::Flow(r) => r.render(surface),
        }
    }

    /// Turn to the next page and render it
    ///
    /// Returns `Ok(false)` without rendering at the last page.
    pub fn advance<S: Surface>(&mut self, surface: &mut S) -> Result<bool, S::Error> {
        if !self.pager_mut().forward() {
            return Ok(false);
        }
        self.render_current_page(surface)?;
        Ok(true)
    }

    /// Turn to the previous page and render it
    ///
    /// Returns `Ok(false)` without rendering at the first page.
    pub fn retreat<S: Surface>(&mut self, surface: &mut S) -> Result<bool, S::Error> {
        if !self.pager_mut().back() {
            return Ok(false);
        }
        self.render_current_page(surface)?;
        Ok(true)
    }
}
