//! Flow-text (EPUB) documents
//!
//! Content units are read in spine order, stripped to plain text, joined and
//! paginated once as a single text stream.

use std::path::Path;

use epub::doc::EpubDoc;
use log::{debug, warn};

use super::Pager;
use super::markup::strip_markup;
use super::text::TextReader;
use crate::error::LoadError;
use crate::surface::Surface;

/// Extracts the markup of each content unit in reading order
pub trait FlowBackend {
    /// Markup of every unit, in spine order
    fn units(&self, path: &Path) -> Result<Vec<String>, LoadError>;
}

/// Backend built on the `epub` crate
#[derive(Clone, Copy, Debug, Default)]
pub struct EpubBackend;

impl FlowBackend for EpubBackend {
    fn units(&self, path: &Path) -> Result<Vec<String>, LoadError> {
        let mut doc = EpubDoc::new(path).map_err(|e| LoadError::Backend {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let ids: Vec<String> = doc.spine.iter().map(|item| item.idref.clone()).collect();

        let mut units = Vec::with_capacity(ids.len());
        for id in ids {
            match doc.get_resource_str(&id) {
                Some((markup, _mime)) => units.push(markup),
                None => debug!("spine item {id} has no readable content"),
            }
        }
        Ok(units)
    }
}

/// Join the stripped text of every unit, in order
pub fn extract_text(units: &[String]) -> String {
    units
        .iter()
        .map(|unit| strip_markup(unit))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reader for flow-text documents
pub struct FlowReader {
    text: TextReader,
}

impl FlowReader {
    /// Extract, join and paginate the document at `path`
    ///
    /// A load failure becomes a single diagnostic page.
    pub fn load(path: &Path, backend: &dyn FlowBackend, font_size: u32) -> Self {
        let text = match backend.units(path) {
            Ok(units) => TextReader::from_text(&extract_text(&units), font_size),
            Err(err) => {
                warn!("{err}");
                TextReader::diagnostic(&err, font_size)
            }
        };
        Self { text }
    }

    /// Pages in reading order
    pub fn pages(&self) -> &[Vec<String>] {
        self.text.pages()
    }

    pub(crate) fn pager(&self) -> &Pager {
        self.text.pager()
    }

    pub(crate) fn pager_mut(&mut self) -> &mut Pager {
        self.text.pager_mut()
    }

    /// Paint the current page
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        self.text.render(surface)
    }
}
