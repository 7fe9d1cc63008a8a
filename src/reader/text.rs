//! Plain-text pagination and page rendering

use std::fmt::Display;
use std::fs;
use std::path::Path;

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_9X18, FONT_10X20};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use log::warn;

use super::Pager;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::LoadError;
use crate::surface::Surface;

/// Hard-wrap column, counted in Unicode scalar values
pub const CHARS_PER_LINE: usize = 80;
/// Wrapped lines per page
pub const LINES_PER_PAGE: usize = 20;
/// Left margin in pixels
pub const LEFT_MARGIN: i32 = 10;
/// Top of the first body line in pixels
pub const TOP_MARGIN: i32 = 20;
/// Vertical distance between body lines in pixels
pub const LINE_PITCH: i32 = 20;
/// Distance of the footer from the bottom edge in pixels
pub const FOOTER_OFFSET: i32 = 25;

/// One page of wrapped lines
pub type Page = Vec<String>;

/// Monospace glyph set for a configured font size
pub fn font_for_size(font_size: u32) -> &'static MonoFont<'static> {
    match font_size {
        0..=12 => &FONT_6X10,
        13..=16 => &FONT_9X18,
        _ => &FONT_10X20,
    }
}

/// Split a line into pieces of at most [`CHARS_PER_LINE`] characters
///
/// Breaks fall wherever the column runs out, including mid-word. An empty
/// line stays one empty piece.
pub fn wrap_line(line: &str) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(CHARS_PER_LINE)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Wrap every line of `text` and cut the result into pages
///
/// Always returns at least one page; an empty document gives one empty page.
///
/// ```
/// use lume::reader::text::paginate;
///
/// let text: String = (1..=45).map(|n| format!("line {n}\n")).collect();
/// let pages = paginate(&text);
/// assert_eq!(pages.iter().map(Vec::len).collect::<Vec<_>>(), [20, 20, 5]);
/// ```
pub fn paginate(text: &str) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut current = Vec::with_capacity(LINES_PER_PAGE);

    for line in text.lines() {
        for piece in wrap_line(line) {
            current.push(piece);
            if current.len() == LINES_PER_PAGE {
                pages.push(std::mem::replace(
                    &mut current,
                    Vec::with_capacity(LINES_PER_PAGE),
                ));
            }
        }
    }
    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

/// The first page of `message`, for showing an error in place of content
pub(crate) fn diagnostic_page(message: &str) -> Page {
    paginate(message).into_iter().next().unwrap_or_default()
}

/// Draw body lines plus the "Page X of Y" footer and present the result
///
/// Lines that would run into the footer area are not drawn.
pub fn render_page<S: Surface>(
    surface: &mut S,
    lines: &[String],
    page_number: usize,
    page_count: usize,
    font: &'static MonoFont<'static>,
) -> Result<(), S::Error> {
    let mut canvas = surface.blank_canvas();
    let style = MonoTextStyle::new(font, Color::Black);
    let footer_y = canvas.height() as i32 - FOOTER_OFFSET;

    let mut y = TOP_MARGIN;
    for line in lines {
        if y + LINE_PITCH > footer_y {
            break;
        }
        draw_text(&mut canvas, line, Point::new(LEFT_MARGIN, y), style);
        y += LINE_PITCH;
    }

    let footer = format!("Page {page_number} of {page_count}");
    draw_text(&mut canvas, &footer, Point::new(LEFT_MARGIN, footer_y), style);
    surface.present(&canvas)
}

pub(crate) fn draw_text(
    canvas: &mut Canvas,
    text: &str,
    at: Point,
    style: MonoTextStyle<'_, Color>,
) {
    let Ok(_) = Text::with_baseline(text, at, style, Baseline::Top).draw(canvas);
}

/// Reader for pre-paginated text
///
/// Backs `.txt` files directly and is reused by the flow reader once
/// markup has been stripped. A document that cannot be loaded becomes a
/// single diagnostic page.
pub struct TextReader {
    pages: Vec<Page>,
    pager: Pager,
    font: &'static MonoFont<'static>,
}

impl TextReader {
    /// Read and paginate a UTF-8 text file
    pub fn load(path: &Path, font_size: u32) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_text(&text, font_size),
            Err(source) => {
                let err = LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                };
                warn!("{err}");
                Self::diagnostic(&err, font_size)
            }
        }
    }

    /// Paginate text already in memory
    pub fn from_text(text: &str, font_size: u32) -> Self {
        let pages = paginate(text);
        Self {
            pager: Pager::new(pages.len()),
            pages,
            font: font_for_size(font_size),
        }
    }

    /// A one-page document describing `err`
    ///
    /// Messages longer than a page are cut at the page end.
    pub fn diagnostic(err: &dyn Display, font_size: u32) -> Self {
        Self {
            pages: vec![diagnostic_page(&format!("Error loading book: {err}"))],
            pager: Pager::new(1),
            font: font_for_size(font_size),
        }
    }

    /// All pages in order
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub(crate) fn pager(&self) -> &Pager {
        &self.pager
    }

    pub(crate) fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    /// Paint the current page
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        let lines = self
            .pages
            .get(self.pager.cursor())
            .map_or(&[][..], Vec::as_slice);
        render_page(
            surface,
            lines,
            self.pager.cursor() + 1,
            self.pager.count(),
            self.font,
        )
    }
}
