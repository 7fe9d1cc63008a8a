//! Menu / reading state machine
//!
//! [`Navigator`] owns the surface, the open reader and the settings, and
//! interprets one [`Action`] at a time:
//!
//! | action          | Menu                       | Reading              |
//! |-----------------|----------------------------|----------------------|
//! | up              | select previous, redraw    | previous page        |
//! | down            | select next, redraw        | next page            |
//! | left            | -                          | previous page        |
//! | right           | -                          | next page            |
//! | select          | open selected book         | -                    |
//! | menu / back     | -                          | back to menu         |
//! | bookmark        | -                          | save current page    |
//! | settings        | -                          | -                    |
//!
//! Only surface (hardware) errors are returned; everything else is logged
//! and absorbed.

use std::path::{Path, PathBuf};

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use log::{debug, info, warn};

use crate::canvas::Canvas;
use crate::color::Color;
use crate::input::Action;
use crate::library::{Library, display_name};
use crate::reader::text::{LEFT_MARGIN, LINE_PITCH, TOP_MARGIN, draw_text, font_for_size};
use crate::reader::{Formats, Reader};
use crate::settings::{Settings, SettingsStore};
use crate::surface::Surface;

/// Top-level screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Book list
    Menu,
    /// A book is open
    Reading,
}

/// Application state plus the resources it drives
pub struct Navigator<S: Surface> {
    surface: S,
    library: Library,
    formats: Formats,
    store: SettingsStore,
    settings: Settings,
    mode: Mode,
    selected_index: usize,
    books: Vec<PathBuf>,
    reader: Option<Reader>,
    current_path: Option<PathBuf>,
}

impl<S: Surface> Navigator<S> {
    /// Build the navigator and load settings from `store`
    ///
    /// Nothing is drawn until [`start`](Self::start).
    pub fn new(surface: S, library: Library, formats: Formats, store: SettingsStore) -> Self {
        let settings = store.load();
        Self {
            surface,
            library,
            formats,
            store,
            settings,
            mode: Mode::Menu,
            selected_index: 0,
            books: Vec::new(),
            reader: None,
            current_path: None,
        }
    }

    /// Show the menu
    pub fn start(&mut self) -> Result<(), S::Error> {
        self.show_menu()
    }

    /// Current screen
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Highlighted menu row
    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    /// Books found by the last menu scan
    pub fn books(&self) -> &[PathBuf] {
        &self.books
    }

    /// The open book, if any
    pub fn reader(&self) -> Option<&Reader> {
        self.reader.as_ref()
    }

    /// In-memory settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The presentation surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Apply one user action
    pub fn handle(&mut self, action: Action) -> Result<(), S::Error> {
        debug!("{action} in {:?}", self.mode);
        match (self.mode, action) {
            (Mode::Menu, Action::Up) => {
                self.selected_index = self.selected_index.saturating_sub(1);
                self.show_menu()
            }
            (Mode::Menu, Action::Down) => {
                self.selected_index += 1;
                self.show_menu()
            }
            (Mode::Menu, Action::Select) => self.open_selected(),
            (Mode::Reading, Action::Up | Action::Left) => self.turn(false),
            (Mode::Reading, Action::Down | Action::Right) => self.turn(true),
            (Mode::Reading, Action::Menu | Action::Back) => {
                info!("back to menu");
                self.mode = Mode::Menu;
                self.show_menu()
            }
            (Mode::Reading, Action::Bookmark) => {
                self.bookmark();
                Ok(())
            }
            (_, Action::Settings)
            | (
                Mode::Menu,
                Action::Left | Action::Right | Action::Menu | Action::Back | Action::Bookmark,
            )
            | (Mode::Reading, Action::Select) => Ok(()),
        }
    }

    /// Open `path`, resuming at the bookmark if it belongs to this book
    ///
    /// Returns `Ok(false)` and stays in the menu if no reader handles the
    /// file type.
    pub fn open(&mut self, path: &Path) -> Result<bool, S::Error> {
        let mut reader = match Reader::open(path, &self.formats, self.settings.font_size) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("{e}");
                return Ok(false);
            }
        };
        if let Some(page) = self.settings.bookmark_for(path) {
            let page = reader.seek(page);
            info!("resuming at page {}", page + 1);
        }
        // Replacing the reader drops the previous one before rendering.
        self.reader = None;
        self.current_path = Some(path.to_path_buf());
        self.mode = Mode::Reading;
        let reader = self.reader.insert(reader);
        reader.render_current_page(&mut self.surface)?;
        Ok(true)
    }

    /// Persist settings
    pub fn shutdown(&mut self) {
        info!("flushing settings");
        self.store.save(&self.settings);
    }

    fn open_selected(&mut self) -> Result<(), S::Error> {
        let Some(path) = self.books.get(self.selected_index).cloned() else {
            debug!("nothing to open");
            return Ok(());
        };
        self.open(&path).map(|_| ())
    }

    fn turn(&mut self, forward: bool) -> Result<(), S::Error> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(());
        };
        let moved = if forward {
            reader.advance(&mut self.surface)?
        } else {
            reader.retreat(&mut self.surface)?
        };
        if moved {
            debug!("page {} of {}", reader.cursor() + 1, reader.page_count());
        }
        Ok(())
    }

    fn bookmark(&mut self) {
        let (Some(reader), Some(path)) = (&self.reader, &self.current_path) else {
            return;
        };
        self.settings.last_book_path = Some(path.clone());
        self.settings.last_page = reader.cursor();
        info!(
            "bookmarked {} at page {}",
            display_name(path),
            reader.cursor() + 1
        );
        self.store.save(&self.settings);
    }

    fn show_menu(&mut self) -> Result<(), S::Error> {
        self.books = self.library.scan();
        self.selected_index = self
            .selected_index
            .min(self.books.len().saturating_sub(1));

        let mut canvas = self.surface.blank_canvas();
        let font = font_for_size(self.settings.font_size);
        if self.books.is_empty() {
            let text = format!("No books in {}", self.library.dir().display());
            let style = MonoTextStyle::new(font, Color::Black);
            draw_text(&mut canvas, &text, Point::new(LEFT_MARGIN, TOP_MARGIN), style);
        } else {
            let rows = menu_rows(&canvas);
            let first = self.selected_index / rows * rows;
            for (offset, path) in self.books.iter().skip(first).take(rows).enumerate() {
                let y = TOP_MARGIN + offset as i32 * LINE_PITCH;
                let selected = first + offset == self.selected_index;
                draw_row(&mut canvas, &display_name(path), y, selected, font);
            }
        }
        self.surface.present(&canvas)
    }
}

/// Menu rows that fit between the top and bottom margins
fn menu_rows(canvas: &Canvas) -> usize {
    let usable = canvas.height() as i32 - 2 * TOP_MARGIN;
    (usable / LINE_PITCH).max(1) as usize
}

fn draw_row(
    canvas: &mut Canvas,
    label: &str,
    y: i32,
    selected: bool,
    font: &'static MonoFont<'static>,
) {
    let mut ink = Color::Black;
    if selected {
        let band = Rectangle::new(
            Point::new(0, y),
            Size::new(canvas.width(), LINE_PITCH as u32),
        );
        let Ok(()) = band
            .into_styled(PrimitiveStyle::with_fill(ink))
            .draw(canvas);
        ink = ink.inverted();
    }
    draw_text(
        canvas,
        label,
        Point::new(LEFT_MARGIN, y),
        MonoTextStyle::new(font, ink),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RecordingSurface, SurfaceDown};
    use std::fs;

    struct Fixture {
        dir: PathBuf,
    }

    impl Fixture {
        fn new(name: &str) -> Self {
            let dir =
                std::env::temp_dir().join(format!("lume-nav-{}-{name}", std::process::id()));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(dir.join("books")).unwrap();
            Self { dir }
        }

        fn book(&self, name: &str, lines: usize) -> PathBuf {
            let path = self.dir.join("books").join(name);
            let text: String = (1..=lines).map(|n| format!("line {n}\n")).collect();
            fs::write(&path, text).unwrap();
            path
        }

        fn navigator(&self) -> Navigator<RecordingSurface> {
            Navigator::new(
                RecordingSurface::new(800, 480),
                Library::new(self.dir.join("books")),
                Formats::default(),
                SettingsStore::new(self.dir.join("settings.toml")),
            )
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }

    fn row_has_ink(canvas: &Canvas, row: usize) -> bool {
        let top = TOP_MARGIN as u32 + row as u32 * LINE_PITCH as u32;
        (top..top + LINE_PITCH as u32)
            .any(|y| (0..canvas.width()).any(|x| canvas.pixel(x, y) == Color::Black))
    }

    #[test]
    fn test_empty_library_shows_placeholder_and_select_is_noop() {
        let fixture = Fixture::new("empty");
        let mut nav = fixture.navigator();
        nav.start().unwrap();

        let canvas = nav.surface().last().clone();
        assert!(row_has_ink(&canvas, 0));
        assert!(!row_has_ink(&canvas, 1));

        nav.handle(Action::Select).unwrap();
        assert_eq!(nav.mode(), Mode::Menu);
        assert!(nav.reader().is_none());
        assert_eq!(nav.surface().frames.len(), 1);
    }

    #[test]
    fn test_menu_selection_clamps() {
        let fixture = Fixture::new("clamp");
        fixture.book("a.txt", 1);
        fixture.book("b.txt", 1);
        fixture.book("c.txt", 1);
        let mut nav = fixture.navigator();
        nav.start().unwrap();

        nav.handle(Action::Up).unwrap();
        assert_eq!(nav.selected_index(), 0);
        for _ in 0..5 {
            nav.handle(Action::Down).unwrap();
        }
        assert_eq!(nav.selected_index(), 2);
        assert_eq!(nav.surface().frames.len(), 7);
    }

    #[test]
    fn test_selected_row_is_inverted() {
        let fixture = Fixture::new("invert");
        fixture.book("a.txt", 1);
        fixture.book("b.txt", 1);
        let mut nav = fixture.navigator();
        nav.start().unwrap();
        nav.handle(Action::Down).unwrap();

        let canvas = nav.surface().last();
        let edge = |row: i32| canvas.pixel(2, (TOP_MARGIN + row * LINE_PITCH + 1) as u32);
        assert_eq!(edge(0), Color::White);
        assert_eq!(edge(1), Color::Black);

        // The label on the band is drawn in the inverse of the band colour.
        let band_top = (TOP_MARGIN + LINE_PITCH) as u32;
        let label_pixels = (band_top..band_top + LINE_PITCH as u32)
            .flat_map(|y| (LEFT_MARGIN as u32..200).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == Color::Black.inverted())
            .count();
        assert!(label_pixels > 0);
    }

    #[test]
    fn test_menu_rescans_on_every_show() {
        let fixture = Fixture::new("rescan");
        fixture.book("a.txt", 1);
        let mut nav = fixture.navigator();
        nav.start().unwrap();
        assert_eq!(nav.books().len(), 1);

        fixture.book("b.txt", 1);
        nav.handle(Action::Down).unwrap();
        assert_eq!(nav.books().len(), 2);
        assert_eq!(nav.selected_index(), 1);

        fs::remove_file(fixture.dir.join("books").join("b.txt")).unwrap();
        nav.handle(Action::Down).unwrap();
        assert_eq!(nav.selected_index(), 0);
    }

    #[test]
    fn test_reading_navigation() {
        let fixture = Fixture::new("reading");
        fixture.book("book.txt", 45);
        let mut nav = fixture.navigator();
        nav.start().unwrap();
        nav.handle(Action::Select).unwrap();

        assert_eq!(nav.mode(), Mode::Reading);
        let cursor = |nav: &Navigator<RecordingSurface>| nav.reader().map(Reader::cursor);
        assert_eq!(nav.reader().map(Reader::page_count), Some(3));
        assert_eq!(cursor(&nav), Some(0));

        nav.handle(Action::Down).unwrap();
        nav.handle(Action::Right).unwrap();
        assert_eq!(cursor(&nav), Some(2));

        let frames = nav.surface().frames.len();
        nav.handle(Action::Right).unwrap();
        assert_eq!(cursor(&nav), Some(2));
        assert_eq!(nav.surface().frames.len(), frames);

        nav.handle(Action::Up).unwrap();
        nav.handle(Action::Left).unwrap();
        assert_eq!(cursor(&nav), Some(0));

        nav.handle(Action::Select).unwrap();
        nav.handle(Action::Settings).unwrap();
        assert_eq!(nav.mode(), Mode::Reading);

        nav.handle(Action::Back).unwrap();
        assert_eq!(nav.mode(), Mode::Menu);
    }

    #[test]
    fn test_bookmark_resumes_on_reopen() {
        let fixture = Fixture::new("bookmark");
        fixture.book("book.txt", 100);
        {
            let mut nav = fixture.navigator();
            nav.start().unwrap();
            nav.handle(Action::Select).unwrap();
            for _ in 0..3 {
                nav.handle(Action::Right).unwrap();
            }
            nav.handle(Action::Bookmark).unwrap();
            nav.handle(Action::Menu).unwrap();
        }

        let mut nav = fixture.navigator();
        assert_eq!(nav.settings().last_page, 3);
        nav.start().unwrap();
        nav.handle(Action::Select).unwrap();
        assert_eq!(nav.reader().map(Reader::cursor), Some(3));
    }

    #[test]
    fn test_bookmark_for_other_book_is_ignored() {
        let fixture = Fixture::new("otherbook");
        fixture.book("a.txt", 100);
        fixture.book("b.txt", 100);
        let store = SettingsStore::new(fixture.dir.join("settings.toml"));
        store
            .try_save(&Settings {
                last_book_path: Some(fixture.dir.join("books").join("a.txt")),
                last_page: 2,
                ..Settings::default()
            })
            .unwrap();

        let mut nav = fixture.navigator();
        nav.start().unwrap();
        nav.handle(Action::Down).unwrap();
        nav.handle(Action::Select).unwrap();
        assert_eq!(nav.reader().map(Reader::cursor), Some(0));
    }

    #[test]
    fn test_unsupported_extension_stays_in_menu() {
        let fixture = Fixture::new("unsupported");
        let path = fixture.dir.join("books").join("book.mobi");
        fs::write(&path, "").unwrap();
        let mut nav = fixture.navigator();
        nav.start().unwrap();

        assert!(!nav.open(&path).unwrap());
        assert_eq!(nav.mode(), Mode::Menu);
        assert!(nav.reader().is_none());
        assert_eq!(nav.surface().frames.len(), 1);
    }

    #[test]
    fn test_menu_actions_ignored_in_menu() {
        let fixture = Fixture::new("menuidle");
        fixture.book("a.txt", 1);
        let mut nav = fixture.navigator();
        nav.start().unwrap();
        for action in [Action::Left, Action::Right, Action::Menu, Action::Back, Action::Bookmark] {
            nav.handle(action).unwrap();
        }
        assert_eq!(nav.mode(), Mode::Menu);
        assert_eq!(nav.surface().frames.len(), 1);
    }

    #[test]
    fn test_shutdown_flushes_settings() {
        let fixture = Fixture::new("shutdown");
        let mut nav = fixture.navigator();
        nav.shutdown();
        assert!(fixture.dir.join("settings.toml").exists());
    }

    #[test]
    fn test_surface_failure_propagates() {
        let fixture = Fixture::new("fail");
        let mut nav = fixture.navigator();
        nav.surface.fail = true;
        assert_eq!(nav.start(), Err(SurfaceDown));
    }

    #[test]
    fn test_long_listing_windows_around_selection() {
        let fixture = Fixture::new("window");
        for n in 0..30 {
            fixture.book(&format!("{n:02}.txt"), 1);
        }
        let mut nav = fixture.navigator();
        nav.start().unwrap();
        for _ in 0..25 {
            nav.handle(Action::Down).unwrap();
        }
        // 22 rows per screen on a 480 px panel; row 25 is the 4th of the second window.
        let canvas = nav.surface().last();
        let edge = |row: i32| canvas.pixel(2, (TOP_MARGIN + row * LINE_PITCH + 1) as u32);
        assert_eq!(edge(3), Color::Black);
        assert!(!row_has_ink(canvas, 8));
    }
}
