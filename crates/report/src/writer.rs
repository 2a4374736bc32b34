//! Paginated document writer.
//!
//! Coordinates are PDF points measured from the top-left corner of the page.
//! Text widths are estimated with a fixed average glyph width of half the
//! font size; there are no real font metrics.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Average glyph width as a fraction of the font size.
pub const GLYPH_WIDTH_RATIO: f32 = 0.5;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_RATIO: f32 = 1.4;

pub const TITLE_SIZE: f32 = 20.0;
pub const HEADING_SIZE: f32 = 14.0;
pub const BODY_SIZE: f32 = 11.0;
pub const FOOTER_SIZE: f32 = 9.0;

/// Indent of bullet text relative to the bullet marker.
const BULLET_INDENT: f32 = 14.0;

// ---------------------------------------------------------------------------
// Layout and output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl PageLayout {
    /// US Letter with 0.75in side margins and a 1in bottom margin that
    /// leaves room for the footer.
    pub const LETTER: PageLayout = PageLayout {
        width: 612.0,
        height: 792.0,
        margin_top: 54.0,
        margin_bottom: 72.0,
        margin_left: 54.0,
        margin_right: 54.0,
    };

    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Lowest y a text baseline may reach.
    pub fn bottom_limit(&self) -> f32 {
        self.height - self.margin_bottom
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::LETTER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Regular,
    Bold,
}

/// A single positioned line of text. `y` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub weight: FontWeight,
    pub text: String,
}

/// A horizontal rule from `x1` to `x2` at `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub runs: Vec<TextRun>,
    pub rules: Vec<Rule>,
    /// `Page i of n`, placed inside the bottom margin.
    pub footer: Option<TextRun>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() && self.rules.is_empty()
    }

    /// All text on the page, one run per line.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub layout: PageLayout,
    pub pages: Vec<Page>,
}

// ---------------------------------------------------------------------------
// Text measurement
// ---------------------------------------------------------------------------

pub fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH_RATIO
}

pub fn line_height(size: f32) -> f32 {
    size * LINE_HEIGHT_RATIO
}

/// Greedy word wrap to `max_width`.
///
/// Explicit newlines are kept, blank lines survive as empty strings, and
/// words wider than a whole line are split at the character limit.
pub fn wrap_text(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let max_chars = ((max_width / (size * GLYPH_WIDTH_RATIO)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for raw in text.lines() {
        let mut line = String::new();
        let mut line_len = 0usize;

        for word in raw.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();

            // Hard-split words that cannot fit on any line.
            while chars.len() > max_chars {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = chars.split_off(max_chars);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }

            let word_len = chars.len();
            if word_len == 0 {
                continue;
            }
            let needed = if line_len == 0 { word_len } else { line_len + 1 + word_len };
            if needed > max_chars {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(chars);
            line_len += word_len;
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

// ---------------------------------------------------------------------------
// PageWriter
// ---------------------------------------------------------------------------

/// Stateful writer that lays out blocks top to bottom, breaking pages as
/// needed.
pub struct PageWriter {
    layout: PageLayout,
    pages: Vec<Page>,
    current: Page,
    cursor: f32,
}

impl PageWriter {
    pub fn new(layout: PageLayout) -> Self {
        Self {
            layout,
            pages: Vec::new(),
            current: Page::default(),
            cursor: layout.margin_top,
        }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Distance from the top of the current page to the next free line.
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Pages started so far, including the current one.
    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    pub fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.cursor = self.layout.margin_top;
    }

    /// Break the page unless `height` more points fit above the bottom margin.
    fn ensure_space(&mut self, height: f32) {
        let fresh = self.cursor <= self.layout.margin_top;
        if !fresh && self.cursor + height > self.layout.bottom_limit() {
            self.new_page();
        }
    }

    fn line(&mut self, x: f32, text: String, size: f32, weight: FontWeight) {
        let height = line_height(size);
        self.ensure_space(height);
        self.current.runs.push(TextRun {
            x,
            y: self.cursor + size,
            size,
            weight,
            text,
        });
        self.cursor += height;
    }

    fn wrapped(&mut self, x: f32, text: &str, size: f32, weight: FontWeight) {
        let width = self.layout.width - self.layout.margin_right - x;
        for line in wrap_text(text, width, size) {
            self.line(x, line, size, weight);
        }
    }

    // -- blocks --

    pub fn title(&mut self, text: &str) {
        self.wrapped(self.layout.margin_left, text, TITLE_SIZE, FontWeight::Bold);
        self.spacer(BODY_SIZE * 0.5);
    }

    pub fn heading(&mut self, text: &str) {
        self.spacer(BODY_SIZE * 0.5);
        // Keep a heading together with at least one body line.
        self.ensure_space(line_height(HEADING_SIZE) + line_height(BODY_SIZE));
        self.wrapped(self.layout.margin_left, text, HEADING_SIZE, FontWeight::Bold);
    }

    pub fn paragraph(&mut self, text: &str) {
        self.wrapped(self.layout.margin_left, text, BODY_SIZE, FontWeight::Regular);
    }

    /// `Label: value` with the value wrapped in its own column.
    pub fn field(&mut self, label: &str, value: &str) {
        let label = format!("{label}:");
        let x = self.layout.margin_left;
        let value_x = x + estimate_width(&label, BODY_SIZE) + BODY_SIZE * GLYPH_WIDTH_RATIO;
        let width = self.layout.width - self.layout.margin_right - value_x;
        let lines = wrap_text(value, width, BODY_SIZE);

        self.ensure_space(line_height(BODY_SIZE));
        self.current.runs.push(TextRun {
            x,
            y: self.cursor + BODY_SIZE,
            size: BODY_SIZE,
            weight: FontWeight::Bold,
            text: label,
        });
        for line in lines {
            self.line(value_x, line, BODY_SIZE, FontWeight::Regular);
        }
    }

    pub fn bullet(&mut self, text: &str) {
        let x = self.layout.margin_left;
        self.ensure_space(line_height(BODY_SIZE));
        self.current.runs.push(TextRun {
            x,
            y: self.cursor + BODY_SIZE,
            size: BODY_SIZE,
            weight: FontWeight::Regular,
            text: "-".to_string(),
        });
        self.wrapped(x + BULLET_INDENT, text, BODY_SIZE, FontWeight::Regular);
    }

    /// Fixed-width columns, e.g. a table row.
    pub fn row(&mut self, cells: &[&str], weight: FontWeight) {
        if cells.is_empty() {
            return;
        }
        let col_width = self.layout.content_width() / cells.len() as f32;
        let max_chars = ((col_width / (BODY_SIZE * GLYPH_WIDTH_RATIO)) as usize).saturating_sub(1);
        self.ensure_space(line_height(BODY_SIZE));
        for (i, cell) in cells.iter().enumerate() {
            let text: String = cell.chars().take(max_chars.max(1)).collect();
            self.current.runs.push(TextRun {
                x: self.layout.margin_left + i as f32 * col_width,
                y: self.cursor + BODY_SIZE,
                size: BODY_SIZE,
                weight,
                text,
            });
        }
        self.cursor += line_height(BODY_SIZE);
    }

    /// Vertical gap. A gap that would cross the bottom margin ends the page.
    pub fn spacer(&mut self, height: f32) {
        if self.cursor + height > self.layout.bottom_limit() {
            self.new_page();
        } else {
            self.cursor += height;
        }
    }

    pub fn rule(&mut self) {
        self.ensure_space(BODY_SIZE);
        let y = self.cursor + BODY_SIZE * 0.5;
        self.current.rules.push(Rule {
            x1: self.layout.margin_left,
            x2: self.layout.width - self.layout.margin_right,
            y,
        });
        self.cursor += BODY_SIZE;
    }

    /// Close the document and stamp `Page i of n` on every page.
    ///
    /// Trailing empty pages are dropped, but a document always has at least
    /// one page.
    pub fn finish(mut self) -> Document {
        let current = std::mem::take(&mut self.current);
        self.pages.push(current);
        while self.pages.len() > 1 && self.pages.last().is_some_and(Page::is_empty) {
            self.pages.pop();
        }

        let total = self.pages.len();
        let layout = self.layout;
        for (i, page) in self.pages.iter_mut().enumerate() {
            let text = format!("Page {} of {}", i + 1, total);
            let x = (layout.width - estimate_width(&text, FOOTER_SIZE)) / 2.0;
            page.footer = Some(TextRun {
                x,
                y: layout.height - layout.margin_bottom / 2.0,
                size: FOOTER_SIZE,
                weight: FontWeight::Regular,
                text,
            });
        }

        Document {
            layout,
            pages: self.pages,
        }
    }
}

impl Default for PageWriter {
    fn default() -> Self {
        Self::new(PageLayout::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
