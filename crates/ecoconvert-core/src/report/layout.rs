//! Vertical-cursor page layout with automatic page breaks.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner. The
//! cursor `y` is the baseline of the next line and only ever moves down
//! within a page.

use super::document::{DrawOp, FilledRect, Font, Page, ReportDocument, Rgb, TextRun};
use super::fonts::text_width;

pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;
pub const MARGIN: f64 = 50.0;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;
pub const HEADER_HEIGHT: f64 = 100.0;
pub const FOOTER_HEIGHT: f64 = 40.0;
pub const SECTION_SPACING: f64 = 20.0;
pub const SECTION_HEADER_HEIGHT: f64 = 30.0;

/// Lowest baseline any content line may use.
pub const BOTTOM_LIMIT: f64 = FOOTER_HEIGHT + MARGIN;
/// Baseline of the first content line on every page.
pub const CONTENT_TOP: f64 = PAGE_HEIGHT - HEADER_HEIGHT - MARGIN;

/// Indented text column used for section bodies.
pub const BODY_X: f64 = MARGIN + 10.0;
pub const BODY_WIDTH: f64 = CONTENT_WIDTH - 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineHeight {
    Title,
    Heading,
    Normal,
    Small,
}

impl LineHeight {
    pub fn points(self) -> f64 {
        match self {
            LineHeight::Title => 32.0,
            LineHeight::Heading => 24.0,
            LineHeight::Normal => 18.0,
            LineHeight::Small => 14.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f64,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn regular(size: f64) -> Self {
        Self {
            font: Font::Helvetica,
            size,
            color: Rgb::TEXT,
        }
    }

    pub const fn bold(size: f64) -> Self {
        Self {
            font: Font::HelveticaBold,
            size,
            color: Rgb::TEXT,
        }
    }
}

/// Greedy word wrap: each line is as long as fits in `max_width`.
///
/// A single word wider than `max_width` is split between characters.
pub fn wrap_lines(text: &str, style: TextStyle, max_width: f64) -> Vec<String> {
    let fits = |s: &str| text_width(style.font, s, style.size) <= max_width;

    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        for piece in split_word(word, &fits) {
            if line.is_empty() {
                line = piece;
                continue;
            }
            let candidate = format!("{line} {piece}");
            if fits(&candidate) {
                line = candidate;
            } else {
                lines.push(std::mem::replace(&mut line, piece));
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn split_word(word: &str, fits: &impl Fn(&str) -> bool) -> Vec<String> {
    if fits(word) {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if !fits(&current) && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Mutable layout state threaded through report rendering.
///
/// Every page gets the branded header when it is opened and the footer when
/// it is closed, so a page never exists without both.
pub struct LayoutState {
    done: Vec<Page>,
    current: Page,
    y: f64,
    title: String,
    continuation: String,
    footer: String,
}

impl LayoutState {
    /// Start a document with one page headed by `subtitle`.
    pub fn begin(title: &str, subtitle: &str, footer: String) -> Self {
        let mut state = Self {
            done: Vec::new(),
            current: Page::default(),
            y: CONTENT_TOP,
            title: title.to_string(),
            continuation: format!("{subtitle} (Continued)"),
            footer,
        };
        state.draw_header(subtitle);
        state
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Zero-based index of the page being filled.
    pub fn page_index(&self) -> usize {
        self.done.len()
    }

    /// Subtitle used for pages opened by automatic breaks.
    pub fn set_continuation(&mut self, subtitle: impl Into<String>) {
        self.continuation = subtitle.into();
    }

    /// Break to a new page unless `required` points remain above the footer.
    pub fn need_space(&mut self, required: f64) {
        if self.y - required < BOTTOM_LIMIT {
            self.break_page();
        }
    }

    /// Close the current page and open a new one headed by `subtitle`.
    pub fn new_page(&mut self, subtitle: &str) {
        self.draw_footer();
        self.done.push(std::mem::take(&mut self.current));
        self.y = CONTENT_TOP;
        self.draw_header(subtitle);
        tracing::debug!(page = self.page_index() + 1, subtitle, "report page opened");
    }

    pub fn advance(&mut self, points: f64) {
        self.y -= points;
    }

    /// Draw one line at the cursor, then move down by `advance`.
    pub fn line(&mut self, text: &str, style: TextStyle, x: f64, advance: LineHeight) {
        self.ensure_line();
        self.push_text(x, self.y, style, text);
        self.y -= advance.points();
    }

    /// Word-wrap `text` into the body column, one normal-height line each.
    pub fn wrapped(&mut self, text: &str, style: TextStyle) {
        for line in wrap_lines(text, style, BODY_WIDTH) {
            self.line(&line, style, BODY_X, LineHeight::Normal);
        }
    }

    /// Full-width gray band with a bold title.
    pub fn section_header(&mut self, title: &str) {
        self.need_space(SECTION_HEADER_HEIGHT);
        self.push_rect(FilledRect {
            x: MARGIN,
            y: self.y - 10.0,
            width: CONTENT_WIDTH,
            height: SECTION_HEADER_HEIGHT,
            color: Rgb::LIGHT_GRAY,
        });
        self.push_text(BODY_X, self.y, TextStyle::bold(14.0), title);
        self.y -= SECTION_HEADER_HEIGHT;
    }

    /// Close the last page and hand back the finished document.
    pub fn finish(mut self) -> ReportDocument {
        self.draw_footer();
        let mut pages = self.done;
        pages.push(self.current);
        ReportDocument::from_pages(PAGE_WIDTH, PAGE_HEIGHT, pages)
    }

    fn break_page(&mut self) {
        let subtitle = self.continuation.clone();
        self.new_page(&subtitle);
    }

    fn ensure_line(&mut self) {
        if self.y < BOTTOM_LIMIT {
            self.break_page();
        }
    }

    fn draw_header(&mut self, subtitle: &str) {
        self.push_rect(FilledRect {
            x: 0.0,
            y: PAGE_HEIGHT - HEADER_HEIGHT,
            width: PAGE_WIDTH,
            height: HEADER_HEIGHT,
            color: Rgb::PRIMARY,
        });
        let title = self.title.clone();
        self.push_text(
            MARGIN,
            PAGE_HEIGHT - 50.0,
            TextStyle {
                color: Rgb::WHITE,
                ..TextStyle::bold(24.0)
            },
            &title,
        );
        self.push_text(
            MARGIN,
            PAGE_HEIGHT - 80.0,
            TextStyle {
                color: Rgb::WHITE,
                ..TextStyle::regular(16.0)
            },
            subtitle,
        );
    }

    fn draw_footer(&mut self) {
        let style = TextStyle::regular(10.0);
        let width = text_width(style.font, &self.footer, style.size);
        let x = ((PAGE_WIDTH - width) / 2.0).max(MARGIN);
        let footer = self.footer.clone();
        self.push_text(x, FOOTER_HEIGHT - 10.0, style, &footer);
    }

    fn push_text(&mut self, x: f64, y: f64, style: TextStyle, text: &str) {
        let run = TextRun {
            x,
            y,
            size: style.size,
            font: style.font,
            color: style.color,
            text: text.to_string(),
        };
        self.current.ops.push(DrawOp::Text(run));
    }

    fn push_rect(&mut self, rect: FilledRect) {
        self.current.ops.push(DrawOp::Rect(rect));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> LayoutState {
        LayoutState::begin("TITLE", "Sub", "footer text".to_string())
    }

    const LONG: &str = "Anaerobic digestion breaks down organic matter in the absence of oxygen \
        to produce biogas which can be burned for heat and electricity while the remaining \
        digestate is returned to farmland as a nutrient rich fertilizer that closes the loop.";

    #[test]
    fn test_wrap_respects_width() {
        let style = TextStyle::regular(10.0);
        let lines = wrap_lines(LONG, style, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(style.font, line, style.size) <= 200.0, "{line}");
        }
        assert_eq!(lines.join(" "), LONG.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let style = TextStyle::regular(10.0);
        let word = "x".repeat(200);
        let lines = wrap_lines(&word, style, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width(style.font, line, style.size) <= 100.0);
        }
    }

    #[test]
    fn test_wrap_empty_text() {
        assert!(wrap_lines("   ", TextStyle::regular(10.0), 100.0).is_empty());
    }

    #[test]
    fn test_every_page_has_header_and_footer() {
        let mut layout = state();
        layout.new_page("Second");
        let doc = layout.finish();
        assert_eq!(doc.page_count(), 2);
        for page in doc.pages() {
            assert!(page.contains_text("TITLE"));
            assert!(page.contains_text("footer text"));
        }
        assert!(doc.pages()[1].contains_text("Second"));
    }

    #[test]
    fn test_wrapped_text_breaks_page_once_without_losing_lines() {
        let style = TextStyle::regular(10.0);
        let mut layout = state();
        // Leave room for roughly two lines.
        layout.advance(CONTENT_TOP - BOTTOM_LIMIT - 30.0);
        let start_page = layout.page_index();

        let text = format!("{LONG} {LONG}");
        layout.wrapped(&text, style);
        let doc = layout.finish();
        assert_eq!(doc.page_count(), start_page + 2);

        let expected = wrap_lines(&text, style, BODY_WIDTH);
        assert!(expected.len() > 2);
        let drawn: Vec<&str> = doc
            .pages()
            .iter()
            .flat_map(|p| p.text_runs())
            .filter(|r| r.x == BODY_X && r.size == 10.0)
            .map(|r| r.text.as_str())
            .collect();
        assert_eq!(drawn, expected);
        assert!(doc.pages()[1].contains_text("Sub (Continued)"));
    }

    #[test]
    fn test_content_stays_above_footer() {
        let mut layout = state();
        for i in 0..200 {
            layout.line(&format!("line {i}"), TextStyle::regular(10.0), BODY_X, LineHeight::Normal);
        }
        let doc = layout.finish();
        assert!(doc.page_count() > 1);
        for page in doc.pages() {
            for run in page.text_runs().filter(|r| r.text.starts_with("line ")) {
                assert!(run.y >= BOTTOM_LIMIT && run.y <= CONTENT_TOP);
            }
        }
    }

    #[test]
    fn test_need_space_breaks_only_when_short() {
        let mut layout = state();
        layout.need_space(100.0);
        assert_eq!(layout.page_index(), 0);
        layout.advance(CONTENT_TOP - BOTTOM_LIMIT - 50.0);
        layout.need_space(100.0);
        assert_eq!(layout.page_index(), 1);
        assert_eq!(layout.y(), CONTENT_TOP);
    }
}
