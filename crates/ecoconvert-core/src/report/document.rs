/// RGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f64, pub f64, pub f64);

impl Rgb {
    pub const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
    /// Brand green used for header bands.
    pub const PRIMARY: Rgb = Rgb(0.06, 0.5, 0.31);
    pub const TEXT: Rgb = Rgb(0.2, 0.2, 0.2);
    pub const LIGHT_GRAY: Rgb = Rgb(0.9, 0.9, 0.9);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    /// Resource name used in page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    pub fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    /// Baseline position, measured up from the bottom edge.
    pub y: f64,
    pub size: f64,
    pub font: Font,
    pub color: Rgb,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilledRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text(TextRun),
    Rect(FilledRect),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(run) => Some(run),
            DrawOp::Rect(_) => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_runs().any(|run| run.text.contains(needle))
    }
}

/// Fixed-size pages of draw operations, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub width: f64,
    pub height: f64,
    pages: Vec<Page>,
}

impl ReportDocument {
    pub fn from_pages(width: f64, height: f64, pages: Vec<Page>) -> Self {
        Self {
            width,
            height,
            pages,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text in drawing order, one entry per run.
    pub fn text_lines(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|p| p.text_runs().map(|r| r.text.as_str()))
            .collect()
    }
}
