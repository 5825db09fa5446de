//! # Document model
//!
//! The read-only view model a caller hands to the renderer. A [`Magazine`] is
//! an ordered list of [`Page`]s; each page has up to three [`PagePart`]
//! slots, and each part an ordered list of [`Section`]s.
//!
//! Optional fields map to `Option` so that *presence* of a key, not its
//! value, decides whether the renderer emits the corresponding style. The
//! only exceptions are the truthy flags (`bold`, `italic`, `underline`,
//! `landscape`), which are read with [`flag`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered sequence of pages. Position is the only identity a page has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Magazine {
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Magazine {
    pub fn new(pages: Vec<Page>) -> Self {
        Self { pages }
    }
}

/// One page: paper size, orientation and the three part slots.
///
/// Both `body` and `content` exist because the two document dialects name the
/// main slot differently; [`crate::MainSlot`] picks which one is rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub size: PageSize,
    #[serde(default)]
    pub layout: PageLayout,
    pub header: Option<PagePart>,
    pub body: Option<PagePart>,
    pub content: Option<PagePart>,
    pub footer: Option<PagePart>,
}

impl Page {
    pub fn part(&self, name: PartName) -> Option<&PagePart> {
        match name {
            PartName::Header => self.header.as_ref(),
            PartName::Body => self.body.as_ref(),
            PartName::Content => self.content.as_ref(),
            PartName::Footer => self.footer.as_ref(),
        }
    }
}

/// The structural regions of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartName {
    Header,
    Body,
    Content,
    Footer,
}

impl PartName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartName::Header => "header",
            PartName::Body => "body",
            PartName::Content => "content",
            PartName::Footer => "footer",
        }
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paper sizes understood by the page renderer and the print driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    #[serde(alias = "a3")]
    A3,
    #[default]
    #[serde(alias = "a4")]
    A4,
    #[serde(alias = "a5")]
    A5,
    #[serde(alias = "letter")]
    Letter,
    #[serde(alias = "legal")]
    Legal,
}

impl PageSize {
    pub const ALL: [PageSize; 5] = [PageSize::A3, PageSize::A4, PageSize::A5, PageSize::Letter, PageSize::Legal];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
        }
    }

    /// Portrait (width, height) in millimetres.
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            PageSize::A3 => (297.0, 420.0),
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }

    /// (width, height) in millimetres for the given orientation.
    pub fn oriented_mm(&self, layout: PageLayout) -> (f64, f64) {
        let (w, h) = self.dimensions_mm();
        match layout {
            PageLayout::Portrait => (w, h),
            PageLayout::Landscape => (h, w),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "a3" => Some(PageSize::A3),
            "a4" => Some(PageSize::A4),
            "a5" => Some(PageSize::A5),
            "letter" => Some(PageSize::Letter),
            "legal" => Some(PageSize::Legal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLayout {
    #[default]
    Portrait,
    Landscape,
}

impl PageLayout {
    pub const ALL: [PageLayout; 2] = [PageLayout::Portrait, PageLayout::Landscape];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageLayout::Portrait => "portrait",
            PageLayout::Landscape => "landscape",
        }
    }
}

/// One region of a page and the sections it holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePart {
    pub section_layout: Option<String>,
    pub landscape: Option<bool>,
    /// Rotation in degrees (only honoured under the rotation policy)
    pub rotation: Option<f64>,
    /// Padding in millimetres
    pub padding: Option<f64>,
    /// Region height in millimetres
    pub size: Option<f64>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A CSS value supplied either as a bare number (pixels) or a literal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Number(n) => write!(f, "{}px", n),
            CssValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CssValue {
    fn from(value: &str) -> Self {
        CssValue::Text(value.to_string())
    }
}

impl From<f64> for CssValue {
    fn from(value: f64) -> Self {
        CssValue::Number(value)
    }
}

/// Styling fields shared by every section variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionStyle {
    pub mode: Option<String>,
    pub direction: Option<String>,
    pub align: Option<String>,
    pub vertical_align: Option<String>,
    /// Padding in millimetres
    pub padding: Option<f64>,
    /// Block size in millimetres; width in landscape parts, height otherwise
    pub size: Option<f64>,
    pub font_size: Option<CssValue>,
    pub font_name: Option<String>,
}

/// A content section. `section_type` is kept as the raw tag so that an
/// unknown value reaches the renderer and fails there, loudly, instead of
/// being rejected or defaulted during decoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "type")]
    pub section_type: String,
    #[serde(flatten)]
    pub style: SectionStyle,

    // text
    pub text: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,

    // image
    pub source: Option<String>,
    pub width: Option<CssValue>,
    pub height: Option<CssValue>,

    // table
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

impl Section {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            section_type: "text".into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn image(source: impl Into<String>) -> Self {
        Self {
            section_type: "image".into(),
            source: Some(source.into()),
            ..Default::default()
        }
    }

    pub fn table<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|cells| TableRow {
                cells: cells
                    .into_iter()
                    .map(|v| TableCell { value: v.into() })
                    .collect(),
            })
            .collect();
        Self {
            section_type: "table".into(),
            rows,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub value: String,
}

/// Truthiness of an optional flag: absent and `false` are both "off".
pub fn flag(value: Option<bool>) -> bool {
    value.unwrap_or(false)
}
