//! PDF export plumbing shared by print backends.
//!
//! A backend receives a magazine and a render configuration and returns PDF
//! bytes. Everything that does not need a browser lives here: building the
//! document that gets loaded, and the print options handed to the printer.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::dom::{Dom, SerializeOptions};
use crate::model::{Magazine, PageLayout, PageSize};
use crate::render::{BuiltMagazine, MagazineRenderer};
use crate::stylesheet::base_stylesheet;
use crate::{Error, RenderConfig, Result};

pub const MM_PER_INCH: f64 = 25.4;

/// Export driver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Paper size for every printed page; defaults to the first page's size
    pub paper: Option<PageSize>,
    pub scale: f64,
    /// How long to wait for the loaded document to report ready (ms)
    pub ready_timeout_ms: u64,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            paper: None,
            scale: 1.0,
            ready_timeout_ms: 1000,
            window_width: 1280,
            window_height: 1024,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.scale.is_nan() || self.scale <= 0.0 {
            return Err(Error::ConfigError(format!("print scale must be positive, got {}", self.scale)));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(Error::ConfigError("browser window size must be non-zero".into()));
        }
        Ok(())
    }
}

/// Page setup for a print run. Margins are always zero; pages carry their
/// own padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintOptions {
    pub paper_width_mm: f64,
    pub paper_height_mm: f64,
    pub scale: f64,
}

impl PrintOptions {
    pub fn from_page(size: PageSize, layout: PageLayout, scale: f64) -> Self {
        let (w, h) = size.oriented_mm(layout);
        Self {
            paper_width_mm: w,
            paper_height_mm: h,
            scale,
        }
    }

    /// Paper from the config override, else the first page, else portrait A4.
    pub fn for_magazine(magazine: &Magazine, config: &ExportConfig) -> Self {
        let first = magazine.pages.first();
        let size = config
            .paper
            .or_else(|| first.map(|p| p.size))
            .unwrap_or_default();
        let layout = first.map(|p| p.layout).unwrap_or_default();
        Self::from_page(size, layout, config.scale)
    }

    pub fn paper_width_in(&self) -> f64 {
        self.paper_width_mm / MM_PER_INCH
    }

    pub fn paper_height_in(&self) -> f64 {
        self.paper_height_mm / MM_PER_INCH
    }

    pub fn margin_in(&self) -> f64 {
        0.0
    }
}

/// A built but not yet fitted document, serialized for loading into a
/// browser. Elements carry `data-node` ids so a live surface can find them.
#[derive(Debug)]
pub struct PreparedDocument {
    pub dom: Dom,
    pub built: BuiltMagazine,
    pub html: String,
}

pub fn prepare_document(magazine: &Magazine, config: &RenderConfig) -> Result<PreparedDocument> {
    let mut dom = Dom::new("body");
    let root = dom.root();
    let built = MagazineRenderer::new(config.clone())?.build(&mut dom, root, magazine)?;
    let html = dom.to_html_document(&base_stylesheet(config), SerializeOptions { node_ids: true });
    Ok(PreparedDocument { dom, built, html })
}

/// Page at which a backend opens before the document is written in.
pub const BLANK_PAGE: &str = "about:blank";

/// Script replacing the current page with `html`.
///
/// Documents go in through `document.write` on a blank page rather than a
/// `data:` URL, so inline images are not bound by the browser's URL length cap.
pub fn document_write_script(html: &str) -> Result<String> {
    let literal = serde_json::to_string(html)?;
    Ok(format!(
        "(function() {{ document.open(); document.write({}); document.close(); return true; }})()",
        literal
    ))
}

/// A print backend.
pub trait PdfExporter {
    fn export(&mut self, magazine: &Magazine, config: &RenderConfig) -> Result<Vec<u8>>;
}

/// Export through `exporter` and write the PDF to `path`. Returns the number
/// of bytes written.
pub fn export_to_file(
    exporter: &mut dyn PdfExporter,
    magazine: &Magazine,
    config: &RenderConfig,
    path: impl AsRef<Path>,
) -> Result<usize> {
    let pdf = exporter.export(magazine, config)?;
    if !pdf.starts_with(b"%PDF") {
        return Err(Error::ExportError("printer returned data without a PDF header".into()));
    }
    std::fs::write(path.as_ref(), &pdf)?;
    info!("wrote {} bytes to {}", pdf.len(), path.as_ref().display());
    Ok(pdf.len())
}
