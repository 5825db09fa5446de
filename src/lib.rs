//! Magrender
//!
//! A declarative magazine renderer: a document description (pages, page
//! parts, typed content sections) is turned into a styled visual tree, after
//! which every section is fitted to its box by shrinking its font or, as a
//! last resort, swapping its content for a placeholder glyph. The finished
//! tree can be serialized to HTML or handed to a headless browser to print a
//! paginated PDF.
//!
//! # Architecture
//!
//! - **Build** (`render`): Magazine → Page → Page part → Section, constructing
//!   and styling nodes only. Nothing is measured here.
//! - **Fit** (`overflow`): once every page is attached, each section is
//!   measured through a [`LayoutSurface`] and shrunk until it fits.
//! - **Surfaces** (`surface`, `cdp`): the measuring backend, either the
//!   built-in estimator or a live browser tab over CDP.
//! - **Export** (`export`, `cdp`): print-to-PDF driver.
//!
//! # Example
//!
//! ```
//! use magrender::model::{Magazine, Page, PagePart, Section};
//! use magrender::RenderConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let magazine = Magazine::new(vec![Page {
//!     content: Some(PagePart {
//!         sections: vec![Section::text("Hello")],
//!         ..Default::default()
//!     }),
//!     ..Default::default()
//! }]);
//!
//! let html = magrender::render_html(&magazine, &RenderConfig::default())?;
//! assert!(html.contains("Hello"));
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod error;
pub use error::{Error, Result};

pub mod dom;
pub mod export;
pub mod model;
pub mod overflow;
pub mod render;
pub mod stylesheet;
pub mod surface;

// Chrome DevTools backend: live measuring surface and PDF print driver
#[cfg(feature = "cdp")]
pub mod cdp;

// Async-friendly export API (worker-thread backed)
#[cfg(feature = "cdp")]
pub mod async_api;

#[cfg(feature = "cdp")]
pub use async_api::Exporter;

pub use dom::{Dom, NodeId, SerializeOptions};
pub use model::{Magazine, Page, PagePart, PartName, Section};
pub use overflow::{OverflowConfig, OverflowOutcome, OverflowState, SectionHandle};
pub use render::{BuiltMagazine, MagazineRenderer, RenderedMagazine};
pub use surface::{BoxMetrics, EstimatedSurface, LayoutSurface};

/// How a page part expresses orientation.
///
/// The two conventions are alternatives for a whole render; the part field
/// that the selected policy does not read is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrientationPolicy {
    /// `landscape: true` flips the part to a vertical writing mode
    #[default]
    LandscapeFlip,
    /// `rotation: <deg>` is applied as a transform
    Rotation,
}

impl OrientationPolicy {
    /// Whether sections in `part` are laid out landscape: `size` constrains
    /// width and images/placeholders are turned a quarter.
    pub fn is_landscape(&self, part: &PagePart) -> bool {
        match self {
            OrientationPolicy::LandscapeFlip => model::flag(part.landscape),
            OrientationPolicy::Rotation => part
                .rotation
                .map(|deg| {
                    let turn = deg.rem_euclid(360.0);
                    turn == 90.0 || turn == 270.0
                })
                .unwrap_or(false),
        }
    }
}

/// Which page key holds the main region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainSlot {
    #[default]
    Content,
    Body,
}

impl MainSlot {
    pub fn part_name(&self) -> PartName {
        match self {
            MainSlot::Content => PartName::Content,
            MainSlot::Body => PartName::Body,
        }
    }
}

/// Tag naming convention for the structural nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementNaming {
    /// `page`, `header`, `content`, `footer`
    #[default]
    Plain,
    /// `page-container`, `page-header`, `page-body`, `page-footer`
    Prefixed,
}

impl ElementNaming {
    pub const DOCUMENT_TAG: &'static str = "magazine";

    pub fn page_tag(&self) -> &'static str {
        match self {
            ElementNaming::Plain => "page",
            ElementNaming::Prefixed => "page-container",
        }
    }

    pub fn part_tag(&self, name: PartName) -> String {
        match self {
            ElementNaming::Plain => name.as_str().to_string(),
            ElementNaming::Prefixed => format!("page-{}", name),
        }
    }
}

/// Renderer configuration
///
/// The default is the "magazine" dialect: landscape flip, `content` main
/// slot, plain tags and overflow fitting enabled.
///
/// # Examples
///
/// ```
/// let cfg = magrender::RenderConfig::default();
/// assert!(cfg.resolve_overflow);
/// assert_eq!(cfg.main_slot, magrender::MainSlot::Content);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub orientation: OrientationPolicy,
    pub main_slot: MainSlot,
    pub naming: ElementNaming,
    /// Run the fitting pass after the tree is built
    pub resolve_overflow: bool,
    pub overflow: OverflowConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::magazine()
    }
}

impl RenderConfig {
    pub fn magazine() -> Self {
        Self {
            orientation: OrientationPolicy::LandscapeFlip,
            main_slot: MainSlot::Content,
            naming: ElementNaming::Plain,
            resolve_overflow: true,
            overflow: OverflowConfig::default(),
        }
    }

    pub fn pages() -> Self {
        Self {
            orientation: OrientationPolicy::Rotation,
            main_slot: MainSlot::Body,
            naming: ElementNaming::Prefixed,
            resolve_overflow: false,
            overflow: OverflowConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.naming == ElementNaming::Plain && self.main_slot == MainSlot::Body {
            return Err(Error::ConfigError(
                "plain naming cannot emit a nested 'body' element; use the prefixed naming or the 'content' slot".into(),
            ));
        }
        self.overflow.validate()
    }

    /// Load a configuration from a JSON file; missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: RenderConfig = serde_json::from_str(&data)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Render `magazine` into a fresh tree, fitting sections with the built-in
/// [`EstimatedSurface`].
pub fn render_magazine(magazine: &Magazine, config: &RenderConfig) -> Result<(Dom, RenderedMagazine)> {
    let mut dom = Dom::new("body");
    let root = dom.root();
    let mut surface = EstimatedSurface::default();
    let rendered = MagazineRenderer::new(config.clone())?.render(&mut dom, root, magazine, &mut surface)?;
    Ok((dom, rendered))
}

/// Decode a JSON document description and render it.
pub fn render_json(json: &str, config: &RenderConfig) -> Result<(Dom, RenderedMagazine)> {
    let magazine: Magazine = serde_json::from_str(json)?;
    render_magazine(&magazine, config)
}

/// Render `magazine` to a standalone HTML document with the base stylesheet.
pub fn render_html(magazine: &Magazine, config: &RenderConfig) -> Result<String> {
    let (dom, _) = render_magazine(magazine, config)?;
    Ok(dom.to_html_document(&stylesheet::base_stylesheet(config), SerializeOptions::default()))
}
