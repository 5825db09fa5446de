//! Layout surfaces: where live geometry comes from.
//!
//! The renderer never computes layout itself. Fitting asks a
//! [`LayoutSurface`] for the scroll and client extents of a section and for
//! its computed font size, the same two questions a browser answers through
//! `scrollWidth`/`clientWidth` and `getComputedStyle`.

pub mod estimate;

pub use estimate::EstimatedSurface;

use cssparser::{Parser, ParserInput, Token};

use crate::dom::{Dom, NodeId};
use crate::Result;

/// CSS reference pixels per millimetre (96 dpi).
pub const PX_PER_MM: f64 = 96.0 / 25.4;

/// Font size used when nothing in the cascade sets one.
pub const DEFAULT_FONT_PX: f64 = 16.0;

/// Scroll and client extents of a box, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxMetrics {
    pub scroll_width: f64,
    pub scroll_height: f64,
    pub client_width: f64,
    pub client_height: f64,
}

impl BoxMetrics {
    pub fn new(scroll_width: f64, scroll_height: f64, client_width: f64, client_height: f64) -> Self {
        Self {
            scroll_width,
            scroll_height,
            client_width,
            client_height,
        }
    }

    pub fn overflows_width(&self) -> bool {
        self.scroll_width > self.client_width
    }

    pub fn overflows_height(&self) -> bool {
        self.scroll_height > self.client_height
    }

    pub fn is_overflowing(&self) -> bool {
        self.overflows_width() || self.overflows_height()
    }
}

/// A measuring backend.
///
/// Implementations only have to answer for nodes attached under the root;
/// callers enforce that barrier before asking.
pub trait LayoutSurface {
    /// Current scroll/client extents of `node`, reflecting every style and
    /// child change made to the tree so far.
    fn metrics(&mut self, dom: &Dom, node: NodeId) -> Result<BoxMetrics>;

    /// Computed font size of `node` in pixels.
    fn computed_font_size(&mut self, dom: &Dom, node: NodeId) -> Result<f64>;
}

/// Resolve a CSS length to pixels.
///
/// Percentages resolve against `percent_base`, `em` against `font_px`.
/// Bare numbers are taken as pixels. Units are matched case-insensitively.
/// Keywords, unknown units and trailing tokens yield `None`.
pub fn parse_length(value: &str, percent_base: f64, font_px: f64) -> Option<f64> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    let token = parser.next().ok()?.clone();
    if !parser.is_exhausted() {
        return None;
    }

    let px = match token {
        Token::Dimension { value, ref unit, .. } => {
            let n = widen(value);
            match unit.to_ascii_lowercase().as_str() {
                "px" => n,
                "mm" => n * PX_PER_MM,
                "cm" => n * PX_PER_MM * 10.0,
                "in" => n * 96.0,
                "pt" => n * 96.0 / 72.0,
                "pc" => n * 16.0,
                "em" | "rem" => n * font_px,
                _ => return None,
            }
        }
        Token::Percentage { unit_value, .. } => widen(unit_value) * percent_base,
        Token::Number { value, .. } => widen(value),
        _ => return None,
    };
    Some(px)
}

/// Tokens carry `f32`; go through the shortest decimal form so `3.3px`
/// reads back as 3.3 rather than 3.2999999523.
fn widen(value: f32) -> f64 {
    value.to_string().parse().unwrap_or(f64::from(value))
}

/// Computed font size from inline `font-size` declarations, cascading from
/// the root down to `node`. Relative sizes resolve against the parent.
pub fn cascaded_font_size(dom: &Dom, node: NodeId, default_px: f64) -> f64 {
    let mut chain: Vec<NodeId> = dom.ancestors(node).collect();
    chain.reverse();
    chain.push(node);

    chain.into_iter().fold(default_px, |inherited, n| {
        dom.style(n, "font-size")
            .and_then(|v| parse_length(v, inherited, inherited))
            .unwrap_or(inherited)
    })
}
