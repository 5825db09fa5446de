//! Overflow fitting
//!
//! After the tree is attached, each section is measured. A section whose
//! content overflows its box is shrunk in up to three moves:
//!
//! 1. one proportional jump (`size × clientWidth / scrollWidth`) when the
//!    overflow is width-driven,
//! 2. repeated `step` decrements, one per scheduler tick,
//! 3. at or below `floor`, the content is replaced by a placeholder glyph.
//!
//! ```text
//! Fitted ◄── (measure) ──► ShrinkingProportional ──► ShrinkingStepwise ──► Exhausted
//!                                   │                        │
//!                                   └────────► Fitted ◄──────┘
//! ```

pub mod queue;

pub use queue::ResolveQueue;

use crate::dom::{Dom, NodeId};
use crate::surface::LayoutSurface;
use crate::{Error, Result};
use base64::Engine as _;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

const PLACEHOLDER_SVG: &str = include_str!("../assets/content_too_small.svg");

/// Shrink tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverflowConfig {
    /// Font-size decrement per stepwise iteration (px)
    pub step: f64,
    /// Font size (px) at or below which shrinking gives up
    pub floor: f64,
}

impl Default for OverflowConfig {
    fn default() -> Self {
        Self { step: 0.1, floor: 2.0 }
    }
}

impl OverflowConfig {
    pub fn validate(&self) -> Result<()> {
        if self.step.is_nan() || self.step <= 0.0 {
            return Err(Error::ConfigError(format!("overflow step must be positive, got {}", self.step)));
        }
        if self.floor.is_nan() || self.floor < 0.0 {
            return Err(Error::ConfigError(format!("overflow floor must not be negative, got {}", self.floor)));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowState {
    Fitted,
    ShrinkingProportional,
    ShrinkingStepwise,
    Exhausted,
}

impl OverflowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, OverflowState::Fitted | OverflowState::Exhausted)
    }
}

/// A back-reference to a rendered section plus what fallback restoration
/// needs. The node id does not own the node; the tree does.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionHandle {
    node: NodeId,
    landscape: bool,
    configured_font_size: Option<String>,
}

impl SectionHandle {
    pub fn new(node: NodeId, landscape: bool, configured_font_size: Option<String>) -> Self {
        Self {
            node,
            landscape,
            configured_font_size,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_landscape(&self) -> bool {
        self.landscape
    }

    /// The `font-size` the section was rendered with, if one was configured.
    pub fn configured_font_size(&self) -> Option<&str> {
        self.configured_font_size.as_deref()
    }
}

/// Terminal report for one section.
#[derive(Debug, Clone, PartialEq)]
pub struct OverflowOutcome {
    node: NodeId,
    /// `Fitted` or `Exhausted`
    pub state: OverflowState,
    /// Computed font size when the task finished
    pub font_size: f64,
    /// Every font size applied, in order
    pub applied: Vec<f64>,
}

impl OverflowOutcome {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn was_shrunk(&self) -> bool {
        !self.applied.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == OverflowState::Exhausted
    }
}

/// Result of advancing a task by one step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Still shrinking; re-schedule after other pending work
    Yield,
    Done(OverflowOutcome),
}

/// The fitting state machine for one section.
#[derive(Debug, Clone)]
pub struct OverflowTask {
    section: SectionHandle,
    config: OverflowConfig,
    state: Option<OverflowState>,
    applied: Vec<f64>,
}

impl OverflowTask {
    pub fn new(section: SectionHandle, config: OverflowConfig) -> Self {
        Self {
            section,
            config,
            state: None,
            applied: Vec::new(),
        }
    }

    pub fn section(&self) -> &SectionHandle {
        &self.section
    }

    /// `None` until the first measurement.
    pub fn state(&self) -> Option<OverflowState> {
        self.state
    }

    /// Advance by one unit of work.
    pub fn step(&mut self, dom: &mut Dom, surface: &mut dyn LayoutSurface) -> Result<Step> {
        let node = self.section.node;
        if !dom.is_attached(node) {
            return Err(Error::DetachedNode(node.index()));
        }

        match self.state {
            None => {
                let metrics = surface.metrics(dom, node)?;
                if !metrics.is_overflowing() {
                    return self.finish(OverflowState::Fitted, dom, surface);
                }

                self.state = Some(OverflowState::ShrinkingProportional);
                if metrics.overflows_width() {
                    let current = surface.computed_font_size(dom, node)?;
                    let size = round_to(current * metrics.client_width / metrics.scroll_width, 10.0);
                    self.apply(dom, size);
                    if !surface.metrics(dom, node)?.is_overflowing() {
                        return self.finish(OverflowState::Fitted, dom, surface);
                    }
                }

                self.state = Some(OverflowState::ShrinkingStepwise);
                Ok(Step::Yield)
            }
            Some(OverflowState::ShrinkingStepwise) => {
                let current = surface.computed_font_size(dom, node)?;
                if current <= self.config.floor {
                    self.substitute_placeholder(dom);
                    return self.finish(OverflowState::Exhausted, dom, surface);
                }

                self.apply(dom, round_to(current - self.config.step, 1000.0));
                if surface.metrics(dom, node)?.is_overflowing() {
                    Ok(Step::Yield)
                } else {
                    self.finish(OverflowState::Fitted, dom, surface)
                }
            }
            // A surface error interrupted the jump; carry on stepwise.
            Some(OverflowState::ShrinkingProportional) => {
                self.state = Some(OverflowState::ShrinkingStepwise);
                Ok(Step::Yield)
            }
            Some(terminal) => self.finish(terminal, dom, surface),
        }
    }

    fn apply(&mut self, dom: &mut Dom, size: f64) {
        trace!("node {}: font-size {}px", self.section.node.index(), size);
        dom.set_style(self.section.node, "font-size", format!("{}px", size));
        self.applied.push(size);
    }

    fn finish(&mut self, state: OverflowState, dom: &Dom, surface: &mut dyn LayoutSurface) -> Result<Step> {
        self.state = Some(state);
        let font_size = surface.computed_font_size(dom, self.section.node)?;
        Ok(Step::Done(OverflowOutcome {
            node: self.section.node,
            state,
            font_size,
            applied: self.applied.clone(),
        }))
    }

    fn substitute_placeholder(&self, dom: &mut Dom) {
        let node = self.section.node;
        warn!("node {}: content does not fit at any legible size; substituting placeholder", node.index());

        dom.remove_children(node);
        match &self.section.configured_font_size {
            Some(size) => dom.set_style(node, "font-size", size.as_str()),
            None => dom.remove_style(node, "font-size"),
        }

        let placeholder = fallback_placeholder(dom, self.section.landscape);
        dom.append(node, placeholder);
    }
}

/// Build the detached "content too small" placeholder.
pub fn fallback_placeholder(dom: &mut Dom, landscape: bool) -> NodeId {
    let wrapper = dom.create_element("div");
    dom.set_style(wrapper, "width", "100%");
    dom.set_style(wrapper, "height", "100%");
    dom.set_style(wrapper, "text-align", "center");
    dom.set_style(wrapper, "justify-content", "center");
    dom.set_style(wrapper, "align-items", "center");
    dom.set_style(wrapper, "display", "flex");

    let img = dom.create_element("img");
    dom.set_attribute(img, "src", placeholder_data_uri());
    if landscape {
        dom.set_style(img, "transform", "rotate(90deg)");
    }
    dom.append(wrapper, img);
    wrapper
}

/// The placeholder glyph as a `data:` URI.
pub fn placeholder_data_uri() -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(PLACEHOLDER_SVG)
    )
}

fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}
