//! Chrome DevTools Protocol backend
//!
//! Two pieces share one headless Chrome tab:
//! - [`CdpSurface`] answers layout questions against the live page, pushing a
//!   section's current style and children into the page before each read,
//! - [`CdpExporter`] loads a built magazine, fits it through the surface and
//!   prints the result to PDF.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::browser::tab::Tab;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use serde::Deserialize;

use crate::dom::{Dom, NodeId, SerializeOptions};
use crate::export::{document_write_script, prepare_document, ExportConfig, PdfExporter, PreparedDocument, PrintOptions, BLANK_PAGE};
use crate::model::Magazine;
use crate::surface::{BoxMetrics, LayoutSurface};
use crate::{Error, RenderConfig, Result};

const READY_POLL: Duration = Duration::from_millis(25);

#[derive(Debug, Deserialize)]
struct RawMetrics {
    sw: f64,
    sh: f64,
    cw: f64,
    ch: f64,
}

/// Live layout over a browser tab.
///
/// Nodes are found through the `data-node` attribute emitted by
/// [`SerializeOptions::node_ids`], so the page must have been loaded from a
/// document serialized that way.
pub struct CdpSurface {
    tab: Arc<Tab>,
    // last (style, inner html) pushed per node
    synced: HashMap<NodeId, (String, String)>,
}

impl CdpSurface {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self {
            tab,
            synced: HashMap::new(),
        }
    }

    /// Push `node`'s inline style and children to the page when they changed
    /// since the last push.
    fn sync(&mut self, dom: &Dom, node: NodeId) -> Result<()> {
        let style = dom.element(node).map(|el| el.style.to_css()).unwrap_or_default();
        let inner = dom.inner_html(node, SerializeOptions { node_ids: true });
        let current = (style, inner);
        if self.synced.get(&node) == Some(&current) {
            return Ok(());
        }

        let script = sync_script(node, &current.0, &current.1);
        let found = self
            .tab
            .evaluate(&script, false)
            .map_err(|e| Error::CdpError(format!("Failed to sync node {}: {}", node.index(), e)))?
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !found {
            return Err(Error::CdpError(format!("node {} is not present in the page", node.index())));
        }
        self.synced.insert(node, current);
        Ok(())
    }

    fn eval_string(&self, script: &str) -> Result<String> {
        let value = self
            .tab
            .evaluate(script, false)
            .map_err(|e| Error::CdpError(format!("Evaluation failed: {}", e)))?
            .value
            .ok_or_else(|| Error::CdpError("No value returned from evaluation".into()))?;
        match value {
            serde_json::Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }
}

impl LayoutSurface for CdpSurface {
    fn metrics(&mut self, dom: &Dom, node: NodeId) -> Result<BoxMetrics> {
        if !dom.is_attached(node) {
            return Ok(BoxMetrics::default());
        }
        self.sync(dom, node)?;
        let raw = self.eval_string(&format!(
            "(function(){{const el=document.querySelector('[data-node=\"{}\"]');\
             return JSON.stringify({{sw:el.scrollWidth,sh:el.scrollHeight,cw:el.clientWidth,ch:el.clientHeight}});}})()",
            node.index()
        ))?;
        let m: RawMetrics = serde_json::from_str(&raw)?;
        Ok(BoxMetrics::new(m.sw, m.sh, m.cw, m.ch))
    }

    fn computed_font_size(&mut self, dom: &Dom, node: NodeId) -> Result<f64> {
        self.sync(dom, node)?;
        let raw = self.eval_string(&format!(
            "String(parseFloat(getComputedStyle(document.querySelector('[data-node=\"{}\"]')).fontSize))",
            node.index()
        ))?;
        raw.trim()
            .parse()
            .map_err(|_| Error::CdpError(format!("unexpected computed font size '{}'", raw)))
    }
}

/// Script replacing the inline style and children of the element tagged with
/// `node`. Evaluates to whether the element was found.
fn sync_script(node: NodeId, style: &str, inner_html: &str) -> String {
    // JSON string literals are valid JS string literals
    let style = serde_json::Value::String(style.to_string());
    let inner = serde_json::Value::String(inner_html.to_string());
    format!(
        "(function(){{const el=document.querySelector('[data-node=\"{}\"]');\
         if(!el)return false;el.setAttribute('style',{});el.innerHTML={};return true;}})()",
        node.index(),
        style,
        inner
    )
}

/// Headless Chrome print driver.
pub struct CdpExporter {
    browser: Browser,
    tab: Arc<Tab>,
    config: ExportConfig,
}

impl CdpExporter {
    pub fn new(config: ExportConfig) -> Result<Self> {
        config.validate()?;

        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.window_width, config.window_height)))
            .build()
            .map_err(|e| Error::CdpError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::CdpError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser.new_tab()?;

        Ok(Self { browser, tab, config })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn load(&self, html: &str) -> Result<()> {
        self.tab
            .navigate_to(BLANK_PAGE)
            .map_err(|e| Error::ExportError(format!("Navigation failed: {}", e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::ExportError(format!("Wait for navigation failed: {}", e)))?;
        self.tab
            .evaluate(&document_write_script(html)?, false)
            .map_err(|e| Error::ExportError(format!("Writing the document failed: {}", e)))?;
        self.wait_until_ready()
    }

    /// Poll `document.readyState` until it reports `complete`.
    fn wait_until_ready(&self) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(self.config.ready_timeout_ms);
        loop {
            let state = self
                .tab
                .evaluate("document.readyState", false)
                .map_err(|e| Error::ExportError(format!("readyState query failed: {}", e)))?
                .value;
            if state.as_ref().and_then(|v| v.as_str()) == Some("complete") {
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!("document not ready after {}ms", self.config.ready_timeout_ms);
                return Err(Error::Timeout(self.config.ready_timeout_ms));
            }
            std::thread::sleep(READY_POLL);
        }
    }

    pub fn close(self) -> Result<()> {
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}

impl PdfExporter for CdpExporter {
    fn export(&mut self, magazine: &Magazine, config: &RenderConfig) -> Result<Vec<u8>> {
        let PreparedDocument { mut dom, built, html } = prepare_document(magazine, config)?;
        self.load(&html)?;

        let mut surface = CdpSurface::new(self.tab.clone());
        let rendered = built.resolve(&mut dom, &mut surface)?;
        debug!("fitted {} section(s) in the live page", rendered.outcomes().len());

        let opts = PrintOptions::for_magazine(magazine, &self.config);
        let pdf = self
            .tab
            .print_to_pdf(Some(PrintToPdfOptions {
                paper_width: Some(opts.paper_width_in()),
                paper_height: Some(opts.paper_height_in()),
                scale: Some(opts.scale),
                margin_top: Some(opts.margin_in()),
                margin_bottom: Some(opts.margin_in()),
                margin_left: Some(opts.margin_in()),
                margin_right: Some(opts.margin_in()),
                print_background: Some(true),
                ..Default::default()
            }))
            .map_err(|e| Error::ExportError(format!("printToPDF failed: {}", e)))?;
        Ok(pdf)
    }
}
