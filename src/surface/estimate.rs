/// Approximate layout surface
///
/// A deterministic stand-in for a browser's layout pass, good enough to drive
/// fitting offline and in tests:
/// - pages take their paper size at 96 dpi (swapped for landscape),
/// - children stack along their parent's block axis; explicit block sizes
///   are honoured and the remaining space is shared equally,
/// - text wraps greedily on whitespace with a fixed average glyph advance,
/// - `br` elements break lines; an empty line takes a full line height,
/// - tables take one padded row per line of their tallest cell,
/// - images take their explicit size (unsized images are assumed to fit).
use crate::dom::{Dom, NodeData, NodeId};
use crate::model::{PageLayout, PageSize};
use crate::Result;

use super::{cascaded_font_size, parse_length, BoxMetrics, LayoutSurface, DEFAULT_FONT_PX, PX_PER_MM};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Writing-mode relative extent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Extent {
    inline: f64,
    block: f64,
}

#[derive(Debug, Clone)]
pub struct EstimatedSurface {
    /// Average glyph advance as a fraction of the font size
    pub glyph_advance_em: f64,
    pub line_height_em: f64,
    pub default_font_px: f64,
    pub cell_padding_px: f64,
}

impl Default for EstimatedSurface {
    fn default() -> Self {
        Self {
            glyph_advance_em: 0.5,
            line_height_em: 1.2,
            default_font_px: DEFAULT_FONT_PX,
            cell_padding_px: 2.0,
        }
    }
}

impl LayoutSurface for EstimatedSurface {
    fn metrics(&mut self, dom: &Dom, node: NodeId) -> Result<BoxMetrics> {
        if !dom.is_attached(node) {
            return Ok(BoxMetrics::default());
        }
        let Some(outer) = self.border_box(dom, node) else {
            return Ok(BoxMetrics::default());
        };

        let font = self.font(dom, node);
        let pad = self.padding(dom, node, outer.width, font);
        let vertical = self.is_vertical(dom, node);
        let content = Size {
            width: (outer.width - 2.0 * pad).max(0.0),
            height: (outer.height - 2.0 * pad).max(0.0),
        };
        let (avail_inline, avail_block) = logical(content, vertical);
        let extent = self.children_extent(dom, node, avail_inline, avail_block, font, vertical);
        let (content_w, content_h) = physical(extent, vertical);

        Ok(BoxMetrics::new(
            outer.width.max(content_w + 2.0 * pad).round(),
            outer.height.max(content_h + 2.0 * pad).round(),
            outer.width.round(),
            outer.height.round(),
        ))
    }

    fn computed_font_size(&mut self, dom: &Dom, node: NodeId) -> Result<f64> {
        Ok(self.font(dom, node))
    }
}

impl EstimatedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Border box of `node` as placed by its parent, or `None` when the node
    /// does not sit inside a page.
    pub fn border_box(&self, dom: &Dom, node: NodeId) -> Option<Size> {
        if let Some(size) = dom.attribute(node, "size").and_then(PageSize::parse) {
            let layout = match dom.attribute(node, "layout") {
                Some("landscape") => PageLayout::Landscape,
                _ => PageLayout::Portrait,
            };
            let (w, h) = size.oriented_mm(layout);
            return Some(Size {
                width: w * PX_PER_MM,
                height: h * PX_PER_MM,
            });
        }

        let parent = dom.parent(node)?;
        let outer = self.border_box(dom, parent)?;
        let pad = self.padding(dom, parent, outer.width, self.font(dom, parent));
        let inner = Size {
            width: (outer.width - 2.0 * pad).max(0.0),
            height: (outer.height - 2.0 * pad).max(0.0),
        };
        let vertical = self.is_vertical(dom, parent);
        let (inner_inline, inner_block) = logical(inner, vertical);
        let (inline_prop, block_prop) = axis_properties(vertical);

        let mut explicit = 0.0;
        let mut unsized_count = 0usize;
        for sibling in dom.element_children(parent) {
            match self.length_style(dom, sibling, block_prop, inner_block) {
                Some(v) => explicit += v,
                None => unsized_count += 1,
            }
        }

        let block = self
            .length_style(dom, node, block_prop, inner_block)
            .unwrap_or_else(|| (inner_block - explicit).max(0.0) / unsized_count.max(1) as f64);
        let inline = self
            .length_style(dom, node, inline_prop, inner_inline)
            .unwrap_or(inner_inline);

        Some(physical_size(Extent { inline, block }, vertical))
    }

    fn font(&self, dom: &Dom, node: NodeId) -> f64 {
        cascaded_font_size(dom, node, self.default_font_px)
    }

    fn padding(&self, dom: &Dom, node: NodeId, percent_base: f64, font: f64) -> f64 {
        dom.style(node, "padding")
            .and_then(|v| parse_length(v, percent_base, font))
            .unwrap_or(0.0)
    }

    fn length_style(&self, dom: &Dom, node: NodeId, property: &str, percent_base: f64) -> Option<f64> {
        dom.style(node, property)
            .and_then(|v| parse_length(v, percent_base, self.font(dom, node)))
    }

    /// `writing-mode` is inherited.
    fn is_vertical(&self, dom: &Dom, node: NodeId) -> bool {
        std::iter::once(node)
            .chain(dom.ancestors(node))
            .find_map(|n| dom.style(n, "writing-mode"))
            .map(|mode| mode.starts_with("tb") || mode.starts_with("vertical"))
            .unwrap_or(false)
    }

    fn children_extent(
        &self,
        dom: &Dom,
        node: NodeId,
        avail_inline: f64,
        avail_block: f64,
        font: f64,
        vertical: bool,
    ) -> Extent {
        let mut total = Extent::default();
        // A `br` with no text since the previous break is an empty line.
        let mut line_open = false;
        for child in dom.children(node) {
            let e = match dom.data(*child) {
                NodeData::Text(text) => {
                    line_open |= !text.trim().is_empty();
                    self.text_extent(text, avail_inline, font)
                }
                NodeData::Element(_) if dom.tag(*child) == Some("br") => {
                    let blank = !line_open;
                    line_open = false;
                    Extent {
                        inline: 0.0,
                        block: if blank { font * self.line_height_em } else { 0.0 },
                    }
                }
                NodeData::Element(_) => {
                    line_open = false;
                    self.element_extent(dom, *child, avail_inline, avail_block, vertical)
                }
            };
            total.inline = total.inline.max(e.inline);
            total.block += e.block;
        }
        total
    }

    fn element_extent(&self, dom: &Dom, el: NodeId, avail_inline: f64, avail_block: f64, vertical: bool) -> Extent {
        let font = self.font(dom, el);
        match dom.tag(el).unwrap_or_default() {
            "table" => self.table_extent(dom, el, font),
            "img" => {
                let (base_w, base_h) = physical(
                    Extent {
                        inline: avail_inline,
                        block: avail_block,
                    },
                    vertical,
                );
                let w = self.length_style(dom, el, "width", base_w).unwrap_or(0.0);
                let h = self.length_style(dom, el, "height", base_h).unwrap_or(0.0);
                let (w, h) = if quarter_turned(dom, el) { (h, w) } else { (w, h) };
                let (inline, block) = logical(Size { width: w, height: h }, vertical);
                Extent { inline, block }
            }
            _ => {
                let (inline_prop, block_prop) = axis_properties(vertical);
                let inline = self.length_style(dom, el, inline_prop, avail_inline);
                let block = self.length_style(dom, el, block_prop, avail_block);
                let inner = self.children_extent(
                    dom,
                    el,
                    inline.unwrap_or(avail_inline),
                    block.unwrap_or(avail_block),
                    font,
                    vertical,
                );
                Extent {
                    inline: inline.unwrap_or(inner.inline),
                    block: block.unwrap_or(inner.block),
                }
            }
        }
    }

    fn text_extent(&self, text: &str, avail_inline: f64, font: f64) -> Extent {
        if text.trim().is_empty() {
            return Extent::default();
        }
        let advance = font * self.glyph_advance_em;
        let mut lines = 0usize;
        let mut widest = 0.0f64;

        for paragraph in text.split('\n') {
            let mut line = 0.0f64;
            let mut started = false;
            for word in paragraph.split_whitespace() {
                let w = word.chars().count() as f64 * advance;
                if started && line + advance + w > avail_inline {
                    widest = widest.max(line);
                    lines += 1;
                    line = w;
                } else {
                    if started {
                        line += advance;
                    }
                    line += w;
                }
                started = true;
            }
            widest = widest.max(line);
            lines += 1;
        }

        Extent {
            inline: widest,
            block: lines as f64 * font * self.line_height_em,
        }
    }

    fn table_extent(&self, dom: &Dom, table: NodeId, font: f64) -> Extent {
        let advance = font * self.glyph_advance_em;
        let line_height = font * self.line_height_em;
        let mut total = Extent::default();
        for row in dom.element_children(table) {
            let mut row_inline = 0.0;
            let mut row_lines = 0usize;
            let mut cells = 0usize;
            for cell in dom.element_children(row) {
                let text = dom.inner_text(cell);
                let widest = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
                row_inline += widest as f64 * advance + 2.0 * self.cell_padding_px;
                row_lines = row_lines.max(text.split('\n').count());
                cells += 1;
            }
            total.inline = total.inline.max(row_inline);
            if cells > 0 {
                total.block += row_lines as f64 * line_height + 2.0 * self.cell_padding_px;
            }
        }
        total
    }
}

fn axis_properties(vertical: bool) -> (&'static str, &'static str) {
    if vertical {
        ("height", "width")
    } else {
        ("width", "height")
    }
}

fn logical(size: Size, vertical: bool) -> (f64, f64) {
    if vertical {
        (size.height, size.width)
    } else {
        (size.width, size.height)
    }
}

fn physical(extent: Extent, vertical: bool) -> (f64, f64) {
    if vertical {
        (extent.block, extent.inline)
    } else {
        (extent.inline, extent.block)
    }
}

fn physical_size(extent: Extent, vertical: bool) -> Size {
    let (width, height) = physical(extent, vertical);
    Size { width, height }
}

fn quarter_turned(dom: &Dom, node: NodeId) -> bool {
    dom.style(node, "transform")
        .map(|t| t.contains("rotate(90deg)") || t.contains("rotate(270deg)") || t.contains("rotate(-90deg)"))
        .unwrap_or(false)
}
