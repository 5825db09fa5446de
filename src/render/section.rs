//! Section renderer: one content section → one styled `section` node.

use crate::dom::{Dom, NodeId};
use crate::model::{flag, CssValue, Section, TableRow};
use crate::overflow::SectionHandle;
use crate::{Error, Result};
use log::debug;

use super::{flex_alignment, mm};

/// Variant payload, resolved from the raw type tag.
#[derive(Debug, Clone, Copy)]
enum SectionBody<'a> {
    Text {
        text: &'a str,
        bold: bool,
        italic: bool,
        underline: bool,
    },
    Image {
        source: &'a str,
        width: Option<&'a CssValue>,
        height: Option<&'a CssValue>,
    },
    Table {
        rows: &'a [TableRow],
    },
}

impl<'a> SectionBody<'a> {
    fn from_section(section: &'a Section) -> Result<Self> {
        match section.section_type.as_str() {
            "text" => Ok(SectionBody::Text {
                text: section.text.as_deref().unwrap_or(""),
                bold: flag(section.bold),
                italic: flag(section.italic),
                underline: flag(section.underline),
            }),
            "image" => {
                let source = section.source.as_deref().ok_or_else(|| Error::MissingField {
                    section_type: section.section_type.clone(),
                    field: "source",
                })?;
                Ok(SectionBody::Image {
                    source,
                    width: section.width.as_ref(),
                    height: section.height.as_ref(),
                })
            }
            "table" => Ok(SectionBody::Table { rows: &section.rows }),
            other => Err(Error::UnknownSectionType(other.to_string())),
        }
    }
}

/// Renders one section. Construction resolves the type tag and fails for an
/// unknown one, so a malformed section never produces a node.
#[derive(Debug, Clone)]
pub struct SectionRenderer<'a> {
    section: &'a Section,
    body: SectionBody<'a>,
    landscape: bool,
}

impl<'a> SectionRenderer<'a> {
    /// `landscape` is the orientation of the containing part.
    pub fn new(section: &'a Section, landscape: bool) -> Result<Self> {
        let body = SectionBody::from_section(section)?;
        Ok(Self {
            section,
            body,
            landscape,
        })
    }

    pub fn section_type(&self) -> &str {
        &self.section.section_type
    }

    /// Create the (detached) section node and return a handle for fitting.
    pub fn render(&self, dom: &mut Dom) -> SectionHandle {
        let node = dom.create_element("section");
        self.apply_shared(dom, node);

        match self.body {
            SectionBody::Text {
                text,
                bold,
                italic,
                underline,
            } => {
                dom.set_inner_text(node, text);
                if bold {
                    dom.set_style(node, "font-weight", "bold");
                }
                if italic {
                    dom.set_style(node, "font-style", "italic");
                }
                if underline {
                    dom.set_style(node, "text-decoration", "underline");
                }
            }
            SectionBody::Image {
                source,
                width,
                height,
            } => {
                let img = dom.create_element("img");
                dom.set_attribute(img, "src", source);
                if let Some(w) = width {
                    dom.set_style(img, "width", w.to_string());
                }
                if let Some(h) = height {
                    dom.set_style(img, "height", h.to_string());
                }
                if self.landscape {
                    dom.set_style(img, "transform", "rotate(90deg)");
                }
                dom.append(node, img);
            }
            SectionBody::Table { rows } => {
                let table = dom.create_element("table");
                for row in rows {
                    let tr = dom.create_element("tr");
                    for cell in &row.cells {
                        let td = dom.create_element("td");
                        dom.set_inner_text(td, &cell.value);
                        dom.append(tr, td);
                    }
                    dom.append(table, tr);
                }
                dom.append(node, table);
            }
        }

        debug!("rendered {} section as node {}", self.section_type(), node.index());

        SectionHandle::new(
            node,
            self.landscape,
            self.section.style.font_size.as_ref().map(|v| v.to_string()),
        )
    }

    fn apply_shared(&self, dom: &mut Dom, node: NodeId) {
        let style = &self.section.style;

        dom.set_attribute(node, "type", self.section.section_type.as_str());
        if let Some(mode) = &style.mode {
            dom.set_attribute(node, "mode", mode.as_str());
        }

        match &style.direction {
            Some(direction) => dom.set_style(node, "direction", direction.as_str()),
            None => dom.set_attribute(node, "dir", "auto"),
        }

        if let Some(align) = &style.align {
            dom.set_style(node, "justify-content", flex_alignment(align));
            dom.set_style(node, "text-align", align.as_str());
        }

        if let Some(padding) = style.padding {
            dom.set_style(node, "padding", mm(padding));
        }

        if let Some(valign) = &style.vertical_align {
            dom.set_style(node, "align-items", flex_alignment(valign));
        }

        if let Some(size) = style.size {
            let axis = if self.landscape { "width" } else { "height" };
            dom.set_style(node, axis, mm(size));
        }

        if let Some(font_size) = &style.font_size {
            dom.set_style(node, "font-size", font_size.to_string());
        }

        if let Some(font_name) = &style.font_name {
            dom.set_style(node, "font-family", font_name.as_str());
        }
    }
}
