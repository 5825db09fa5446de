//! Page renderer

use crate::dom::{Dom, NodeId};
use crate::model::{Page, PartName};
use crate::overflow::SectionHandle;
use crate::{RenderConfig, Result};

use super::part::PartRenderer;

/// A rendered page: its node plus every section rendered into it, in
/// document order, for the fitting pass to revisit.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    node: NodeId,
    sections: Vec<SectionHandle>,
}

impl RenderedPage {
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn sections(&self) -> &[SectionHandle] {
        &self.sections
    }
}

pub struct PageRenderer<'a> {
    config: &'a RenderConfig,
}

impl<'a> PageRenderer<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// Render `page` and append it to `parent`.
    ///
    /// Parts are emitted header → main slot → footer regardless of how the
    /// input was ordered. If any part fails, nothing is appended.
    pub fn render(&self, dom: &mut Dom, parent: NodeId, page: &Page) -> Result<RenderedPage> {
        let node = dom.create_element(self.config.naming.page_tag());
        dom.set_attribute(node, "size", page.size.as_str());
        dom.set_attribute(node, "layout", page.layout.as_str());

        let parts = PartRenderer::new(self.config);
        let mut sections = Vec::new();
        for name in [PartName::Header, self.config.main_slot.part_name(), PartName::Footer] {
            sections.extend(parts.render(dom, node, page.part(name), name)?);
        }

        dom.append(parent, node);
        Ok(RenderedPage { node, sections })
    }
}
