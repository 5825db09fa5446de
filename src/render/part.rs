//! Page-part renderer: header / main / footer regions.

use crate::dom::{Dom, NodeId};
use crate::model::{flag, PagePart, PartName};
use crate::overflow::SectionHandle;
use crate::{OrientationPolicy, RenderConfig, Result};
use log::debug;

use super::{mm, section::SectionRenderer};

pub struct PartRenderer<'a> {
    config: &'a RenderConfig,
}

impl<'a> PartRenderer<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// Render `part` under `page_node` as the `name` region.
    ///
    /// An absent part renders nothing. Every section renderer is constructed
    /// before the first node is created, so an unknown section tag leaves no
    /// trace in the tree.
    pub fn render(
        &self,
        dom: &mut Dom,
        page_node: NodeId,
        part: Option<&PagePart>,
        name: PartName,
    ) -> Result<Vec<SectionHandle>> {
        let Some(part) = part else {
            return Ok(Vec::new());
        };

        let landscape = self.config.orientation.is_landscape(part);
        let renderers = part
            .sections
            .iter()
            .map(|s| SectionRenderer::new(s, landscape))
            .collect::<Result<Vec<_>>>()?;

        let part_node = dom.create_element(&self.config.naming.part_tag(name));

        if let Some(layout) = &part.section_layout {
            dom.set_attribute(part_node, "layout", layout.as_str());
        }
        match self.config.orientation {
            OrientationPolicy::LandscapeFlip => {
                if flag(part.landscape) {
                    dom.set_style(part_node, "writing-mode", "tb-rl");
                }
            }
            OrientationPolicy::Rotation => {
                if let Some(deg) = part.rotation {
                    dom.set_style(part_node, "transform", format!("rotate({}deg)", deg));
                }
            }
        }
        if let Some(padding) = part.padding {
            dom.set_style(part_node, "padding", mm(padding));
        }
        if let Some(size) = part.size {
            dom.set_style(part_node, "height", mm(size));
        }

        let mut handles = Vec::with_capacity(renderers.len());
        for renderer in &renderers {
            let handle = renderer.render(dom);
            dom.append(part_node, handle.node());
            handles.push(handle);
        }

        dom.append(page_node, part_node);
        debug!("rendered {} part with {} section(s)", name, handles.len());
        Ok(handles)
    }
}
