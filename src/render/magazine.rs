//! Magazine renderer and the build → fit barrier.

use std::collections::BTreeMap;

use crate::dom::{Dom, NodeId};
use crate::model::Magazine;
use crate::overflow::{OverflowConfig, OverflowOutcome, OverflowTask, ResolveQueue, SectionHandle};
use crate::surface::LayoutSurface;
use crate::{ElementNaming, RenderConfig, Result};
use log::info;

use super::page::{PageRenderer, RenderedPage};

/// Renders a whole magazine under a caller-supplied root.
#[derive(Debug, Clone)]
pub struct MagazineRenderer {
    config: RenderConfig,
}

impl MagazineRenderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Build the tree, then fit every section.
    pub fn render(
        &self,
        dom: &mut Dom,
        output_root: NodeId,
        magazine: &Magazine,
        surface: &mut dyn LayoutSurface,
    ) -> Result<RenderedMagazine> {
        self.build(dom, output_root, magazine)?.resolve(dom, surface)
    }

    /// First pass: construct and style every node without measuring.
    ///
    /// Pages are rendered into a detached container which is attached to
    /// `output_root` only once all of them succeeded; on error the output
    /// root is left as it was. The returned [`BuiltMagazine`] is the only way
    /// to reach the fitting pass.
    pub fn build(&self, dom: &mut Dom, output_root: NodeId, magazine: &Magazine) -> Result<BuiltMagazine> {
        let container = dom.create_element(ElementNaming::DOCUMENT_TAG);
        let pages = PageRenderer::new(&self.config);

        let mut rendered = Vec::with_capacity(magazine.pages.len());
        for page in &magazine.pages {
            rendered.push(pages.render(dom, container, page)?);
        }

        dom.append(output_root, container);

        Ok(BuiltMagazine {
            container,
            pages: rendered,
            resolve_overflow: self.config.resolve_overflow,
            overflow: self.config.overflow,
        })
    }
}

/// A fully built and attached magazine awaiting the fitting pass.
#[derive(Debug)]
pub struct BuiltMagazine {
    container: NodeId,
    pages: Vec<RenderedPage>,
    resolve_overflow: bool,
    overflow: OverflowConfig,
}

impl BuiltMagazine {
    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn pages(&self) -> &[RenderedPage] {
        &self.pages
    }

    /// Rendered sections per type tag. Slots the configuration does not
    /// render are not counted.
    pub fn section_counts(&self, dom: &Dom) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for handle in self.pages.iter().flat_map(|p| p.sections()) {
            if let Some(ty) = dom.attribute(handle.node(), "type") {
                *counts.entry(ty.to_string()).or_default() += 1;
            }
        }
        counts
    }

    /// Second pass: fit every section, starting them in document order.
    pub fn resolve(self, dom: &mut Dom, surface: &mut dyn LayoutSurface) -> Result<RenderedMagazine> {
        let mut outcomes = Vec::new();
        if self.resolve_overflow {
            let mut queue = ResolveQueue::new();
            for section in self.pages.iter().flat_map(|p| p.sections()) {
                queue.push(OverflowTask::new(section.clone(), self.overflow));
            }
            outcomes = queue.run(dom, surface)?;
        }

        let rendered = RenderedMagazine {
            container: self.container,
            pages: self.pages,
            outcomes,
        };
        info!(
            "rendered {} page(s), {} section(s), {} shrunk, {} replaced",
            rendered.pages.len(),
            rendered.sections().count(),
            rendered.outcomes.iter().filter(|o| o.was_shrunk()).count(),
            rendered.outcomes.iter().filter(|o| o.is_exhausted()).count(),
        );
        Ok(rendered)
    }
}

/// The result of a complete render.
#[derive(Debug, Clone)]
pub struct RenderedMagazine {
    container: NodeId,
    pages: Vec<RenderedPage>,
    outcomes: Vec<OverflowOutcome>,
}

impl RenderedMagazine {
    /// The `magazine` container node appended to the output root.
    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn pages(&self) -> &[RenderedPage] {
        &self.pages
    }

    /// Every section handle in document order.
    pub fn sections(&self) -> impl Iterator<Item = &SectionHandle> {
        self.pages.iter().flat_map(|p| p.sections())
    }

    /// Fitting outcomes in document order; empty when fitting is disabled.
    pub fn outcomes(&self) -> &[OverflowOutcome] {
        &self.outcomes
    }

    pub fn outcome_for(&self, node: NodeId) -> Option<&OverflowOutcome> {
        self.outcomes.iter().find(|o| o.node() == node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, PagePart, Section};
    use crate::surface::BoxMetrics;
    use crate::Error;

    /// Reports a fixed box for attached nodes and fails the render if asked
    /// to measure anything still detached.
    struct AttachedOnly;

    impl LayoutSurface for AttachedOnly {
        fn metrics(&mut self, dom: &Dom, node: NodeId) -> Result<BoxMetrics> {
            if !dom.is_attached(node) {
                return Err(Error::DetachedNode(node.index()));
            }
            Ok(BoxMetrics::new(100.0, 100.0, 100.0, 100.0))
        }

        fn computed_font_size(&mut self, _dom: &Dom, _node: NodeId) -> Result<f64> {
            Ok(16.0)
        }
    }

    fn page(texts: &[&str]) -> Page {
        Page {
            content: Some(PagePart {
                sections: texts.iter().map(|t| Section::text(*t)).collect(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn fitting_runs_after_everything_is_attached() {
        let magazine = Magazine::new(vec![page(&["a", "b"]), page(&["c"])]);
        let mut dom = Dom::new("body");
        let root = dom.root();
        let rendered = MagazineRenderer::new(RenderConfig::default())
            .unwrap()
            .render(&mut dom, root, &magazine, &mut AttachedOnly)
            .unwrap();

        assert_eq!(dom.children(root), &[rendered.container()]);
        assert_eq!(dom.tag(rendered.container()), Some("magazine"));
        assert_eq!(rendered.pages().len(), 2);
        let order: Vec<_> = rendered.outcomes().iter().map(|o| o.node()).collect();
        let sections: Vec<_> = rendered.sections().map(|s| s.node()).collect();
        assert_eq!(order, sections);
    }

    #[test]
    fn malformed_document_attaches_nothing() {
        let mut bad = page(&["fine"]);
        bad.footer = Some(PagePart {
            sections: vec![Section {
                section_type: "audio".into(),
                ..Default::default()
            }],
            ..Default::default()
        });
        let magazine = Magazine::new(vec![page(&["first"]), bad]);
        let mut dom = Dom::new("body");
        let root = dom.root();
        let err = MagazineRenderer::new(RenderConfig::default())
            .unwrap()
            .render(&mut dom, root, &magazine, &mut AttachedOnly)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownSectionType(ref t) if t == "audio"));
        assert!(dom.children(root).is_empty());
    }

    #[test]
    fn fitting_can_be_disabled() {
        let magazine = Magazine::new(vec![Page {
            body: Some(PagePart {
                sections: vec![Section::text("x")],
                ..Default::default()
            }),
            ..Default::default()
        }]);
        let mut dom = Dom::new("body");
        let root = dom.root();
        let rendered = MagazineRenderer::new(RenderConfig::pages())
            .unwrap()
            .render(&mut dom, root, &magazine, &mut AttachedOnly)
            .unwrap();
        assert!(rendered.outcomes().is_empty());
        assert_eq!(rendered.sections().count(), 1);
    }

    #[test]
    fn section_counts_follow_the_main_slot() {
        let magazine = Magazine::new(vec![Page {
            content: Some(PagePart {
                sections: vec![Section::text("c")],
                ..Default::default()
            }),
            body: Some(PagePart {
                sections: vec![Section::image("b.png"), Section::text("b")],
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let mut dom = Dom::new("body");
        let root = dom.root();
        let built = MagazineRenderer::new(RenderConfig::magazine())
            .unwrap()
            .build(&mut dom, root, &magazine)
            .unwrap();
        let counts = built.section_counts(&dom);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["text"], 1);

        let mut dom = Dom::new("body");
        let root = dom.root();
        let built = MagazineRenderer::new(RenderConfig::pages())
            .unwrap()
            .build(&mut dom, root, &magazine)
            .unwrap();
        let counts = built.section_counts(&dom);
        assert_eq!(counts["image"], 1);
        assert_eq!(counts["text"], 1);
    }
}
