//! Base stylesheet shipped with serialized documents.
//!
//! Inline styles produced by the renderers only carry per-node settings; the
//! box model that makes parts stack down a page and sections share a part
//! lives here.

use std::fmt::Write as _;

use crate::model::{PageLayout, PageSize, PartName};
use crate::{ElementNaming, RenderConfig};

const BASE_RULES: &str = "\
*, *::before, *::after { box-sizing: border-box; }
html, body { margin: 0; padding: 0; }
@page { margin: 0; }
section { display: flex; overflow: hidden; flex: 1 1 0; min-width: 0; min-height: 0; }
section[style*=\"height: \"], section[style*=\"width: \"] { flex: none; }
section table { border-collapse: collapse; }
section img { max-width: none; }";

/// Stylesheet for documents rendered with `config`.
pub fn base_stylesheet(config: &RenderConfig) -> String {
    let naming = config.naming;
    let page = naming.page_tag();
    let mut css = String::from(BASE_RULES);

    let _ = write!(
        css,
        "\n{} {{ display: flex; flex-direction: column; overflow: hidden; page-break-after: always; break-after: page; }}",
        page
    );
    let _ = write!(css, "\n{}:last-child {{ page-break-after: auto; break-after: auto; }}", page);

    let parts = part_selector(naming);
    let _ = write!(
        css,
        "\n{} {{ display: flex; flex-direction: column; overflow: hidden; flex: 1 1 0; min-height: 0; }}",
        parts
    );
    let _ = write!(css, "\n{} {{ flex: none; }}", sized_part_selector(naming));

    for size in PageSize::ALL {
        for layout in PageLayout::ALL {
            let (w, h) = size.oriented_mm(layout);
            let _ = write!(
                css,
                "\n{}[size=\"{}\"][layout=\"{}\"] {{ width: {}mm; height: {}mm; }}",
                page,
                size.as_str(),
                layout.as_str(),
                w,
                h
            );
        }
    }

    css
}

fn part_tags(naming: ElementNaming) -> Vec<String> {
    [PartName::Header, PartName::Content, PartName::Body, PartName::Footer]
        .into_iter()
        .filter(|name| naming != ElementNaming::Plain || *name != PartName::Body)
        .map(|name| naming.part_tag(name))
        .collect()
}

fn part_selector(naming: ElementNaming) -> String {
    part_tags(naming).join(", ")
}

fn sized_part_selector(naming: ElementNaming) -> String {
    part_tags(naming)
        .iter()
        .map(|tag| format!("{}[style*=\"height: \"]", tag))
        .collect::<Vec<_>>()
        .join(", ")
}
