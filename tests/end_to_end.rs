use magrender::dom::NodeData;
use magrender::model::{Page, PagePart, Section};
use magrender::{render_json, render_magazine, Dom, Error, Magazine, NodeId, RenderConfig};

fn content(sections: Vec<Section>) -> Option<PagePart> {
    Some(PagePart {
        sections,
        ..Default::default()
    })
}

fn element_children(dom: &Dom, node: NodeId) -> Vec<NodeId> {
    dom.element_children(node).collect()
}

#[test]
fn two_page_magazine() {
    let magazine = Magazine::new(vec![
        Page {
            content: content(vec![Section::text("Hello")]),
            ..Default::default()
        },
        Page {
            content: content(vec![Section::table([["a1", "a2"], ["b1", " b 2 "]])]),
            ..Default::default()
        },
    ]);

    let (dom, rendered) = render_magazine(&magazine, &RenderConfig::default()).unwrap();

    let container = rendered.container();
    assert_eq!(dom.parent(container), Some(dom.root()));
    assert_eq!(dom.tag(container), Some("magazine"));
    let pages = element_children(&dom, container);
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| dom.tag(*p) == Some("page")));

    // page 1: one unshrunk text section
    let parts = element_children(&dom, pages[0]);
    assert_eq!(parts.len(), 1);
    let sections = element_children(&dom, parts[0]);
    assert_eq!(sections.len(), 1);
    assert_eq!(dom.text_content(sections[0]), "Hello");
    assert_eq!(dom.style(sections[0], "font-size"), None);
    let outcome = rendered.outcome_for(sections[0]).unwrap();
    assert!(!outcome.was_shrunk());

    // page 2: a 2 × 2 table with cell text preserved
    let parts = element_children(&dom, pages[1]);
    let section = element_children(&dom, parts[0])[0];
    let table = element_children(&dom, section)[0];
    assert_eq!(dom.tag(table), Some("table"));
    let rows = element_children(&dom, table);
    assert_eq!(rows.len(), 2);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|tr| {
            element_children(&dom, *tr)
                .into_iter()
                .inspect(|td| assert_eq!(dom.tag(*td), Some("td")))
                .map(|td| dom.text_content(td))
                .collect()
        })
        .collect();
    assert_eq!(cells, vec![vec!["a1", "a2"], vec!["b1", " b 2 "]]);
}

#[test]
fn parts_follow_fixed_order_whatever_the_json_order() {
    let json = r#"{ "pages": [ {
        "footer":  { "sections": [ { "type": "text", "text": "F" } ] },
        "content": { "sections": [ { "type": "text", "text": "C" } ] },
        "header":  { "sections": [ { "type": "text", "text": "H" } ] }
    } ] }"#;
    let (dom, rendered) = render_json(json, &RenderConfig::default()).unwrap();
    let page = rendered.pages()[0].node();
    let tags: Vec<_> = dom.element_children(page).map(|n| dom.tag(n).unwrap_or_default().to_string()).collect();
    assert_eq!(tags, ["header", "content", "footer"]);
    assert_eq!(dom.text_content(page), "HCF");
}

#[test]
fn pages_dialect_names_and_body_slot() {
    let json = r#"{ "pages": [ {
        "size": "A5",
        "footer": { "sections": [ { "type": "text", "text": "F" } ] },
        "body":   { "rotation": 90, "sections": [ { "type": "image", "source": "a.png", "width": 40 } ] },
        "header": { "sections": [ { "type": "text", "text": "H" } ] }
    } ] }"#;
    let (dom, rendered) = render_json(json, &RenderConfig::pages()).unwrap();
    let page = rendered.pages()[0].node();
    assert_eq!(dom.tag(page), Some("page-container"));
    assert_eq!(dom.attribute(page, "size"), Some("A5"));
    let parts: Vec<_> = dom.element_children(page).collect();
    let tags: Vec<_> = parts.iter().map(|n| dom.tag(*n).unwrap_or_default()).collect();
    assert_eq!(tags, ["page-header", "page-body", "page-footer"]);
    assert_eq!(dom.style(parts[1], "transform"), Some("rotate(90deg)"));

    let img = dom.element_children(dom.element_children(parts[1]).next().unwrap()).next().unwrap();
    assert_eq!(dom.style(img, "width"), Some("40px"));
    assert_eq!(dom.style(img, "transform"), Some("rotate(90deg)"));
    // fitting is off in this dialect
    assert!(rendered.outcomes().is_empty());
}

#[test]
fn missing_footer_renders_nothing_for_it() {
    let magazine = Magazine::new(vec![Page {
        header: content(vec![Section::text("h")]),
        content: content(vec![Section::text("c")]),
        ..Default::default()
    }]);
    let (dom, rendered) = render_magazine(&magazine, &RenderConfig::default()).unwrap();
    let page = rendered.pages()[0].node();
    let tags: Vec<_> = dom.element_children(page).map(|n| dom.tag(n).unwrap_or_default().to_string()).collect();
    assert_eq!(tags, ["header", "content"]);
}

#[test]
fn unknown_section_type_aborts_the_render() {
    let json = r#"{ "pages": [
        { "content": { "sections": [ { "type": "text", "text": "fine" } ] } },
        { "content": { "sections": [ { "type": "video", "source": "x.mp4" } ] } }
    ] }"#;
    let err = render_json(json, &RenderConfig::default()).unwrap_err();
    assert!(matches!(err, Error::UnknownSectionType(ref t) if t == "video"));
    assert_eq!(err.to_string(), "The 'video' section renderer is not defined.");
}

#[test]
fn failed_render_leaves_the_root_untouched() {
    let magazine: Magazine = serde_json::from_str(
        r#"{ "pages": [
            { "content": { "sections": [ { "type": "text", "text": "fine" } ] } },
            { "content": { "sections": [ { "type": "image" } ] } }
        ] }"#,
    )
    .unwrap();
    let mut dom = Dom::new("body");
    let root = dom.root();
    let err = magrender::MagazineRenderer::new(RenderConfig::default())
        .unwrap()
        .build(&mut dom, root, &magazine)
        .unwrap_err();
    assert!(matches!(err, Error::MissingField { field: "source", .. }));
    assert!(dom.children(root).is_empty());
}

#[test]
fn overflowing_text_ends_fitted_or_replaced() {
    let mut section = Section::text("lorem ipsum dolor sit amet ".repeat(300));
    section.style.size = Some(15.0);
    let mut tiny = Section::text("x ".repeat(5000));
    tiny.style.size = Some(1.0);
    tiny.style.font_size = Some("14px".into());

    let magazine = Magazine::new(vec![Page {
        content: content(vec![section, tiny, Section::text("fits")]),
        ..Default::default()
    }]);
    let (dom, rendered) = render_magazine(&magazine, &RenderConfig::default()).unwrap();
    let outcomes = rendered.outcomes();
    assert_eq!(outcomes.len(), 3);

    assert_eq!(outcomes[0].state, magrender::OverflowState::Fitted);
    assert!(outcomes[0].was_shrunk());
    assert!(outcomes[0].font_size < 16.0 && outcomes[0].font_size > 2.0);

    assert!(outcomes[1].is_exhausted());
    let replaced = outcomes[1].node();
    assert_eq!(dom.style(replaced, "font-size"), Some("14px"));
    assert!(dom.children(replaced).iter().all(|c| !matches!(dom.data(*c), NodeData::Text(_))));
    let html = dom.inner_html(replaced, Default::default());
    assert!(html.contains("data:image/svg+xml;base64,"));

    assert!(!outcomes[2].was_shrunk());
}
