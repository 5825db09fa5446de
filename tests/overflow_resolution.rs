use magrender::overflow::{OverflowConfig, OverflowState, OverflowTask, ResolveQueue, SectionHandle, Step};
use magrender::surface::{cascaded_font_size, BoxMetrics, LayoutSurface};
use magrender::{Dom, NodeId, Result};

/// Content extents scale linearly with the font; an empty section (or one
/// holding only the placeholder) always fits.
struct Scripted {
    client: (f64, f64),
    width_per_px: f64,
    height_per_px: f64,
}

impl LayoutSurface for Scripted {
    fn metrics(&mut self, dom: &Dom, node: NodeId) -> Result<BoxMetrics> {
        let (cw, ch) = self.client;
        if dom.text_content(node).is_empty() {
            return Ok(BoxMetrics::new(cw, ch, cw, ch));
        }
        let font = self.computed_font_size(dom, node)?;
        Ok(BoxMetrics::new(
            (font * self.width_per_px).max(cw),
            (font * self.height_per_px).max(ch),
            cw,
            ch,
        ))
    }

    fn computed_font_size(&mut self, dom: &Dom, node: NodeId) -> Result<f64> {
        Ok(cascaded_font_size(dom, node, 16.0))
    }
}

fn section(dom: &mut Dom, font_size: Option<&str>) -> SectionHandle {
    let root = dom.root();
    let node = dom.create_element("section");
    dom.set_text(node, "some content");
    if let Some(size) = font_size {
        dom.set_style(node, "font-size", size);
    }
    dom.append(root, node);
    SectionHandle::new(node, false, font_size.map(String::from))
}

fn run_one(dom: &mut Dom, handle: SectionHandle, surface: &mut Scripted) -> magrender::OverflowOutcome {
    let mut queue = ResolveQueue::new();
    queue.push(OverflowTask::new(handle, OverflowConfig::default()));
    queue.run(dom, surface).unwrap().remove(0)
}

#[test]
fn width_overflow_jumps_proportionally_once() {
    let mut dom = Dom::new("body");
    let handle = section(&mut dom, None);
    // 16px → 480 wide in a 100px box: 16 × 100 / 480 = 3.33… → 3.3
    let mut surface = Scripted {
        client: (100.0, 100.0),
        width_per_px: 30.0,
        height_per_px: 1.0,
    };
    let outcome = run_one(&mut dom, handle.clone(), &mut surface);
    assert_eq!(outcome.state, OverflowState::Fitted);
    assert_eq!(outcome.applied, vec![3.3]);
    assert_eq!(dom.style(handle.node(), "font-size"), Some("3.3px"));
}

#[test]
fn stepwise_continues_after_the_jump() {
    let mut dom = Dom::new("body");
    let handle = section(&mut dom, None);
    // jump to 5.0 fixes the width; height needs ≤ 4.0
    let mut surface = Scripted {
        client: (100.0, 100.0),
        width_per_px: 20.0,
        height_per_px: 25.0,
    };
    let outcome = run_one(&mut dom, handle, &mut surface);
    assert_eq!(outcome.state, OverflowState::Fitted);
    assert_eq!(
        outcome.applied,
        vec![5.0, 4.9, 4.8, 4.7, 4.6, 4.5, 4.4, 4.3, 4.2, 4.1, 4.0]
    );
    assert_eq!(outcome.font_size, 4.0);
}

#[test]
fn height_only_overflow_never_jumps() {
    let mut dom = Dom::new("body");
    let handle = section(&mut dom, Some("12px"));
    let mut surface = Scripted {
        client: (100.0, 100.0),
        width_per_px: 1.0,
        height_per_px: 8.5,
    };
    let outcome = run_one(&mut dom, handle, &mut surface);
    // 11.7 × 8.5 = 99.45
    assert_eq!(outcome.applied, vec![11.9, 11.8, 11.7]);
}

#[test]
fn one_decrement_per_step_and_monotonic() {
    let mut dom = Dom::new("body");
    let handle = section(&mut dom, None);
    let node = handle.node();
    let mut surface = Scripted {
        client: (100.0, 100.0),
        width_per_px: 1.0,
        height_per_px: 1000.0,
    };
    let mut task = OverflowTask::new(handle, OverflowConfig::default());

    let mut seen = Vec::new();
    let outcome = loop {
        let before = dom.style(node, "font-size").map(String::from);
        match task.step(&mut dom, &mut surface).unwrap() {
            Step::Yield => {
                let after = dom.style(node, "font-size").map(String::from);
                if after != before {
                    seen.push(after);
                }
                assert!(!task.state().unwrap().is_terminal());
            }
            Step::Done(outcome) => break outcome,
        }
    };

    assert_eq!(outcome.state, OverflowState::Exhausted);
    // 15.9 down to 2.0, each in its own step
    assert_eq!(outcome.applied.len(), 140);
    assert_eq!(seen.len(), outcome.applied.len());
    assert!(outcome
        .applied
        .windows(2)
        .all(|w| w[1] < w[0] && (w[0] - w[1] - 0.1).abs() < 1e-9));
    assert_eq!(*outcome.applied.last().unwrap(), 2.0);
}

#[test]
fn exhaustion_swaps_content_and_is_stable() {
    let mut dom = Dom::new("body");
    let handle = section(&mut dom, Some("9px"));
    let node = handle.node();
    let mut surface = Scripted {
        client: (100.0, 100.0),
        width_per_px: 1.0,
        height_per_px: 1000.0,
    };

    let outcome = run_one(&mut dom, handle.clone(), &mut surface);
    assert!(outcome.is_exhausted());
    assert_eq!(outcome.font_size, 9.0);
    assert_eq!(dom.style(node, "font-size"), Some("9px"));
    assert_eq!(dom.children(node).len(), 1);
    assert_eq!(dom.text_content(node), "");

    // Resolving again leaves the placeholder alone.
    let html_before = dom.to_html(node, Default::default());
    let again = run_one(&mut dom, handle, &mut surface);
    assert_eq!(again.state, OverflowState::Fitted);
    assert!(again.applied.is_empty());
    assert_eq!(dom.to_html(node, Default::default()), html_before);
}

#[test]
fn exhaustion_without_configured_size_clears_font_size() {
    let mut dom = Dom::new("body");
    let handle = section(&mut dom, None);
    let node = handle.node();
    let mut surface = Scripted {
        client: (50.0, 50.0),
        width_per_px: 1.0,
        height_per_px: 1000.0,
    };
    let outcome = run_one(&mut dom, handle, &mut surface);
    assert!(outcome.is_exhausted());
    assert_eq!(dom.style(node, "font-size"), None);
    assert_eq!(outcome.font_size, 16.0);
}

#[test]
fn siblings_are_independent() {
    let mut dom = Dom::new("body");
    let a = section(&mut dom, None);
    let b = section(&mut dom, None);
    dom.remove_children(b.node());
    let mut surface = Scripted {
        client: (100.0, 100.0),
        width_per_px: 1.0,
        height_per_px: 1000.0,
    };

    let mut queue = ResolveQueue::new();
    queue.push(OverflowTask::new(a, OverflowConfig::default()));
    queue.push(OverflowTask::new(b.clone(), OverflowConfig::default()));
    let outcomes = queue.run(&mut dom, &mut surface).unwrap();
    assert!(outcomes[0].is_exhausted());
    assert_eq!(outcomes[1].state, OverflowState::Fitted);
    assert!(dom.children(b.node()).is_empty());
}
