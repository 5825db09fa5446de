//! Tree construction: magazine → page → page part → section.
//!
//! This pass only creates and styles nodes. Anything that needs live layout
//! (overflow) is deferred to [`BuiltMagazine::resolve`].

pub mod magazine;
pub mod page;
pub mod part;
pub mod section;

pub use magazine::{BuiltMagazine, MagazineRenderer, RenderedMagazine};
pub use page::{PageRenderer, RenderedPage};
pub use part::PartRenderer;
pub use section::SectionRenderer;

/// Map a logical alignment onto its flexbox keyword.
pub fn flex_alignment(value: &str) -> String {
    match value {
        "start" | "end" => format!("flex-{}", value),
        other => other.to_string(),
    }
}

/// Millimetre length.
pub(crate) fn mm(value: f64) -> String {
    format!("{}mm", value)
}
