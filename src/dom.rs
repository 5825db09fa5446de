//! Output visual tree
//!
//! A small arena-backed element tree standing in for a browser DOM. Nodes are
//! created detached and only become measurable once they are reachable from
//! the root, mirroring how a layout engine treats unattached elements.

use std::fmt::Write as _;

/// Handle to a node in a [`Dom`]. Holding one does not keep anything alive;
/// it is an index that stays valid for the lifetime of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered inline style declarations (`property: value`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    declarations: Vec<(String, String)>,
}

impl Style {
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set a declaration, replacing an existing one in place.
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        match self.declarations.iter_mut().find(|(k, _)| k == property) {
            Some(slot) => slot.1 = value,
            None => self.declarations.push((property.to_string(), value)),
        }
    }

    pub fn remove(&mut self, property: &str) {
        self.declarations.retain(|(k, _)| k != property);
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_css(&self) -> String {
        self.declarations
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    attributes: Vec<(String, String)>,
    pub style: Style,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            style: Style::default(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Options for HTML serialization.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializeOptions {
    /// Emit `data-node="<index>"` on every element so an external engine can
    /// address nodes by handle.
    pub node_ids: bool,
}

const VOID_ELEMENTS: &[&str] = &["img", "br", "meta", "link", "hr", "input"];

#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Dom {
    /// Create a tree whose root element carries `root_tag`.
    pub fn new(root_tag: &str) -> Self {
        let root = Node {
            data: NodeData::Element(Element::new(root_tag)),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    /// Detach every child of `node`, text included.
    pub fn remove_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Replace the children of `node` with a single literal text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.remove_children(node);
        let t = self.create_text(text);
        self.append(node, t);
    }

    /// Replace the children of `node` the way a browser's `innerText` setter
    /// does: every line break (`\n`, `\r\n` or `\r`) becomes a `br` element
    /// and empty lines get no text node.
    pub fn set_inner_text(&mut self, node: NodeId, text: &str) {
        self.remove_children(node);
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        for (i, line) in normalized.split('\n').enumerate() {
            if i > 0 {
                let br = self.create_element("br");
                self.append(node, br);
            }
            if !line.is_empty() {
                let t = self.create_text(line);
                self.append(node, t);
            }
        }
    }

    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0].data
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.0].data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node.0].data {
            NodeData::Element(e) => Some(e),
            NodeData::Text(_) => None,
        }
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(move |c| self.element(*c).is_some())
    }

    /// Strict ancestors of `node`, nearest first.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |n| self.parent(*n))
    }

    /// Whether `node` is reachable from the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.root || self.ancestors(node).any(|a| a == self.root)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(node) {
            el.set_attribute(name, value.into());
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attribute(name))
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(node) {
            el.style.set(property, value);
        }
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(el) = self.element_mut(node) {
            el.style.remove(property);
        }
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.style.get(property))
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].data {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Element(_) => {
                for child in self.children(node) {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Like [`Dom::text_content`], with a line break for every `br`.
    pub fn inner_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_lines(node, &mut out);
        out
    }

    fn collect_lines(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].data {
            NodeData::Text(t) => out.push_str(t),
            NodeData::Element(e) if e.tag == "br" => out.push('\n'),
            NodeData::Element(_) => {
                for child in self.children(node) {
                    self.collect_lines(*child, out);
                }
            }
        }
    }

    /// Serialize `node` (outer HTML).
    pub fn to_html(&self, node: NodeId, opts: SerializeOptions) -> String {
        let mut out = String::new();
        self.write_node(node, opts, &mut out);
        out
    }

    /// Serialize the children of `node` (inner HTML).
    pub fn inner_html(&self, node: NodeId, opts: SerializeOptions) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_node(*child, opts, &mut out);
        }
        out
    }

    /// Serialize the whole tree as a standalone HTML document with the given
    /// stylesheet inlined in `<head>`.
    pub fn to_html_document(&self, stylesheet: &str, opts: SerializeOptions) -> String {
        let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        if !stylesheet.is_empty() {
            let _ = write!(out, "<style>\n{}\n</style>\n", stylesheet);
        }
        out.push_str("</head>\n");
        let body = self.to_html(self.root, opts);
        if self.tag(self.root) == Some("body") {
            out.push_str(&body);
        } else {
            let _ = write!(out, "<body>{}</body>", body);
        }
        out.push_str("\n</html>\n");
        out
    }

    fn write_node(&self, node: NodeId, opts: SerializeOptions, out: &mut String) {
        match &self.nodes[node.0].data {
            NodeData::Text(t) => escape_into(t, false, out),
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                if opts.node_ids {
                    let _ = write!(out, " data-node=\"{}\"", node.0);
                }
                for (k, v) in el.attributes() {
                    let _ = write!(out, " {}=\"", k);
                    escape_into(v, true, out);
                    out.push('"');
                }
                if !el.style.is_empty() {
                    out.push_str(" style=\"");
                    escape_into(&el.style.to_css(), true, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in self.children(node) {
                    self.write_node(*child, opts, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_are_detached_until_appended() {
        let mut dom = Dom::new("body");
        let page = dom.create_element("page");
        let section = dom.create_element("section");
        dom.append(page, section);
        assert!(!dom.is_attached(section));

        let root = dom.root();
        dom.append(root, page);
        assert!(dom.is_attached(section));
        assert_eq!(dom.ancestors(section).collect::<Vec<_>>(), vec![page, root]);
    }

    #[test]
    fn style_declarations_keep_insertion_order() {
        let mut dom = Dom::new("body");
        let n = dom.create_element("section");
        dom.set_style(n, "padding", "2mm");
        dom.set_style(n, "font-size", "12px");
        dom.set_style(n, "padding", "3mm");
        assert_eq!(dom.element(n).unwrap().style.to_css(), "padding: 3mm; font-size: 12px");
        dom.remove_style(n, "padding");
        assert_eq!(dom.style(n, "padding"), None);
    }

    #[test]
    fn remove_children_drops_text_too() {
        let mut dom = Dom::new("body");
        let n = dom.create_element("section");
        dom.set_text(n, "hello");
        let img = dom.create_element("img");
        dom.append(n, img);
        assert_eq!(dom.children(n).len(), 2);
        dom.remove_children(n);
        assert!(dom.children(n).is_empty());
        assert_eq!(dom.parent(img), None);
    }

    #[test]
    fn serializes_literal_text_escaped() {
        let mut dom = Dom::new("body");
        let root = dom.root();
        let td = dom.create_element("td");
        dom.set_attribute(td, "title", "a \"b\"");
        dom.set_text(td, "<b> & co");
        dom.append(root, td);
        let img = dom.create_element("img");
        dom.set_attribute(img, "src", "x.png");
        dom.append(root, img);
        assert_eq!(
            dom.to_html(root, SerializeOptions::default()),
            "<body><td title=\"a &quot;b&quot;\">&lt;b&gt; &amp; co</td><img src=\"x.png\"></body>"
        );
        assert_eq!(dom.text_content(td), "<b> & co");
    }

    #[test]
    fn inner_text_turns_line_breaks_into_br() {
        let mut dom = Dom::new("body");
        let n = dom.create_element("section");
        dom.set_inner_text(n, "one\r\ntwo\n\nthree");
        assert_eq!(
            dom.inner_html(n, SerializeOptions::default()),
            "one<br>two<br><br>three"
        );
        assert_eq!(dom.inner_text(n), "one\ntwo\n\nthree");
        assert_eq!(dom.text_content(n), "onetwothree");

        dom.set_inner_text(n, "");
        assert!(dom.children(n).is_empty());
    }

    #[test]
    fn node_ids_are_emitted_on_request() {
        let mut dom = Dom::new("body");
        let root = dom.root();
        let s = dom.create_element("section");
        dom.append(root, s);
        let html = dom.to_html(root, SerializeOptions { node_ids: true });
        assert_eq!(html, "<body data-node=\"0\"><section data-node=\"1\"></section></body>");
    }
}
