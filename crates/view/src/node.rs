use std::collections::BTreeMap;

use serde::Serialize;

/// A rendered markup tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Renders nothing.
    #[default]
    Empty,
    Text(String),
    Element(Element),
    Fragment(Vec<Node>),
    /// A subtree still waiting on asynchronous data. The nearest suspense
    /// boundary replaces the whole tree with its fallback.
    Suspended,
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Self {
        Self::Fragment(children.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Fragment(children) => children.iter().all(Node::is_empty),
            _ => false,
        }
    }

    /// Whether any part of this tree is still suspended.
    pub fn is_suspended(&self) -> bool {
        match self {
            Self::Suspended => true,
            Self::Element(el) => el.children.iter().any(Node::is_suspended),
            Self::Fragment(children) => children.iter().any(Node::is_suspended),
            Self::Empty | Self::Text(_) => false,
        }
    }

    /// Depth-first search for the first element carrying `name = value`.
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<&Element> {
        match self {
            Self::Element(el) => {
                if el.attr_value(name) == Some(value) {
                    return Some(el);
                }
                el.children.iter().find_map(|c| c.find_by_attr(name, value))
            }
            Self::Fragment(children) => children.iter().find_map(|c| c.find_by_attr(name, value)),
            _ => None,
        }
    }

    /// Concatenated text content of the tree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(t),
            Self::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
            Self::Fragment(children) => children.iter().for_each(|c| c.collect_text(out)),
            Self::Empty | Self::Suspended => {}
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// An element with attributes (kept sorted for stable output) and children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}
