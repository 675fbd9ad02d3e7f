use crate::node::{Element, Node};

/// Markup-agnostic output interface. Renderers read a tree and produce
/// output; they never change it.
pub trait MarkupRenderer {
    /// The output type produced by this renderer.
    type Output;

    fn render(&self, node: &Node) -> Self::Output;
}

/// Serialises a tree to HTML text.
///
/// Attributes come out in sorted order, so output is stable and suitable
/// for CLI display and string assertions in tests. Suspended markers and
/// empty nodes produce nothing.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    /// Indent nested elements, one per line.
    pub pretty: bool,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn write_node(&self, node: &Node, depth: usize, out: &mut String) {
        match node {
            Node::Empty | Node::Suspended => {}
            Node::Text(t) => {
                self.indent(depth, out);
                out.push_str(&escape(t));
                self.newline(out);
            }
            Node::Fragment(children) => {
                for c in children {
                    self.write_node(c, depth, out);
                }
            }
            Node::Element(el) => self.write_element(el, depth, out),
        }
    }

    fn write_element(&self, el: &Element, depth: usize, out: &mut String) {
        self.indent(depth, out);
        out.push('<');
        out.push_str(&el.tag);
        for (name, value) in &el.attrs {
            out.push_str(&format!(" {name}=\"{}\"", escape(value)));
        }
        out.push('>');

        let has_children = el.children.iter().any(|c| !c.is_empty());
        if has_children {
            self.newline(out);
            for c in &el.children {
                self.write_node(c, depth + 1, out);
            }
            self.indent(depth, out);
        }

        out.push_str(&format!("</{}>", el.tag));
        self.newline(out);
    }

    fn indent(&self, depth: usize, out: &mut String) {
        if self.pretty {
            out.push_str(&"  ".repeat(depth));
        }
    }

    fn newline(&self, out: &mut String) {
        if self.pretty {
            out.push('\n');
        }
    }
}

impl MarkupRenderer for HtmlRenderer {
    type Output = String;

    fn render(&self, node: &Node) -> String {
        let mut out = String::new();
        self.write_node(node, 0, &mut out);
        out
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
