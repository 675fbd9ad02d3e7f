use crate::node::{Element, Node};
use crate::view::Render;

/// Host capability that shows a fallback while a child render is pending
/// and decides what a failed child turns into.
pub trait SuspenseBoundary {
    fn boundary(&self, child: Render, fallback: Node) -> Node;
}

/// Default boundary.
///
/// Pending children, and ready trees that still contain a suspended
/// subtree, render the fallback. Failures render an alert element.
#[derive(Debug, Default, Clone, Copy)]
pub struct Suspense;

impl Suspense {
    pub fn new() -> Self {
        Self
    }
}

impl SuspenseBoundary for Suspense {
    fn boundary(&self, child: Render, fallback: Node) -> Node {
        match child {
            Render::Ready(node) if !node.is_suspended() => node,
            Render::Ready(_) | Render::Pending => fallback,
            Render::Failed(error) => {
                tracing::error!(%error, "view failed inside suspense boundary");
                Element::new("div")
                    .attr("role", "alert")
                    .attr("data-lazyview", "error")
                    .child(error.to_string())
                    .into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewError;

    #[test]
    fn ready_passes_through() {
        let out = Suspense.boundary(Render::Ready(Node::text("ok")), Node::text("wait"));
        assert_eq!(out, Node::text("ok"));
    }

    #[test]
    fn pending_shows_fallback() {
        let out = Suspense.boundary(Render::Pending, Node::text("wait"));
        assert_eq!(out, Node::text("wait"));
    }

    #[test]
    fn nested_suspension_shows_fallback() {
        let tree = Node::fragment([Node::text("a"), Node::Suspended]);
        let out = Suspense.boundary(Render::Ready(tree), Node::text("wait"));
        assert_eq!(out, Node::text("wait"));
    }

    #[test]
    fn failure_renders_alert() {
        let out = Suspense.boundary(
            Render::Failed(ViewError::ModuleLoad("chart".into())),
            Node::text("wait"),
        );
        let alert = out.find_by_attr("role", "alert").unwrap();
        assert_eq!(alert.attr_value("data-lazyview"), Some("error"));
        assert!(out.text_content().contains("chart"));
    }
}
