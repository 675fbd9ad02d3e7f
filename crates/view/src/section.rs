use lazyview_common::{CssLength, ElementId, RootMargin, Threshold};
use lazyview_visibility::{ObserveOptions, Visibility, VisibilityGate, VisibilityObserver};
use serde::Deserialize;

use crate::node::{Element, Node};
use crate::suspense::SuspenseBoundary;
use crate::view::Render;

/// Trigger configuration for `DeferredSection`. The threshold is always
/// zero: a single visible pixel is enough.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SectionOptions {
    /// Default 200px.
    pub root_margin: RootMargin,
    /// Height reserved by the empty placeholder. Default 100px.
    pub min_height: CssLength,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            root_margin: RootMargin::px(200.0),
            min_height: CssLength::Px(100.0),
        }
    }
}

impl SectionOptions {
    fn observe_options(&self) -> ObserveOptions {
        ObserveOptions {
            threshold: Threshold::ANY,
            root_margin: self.root_margin,
            once: true,
        }
    }
}

/// Defers rendering of already-built content until the section nears the
/// viewport.
///
/// Until then only an empty, `aria-hidden` block that reserves
/// `min_height` is emitted, and that block is the observed element. Once
/// seen, the children are rendered bare inside a suspense boundary, since
/// they may contain suspended subtrees of their own.
#[derive(Debug)]
pub struct DeferredSection {
    children: Node,
    fallback: Node,
    options: SectionOptions,
    gate: VisibilityGate,
}

impl DeferredSection {
    pub fn new(children: impl Into<Node>) -> Self {
        Self::with_options(children, SectionOptions::default())
    }

    pub fn with_options(children: impl Into<Node>, options: SectionOptions) -> Self {
        Self {
            children: children.into(),
            fallback: Node::Empty,
            options,
            gate: VisibilityGate::new(options.observe_options()),
        }
    }

    /// Shown by the suspense boundary while children are suspended.
    pub fn with_fallback(mut self, fallback: impl Into<Node>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Replace the root margin. Must be called before `mount`.
    pub fn with_root_margin(self, root_margin: RootMargin) -> Self {
        let options = SectionOptions {
            root_margin,
            ..self.options
        };
        Self::with_options(self.children, options).with_fallback(self.fallback)
    }

    pub fn options(&self) -> &SectionOptions {
        &self.options
    }

    pub fn element(&self) -> ElementId {
        self.gate.element()
    }

    pub fn visibility(&self) -> Visibility {
        self.gate.state()
    }

    pub fn is_visible(&self) -> bool {
        self.gate.is_visible()
    }

    pub fn mount(&mut self, observer: &dyn VisibilityObserver) {
        self.gate.mount(observer);
    }

    /// Apply pending visibility events. Returns `true` on the one update
    /// that reveals the children.
    pub fn update(&mut self) -> bool {
        let revealed = self.gate.update();
        if revealed {
            tracing::debug!(element = %self.gate.element().short(), "revealing deferred section");
        }
        revealed
    }

    pub fn unmount(&mut self) {
        self.gate.unmount();
    }

    /// The empty block emitted before the section is seen.
    pub fn placeholder(&self) -> Node {
        Element::new("div")
            .attr("aria-hidden", "true")
            .attr("data-lazyview", "section")
            .attr("data-element", self.gate.element().short())
            .attr("style", format!("min-height: {}", self.options.min_height))
            .into()
    }

    pub fn render(&self, suspense: &dyn SuspenseBoundary) -> Node {
        if !self.gate.is_visible() {
            return self.placeholder();
        }
        suspense.boundary(Render::Ready(self.children.clone()), self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{HtmlRenderer, MarkupRenderer};
    use crate::suspense::Suspense;
    use lazyview_visibility::ManualObserver;

    #[test]
    fn defaults() {
        let o = SectionOptions::default();
        assert_eq!(o.root_margin, RootMargin::px(200.0));
        assert_eq!(o.min_height, CssLength::Px(100.0));
        assert!(o.observe_options().threshold.is_any());
    }

    #[test]
    fn placeholder_is_empty_and_hidden() {
        let s = DeferredSection::new(Element::new("h2").child("Pricing"));
        let out = s.render(&Suspense);
        let el = match &out {
            Node::Element(el) => el,
            other => panic!("expected element, got {other:?}"),
        };
        assert!(el.children.is_empty());
        assert_eq!(el.attr_value("aria-hidden"), Some("true"));
        assert_eq!(el.attr_value("style"), Some("min-height: 100px"));
        assert!(!HtmlRenderer::new().render(&out).contains("Pricing"));
    }

    #[test]
    fn children_render_bare_after_visible() {
        let obs = ManualObserver::new();
        let children: Node = Element::new("h2").child("Pricing").into();
        let mut s = DeferredSection::new(children.clone());
        s.mount(&obs);
        obs.emit(s.element(), true);
        assert!(s.update());
        assert_eq!(s.render(&Suspense), children);
    }

    #[test]
    fn suspended_children_show_fallback() {
        let obs = ManualObserver::new();
        let mut s = DeferredSection::new(Node::fragment([Node::text("a"), Node::Suspended]))
            .with_fallback("spinner");
        s.mount(&obs);
        obs.emit(s.element(), true);
        s.update();
        assert_eq!(s.render(&Suspense), Node::text("spinner"));
    }

    #[test]
    fn custom_min_height_and_margin() {
        let s = DeferredSection::with_options(
            "x",
            SectionOptions {
                min_height: CssLength::Px(320.0),
                ..SectionOptions::default()
            },
        )
        .with_root_margin("50%".parse().unwrap());
        assert_eq!(s.options().min_height, CssLength::Px(320.0));
        let out = s.placeholder();
        assert_eq!(
            out.find_by_attr("data-lazyview", "section")
                .and_then(|el| el.attr_value("style")),
            Some("min-height: 320px")
        );
    }
}
