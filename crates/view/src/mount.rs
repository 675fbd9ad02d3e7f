use lazyview_common::{ElementId, RootMargin, Threshold};
use lazyview_visibility::{ObserveOptions, Visibility, VisibilityGate, VisibilityObserver};
use serde::Deserialize;

use crate::node::{Element, Node};
use crate::suspense::SuspenseBoundary;
use crate::view::View;

/// Trigger configuration for `DeferredMount`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeferOptions {
    /// Fraction of the wrapper that must be visible. Default 0.1.
    pub threshold: Threshold,
    /// How far outside the viewport the wrapper starts to count. Default 100px.
    pub root_margin: RootMargin,
}

impl Default for DeferOptions {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            root_margin: RootMargin::px(100.0),
        }
    }
}

impl From<DeferOptions> for ObserveOptions {
    fn from(o: DeferOptions) -> Self {
        ObserveOptions {
            threshold: o.threshold,
            root_margin: o.root_margin,
            once: true,
        }
    }
}

/// Placeholder shown when no fallback is supplied.
pub fn default_placeholder() -> Node {
    Element::new("div")
        .attr("class", "lazyview-placeholder")
        .attr("aria-busy", "true")
        .into()
}

/// Wraps a view so it is only mounted once its wrapper element scrolls near
/// the viewport.
///
/// The wrapper element (`data-lazyview="mount"`) is always emitted; it is
/// what the host lays out and the observer watches. Before the element is
/// seen it holds the placeholder. Afterwards it holds the view, inside a
/// suspense boundary that falls back to the same placeholder while the
/// view's own data or code is pending.
#[derive(Debug)]
pub struct DeferredMount<V> {
    view: V,
    fallback: Option<Node>,
    options: DeferOptions,
    gate: VisibilityGate,
}

/// Decorate any view with deferred mounting, using default options.
pub fn deferred<V: View>(view: V) -> DeferredMount<V> {
    DeferredMount::new(view)
}

impl<V: View> DeferredMount<V> {
    pub fn new(view: V) -> Self {
        Self::with_options(view, DeferOptions::default())
    }

    pub fn with_options(view: V, options: DeferOptions) -> Self {
        Self {
            view,
            fallback: None,
            options,
            gate: VisibilityGate::new(options.into()),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<Node>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Replace the visibility threshold. Must be called before `mount`.
    pub fn with_threshold(self, threshold: Threshold) -> Self {
        let options = DeferOptions {
            threshold,
            ..self.options
        };
        self.reconfigure(options)
    }

    /// Replace the root margin. Must be called before `mount`.
    pub fn with_root_margin(self, root_margin: RootMargin) -> Self {
        let options = DeferOptions {
            root_margin,
            ..self.options
        };
        self.reconfigure(options)
    }

    fn reconfigure(self, options: DeferOptions) -> Self {
        Self {
            view: self.view,
            fallback: self.fallback,
            options,
            gate: VisibilityGate::new(options.into()),
        }
    }

    pub fn options(&self) -> &DeferOptions {
        &self.options
    }

    /// The wrapper element the host reports layout for.
    pub fn element(&self) -> ElementId {
        self.gate.element()
    }

    pub fn visibility(&self) -> Visibility {
        self.gate.state()
    }

    pub fn is_visible(&self) -> bool {
        self.gate.is_visible()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn mount(&mut self, observer: &dyn VisibilityObserver) {
        self.gate.mount(observer);
    }

    /// Apply pending visibility events. Returns `true` on the one update
    /// that mounts the view.
    pub fn update(&mut self) -> bool {
        let mounted = self.gate.update();
        if mounted {
            tracing::debug!(element = %self.gate.element().short(), "mounting deferred view");
        }
        mounted
    }

    pub fn unmount(&mut self) {
        self.gate.unmount();
    }

    fn placeholder(&self) -> Node {
        self.fallback.clone().unwrap_or_else(default_placeholder)
    }

    pub fn render(&self, props: &V::Props, suspense: &dyn SuspenseBoundary) -> Node {
        let content = if self.gate.is_visible() {
            suspense.boundary(self.view.render(props), self.placeholder())
        } else {
            self.placeholder()
        };

        Element::new("div")
            .attr("data-lazyview", "mount")
            .attr("data-element", self.gate.element().short())
            .child(content)
            .into()
    }
}
