use std::marker::PhantomData;

use crate::node::Node;

/// Errors a view can report while rendering.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    #[error("failed to load view module: {0}")]
    ModuleLoad(String),
    #[error("render failed: {0}")]
    Render(String),
}

/// Outcome of rendering a view.
#[derive(Debug, Clone, PartialEq)]
pub enum Render {
    Ready(Node),
    /// Asynchronous code or data has not resolved yet.
    Pending,
    Failed(ViewError),
}

impl Render {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl From<Node> for Render {
    fn from(node: Node) -> Self {
        Self::Ready(node)
    }
}

/// A renderable view type. `Props` are passed through untouched by every
/// wrapper in this crate.
pub trait View {
    type Props;

    fn render(&self, props: &Self::Props) -> Render;
}

/// View backed by a closure.
pub struct ViewFn<P, F> {
    f: F,
    _props: PhantomData<fn(&P)>,
}

/// Wrap a closure as a `View`.
pub fn view_fn<P, F>(f: F) -> ViewFn<P, F>
where
    F: Fn(&P) -> Render,
{
    ViewFn {
        f,
        _props: PhantomData,
    }
}

impl<P, F> View for ViewFn<P, F>
where
    F: Fn(&P) -> Render,
{
    type Props = P;

    fn render(&self, props: &P) -> Render {
        (self.f)(props)
    }
}

impl<P, F> std::fmt::Debug for ViewFn<P, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ViewFn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_fn_forwards_props() {
        let v = view_fn(|name: &String| Render::Ready(Node::text(format!("hi {name}"))));
        assert_eq!(
            v.render(&"ada".to_string()),
            Render::Ready(Node::text("hi ada"))
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ViewError::ModuleLoad("chart".into()).to_string(),
            "failed to load view module: chart"
        );
    }
}
