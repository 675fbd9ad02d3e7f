use std::cell::RefCell;
use std::rc::Rc;

use crate::view::{Render, View, ViewError};

/// Lifecycle of an asynchronously produced value.
#[derive(Debug)]
pub enum ResourceState<T> {
    Pending,
    Ready(Rc<T>),
    Failed(ViewError),
}

/// Shared handle to a value that resolves later, such as a dynamically
/// loaded view module. The loader resolves it; views read it while
/// rendering. Clones observe the same state.
#[derive(Debug)]
pub struct Resource<T> {
    state: Rc<RefCell<ResourceState<T>>>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<T> Resource<T> {
    pub fn pending() -> Self {
        Self {
            state: Rc::new(RefCell::new(ResourceState::Pending)),
        }
    }

    pub fn ready(value: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(ResourceState::Ready(Rc::new(value)))),
        }
    }

    /// Settle with a value. Ignored if already settled.
    pub fn resolve(&self, value: T) {
        let mut state = self.state.borrow_mut();
        if matches!(*state, ResourceState::Pending) {
            *state = ResourceState::Ready(Rc::new(value));
        }
    }

    /// Settle with an error. Ignored if already settled.
    pub fn fail(&self, error: ViewError) {
        let mut state = self.state.borrow_mut();
        if matches!(*state, ResourceState::Pending) {
            tracing::debug!(%error, "resource failed");
            *state = ResourceState::Failed(error);
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(*self.state.borrow(), ResourceState::Pending)
    }

    /// The resolved value, if any.
    pub fn get(&self) -> Option<Rc<T>> {
        match &*self.state.borrow() {
            ResourceState::Ready(v) => Some(Rc::clone(v)),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<ViewError> {
        match &*self.state.borrow() {
            ResourceState::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }
}

/// A view whose implementation arrives later.
///
/// Renders `Pending` until the resource resolves, then delegates. Wrap it in
/// `deferred()` to get a dynamically loaded, visibility-gated component.
#[derive(Debug, Clone)]
pub struct LazyView<V> {
    module: Resource<V>,
}

impl<V> LazyView<V> {
    pub fn new(module: Resource<V>) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &Resource<V> {
        &self.module
    }
}

impl<V: View> View for LazyView<V> {
    type Props = V::Props;

    fn render(&self, props: &Self::Props) -> Render {
        if let Some(view) = self.module.get() {
            return view.render(props);
        }
        match self.module.error() {
            Some(e) => Render::Failed(e),
            None => Render::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::view::{ViewFn, view_fn};

    #[test]
    fn resolve_once() {
        let r = Resource::pending();
        assert!(r.is_pending());
        r.resolve(1);
        r.resolve(2);
        assert_eq!(*r.get().unwrap(), 1);
    }

    #[test]
    fn fail_after_resolve_is_ignored() {
        let r = Resource::ready(5);
        r.fail(ViewError::ModuleLoad("x".into()));
        assert!(r.error().is_none());
    }

    #[test]
    fn clones_share_state() {
        let r: Resource<u8> = Resource::pending();
        let loader = r.clone();
        loader.resolve(7);
        assert_eq!(r.get().as_deref(), Some(&7));
    }

    type TestView = ViewFn<(), fn(&()) -> Render>;

    fn loaded(_: &()) -> Render {
        Render::Ready(Node::text("loaded"))
    }

    #[test]
    fn lazy_view_tracks_module() {
        let module = Resource::<TestView>::pending();
        let lazy = LazyView::new(module.clone());
        assert!(lazy.render(&()).is_pending());

        module.resolve(view_fn(loaded as fn(&()) -> Render));
        assert_eq!(lazy.render(&()), Render::Ready(Node::text("loaded")));
    }

    #[test]
    fn lazy_view_reports_failure() {
        let module = Resource::<TestView>::pending();
        let lazy = LazyView::new(module.clone());
        module.fail(ViewError::ModuleLoad("chart".into()));
        assert_eq!(
            lazy.render(&()),
            Render::Failed(ViewError::ModuleLoad("chart".into()))
        );
    }
}
