//! Call-context chain used to attribute failures.
//!
//! Evaluation order is continuation order, not call-stack order, so a
//! failure cannot recover its location by unwinding. Instead each call site
//! extends the caller's binding and the chain travels with the call.

use std::fmt;
use std::rc::Rc;

struct Frame {
    site: String,
    parent: Binding,
}

/// A call-context chain. Cheap to clone; observes, never owns, values.
#[derive(Clone, Default)]
pub struct Binding(Option<Rc<Frame>>);

impl Binding {
    /// The empty, top-level binding.
    pub fn root() -> Self {
        Binding(None)
    }

    /// Extend this binding with a call site description.
    #[must_use]
    pub fn call(&self, site: impl Into<String>) -> Binding {
        Binding(Some(Rc::new(Frame {
            site: site.into(),
            parent: self.clone(),
        })))
    }

    /// The innermost call site.
    pub fn site(&self) -> Option<&str> {
        self.0.as_deref().map(|frame| frame.site.as_str())
    }

    /// Call sites from innermost to outermost.
    pub fn frames(&self) -> impl Iterator<Item = &str> {
        let mut cursor = self.0.as_deref();
        std::iter::from_fn(move || {
            let frame = cursor?;
            cursor = frame.parent.0.as_deref();
            Some(frame.site.as_str())
        })
    }

    /// Owned snapshot of the chain, innermost first.
    pub fn stack(&self) -> Vec<String> {
        self.frames().map(str::to_string).collect()
    }

    pub fn depth(&self) -> usize {
        self.frames().count()
    }
}

impl Drop for Binding {
    // Unlink iteratively; a long chain would otherwise drop recursively.
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(rc) = next {
            match Rc::try_unwrap(rc) {
                Ok(mut frame) => next = frame.parent.0.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.frames()).finish()
    }
}
