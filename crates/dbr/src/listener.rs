//! Callbacks that adjust a statement right before it is serialized.
//!
//! Listeners run in registration order on a working copy of the statement,
//! so the statement itself is never changed and repeated `to_sql()` calls
//! see the same input. Only listeners registered for the statement's kind
//! run.

use crate::dml::{Delete, Insert, Select, Statement, Update};
use crate::error::{DbrError, DbrResult};
use std::fmt;
use std::sync::Arc;

/// What a listener wants to happen next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenAction {
    /// Run the next listener.
    Continue,
    /// Skip the remaining listeners and serialize.
    StopPropagation,
    /// Fail serialization with [`DbrError::Aborted`].
    Abort(String),
}

/// A listener callback for statements of type `S`.
pub type ListenerFn<S> = Arc<dyn Fn(&mut S) -> ListenAction + Send + Sync>;

/// A listener bound to one statement kind.
#[derive(Clone)]
pub enum Listener {
    Select(ListenerFn<Select>),
    Insert(ListenerFn<Insert>),
    Update(ListenerFn<Update>),
    Delete(ListenerFn<Delete>),
}

impl Listener {
    pub fn select(f: impl Fn(&mut Select) -> ListenAction + Send + Sync + 'static) -> Self {
        Listener::Select(Arc::new(f))
    }

    pub fn insert(f: impl Fn(&mut Insert) -> ListenAction + Send + Sync + 'static) -> Self {
        Listener::Insert(Arc::new(f))
    }

    pub fn update(f: impl Fn(&mut Update) -> ListenAction + Send + Sync + 'static) -> Self {
        Listener::Update(Arc::new(f))
    }

    pub fn delete(f: impl Fn(&mut Delete) -> ListenAction + Send + Sync + 'static) -> Self {
        Listener::Delete(Arc::new(f))
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Listener::Select(_) => "Select",
            Listener::Insert(_) => "Insert",
            Listener::Update(_) => "Update",
            Listener::Delete(_) => "Delete",
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener::{}(..)", self.kind_name())
    }
}

/// An ordered, named list of listeners.
#[derive(Clone, Default)]
pub struct Listeners {
    entries: Vec<(String, Listener)>,
}

impl Listeners {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener under `name`.
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, name: impl Into<String>, listener: Listener) -> Self {
        self.entries.push((name.into(), listener));
        self
    }

    /// Append all listeners of `other` after the existing ones.
    pub fn extend(mut self, other: Listeners) -> Self {
        self.entries.extend(other.entries);
        self
    }

    /// Remove every listener named `name`.
    pub fn remove(mut self, name: &str) -> Self {
        self.entries.retain(|(n, _)| n != name);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Run the listeners matching `S` against `stmt`.
    pub(crate) fn dispatch<S: Statement>(&self, stmt: &mut S) -> DbrResult<()> {
        for (name, listener) in &self.entries {
            let Some(f) = S::pick_listener(listener) else {
                continue;
            };
            match f(stmt) {
                ListenAction::Continue => {}
                ListenAction::StopPropagation => break,
                ListenAction::Abort(reason) => {
                    return Err(DbrError::Aborted(format!("{name}: {reason}")));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
