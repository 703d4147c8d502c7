//! Typed publish/subscribe channel
//!
//! Each widget owns one [`EventEmitter`] for its message type. Hosts
//! subscribe closures with [`EventEmitter::on`] and get back a
//! [`ListenerId`] that can later be passed to [`EventEmitter::off`].
//! Emitters are cheap to clone; clones share the same listeners.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use plotcraft_meta::ChartTemplate;

/// Unique identifier for a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Get the raw ID value
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A committed property edit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyChange {
    /// Option path that changed
    pub path: String,
    /// New value
    pub value: Value,
    /// Array element edited, for array-valued options
    pub index: Option<usize>,
}

impl PropertyChange {
    /// Create a change notification
    #[must_use]
    pub fn new(path: impl Into<String>, value: Value, index: Option<usize>) -> Self {
        Self {
            path: path.into(),
            value,
            index,
        }
    }
}

/// Notifications from the template picker
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateEvent {
    /// A template was clicked
    Select(ChartTemplate),
    /// The pointer entered a template preview that has a hint
    Hover(ChartTemplate),
}

type Listener<E> = Rc<RefCell<dyn FnMut(&E)>>;

/// Typed event emitter
pub struct EventEmitter<E> {
    listeners: Rc<RefCell<Vec<(ListenerId, Listener<E>)>>>,
    next_id: Rc<Cell<u64>>,
}

impl<E: 'static> EventEmitter<E> {
    /// Create an emitter with no listeners
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(1)),
        }
    }

    /// Subscribe a listener
    pub fn on<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let listener: Listener<E> = Rc::new(RefCell::new(listener));
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    /// Unsubscribe a listener. Returns false if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Deliver an event to every listener in subscription order.
    ///
    /// Returns the number of listeners notified. A listener that emits on
    /// the same emitter while handling an event is not re-entered.
    pub fn emit(&self, event: &E) -> usize {
        let snapshot: Vec<Listener<E>> = self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();

        let mut notified = 0;
        for listener in snapshot {
            match listener.try_borrow_mut() {
                Ok(mut handler) => {
                    (&mut *handler)(event);
                    notified += 1;
                }
                Err(_) => tracing::warn!("skipping re-entrant event listener"),
            }
        }
        notified
    }

    /// Number of listeners
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Whether nobody is listening
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Remove every listener
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<E: 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
