//! Theme dependency values.
//!
//! A [`ThemeValue`] is a live value holder components can bind property
//! slots to: when the holder changes, every bound slot is re-applied. The
//! observer registry is explicit and keyed by (component id, slot id), so a
//! subscriber is removed deterministically when its slot is overwritten with
//! a static value or its component leaves the tree.
//!
//! Theme storage itself (palettes, presets, switching) lives outside this
//! core; this is the collaborator surface reactive bindings consume.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use crate::props::{PropertyError, Value, ValueKind};

// =============================================================================
// Observer registry
// =============================================================================

/// Identity of one subscription: which slot of which component is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverKey {
    pub component: u64,
    pub prop: u32,
}

type ObserverFn = Rc<dyn Fn(&Value)>;

struct ThemeState {
    value: Value,
    observers: Vec<(ObserverKey, ObserverFn)>,
}

struct ThemeValueInner {
    kind: ValueKind,
    /// Thread the holder was created on; every accessor is pinned to it.
    origin: ThreadId,
    state: RefCell<ThemeState>,
}

// SAFETY: handles are shared freely between threads, but the interior is
// only ever touched on the creating (UI) thread - bindings are created
// through the component marshaling path, notifications fire from UI-thread
// writes, and every accessor debug-asserts the origin thread. This mirrors
// the single-writer discipline of property storage.
unsafe impl Send for ThemeValueInner {}
unsafe impl Sync for ThemeValueInner {}

// =============================================================================
// ThemeValue
// =============================================================================

/// A typed, observable theme value. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct ThemeValue {
    inner: Arc<ThemeValueInner>,
}

impl ThemeValue {
    /// Create a holder; its value kind is fixed by the initial value, and
    /// its state is pinned to the creating thread.
    pub fn new(initial: Value) -> Self {
        Self {
            inner: Arc::new(ThemeValueInner {
                kind: initial.kind(),
                origin: thread::current().id(),
                state: RefCell::new(ThemeState {
                    value: initial,
                    observers: Vec::new(),
                }),
            }),
        }
    }

    fn assert_synced(&self) {
        debug_assert!(
            thread::current().id() == self.inner.origin,
            "theme value accessed off its owning UI thread"
        );
    }

    /// The kind every stored value must carry.
    pub fn kind(&self) -> ValueKind {
        self.inner.kind
    }

    /// Current value. UI thread only.
    pub fn get(&self) -> Value {
        self.assert_synced();
        self.inner.state.borrow().value.clone()
    }

    /// Replace the value and notify observers in registration order.
    /// UI thread only.
    pub fn set(&self, value: Value) -> Result<(), PropertyError> {
        self.assert_synced();
        if value.kind() != self.inner.kind {
            return Err(PropertyError::HolderTypeMismatch {
                expected: self.inner.kind,
                got: value.kind(),
            });
        }

        // Snapshot the callbacks so an observer that unsubscribes mid-notify
        // (a binding overwritten from inside a hook) cannot invalidate the
        // iteration. Stale callbacks no-op behind their reactive flag.
        let observers: Vec<ObserverFn> = {
            let mut state = self.inner.state.borrow_mut();
            state.value = value.clone();
            state.observers.iter().map(|(_, f)| f.clone()).collect()
        };
        for observer in observers {
            observer(&value);
        }
        Ok(())
    }

    /// Register an observer. Replaces any previous observer with the same
    /// key. UI thread only.
    pub fn subscribe(&self, key: ObserverKey, callback: impl Fn(&Value) + 'static) {
        self.assert_synced();
        let mut state = self.inner.state.borrow_mut();
        state.observers.retain(|(k, _)| *k != key);
        state.observers.push((key, Rc::new(callback)));
    }

    /// Remove the observer with this key, if any. UI thread only.
    pub fn unsubscribe(&self, key: ObserverKey) {
        self.assert_synced();
        self.inner
            .state
            .borrow_mut()
            .observers
            .retain(|(k, _)| *k != key);
    }

    /// Number of live subscriptions. UI thread only.
    pub fn observer_count(&self) -> usize {
        self.assert_synced();
        self.inner.state.borrow().observers.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
