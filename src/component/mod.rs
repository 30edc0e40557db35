//! Component instances - composed property storage on a tree node.
//!
//! A [`Component`] is a cheap cloneable handle to one tree node plus its
//! property storage: one block per composed capability module, a reactive
//! bitset marking which slots are currently bound, and the node's parent /
//! children / visibility state.
//!
//! Every accessor is thread-safe through marshaling: callers on the UI
//! thread touch storage directly, any other thread has its closure queued
//! onto the [`SyncContext`] and blocks for the result. The marshaled closure
//! holds the component's `Arc`, so an in-flight access can never observe the
//! node being freed underneath it. Off-thread callers should batch work via
//! [`Component::apply_get`] / [`Component::apply_set`] - one marshal, many
//! field touches - rather than issuing many single-property calls.
//!
//! No locks guard the storage itself; correctness rests on the
//! single-writer UI-thread discipline enforced by [`SyncContext`].

use std::cell::{Ref, RefCell, RefMut};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use log::trace;

use crate::props::kind::{KindTable, Located};
use crate::props::{ChangeClass, PropId, PropertyError, Value};
use crate::sync::SyncContext;
use crate::theme::{ObserverKey, ThemeValue};
use crate::types::{Rect, Size};
use crate::unit::{Unit, UnitReport};

pub mod kinds;

/// Pure filter applied to a bound value before it is written to the slot.
pub type Transform = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

// =============================================================================
// Storage
// =============================================================================

/// One live reactive binding: which slot follows which theme value.
struct Binding {
    prop: PropId,
    source: ThemeValue,
}

struct State {
    /// One value block per module in the kind chain, base-first.
    blocks: Vec<Vec<Value>>,
    /// Reactive bitset per block, indexed by module-local slot index.
    reactive: Vec<Vec<u64>>,
    bindings: Vec<Binding>,

    // Tree node
    parent: Weak<ComponentInner>,
    children: Vec<Component>,
    visible: bool,
    /// Outward signaling is suppressed until first layout completes.
    initializing: bool,

    // Resolved layout, written by the layout passes.
    geometry: Rect,
    /// Content-driven size substituted for Auto extents.
    content_size: Size,
    /// Viewport extent; meaningful on the root node only.
    viewport: Size,

    // Dirty flags for a renderer loop to consume.
    style_dirty: bool,
    layout_dirty: bool,
}

struct ComponentInner {
    id: u64,
    kind: Arc<KindTable>,
    sync: SyncContext,
    state: RefCell<State>,
}

// SAFETY: handles cross threads freely, but the RefCell interior is only
// touched on the UI thread - every public accessor either asserts
// `is_synced()` or marshals itself there first. Single-writer discipline;
// there is deliberately no lock.
unsafe impl Send for ComponentInner {}
unsafe impl Sync for ComponentInner {}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

const BITS: usize = u64::BITS as usize;

fn words_for(slots: usize) -> usize {
    slots.div_ceil(BITS)
}

// =============================================================================
// Component
// =============================================================================

/// Handle to one component instance. Clones share the instance.
#[derive(Clone)]
pub struct Component {
    inner: Arc<ComponentInner>,
}

/// Borrowed direct reference to a slot value.
///
/// Only obtainable on the UI thread; do not hold one across a `set` on the
/// same component.
pub struct ValueRef<'a> {
    guard: Ref<'a, State>,
    loc: Located,
}

impl Deref for ValueRef<'_> {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.guard.blocks[self.loc.block][self.loc.slot]
    }
}

impl Component {
    /// Create an instance of `kind`, storage initialized from slot defaults.
    ///
    /// The instance starts visible and in the initializing phase: writes do
    /// not signal outward until the first layout pass completes (or
    /// [`Component::complete_init`] is called).
    pub fn new(kind: Arc<KindTable>, sync: SyncContext) -> Self {
        let chain = kind.chain();
        let blocks = chain
            .iter()
            .map(|(_, module)| {
                module
                    .slots
                    .iter()
                    .map(|slot| slot.default.clone())
                    .collect()
            })
            .collect();
        let reactive = chain
            .iter()
            .map(|(_, module)| vec![0u64; words_for(module.slots.len())])
            .collect();

        Self {
            inner: Arc::new(ComponentInner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                kind,
                sync,
                state: RefCell::new(State {
                    blocks,
                    reactive,
                    bindings: Vec::new(),
                    parent: Weak::new(),
                    children: Vec::new(),
                    visible: true,
                    initializing: true,
                    geometry: Rect::default(),
                    content_size: Size::default(),
                    viewport: Size::default(),
                    style_dirty: false,
                    layout_dirty: false,
                }),
            }),
        }
    }

    /// Unique instance id; never reused within a process.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn kind(&self) -> &Arc<KindTable> {
        &self.inner.kind
    }

    pub fn sync_context(&self) -> &SyncContext {
        &self.inner.sync
    }

    /// Whether two handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Component) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Marshaling
    // =========================================================================

    /// Run `f` against this component on the UI thread, inline when already
    /// there. The closure holds the handle, extending ownership for the
    /// duration of the in-flight access.
    fn run<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Component) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.inner.sync.is_synced() {
            f(self)
        } else {
            let this = self.clone();
            let sync = self.inner.sync.clone();
            sync.sync(move || f(&this))
        }
    }

    fn state(&self) -> Ref<'_, State> {
        self.inner.sync.assert_synced();
        self.inner.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, State> {
        self.inner.sync.assert_synced();
        self.inner.state.borrow_mut()
    }

    // =========================================================================
    // Property access
    // =========================================================================

    /// Read a slot value. Direct read on the UI thread, marshaled and
    /// blocked on otherwise.
    pub fn get(&self, prop: PropId) -> Value {
        self.run(move |c| {
            let loc = c.inner.kind.locate(prop);
            c.state().blocks[loc.block][loc.slot].clone()
        })
    }

    /// Direct reference to a slot value. UI thread only.
    pub fn getref(&self, prop: PropId) -> ValueRef<'_> {
        self.inner.sync.assert_synced();
        ValueRef {
            guard: self.inner.state.borrow(),
            loc: self.inner.kind.locate(prop),
        }
    }

    /// Write a slot value. Clears the slot's reactive flag (detaching any
    /// binding) and emits one classification signal.
    pub fn set(&self, prop: PropId, value: impl Into<Value>) -> Result<(), PropertyError> {
        let value = value.into();
        self.run(move |c| c.write(prop, value, true))
    }

    /// Write a slot value without clearing the reactive flag: an existing
    /// binding keeps re-applying on upstream changes.
    pub fn set_temporary(&self, prop: PropId, value: impl Into<Value>) -> Result<(), PropertyError> {
        let value = value.into();
        self.run(move |c| c.write(prop, value, false))
    }

    /// Run `f` with a direct reference to the slot value, then return its
    /// result. One marshal regardless of how much `f` reads.
    pub fn apply_get<R, F>(&self, prop: PropId, f: F) -> R
    where
        F: FnOnce(&Value) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.run(move |c| {
            let loc = c.inner.kind.locate(prop);
            f(&c.state().blocks[loc.block][loc.slot])
        })
    }

    /// Mutate the slot value in place (cheaper than read-modify-write for
    /// e.g. string append). Clears the reactive flag first, then emits
    /// exactly one classification signal.
    pub fn apply_set<F>(&self, prop: PropId, f: F)
    where
        F: FnOnce(&mut Value) + Send + 'static,
    {
        self.run(move |c| {
            let def = c.inner.kind.slot_def(prop);
            let class = def.class;
            let kind_tag = def.kind;
            let loc = c.inner.kind.locate(prop);
            c.detach_binding(prop);
            {
                let mut state = c.state_mut();
                let value = &mut state.blocks[loc.block][loc.slot];
                f(value);
                debug_assert_eq!(value.kind(), kind_tag, "apply_set changed the slot's kind");
            }
            c.emit(class, prop);
        })
    }

    /// Whether the slot currently follows a binding.
    pub fn is_reactive(&self, prop: PropId) -> bool {
        self.run(move |c| {
            let loc = c.inner.kind.locate(prop);
            let state = c.state();
            state.reactive[loc.block][loc.slot / BITS] & (1 << (loc.slot % BITS)) != 0
        })
    }

    fn write(&self, prop: PropId, value: Value, clear_reactive: bool) -> Result<(), PropertyError> {
        let def = self.inner.kind.slot_def(prop);
        if value.kind() != def.kind {
            return Err(PropertyError::TypeMismatch {
                slot: def.name,
                expected: def.kind,
                got: value.kind(),
            });
        }
        let loc = self.inner.kind.locate(prop);
        if clear_reactive {
            self.detach_binding(prop);
        }
        self.state_mut().blocks[loc.block][loc.slot] = value;
        self.emit(def.class, prop);
        Ok(())
    }

    // =========================================================================
    // Reactive bindings
    // =========================================================================

    /// Bind the slot to a theme value: the current value applies now and on
    /// every upstream change, until the slot is overwritten with a static
    /// value or the component leaves the tree.
    pub fn bind(&self, prop: PropId, source: &ThemeValue) -> Result<(), PropertyError> {
        let source = source.clone();
        self.run(move |c| c.do_bind(prop, source, None))
    }

    /// As [`Component::bind`], with a pure filter applied before each write.
    pub fn bind_with<F>(&self, prop: PropId, source: &ThemeValue, transform: F) -> Result<(), PropertyError>
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let source = source.clone();
        let transform: Transform = Arc::new(transform);
        self.run(move |c| c.do_bind(prop, source, Some(transform)))
    }

    fn do_bind(
        &self,
        prop: PropId,
        source: ThemeValue,
        transform: Option<Transform>,
    ) -> Result<(), PropertyError> {
        let def = self.inner.kind.slot_def(prop);

        // Wrong underlying type is rejected at binding-construction time.
        let candidate = match &transform {
            Some(t) => t(&source.get()),
            None => source.get(),
        };
        if candidate.kind() != def.kind {
            return Err(PropertyError::TypeMismatch {
                slot: def.name,
                expected: def.kind,
                got: candidate.kind(),
            });
        }

        // Rebinding replaces any previous binding on this slot.
        self.detach_binding(prop);

        let loc = self.inner.kind.locate(prop);
        {
            let mut state = self.state_mut();
            state.reactive[loc.block][loc.slot / BITS] |= 1 << (loc.slot % BITS);
            state.bindings.push(Binding {
                prop,
                source: source.clone(),
            });
        }

        // The callback fires on the UI thread already, so it writes
        // directly; it only applies while the slot stays reactive.
        let weak = Arc::downgrade(&self.inner);
        let key = ObserverKey {
            component: self.inner.id,
            prop: prop.index(),
        };
        source.subscribe(key, move |value| {
            let Some(inner) = weak.upgrade() else { return };
            let component = Component { inner };
            if !component.is_reactive(prop) {
                return;
            }
            let next = match &transform {
                Some(t) => t(value),
                None => value.clone(),
            };
            // A transform yielding a wrong kind is dropped silently; the
            // binding itself was checked at construction.
            let _ = component.write(prop, next, false);
        });

        self.write(prop, candidate, false)
    }

    /// Clear the reactive flag and unsubscribe any binding on `prop`.
    fn detach_binding(&self, prop: PropId) {
        let loc = self.inner.kind.locate(prop);
        let binding = {
            let mut state = self.state_mut();
            state.reactive[loc.block][loc.slot / BITS] &= !(1 << (loc.slot % BITS));
            state
                .bindings
                .iter()
                .position(|b| b.prop == prop)
                .map(|i| state.bindings.remove(i))
        };
        if let Some(binding) = binding {
            binding.source.unsubscribe(ObserverKey {
                component: self.inner.id,
                prop: prop.index(),
            });
        }
    }

    /// Detach every binding of this component and its subtree. Called when
    /// the node leaves the tree.
    fn detach_all(&self) {
        let (bindings, children) = {
            let mut state = self.state_mut();
            for word in state.reactive.iter_mut().flatten() {
                *word = 0;
            }
            (
                std::mem::take(&mut state.bindings),
                state.children.clone(),
            )
        };
        for binding in bindings {
            binding.source.unsubscribe(ObserverKey {
                component: self.inner.id,
                prop: binding.prop.index(),
            });
        }
        for child in children {
            child.detach_all();
        }
    }

    // =========================================================================
    // Change signaling
    // =========================================================================

    /// Raise a classification signal for a completed write.
    ///
    /// Suppressed while initializing; otherwise the kind's interception hook
    /// runs first (it may strengthen the class), the dirty flags are
    /// recorded, and a structural change re-runs the parent's layout.
    fn emit(&self, class: ChangeClass, prop: PropId) {
        if class.is_empty() || self.state().initializing {
            return;
        }
        let class = match self.inner.kind.hook() {
            Some(hook) => {
                let hook = hook.clone();
                hook(self, class, prop)
            }
            None => class,
        };
        if class.is_empty() {
            return;
        }
        trace!(
            "component {}: prop {} changed ({:?})",
            self.inner.id,
            prop.index(),
            class
        );
        {
            let mut state = self.state_mut();
            state.style_dirty = true;
            if class.needs_layout() {
                state.layout_dirty = true;
            }
        }
        if class.needs_layout()
            && let Some(parent) = self.parent()
        {
            crate::layout::layout_pass(&parent);
        }
    }

    // =========================================================================
    // Tree node
    // =========================================================================

    /// Append `child` to this node's ordered child list.
    pub fn add_child(&self, child: &Component) {
        let child = child.clone();
        self.run(move |c| {
            {
                let mut child_state = child.state_mut();
                child_state.parent = Arc::downgrade(&c.inner);
            }
            c.state_mut().children.push(child.clone());
        });
    }

    /// Remove `child` from the tree, detaching its subtree's bindings.
    pub fn remove_child(&self, child: &Component) {
        let child = child.clone();
        self.run(move |c| {
            let found = {
                let mut state = c.state_mut();
                let idx = state.children.iter().position(|x| x.ptr_eq(&child));
                idx.map(|i| state.children.remove(i))
            };
            if let Some(removed) = found {
                removed.state_mut().parent = Weak::new();
                removed.detach_all();
            }
        });
    }

    /// Ordered child list snapshot.
    pub fn children(&self) -> Vec<Component> {
        self.run(|c| c.state().children.clone())
    }

    pub fn parent(&self) -> Option<Component> {
        self.run(|c| c.state().parent.upgrade().map(|inner| Component { inner }))
    }

    pub fn is_visible(&self) -> bool {
        self.run(|c| c.state().visible)
    }

    /// Toggle visibility. A change re-runs the parent's layout: hidden
    /// siblings never occupy flow groups.
    pub fn set_visible(&self, visible: bool) {
        self.run(move |c| {
            let changed = {
                let mut state = c.state_mut();
                let changed = state.visible != visible;
                state.visible = visible;
                changed
            };
            let relayout = changed && !c.state().initializing;
            if relayout && let Some(parent) = c.parent() {
                crate::layout::layout_pass(&parent);
            }
        });
    }

    pub fn is_initializing(&self) -> bool {
        self.run(|c| c.state().initializing)
    }

    /// Leave the initializing phase; later writes signal outward.
    /// Layout passes call this for every node they place.
    pub fn complete_init(&self) {
        self.run(|c| c.state_mut().initializing = false);
    }

    // =========================================================================
    // Resolved layout
    // =========================================================================

    /// Resolved cell rectangle, relative to the parent content origin.
    pub fn geometry(&self) -> Rect {
        self.run(|c| c.state().geometry)
    }

    pub(crate) fn set_geometry(&self, rect: Rect) {
        self.state_mut().geometry = rect;
    }

    /// Content-driven size substituted for Auto extents.
    pub fn content_size(&self) -> Size {
        self.run(|c| c.state().content_size)
    }

    /// Record the content-driven size (text measure, children bounding box).
    pub fn set_content_size(&self, size: Size) {
        self.run(move |c| c.state_mut().content_size = size);
    }

    /// Set the viewport extent on this (root) node.
    pub fn set_viewport(&self, size: Size) {
        self.run(move |c| c.state_mut().viewport = size);
    }

    /// Viewport extent, read from the tree root.
    pub fn viewport(&self) -> Size {
        self.run(|c| c.viewport_synced())
    }

    pub(crate) fn viewport_synced(&self) -> Size {
        let mut current = self.clone();
        loop {
            let parent = current.state().parent.upgrade();
            match parent {
                Some(inner) => current = Component { inner },
                None => return current.state().viewport,
            }
        }
    }

    /// Bitmask of which layout slots are relative / contextual / inverted,
    /// for parent layout algorithms.
    pub fn unit_report(&self) -> UnitReport {
        self.run(|c| match c.layout_units() {
            Some((x, y, w, h)) => UnitReport::for_box(&x, &y, &w, &h),
            None => UnitReport::empty(),
        })
    }

    /// The four layout units, if this kind composes the layout module.
    /// UI thread only.
    pub(crate) fn layout_units(&self) -> Option<(Unit, Unit, Unit, Unit)> {
        let props = self.inner.kind.layout_props()?;
        let state = self.state();
        let unit = |prop: PropId| {
            let loc = self.inner.kind.locate(prop);
            state.blocks[loc.block][loc.slot]
                .as_unit()
                .expect("layout slot holds a unit")
        };
        Some((unit(props.x), unit(props.y), unit(props.width), unit(props.height)))
    }

    // =========================================================================
    // Dirty flags
    // =========================================================================

    /// Consume the style-dirty flag (renderer loop).
    pub fn take_style_dirty(&self) -> bool {
        self.run(|c| {
            let mut state = c.state_mut();
            std::mem::take(&mut state.style_dirty)
        })
    }

    /// Consume the layout-dirty flag.
    pub fn take_layout_dirty(&self) -> bool {
        self.run(|c| {
            let mut state = c.state_mut();
            std::mem::take(&mut state.layout_dirty)
        })
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind.name())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::kinds;
    use super::*;
    use crate::props::ValueKind;
    use crate::types::Rgba;

    fn widget(sync: &SyncContext) -> Component {
        Component::new(kinds::widget_kind(), sync.clone())
    }

    #[test]
    fn test_defaults_from_slot_defs() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        let fg = c.kind().prop("appearance", "foreground").unwrap();
        assert_eq!(c.get(fg), Value::Color(Rgba::TERMINAL_DEFAULT));
        let width = c.kind().layout_props().unwrap().width;
        assert!(c.get(width).as_unit().unwrap().kind == crate::unit::UnitKind::Auto);
    }

    #[test]
    fn test_set_get_roundtrip() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        let fg = c.kind().prop("appearance", "foreground").unwrap();
        c.set(fg, Rgba::RED).unwrap();
        assert_eq!(c.get(fg), Value::Color(Rgba::RED));
    }

    #[test]
    fn test_set_wrong_type_rejected() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        let fg = c.kind().prop("appearance", "foreground").unwrap();
        let err = c.set(fg, Value::Int(3)).unwrap_err();
        assert_eq!(
            err,
            PropertyError::TypeMismatch {
                slot: "foreground",
                expected: ValueKind::Color,
                got: ValueKind::Int,
            }
        );
    }

    #[test]
    fn test_getref_direct() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        let fg = c.kind().prop("appearance", "foreground").unwrap();
        c.set(fg, Rgba::BLUE).unwrap();
        let value = c.getref(fg);
        assert_eq!(value.as_color(), Some(Rgba::BLUE));
    }

    #[test]
    fn test_base_ids_hit_same_storage_on_derived() {
        let sync = SyncContext::new();
        let c = Component::new(kinds::text_kind(), sync.clone());
        c.complete_init();

        let base = kinds::widget_kind();
        let fg_base = base.prop("appearance", "foreground").unwrap();
        let fg_derived = c.kind().prop("appearance", "foreground").unwrap();
        assert_eq!(fg_base, fg_derived);

        c.set(fg_base, Rgba::GREEN).unwrap();
        assert_eq!(c.get(fg_derived), Value::Color(Rgba::GREEN));
    }

    #[test]
    fn test_bind_applies_and_follows() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        c.complete_init();
        let fg = c.kind().prop("appearance", "foreground").unwrap();
        let theme = ThemeValue::new(Value::Color(Rgba::RED));

        c.bind(fg, &theme).unwrap();
        assert!(c.is_reactive(fg));
        assert_eq!(c.get(fg), Value::Color(Rgba::RED));

        theme.set(Value::Color(Rgba::BLUE)).unwrap();
        assert_eq!(c.get(fg), Value::Color(Rgba::BLUE));
    }

    #[test]
    fn test_static_set_permanently_detaches_binding() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        c.complete_init();
        let fg = c.kind().prop("appearance", "foreground").unwrap();
        let theme = ThemeValue::new(Value::Color(Rgba::RED));
        c.bind(fg, &theme).unwrap();

        c.set(fg, Rgba::WHITE).unwrap();
        assert!(!c.is_reactive(fg));
        assert_eq!(theme.observer_count(), 0);

        // Later source changes must not re-apply.
        theme.set(Value::Color(Rgba::BLACK)).unwrap();
        assert_eq!(c.get(fg), Value::Color(Rgba::WHITE));
    }

    #[test]
    fn test_temporary_set_keeps_binding() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        c.complete_init();
        let fg = c.kind().prop("appearance", "foreground").unwrap();
        let theme = ThemeValue::new(Value::Color(Rgba::RED));
        c.bind(fg, &theme).unwrap();

        c.set_temporary(fg, Rgba::WHITE).unwrap();
        assert!(c.is_reactive(fg));

        theme.set(Value::Color(Rgba::GREEN)).unwrap();
        assert_eq!(c.get(fg), Value::Color(Rgba::GREEN));
    }

    #[test]
    fn test_bind_wrong_type_rejected_at_construction() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        let fg = c.kind().prop("appearance", "foreground").unwrap();
        let theme = ThemeValue::new(Value::Int(3));
        assert!(matches!(
            c.bind(fg, &theme),
            Err(PropertyError::TypeMismatch { .. })
        ));
        assert!(!c.is_reactive(fg));
        assert_eq!(theme.observer_count(), 0);
    }

    #[test]
    fn test_bind_with_transform() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        c.complete_init();
        let fg = c.kind().prop("appearance", "foreground").unwrap();
        // Int source transformed into a grayscale color.
        let theme = ThemeValue::new(Value::Int(128));
        c.bind_with(fg, &theme, |v| {
            let level = v.as_int().unwrap_or(0) as u8;
            Value::Color(Rgba::rgb(level, level, level))
        })
        .unwrap();
        assert_eq!(c.get(fg), Value::Color(Rgba::rgb(128, 128, 128)));

        theme.set(Value::Int(255)).unwrap();
        assert_eq!(c.get(fg), Value::Color(Rgba::rgb(255, 255, 255)));
    }

    #[test]
    fn test_remove_child_detaches_bindings() {
        let sync = SyncContext::new();
        let parent = widget(&sync);
        let child = widget(&sync);
        parent.add_child(&child);
        child.complete_init();

        let fg = child.kind().prop("appearance", "foreground").unwrap();
        let theme = ThemeValue::new(Value::Color(Rgba::RED));
        child.bind(fg, &theme).unwrap();
        assert_eq!(theme.observer_count(), 1);

        parent.remove_child(&child);
        assert_eq!(theme.observer_count(), 0);
        assert!(!child.is_reactive(fg));
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_tree_navigation() {
        let sync = SyncContext::new();
        let parent = widget(&sync);
        let a = widget(&sync);
        let b = widget(&sync);
        parent.add_child(&a);
        parent.add_child(&b);

        let children = parent.children();
        assert_eq!(children.len(), 2);
        assert!(children[0].ptr_eq(&a));
        assert!(children[1].ptr_eq(&b));
        assert!(a.parent().unwrap().ptr_eq(&parent));
    }

    #[test]
    fn test_initializing_suppresses_dirty_flags() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        let fg = c.kind().prop("appearance", "foreground").unwrap();
        assert!(c.is_initializing());
        c.set(fg, Rgba::RED).unwrap();
        assert!(!c.take_style_dirty());

        c.complete_init();
        c.set(fg, Rgba::BLUE).unwrap();
        assert!(c.take_style_dirty());
    }

    #[test]
    fn test_apply_set_single_signal() {
        let sync = SyncContext::new();
        let c = Component::new(kinds::text_kind(), sync.clone());
        c.complete_init();
        let content = c.kind().prop("text", "content").unwrap();

        c.apply_set(content, |value| {
            if let Value::Text(text) = value {
                text.push_str("line one");
                text.push('\n');
                text.push_str("a longer line two");
            }
        });
        assert_eq!(
            c.get(content),
            Value::Text("line one\na longer line two".into())
        );
        // The text kind's hook re-measured the content box once.
        assert_eq!(c.content_size(), Size::new(17, 2));
    }

    #[test]
    fn test_apply_get_batches_reads() {
        let sync = SyncContext::new();
        let c = Component::new(kinds::text_kind(), sync.clone());
        let content = c.kind().prop("text", "content").unwrap();
        c.set(content, "abc").unwrap();
        let len = c.apply_get(content, |v| v.as_text().map(str::len).unwrap_or(0));
        assert_eq!(len, 3);
    }

    #[test]
    fn test_unit_report_surface() {
        let sync = SyncContext::new();
        let c = widget(&sync);
        let report = c.unit_report();
        // Defaults: x relative (horizontal flow), y plain, extents auto.
        assert!(report.contains(UnitReport::X_RELATIVE));
        assert!(!report.contains(UnitReport::Y_RELATIVE));
        assert!(!report.contains(UnitReport::W_RELATIVE));
    }
}
