//! # ember-tui
//!
//! Core of a terminal UI toolkit: typed property composition, reactive
//! theme bindings, and flow layout over a component tree.
//!
//! Components are instances of *kinds* - named compositions of capability
//! modules whose property slots get stable integer IDs at definition time.
//! Property storage is confined to one UI thread; handles cross threads
//! freely and marshal their accesses through a [`sync::SyncContext`].
//!
//! ## Modules
//!
//! - [`unit`] - measurement model (cells, percentages, Auto, modifiers)
//! - [`sync`] - UI-thread marshaling boundary
//! - [`props`] - value types, capability modules, kind composition
//! - [`theme`] - observable values components bind slots to
//! - [`component`] - instances, property access, change signaling
//! - [`layout`] - fixed placement and directional flow

pub mod component;
pub mod layout;
pub mod props;
pub mod sync;
pub mod theme;
pub mod types;
pub mod unit;

// Re-export commonly used items
pub use types::{Rect, Rgba, Size};

pub use unit::{Axis, Resolved, Role, Unit, UnitClass, UnitKind, UnitModifiers, UnitReport};

pub use props::{
    ChangeClass, ComposeError, KindBuilder, KindTable, LayoutProps, ModuleDef, PropId,
    PropertyError, SlotDef, Value, ValueKind, appearance_module, container_module, layout_module,
    text_module,
};

pub use component::{Component, ValueRef};

pub use component::kinds::{container_kind, text_kind, widget_kind};

pub use theme::{ObserverKey, ThemeValue};

pub use sync::SyncContext;

pub use layout::{CELL_ASPECT, FlowChild, FlowLayout, layout_pass, layout_root};
