//! Property registry foundation.
//!
//! Every styleable attribute of a component is a *property slot*: a typed
//! cell addressed by a stable integer ID, owned by a *capability module*
//! (a named, reusable bundle of related slots). Modules are composed onto
//! component kinds at definition time; see [`kind::KindTable`].
//!
//! Slot values are carried as the tagged [`Value`] type so one get/set
//! surface covers every composed module. Type errors are caught when a kind
//! or binding is defined, never at steady-state runtime.

use bitflags::bitflags;
use thiserror::Error;

use crate::types::Rgba;
use crate::unit::Unit;

pub mod kind;
pub mod module;

pub use kind::{KindBuilder, KindTable, LayoutProps, reset_kinds};
pub use module::{ModuleDef, SlotDef, appearance_module, container_module, layout_module, text_module};

// =============================================================================
// Values
// =============================================================================

/// The underlying type of a property slot, fixed at module definition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Unit,
    Color,
    Text,
}

/// A property slot value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Unit(Unit),
    Color(Rgba),
    Text(String),
}

impl Value {
    /// The kind tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Unit(_) => ValueKind::Unit,
            Self::Color(_) => ValueKind::Color,
            Self::Text(_) => ValueKind::Text,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_unit(&self) -> Option<Unit> {
        match self {
            Self::Unit(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            Self::Color(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Unit> for Value {
    fn from(v: Unit) -> Self {
        Self::Unit(v)
    }
}

impl From<Rgba> for Value {
    fn from(v: Rgba) -> Self {
        Self::Color(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

// =============================================================================
// Property IDs
// =============================================================================

/// Stable integer ID of a property slot, assigned when modules are composed
/// onto a component kind. IDs are unique and contiguous per module, and a
/// derived kind's IDs start above its base kind's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropId(pub(crate) u32);

impl PropId {
    /// Raw index, usable as an observer key component.
    pub const fn index(self) -> u32 {
        self.0
    }
}

// =============================================================================
// Change classification
// =============================================================================

bitflags! {
    /// What a successful write to a slot triggers, as a union of per-axis
    /// tags. `STYLE` means re-render only; width/height tags imply a
    /// bounding-box recompute; x/y tags an offset recompute.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChangeClass: u8 {
        const STYLE = 1 << 0;
        const X = 1 << 1;
        const Y = 1 << 2;
        const WIDTH = 1 << 3;
        const HEIGHT = 1 << 4;

        /// Offset recompute on either axis.
        const POSITION = Self::X.bits() | Self::Y.bits();
        /// Bounding-box recompute on either axis.
        const DIMENSIONS = Self::WIDTH.bits() | Self::HEIGHT.bits();
        /// Both style and structural recompute.
        const MASKED = Self::STYLE.bits() | Self::POSITION.bits() | Self::DIMENSIONS.bits();
    }
}

impl ChangeClass {
    /// Whether this write requires the parent to re-run layout.
    pub fn needs_layout(&self) -> bool {
        self.intersects(Self::POSITION | Self::DIMENSIONS)
    }

    /// Whether this write requires a re-render.
    pub fn needs_render(&self) -> bool {
        !self.is_empty()
    }
}

// =============================================================================
// Definition-time errors
// =============================================================================

/// Errors raised while composing modules onto a component kind.
///
/// These surface at kind definition time; a registered kind can no longer
/// produce them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("module `{0}` composed more than once onto one kind")]
    DuplicateModule(&'static str),

    #[error("kind `{kind}` composes no module named `{module}`")]
    UnknownModule {
        kind: &'static str,
        module: &'static str,
    },

    #[error("module `{module}` has no slot named `{slot}`")]
    UnknownSlot {
        module: &'static str,
        slot: &'static str,
    },

    #[error("kind `{0}` composes no modules and has no base")]
    EmptyKind(&'static str),
}

/// Errors raised when a value or binding does not fit its slot.
///
/// Raised at write/binding-construction time; slot kinds themselves are
/// fixed at definition time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertyError {
    #[error("slot `{slot}` holds {expected:?}, got {got:?}")]
    TypeMismatch {
        slot: &'static str,
        expected: ValueKind,
        got: ValueKind,
    },

    #[error("value holder carries {expected:?}, got {got:?}")]
    HolderTypeMismatch { expected: ValueKind, got: ValueKind },
}

// =============================================================================
// Tests
// =============================================================================
