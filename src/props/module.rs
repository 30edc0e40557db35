//! Capability modules - named bundles of property slots.
//!
//! A module is defined once, independent of any component kind, and carries
//! its slots' names, value kinds, change classifications, and defaults.
//! Kinds compose an ordered list of modules; the composition assigns each
//! slot its stable integer ID (see [`super::kind`]).

use crate::types::Rgba;
use crate::unit::{Axis, Role, Unit, UnitModifiers};

use super::{ChangeClass, Value, ValueKind};

// =============================================================================
// Definitions
// =============================================================================

/// One styleable attribute within a module.
#[derive(Debug, Clone)]
pub struct SlotDef {
    pub name: &'static str,
    pub kind: ValueKind,
    /// What a successful write to this slot triggers.
    pub class: ChangeClass,
    pub default: Value,
}

impl SlotDef {
    pub fn new(name: &'static str, class: ChangeClass, default: Value) -> Self {
        Self {
            name,
            kind: default.kind(),
            class,
            default,
        }
    }
}

/// A named, reusable bundle of property slots.
#[derive(Debug, Clone)]
pub struct ModuleDef {
    pub name: &'static str,
    pub slots: Vec<SlotDef>,
}

impl ModuleDef {
    pub fn new(name: &'static str, slots: Vec<SlotDef>) -> Self {
        Self { name, slots }
    }

    /// Number of slots this module contributes.
    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Local index of a slot by name.
    pub fn slot_index(&self, name: &str) -> Option<u32> {
        self.slots
            .iter()
            .position(|slot| slot.name == name)
            .map(|i| i as u32)
    }
}

// =============================================================================
// Built-in modules
// =============================================================================

/// Layout module: x/y offsets, width/height extents, z-order.
///
/// X defaults to relative zero, so untouched children flow horizontally;
/// Y to a plain zero offset (relative on both axes forces its own flow
/// group). Extents default to Auto (content-driven or flow-pooled).
pub fn layout_module() -> ModuleDef {
    let x = Unit::cells(0.0)
        .with_modifiers(UnitModifiers::RELATIVE)
        .with_context(Axis::Horizontal, Role::Position);
    let y = Unit::cells(0.0).with_context(Axis::Vertical, Role::Position);
    let width = Unit::auto().with_context(Axis::Horizontal, Role::Dimension);
    let height = Unit::auto().with_context(Axis::Vertical, Role::Dimension);

    ModuleDef::new(
        "layout",
        vec![
            SlotDef::new("x", ChangeClass::X, Value::Unit(x)),
            SlotDef::new("y", ChangeClass::Y, Value::Unit(y)),
            SlotDef::new("width", ChangeClass::WIDTH, Value::Unit(width)),
            SlotDef::new("height", ChangeClass::HEIGHT, Value::Unit(height)),
            SlotDef::new("z_order", ChangeClass::STYLE, Value::Int(0)),
        ],
    )
}

/// Appearance module: foreground/background colors.
pub fn appearance_module() -> ModuleDef {
    ModuleDef::new(
        "appearance",
        vec![
            SlotDef::new(
                "foreground",
                ChangeClass::STYLE,
                Value::Color(Rgba::TERMINAL_DEFAULT),
            ),
            SlotDef::new(
                "background",
                ChangeClass::STYLE,
                Value::Color(Rgba::TERMINAL_DEFAULT),
            ),
        ],
    )
}

/// Container module: border configuration.
///
/// Toggling the border moves the content box, so it is a masked change.
pub fn container_module() -> ModuleDef {
    ModuleDef::new(
        "container",
        vec![
            SlotDef::new("border", ChangeClass::MASKED, Value::Bool(false)),
            SlotDef::new(
                "border_color",
                ChangeClass::STYLE,
                Value::Color(Rgba::TERMINAL_DEFAULT),
            ),
        ],
    )
}

/// Text module: content and wrapping.
///
/// Content writes classify as Style here; text kinds intercept the signal
/// and re-emit Dimensions after re-measuring their content box.
pub fn text_module() -> ModuleDef {
    ModuleDef::new(
        "text",
        vec![
            SlotDef::new("content", ChangeClass::STYLE, Value::Text(String::new())),
            SlotDef::new("wrap", ChangeClass::DIMENSIONS, Value::Bool(false)),
        ],
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_def_kind_from_default() {
        let slot = SlotDef::new("flag", ChangeClass::STYLE, Value::Bool(true));
        assert_eq!(slot.kind, ValueKind::Bool);
    }

    #[test]
    fn test_layout_module_shape() {
        let module = layout_module();
        assert_eq!(module.name, "layout");
        assert_eq!(module.len(), 5);
        assert_eq!(module.slot_index("x"), Some(0));
        assert_eq!(module.slot_index("z_order"), Some(4));
        assert_eq!(module.slot_index("nope"), None);
    }

    #[test]
    fn test_layout_defaults_flow_horizontally() {
        let module = layout_module();
        let x = module.slots[0].default.as_unit().unwrap();
        assert!(x.is_relative());
        let y = module.slots[1].default.as_unit().unwrap();
        assert!(!y.is_relative());
        let width = module.slots[2].default.as_unit().unwrap();
        assert!(!width.is_relative());
        assert_eq!(width.axis, Axis::Horizontal);
        assert_eq!(width.role, Role::Dimension);
    }

    #[test]
    fn test_text_module_classes() {
        let module = text_module();
        assert_eq!(module.slots[0].class, ChangeClass::STYLE);
        assert_eq!(module.slots[1].class, ChangeClass::DIMENSIONS);
    }
}
