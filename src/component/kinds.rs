//! Built-in component kinds.
//!
//! Kinds are composed once and memoized by name; every call returns the
//! same table. `widget` is the common base (layout + appearance),
//! `container` and `text` chain beneath it.

use std::sync::Arc;

use crate::props::kind::KindTable;
use crate::props::{ChangeClass, appearance_module, container_module, layout_module, text_module};
use crate::types::Size;

/// Base kind: a positioned, colorable box.
pub fn widget_kind() -> Arc<KindTable> {
    KindTable::builder("widget")
        .module(layout_module())
        .module(appearance_module())
        .register()
        .expect("widget kind composes cleanly")
}

/// Widget with border configuration, parent to child subtrees.
pub fn container_kind() -> Arc<KindTable> {
    KindTable::builder("container")
        .base(widget_kind())
        .module(container_module())
        .register()
        .expect("container kind composes cleanly")
}

/// Widget carrying text content.
///
/// Content writes classify as Style at the module level; this kind's hook
/// re-measures the content box and strengthens the signal to Dimensions, so
/// Auto extents re-resolve without every text edit paying layout cost at
/// the module definition.
pub fn text_kind() -> Arc<KindTable> {
    KindTable::builder("text")
        .base(widget_kind())
        .module(text_module())
        .on_change(Arc::new(|component, class, prop| {
            let kind = component.kind();
            let (Ok(content), Ok(wrap)) = (kind.prop("text", "content"), kind.prop("text", "wrap"))
            else {
                return class;
            };
            if prop != content && prop != wrap {
                return class;
            }
            let size =
                component.apply_get(content, |value| measure_text(value.as_text().unwrap_or("")));
            component.set_content_size(size);
            class | ChangeClass::DIMENSIONS
        }))
        .register()
        .expect("text kind composes cleanly")
}

/// Content box of a text run: longest line by height in lines.
fn measure_text(text: &str) -> Size {
    let mut width = 0usize;
    let mut height = 0usize;
    for line in text.lines() {
        height += 1;
        width = width.max(line.chars().count());
    }
    Size::new(width as u16, height as u16)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::props::Value;
    use crate::sync::SyncContext;

    #[test]
    fn test_builtin_kinds_memoized() {
        assert!(Arc::ptr_eq(&widget_kind(), &widget_kind()));
        assert!(Arc::ptr_eq(&text_kind(), &text_kind()));
    }

    #[test]
    fn test_container_chains_beneath_widget() {
        let container = container_kind();
        assert_eq!(container.base_len(), widget_kind().len());
        // Base lookups resolve through the derived table.
        assert_eq!(
            container.prop("layout", "x").unwrap(),
            widget_kind().prop("layout", "x").unwrap()
        );
        let border = container.prop("container", "border").unwrap();
        assert!(border.index() >= container.base_len());
    }

    #[test]
    fn test_measure_text() {
        assert_eq!(measure_text(""), Size::new(0, 0));
        assert_eq!(measure_text("abc"), Size::new(3, 1));
        assert_eq!(measure_text("ab\nlonger\nc"), Size::new(6, 3));
    }

    #[test]
    fn test_content_write_strengthened_to_dimensions() {
        let sync = SyncContext::new();
        let c = Component::new(text_kind(), sync.clone());
        c.complete_init();
        let content = c.kind().prop("text", "content").unwrap();

        c.set(content, "hello\nhi").unwrap();
        assert_eq!(c.content_size(), Size::new(5, 2));
        // Style-classified at the module, Dimensions after interception.
        assert!(c.take_layout_dirty());
    }

    #[test]
    fn test_wrap_write_remeasures() {
        let sync = SyncContext::new();
        let c = Component::new(text_kind(), sync.clone());
        c.complete_init();
        let content = c.kind().prop("text", "content").unwrap();
        let wrap = c.kind().prop("text", "wrap").unwrap();
        c.set(content, "wide line here").unwrap();

        c.set(wrap, true).unwrap();
        assert_eq!(c.content_size(), Size::new(14, 1));
        assert!(c.take_layout_dirty());
    }

    #[test]
    fn test_unrelated_slot_not_intercepted() {
        let sync = SyncContext::new();
        let c = Component::new(text_kind(), sync.clone());
        c.complete_init();
        let fg = c.kind().prop("appearance", "foreground").unwrap();

        c.set(fg, Value::Color(crate::types::Rgba::RED)).unwrap();
        assert!(c.take_style_dirty());
        assert!(!c.take_layout_dirty());
        assert_eq!(c.content_size(), Size::new(0, 0));
    }

    #[test]
    fn test_base_hook_inherited_by_deriving_kind() {
        // A kind chained beneath `text` keeps its interception.
        let derived = KindTable::builder("status_line")
            .base(text_kind())
            .module(container_module())
            .register()
            .unwrap();

        let sync = SyncContext::new();
        let c = Component::new(derived, sync.clone());
        c.complete_init();
        let content = c.kind().prop("text", "content").unwrap();
        c.set(content, "ready").unwrap();
        assert_eq!(c.content_size(), Size::new(5, 1));
        assert!(c.take_layout_dirty());
    }
}
