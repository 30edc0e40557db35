//! Unit - Abstract measurement model.
//!
//! A [`Unit`] is one scalar layout value: a magnitude plus a kind (absolute
//! cells, percentage of parent or viewport, or automatic) plus positioning
//! modifiers, carried together with its axis and role context.
//!
//! Units are immutable value types. They are resolved to terminal cells at
//! layout time via [`Unit::resolve`]; classification ([`Unit::classify`])
//! tells layout algorithms how a value behaves without re-deriving its
//! internals.

use bitflags::bitflags;

// =============================================================================
// Kind / Context
// =============================================================================

/// What a unit's magnitude means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitKind {
    /// Absolute terminal cells.
    #[default]
    Cell,
    /// Percentage of the viewport extent on this axis.
    ViewportPercent,
    /// Percentage of the parent extent on this axis.
    ParentPercent,
    /// Content-driven: the magnitude is meaningless, the owner substitutes
    /// a content size (or a flow pool share).
    Auto,
}

/// Axis a unit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    /// The other axis.
    pub const fn perpendicular(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Whether a unit describes an offset or an extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Position,
    Dimension,
}

bitflags! {
    /// Positioning modifiers, combinable with bitwise OR.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UnitModifiers: u8 {
        /// Participates in flow stacking / space pooling.
        const RELATIVE = 1 << 0;
        /// Offset measured from the far edge instead of the near edge.
        const INVERTED = 1 << 1;
        /// Centered within the parent extent; magnitude becomes an
        /// additive correction.
        const CENTERED = 1 << 2;
        /// Cell magnitudes are scaled by the terminal cell aspect ratio.
        const ASPECT_ADJUSTED = 1 << 3;
    }
}

// =============================================================================
// Resolution result
// =============================================================================

/// Result of resolving a unit against a parent/viewport context.
///
/// `Auto` units never resolve to a number here: the caller must substitute a
/// content-driven size, so they get the [`Resolved::Content`] sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// Resolved to this many terminal cells. Offsets may be negative.
    Cells(i32),
    /// Content-driven; the owner supplies the size.
    Content,
}

impl Resolved {
    /// Cell count, substituting `fallback` for content-driven values.
    pub fn cells_or(self, fallback: i32) -> i32 {
        match self {
            Self::Cells(n) => n,
            Self::Content => fallback,
        }
    }
}

// =============================================================================
// Unit
// =============================================================================

/// One measurement: magnitude + kind + modifiers + axis/role context.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Unit {
    pub magnitude: f32,
    pub kind: UnitKind,
    pub modifiers: UnitModifiers,
    pub axis: Axis,
    pub role: Role,
}

/// Classification summary consumed by parent layout algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitClass {
    /// Participates in flow stacking / space pooling.
    pub relative: bool,
    /// Needs re-resolution whenever the parent box changes.
    pub contextual: bool,
    /// Measured from the far edge.
    pub inverted: bool,
}

impl Unit {
    /// Create a unit with default context (horizontal position, no modifiers).
    pub const fn new(magnitude: f32, kind: UnitKind) -> Self {
        Self {
            magnitude,
            kind,
            modifiers: UnitModifiers::empty(),
            axis: Axis::Horizontal,
            role: Role::Position,
        }
    }

    /// Absolute cells.
    pub const fn cells(n: f32) -> Self {
        Self::new(n, UnitKind::Cell)
    }

    /// Percentage of the parent extent.
    pub const fn parent_percent(p: f32) -> Self {
        Self::new(p, UnitKind::ParentPercent)
    }

    /// Percentage of the viewport extent.
    pub const fn viewport_percent(p: f32) -> Self {
        Self::new(p, UnitKind::ViewportPercent)
    }

    /// Content-driven value.
    pub const fn auto() -> Self {
        Self::new(0.0, UnitKind::Auto)
    }

    /// Replace the modifier set.
    pub const fn with_modifiers(mut self, modifiers: UnitModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Replace the axis/role context.
    pub const fn with_context(mut self, axis: Axis, role: Role) -> Self {
        self.axis = axis;
        self.role = role;
        self
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Whether this value participates in flow stacking / space pooling.
    ///
    /// Auto never reports relative: pooling of Auto dimensions is a flow
    /// layout decision, not a property of the unit itself.
    pub fn is_relative(&self) -> bool {
        if self.kind == UnitKind::Auto {
            return false;
        }
        self.modifiers.contains(UnitModifiers::RELATIVE)
            || self.kind == UnitKind::ParentPercent
            || self.modifiers.contains(UnitModifiers::INVERTED)
    }

    /// Whether this value must be re-resolved when the parent box changes.
    pub fn is_contextual(&self) -> bool {
        self.kind == UnitKind::ParentPercent
            || self
                .modifiers
                .intersects(UnitModifiers::INVERTED | UnitModifiers::CENTERED)
    }

    /// Whether the offset is measured from the far edge.
    pub fn is_inverted(&self) -> bool {
        self.modifiers.contains(UnitModifiers::INVERTED)
    }

    /// Full classification in one read.
    pub fn classify(&self) -> UnitClass {
        UnitClass {
            relative: self.is_relative(),
            contextual: self.is_contextual(),
            inverted: self.is_inverted(),
        }
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve to terminal cells.
    ///
    /// # Arguments
    ///
    /// * `parent_extent` - parent box extent on this unit's axis
    /// * `viewport_extent` - viewport extent on this unit's axis
    /// * `cell_aspect` - terminal cell aspect correction, applied to Cell
    ///   magnitudes carrying [`UnitModifiers::ASPECT_ADJUSTED`]
    ///
    /// Auto returns [`Resolved::Content`]; its magnitude is ignored.
    pub fn resolve(&self, parent_extent: u16, viewport_extent: u16, cell_aspect: f32) -> Resolved {
        match self.kind {
            UnitKind::Auto => Resolved::Content,
            UnitKind::Cell => {
                let m = if self.modifiers.contains(UnitModifiers::ASPECT_ADJUSTED) {
                    self.magnitude * cell_aspect
                } else {
                    self.magnitude
                };
                Resolved::Cells(m.round() as i32)
            }
            UnitKind::ParentPercent => {
                Resolved::Cells((self.magnitude / 100.0 * parent_extent as f32).round() as i32)
            }
            UnitKind::ViewportPercent => {
                Resolved::Cells((self.magnitude / 100.0 * viewport_extent as f32).round() as i32)
            }
        }
    }
}

// =============================================================================
// UnitReport - per-box classification bitmask
// =============================================================================

bitflags! {
    /// Which layout slots of a component are relative / contextual /
    /// inverted, reported as one bitmask so parent algorithms never
    /// re-derive unit internals.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UnitReport: u16 {
        const X_RELATIVE = 1 << 0;
        const Y_RELATIVE = 1 << 1;
        const W_RELATIVE = 1 << 2;
        const H_RELATIVE = 1 << 3;

        const X_CONTEXTUAL = 1 << 4;
        const Y_CONTEXTUAL = 1 << 5;
        const W_CONTEXTUAL = 1 << 6;
        const H_CONTEXTUAL = 1 << 7;

        const X_INVERTED = 1 << 8;
        const Y_INVERTED = 1 << 9;
        const W_INVERTED = 1 << 10;
        const H_INVERTED = 1 << 11;
    }
}

impl UnitReport {
    /// Build the report for a component's layout box.
    pub fn for_box(x: &Unit, y: &Unit, width: &Unit, height: &Unit) -> Self {
        let mut report = Self::empty();
        for (unit, rel, ctx, inv) in [
            (x, Self::X_RELATIVE, Self::X_CONTEXTUAL, Self::X_INVERTED),
            (y, Self::Y_RELATIVE, Self::Y_CONTEXTUAL, Self::Y_INVERTED),
            (width, Self::W_RELATIVE, Self::W_CONTEXTUAL, Self::W_INVERTED),
            (height, Self::H_RELATIVE, Self::H_CONTEXTUAL, Self::H_INVERTED),
        ] {
            let class = unit.classify();
            if class.relative {
                report |= rel;
            }
            if class.contextual {
                report |= ctx;
            }
            if class.inverted {
                report |= inv;
            }
        }
        report
    }

    /// Whether any slot needs re-resolution on parent box changes.
    pub fn any_contextual(&self) -> bool {
        self.intersects(
            Self::X_CONTEXTUAL | Self::Y_CONTEXTUAL | Self::W_CONTEXTUAL | Self::H_CONTEXTUAL,
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
