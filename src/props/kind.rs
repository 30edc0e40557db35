//! Kind tables - module composition and chaining.
//!
//! A [`KindTable`] maps one component kind's ordered module list to stable
//! property-ID ranges: module *i* starts where module *i*-1 ended (or where
//! the base chain ended, for module 0). The mapping is fully determined by
//! the ordered list; composing is table construction, and only resolving an
//! ID back to its owning module needs a reverse range lookup.
//!
//! Derived kinds chain beneath a base kind: their modules get IDs above the
//! base range, and lookups below the cutoff forward unchanged to the base
//! table, so subclassing never renumbers or duplicates base metadata.
//!
//! Tables are memoized by kind name in a process-wide registry on first
//! registration.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use log::debug;
use parking_lot::Mutex;

use crate::component::Component;

use super::module::{ModuleDef, SlotDef};
use super::{ChangeClass, ComposeError, PropId};

/// Per-kind interception hook for outward change signals.
///
/// Runs before the signal reaches the tree; may re-emit a stronger
/// classification (typically Dimensions after re-measuring a cached
/// content-driven size).
pub type ChangeHook = Arc<dyn Fn(&Component, ChangeClass, PropId) -> ChangeClass + Send + Sync>;

// =============================================================================
// KindTable
// =============================================================================

struct ModuleEntry {
    start: u32,
    def: Arc<ModuleDef>,
}

/// Property IDs of the layout module's slots, cached at composition so
/// layout code never does name lookups per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutProps {
    pub x: PropId,
    pub y: PropId,
    pub width: PropId,
    pub height: PropId,
    pub z_order: PropId,
}

/// Storage address of a slot: block ordinal within the full chain plus the
/// module-local slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Located {
    pub block: usize,
    pub slot: usize,
}

/// Composed property table for one component kind.
pub struct KindTable {
    name: &'static str,
    base: Option<Arc<KindTable>>,
    /// IDs below this forward to the base chain.
    base_len: u32,
    /// Storage blocks contributed by the base chain.
    base_blocks: usize,
    modules: Vec<ModuleEntry>,
    total: u32,
    layout: Option<LayoutProps>,
    hook: Option<ChangeHook>,
}

impl KindTable {
    /// Start composing a new kind.
    pub fn builder(name: &'static str) -> KindBuilder {
        KindBuilder {
            name,
            base: None,
            modules: Vec::new(),
            hook: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total number of property IDs across the whole chain.
    pub fn len(&self) -> u32 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// The ID cutoff below which lookups forward to the base kind.
    pub fn base_len(&self) -> u32 {
        self.base_len
    }

    pub fn base(&self) -> Option<&Arc<KindTable>> {
        self.base.as_ref()
    }

    /// Cached layout-slot IDs, if the chain composes the layout module.
    pub fn layout_props(&self) -> Option<LayoutProps> {
        self.layout
    }

    /// The interception hook for this kind, inherited from the base chain
    /// when the kind defines none of its own.
    pub(crate) fn hook(&self) -> Option<&ChangeHook> {
        self.hook
            .as_ref()
            .or_else(|| self.base.as_ref().and_then(|base| base.hook()))
    }

    /// Look up a slot's ID by module and slot name, searching the chain.
    pub fn prop(&self, module: &'static str, slot: &'static str) -> Result<PropId, ComposeError> {
        for entry in &self.modules {
            if entry.def.name == module {
                return match entry.def.slot_index(slot) {
                    Some(local) => Ok(PropId(entry.start + local)),
                    None => Err(ComposeError::UnknownSlot { module, slot }),
                };
            }
        }
        match &self.base {
            Some(base) => base.prop(module, slot),
            None => Err(ComposeError::UnknownModule {
                kind: self.name,
                module,
            }),
        }
    }

    /// Metadata of the slot owning `id`. IDs below the cutoff forward
    /// unchanged to the base table.
    pub fn slot_def(&self, id: PropId) -> &SlotDef {
        if id.0 < self.base_len {
            return self
                .base
                .as_ref()
                .expect("id below cutoff on a baseless kind")
                .slot_def(id);
        }
        for entry in &self.modules {
            if id.0 < entry.start + entry.def.len() {
                return &entry.def.slots[(id.0 - entry.start) as usize];
            }
        }
        panic!("property id {} never composed onto kind `{}`", id.0, self.name);
    }

    /// Storage address of `id` within an instance's block list.
    pub(crate) fn locate(&self, id: PropId) -> Located {
        if id.0 < self.base_len {
            return self
                .base
                .as_ref()
                .expect("id below cutoff on a baseless kind")
                .locate(id);
        }
        for (i, entry) in self.modules.iter().enumerate() {
            if id.0 < entry.start + entry.def.len() {
                return Located {
                    block: self.base_blocks + i,
                    slot: (id.0 - entry.start) as usize,
                };
            }
        }
        panic!("property id {} never composed onto kind `{}`", id.0, self.name);
    }

    /// Full chain of modules, base-first, with their start offsets.
    ///
    /// Instances allocate one storage block per returned module.
    pub(crate) fn chain(&self) -> Vec<(u32, Arc<ModuleDef>)> {
        let mut out = match &self.base {
            Some(base) => base.chain(),
            None => Vec::new(),
        };
        for entry in &self.modules {
            out.push((entry.start, entry.def.clone()));
        }
        out
    }

    fn chain_has_module(&self, name: &str) -> bool {
        self.modules.iter().any(|entry| entry.def.name == name)
            || self
                .base
                .as_ref()
                .is_some_and(|base| base.chain_has_module(name))
    }
}

impl std::fmt::Debug for KindTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindTable")
            .field("name", &self.name)
            .field("base_len", &self.base_len)
            .field("total", &self.total)
            .finish()
    }
}

// =============================================================================
// Builder + registry
// =============================================================================

/// Composes a kind's ordered module list, then registers it.
pub struct KindBuilder {
    name: &'static str,
    base: Option<Arc<KindTable>>,
    modules: Vec<ModuleDef>,
    hook: Option<ChangeHook>,
}

impl KindBuilder {
    /// Chain beneath a base kind: this kind's IDs start above the base range.
    pub fn base(mut self, base: Arc<KindTable>) -> Self {
        self.base = Some(base);
        self
    }

    /// Append a module; its slots get the next contiguous ID range.
    pub fn module(mut self, def: ModuleDef) -> Self {
        self.modules.push(def);
        self
    }

    /// Install the kind's change-signal interception hook.
    pub fn on_change(mut self, hook: ChangeHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Validate the composition and register it.
    ///
    /// Registration is memoized by kind name: the first composition wins and
    /// later calls return the existing table, so recomposition is
    /// deterministic by construction.
    pub fn register(self) -> Result<Arc<KindTable>, ComposeError> {
        let mut map = kinds().lock();
        if let Some(existing) = map.get(self.name) {
            return Ok(existing.clone());
        }

        if self.modules.is_empty() && self.base.is_none() {
            return Err(ComposeError::EmptyKind(self.name));
        }

        // Module names must be unique across the whole chain.
        for (i, def) in self.modules.iter().enumerate() {
            let dup_local = self.modules[..i].iter().any(|other| other.name == def.name);
            let dup_base = self
                .base
                .as_ref()
                .is_some_and(|base| base.chain_has_module(def.name));
            if dup_local || dup_base {
                return Err(ComposeError::DuplicateModule(def.name));
            }
        }

        let base_len = self.base.as_ref().map_or(0, |base| base.total);
        let base_blocks = self.base.as_ref().map_or(0, |base| base.chain().len());

        let mut cursor = base_len;
        let mut modules = Vec::with_capacity(self.modules.len());
        for def in self.modules {
            let len = def.len();
            modules.push(ModuleEntry {
                start: cursor,
                def: Arc::new(def),
            });
            cursor += len;
        }

        let mut table = KindTable {
            name: self.name,
            base: self.base,
            base_len,
            base_blocks,
            modules,
            total: cursor,
            layout: None,
            hook: self.hook,
        };
        table.layout = layout_props_of(&table);

        debug!(
            "registered kind `{}`: ids {}..{} ({} base)",
            table.name, base_len, table.total, base_len
        );

        let table = Arc::new(table);
        map.insert(table.name, table.clone());
        Ok(table)
    }
}

fn layout_props_of(table: &KindTable) -> Option<LayoutProps> {
    if let Some(base) = &table.base
        && let Some(props) = base.layout
    {
        return Some(props);
    }
    let entry = table.modules.iter().find(|e| e.def.name == "layout")?;
    let id = |name: &str| -> Option<PropId> {
        Some(PropId(entry.start + entry.def.slot_index(name)?))
    };
    Some(LayoutProps {
        x: id("x")?,
        y: id("y")?,
        width: id("width")?,
        height: id("height")?,
        z_order: id("z_order")?,
    })
}

static KINDS: OnceLock<Mutex<HashMap<&'static str, Arc<KindTable>>>> = OnceLock::new();

fn kinds() -> &'static Mutex<HashMap<&'static str, Arc<KindTable>>> {
    KINDS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Clear the memoized kind registry (for testing).
pub fn reset_kinds() {
    kinds().lock().clear();
}

// =============================================================================
// Tests
// =============================================================================
