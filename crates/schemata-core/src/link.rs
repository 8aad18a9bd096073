//! # Lazy Links
//!
//! A link is a validator that stands for "whatever validator is bound to
//! this [`NodeId`]". The resolver emits one when a schema refers back to
//! an ancestor, then binds the ancestor's validator once it is built.
//!
//! Links hold a weak reference to their [`LinkTable`]; the root validator
//! of a resolution owns the table. Bound validators contain links into the
//! same table, so a strong reference would form a cycle.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::validator::Validator;

/// Identity assigned to a schema fragment during one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Validators bound by id.
#[derive(Debug, Default)]
pub struct LinkTable {
    bound: RwLock<HashMap<NodeId, Validator>>,
}

impl LinkTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Bind (or rebind) `id`.
    pub fn bind(&self, id: NodeId, validator: Validator) {
        self.bound.write().insert(id, validator);
    }

    pub fn get(&self, id: NodeId) -> Option<Validator> {
        self.bound.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.bound.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.read().is_empty()
    }
}

/// Deferred reference to a bound validator.
///
/// Holds the table weakly. The table lives as long as some validator
/// carrying it through [`Validator::with_links`] does: the resolved root,
/// or a handle returned by [`Validator::property`]. Once every such holder
/// is dropped the link fails with `link.unresolved`.
#[derive(Clone)]
pub struct Link {
    id: NodeId,
    table: Weak<LinkTable>,
}

impl Link {
    pub(crate) fn new(id: NodeId, table: &Arc<LinkTable>) -> Self {
        Self {
            id,
            table: Arc::downgrade(table),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The bound validator, if the table is alive and `id` is bound.
    pub fn target(&self) -> Option<Validator> {
        self.table.upgrade()?.get(self.id)
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link").field("id", &self.id).finish()
    }
}
