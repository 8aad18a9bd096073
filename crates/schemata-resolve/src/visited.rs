//! Visited-node registry for one resolution.
//!
//! Maps fragment identity to a [`NodeId`]. Identity is the fragment's
//! address: every fragment visited during one resolution borrows from the
//! root document or the sub-schema table, both of which outlive the
//! registry, so an address is never reused while it is alive.

use std::collections::HashMap;

use schemata_core::NodeId;
use serde_json::Value;

/// How the resolver must treat a fragment it is about to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visit {
    /// First time seen; `NodeId` was just assigned.
    New(NodeId),
    /// Seen before, but not on the current ancestor chain.
    Shared(NodeId),
    /// On the current ancestor chain: a reference cycle.
    Cycle(NodeId),
}

#[derive(Debug, Default)]
pub(crate) struct Visited {
    ids: HashMap<usize, NodeId>,
    next: u32,
}

impl Visited {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Classify `fragment` against `ancestors`, registering it if new.
    pub(crate) fn visit(&mut self, fragment: &Value, ancestors: &[NodeId]) -> Visit {
        let key = fragment as *const Value as usize;
        if let Some(&id) = self.ids.get(&key) {
            return if ancestors.contains(&id) {
                Visit::Cycle(id)
            } else {
                Visit::Shared(id)
            };
        }
        let id = NodeId::new(self.next);
        self.next += 1;
        self.ids.insert(key, id);
        Visit::New(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }
}
