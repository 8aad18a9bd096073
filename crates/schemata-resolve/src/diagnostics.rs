//! # Diagnostics
//!
//! Non-fatal notices raised during resolution. A fragment with no `type`,
//! `$ref`, `enum`, composition keyword, `properties` or `format` still
//! resolves (to an accept-anything validator), and the sink is told about
//! it. The default sink logs through `tracing`; embedding applications can
//! capture or silence notices by supplying their own.

use std::fmt;

use parking_lot::Mutex;
use serde_json::Value;

/// Receiver for resolution notices.
pub trait DiagnosticSink: Send + Sync {
    /// `fragment` carries no constraint keywords and resolved to "anything".
    fn under_specified(&self, fragment: &Value);
}

impl fmt::Debug for dyn DiagnosticSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DiagnosticSink")
    }
}

/// Emits a `tracing` warning per notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn under_specified(&self, fragment: &Value) {
        tracing::warn!(
            fragment = %fragment,
            "schema missing a 'type' or '$ref' or 'enum', accepting any value"
        );
    }
}

/// Records every under-specified fragment.
#[derive(Debug, Default)]
pub struct CollectingSink {
    fragments: Mutex<Vec<Value>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fragments reported so far, in order.
    pub fn fragments(&self) -> Vec<Value> {
        self.fragments.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.fragments.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.lock().is_empty()
    }
}

impl DiagnosticSink for CollectingSink {
    fn under_specified(&self, fragment: &Value) {
        self.fragments.lock().push(fragment.clone());
    }
}
