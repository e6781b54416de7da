// Parsed template model

use std::sync::Arc;

/// A structural slot: literal content fixed at parse time, or a reference
/// to the positional argument that fills it.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<T> {
    Static(T),
    Param(usize),
}

/// One element of the path. A literal run may span several `/`-separated
/// components; consecutive literal content is coalesced by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Literal(String),
    Param(usize),
}

/// A single query entry. An empty key marks a query-set placeholder whose
/// argument merges a whole key/value collection into the query string.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEntry {
    pub key: String,
    pub value: Slot<String>,
}

/// The parsed, validated model of a URL template.
///
/// Immutable once parsed. Endpoint overrides build a new `Template` whose
/// path and query storage is shared with the original, so a cached template
/// never observes override side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub(crate) protocol: Option<Slot<String>>,
    pub(crate) hostname: Option<Slot<String>>,
    pub(crate) port: Option<Slot<u16>>,
    pub(crate) paths: Arc<[PathSegment]>,
    pub(crate) queries: Arc<[QueryEntry]>,
    pub(crate) fragment: Option<Slot<String>>,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
}

impl Template {
    /// Number of placeholders in the template; indices are exactly
    /// `0..placeholder_count()`, in order of appearance.
    pub fn placeholder_count(&self) -> usize {
        let single = |slot: &Option<Slot<String>>| match slot {
            Some(Slot::Param(_)) => 1,
            _ => 0,
        };

        let mut count = single(&self.protocol) + single(&self.hostname) + single(&self.fragment);
        if let Some(Slot::Param(_)) = self.port {
            count += 1;
        }
        count += self
            .paths
            .iter()
            .filter(|segment| matches!(segment, PathSegment::Param(_)))
            .count();
        count += self
            .queries
            .iter()
            .filter(|entry| matches!(entry.value, Slot::Param(_)))
            .count();
        count
    }
}
