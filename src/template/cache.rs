// Template cache
//
// Parsing is deterministic, so a race that parses the same template twice is
// harmless; the cache must only never hand out a partially built Template.
// Entries are Arc-shared and never mutated after insert.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use log::debug;

use crate::error::FormatError;

use super::ast::Template;
use super::parser;

/// Concurrent lookup-or-parse store keyed by the exact template string.
pub struct TemplateCache {
    entries: RwLock<HashMap<String, Arc<Template>>>,
    capacity: Option<usize>,
}

impl TemplateCache {
    /// Unbounded cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: None,
        }
    }

    /// Cache that stops inserting once `capacity` entries are stored.
    /// Templates past the bound still work; they are parsed per call.
    /// `bounded(0)` never stores anything.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }

    /// Fetch the parsed template for `source`, parsing and inserting on a
    /// miss.
    pub fn lookup_or_parse(&self, source: &str) -> Result<Arc<Template>, FormatError> {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(template) = entries.get(source) {
                return Ok(Arc::clone(template));
            }
        }

        debug!("template cache miss, parsing '{}'", source);
        let template = Arc::new(parser::parse(source)?);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if self.capacity.map_or(true, |cap| entries.len() < cap) {
            entries
                .entry(source.to_string())
                .or_insert_with(|| Arc::clone(&template));
        }
        Ok(template)
    }

    /// Number of cached templates.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide cache used by the free-standing format functions and by
/// formatters that were not given their own cache.
pub(crate) fn global_cache() -> &'static TemplateCache {
    static GLOBAL: OnceLock<TemplateCache> = OnceLock::new();
    GLOBAL.get_or_init(TemplateCache::new)
}
