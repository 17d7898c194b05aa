//! Memoization of compiled layouts.
//!
//! Keys are built from the full field list content, so two lists compare equal only when
//! every `(kind, name, count)` triple and the endianness match. Entries are never evicted.

use crate::codec::{CodecError, Endianness};
use crate::field::FieldSpec;
use crate::layout::Layout;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LayoutKey {
    endianness: Endianness,
    fields: Vec<FieldSpec>,
}

/// Shared layout cache. Lookups take a read lock; first compilation of a key takes the
/// write lock, so concurrent callers compile each distinct layout once.
#[derive(Debug, Default)]
pub struct LayoutCache {
    layouts: RwLock<HashMap<LayoutKey, Arc<Layout>>>,
    compilations: AtomicUsize,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache.
    pub fn global() -> Arc<LayoutCache> {
        static GLOBAL: OnceLock<Arc<LayoutCache>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(LayoutCache::new())).clone()
    }

    /// Compiled layout for `fields`, compiling on first use.
    pub fn get(&self, fields: &[FieldSpec], endianness: Endianness) -> Result<Arc<Layout>, CodecError> {
        let key = LayoutKey {
            endianness,
            fields: fields.to_vec(),
        };
        {
            let layouts = self.layouts.read().unwrap_or_else(|e| e.into_inner());
            if let Some(layout) = layouts.get(&key) {
                return Ok(Arc::clone(layout));
            }
        }
        let mut layouts = self.layouts.write().unwrap_or_else(|e| e.into_inner());
        if let Some(layout) = layouts.get(&key) {
            return Ok(Arc::clone(layout));
        }
        let layout = Arc::new(Layout::compile(fields, endianness)?);
        self.compilations.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "compiled layout {} ({} fields, {} bytes)",
            layout.format(),
            fields.len(),
            layout.size()
        );
        layouts.insert(key, Arc::clone(&layout));
        Ok(layout)
    }

    pub fn len(&self) -> usize {
        self.layouts.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of compilations performed (cache misses that succeeded).
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }
}
