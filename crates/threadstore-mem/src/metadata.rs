use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use threadstore::{MetadataBook, Result, ValidationError};
use threadstore_types::{MetaValue, ThreadId};

/// An in-memory implementation of [`MetadataBook`].
///
/// Values are stored as given and handed back as clones.
#[derive(Debug, Default)]
pub struct MemoryMetadataBook {
    threads: RwLock<HashMap<ThreadId, HashMap<String, MetaValue>>>,
}

impl MemoryMetadataBook {
    /// Create a new empty metadata book.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataBook for MemoryMetadataBook {
    fn put_meta(&self, thread: &ThreadId, key: &str, value: MetaValue) -> Result<()> {
        if key.is_empty() {
            return Err(ValidationError::EmptyMetaKey.into());
        }
        self.threads
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(*thread)
            .or_default()
            .insert(key.to_string(), value);
        debug!(thread = %thread, key, "stored metadata");
        Ok(())
    }

    fn get_meta(&self, thread: &ThreadId, key: &str) -> Option<MetaValue> {
        self.threads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(thread)?
            .get(key)
            .cloned()
    }

    fn threads_from_meta(&self) -> Vec<ThreadId> {
        let mut threads: Vec<ThreadId> = self
            .threads
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        threads.sort();
        threads
    }
}
