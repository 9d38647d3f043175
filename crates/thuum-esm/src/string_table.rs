//! Localized string tables.
//!
//! Localized plugins store a u32 index in place of display text. The text
//! lives in external `.strings` files; whatever loads those hands the entries
//! to a [`StringTableBuilder`] and the resulting [`StringTable`] is then
//! shared read-only by every record parse.

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

use crate::{Error, Result};

type FxHashMap<K, V> = hashbrown::HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Read-only mapping from string index to text.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    entries: FxHashMap<u32, String>,
}

impl StringTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a table.
    pub fn builder() -> StringTableBuilder {
        StringTableBuilder::new()
    }

    /// Resolve an index.
    pub fn lookup(&self, index: u32) -> Result<&str> {
        self.get(index)
            .ok_or(Error::StringResolutionFailure { index })
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<&str> {
        self.entries.get(&index).map(String::as_str)
    }

    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        self.entries.contains_key(&index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(index, text)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.entries.iter().map(|(&index, text)| (index, text.as_str()))
    }
}

/// Collects entries for a [`StringTable`].
///
/// # Example
///
/// ```
/// use thuum_esm::StringTable;
///
/// let mut builder = StringTable::builder();
/// builder.add_string(0x0001_267C, "foo bar")?.add_string(0x25A6, "foo")?;
/// let table = builder.build();
///
/// assert_eq!(table.lookup(0x0001_267C)?, "foo bar");
/// # Ok::<(), thuum_esm::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct StringTableBuilder {
    entries: FxHashMap<u32, String>,
}

impl StringTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Add an entry. Each index may be added once.
    pub fn add_string(&mut self, index: u32, text: impl Into<String>) -> Result<&mut Self> {
        if self.entries.contains_key(&index) {
            return Err(Error::DuplicateStringIndex(index));
        }
        self.entries.insert(index, text.into());
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Freeze the collected entries.
    pub fn build(self) -> StringTable {
        StringTable {
            entries: self.entries,
        }
    }
}
