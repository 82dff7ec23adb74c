//! The read-only directory seam the filter consults.
//!
//! The filter never writes to the directory. It asks for at most one entry per
//! identifier and reads attribute values off it. Absent attributes read as an
//! empty list, never as an error.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::types::{Identifier, IdentifyingAttribute};

/// A directory entry: its identifier plus multi-valued attributes.
///
/// Attribute names are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    id: Identifier,
    attrs: BTreeMap<String, Vec<String>>,
}

impl Entry {
    /// Create an entry. The identifying attribute of the leading component
    /// is populated from the identifier itself.
    pub fn new(id: impl Into<Identifier>) -> Self {
        let id = id.into();
        let mut attrs = BTreeMap::new();
        if let Some((attribute, value)) = id.components() {
            attrs.insert(attribute.as_ref().to_lowercase(), vec![value.to_string()]);
        }
        Self { id, attrs }
    }

    /// Add values to an attribute, returning the updated entry.
    pub fn with_values<I, S>(mut self, attr: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attrs
            .entry(attr.to_lowercase())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn id(&self) -> &Identifier {
        &self.id
    }

    pub fn values(&self, attr: &str) -> &[String] {
        self.attrs
            .get(&attr.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn first(&self, attr: &str) -> Option<&str> {
        self.values(attr).first().map(String::as_str)
    }

    /// A copy carrying only the requested attributes.
    pub fn project(&self, requested: &[&str]) -> Entry {
        let attrs = requested
            .iter()
            .filter_map(|attr| {
                let key = attr.to_lowercase();
                self.attrs.get(&key).map(|values| (key, values.clone()))
            })
            .collect();
        Entry {
            id: self.id.clone(),
            attrs,
        }
    }
}

/// Exact-match, single-entry lookups against a directory.
///
/// `base` scopes the search to the one entry named by the identifier; the
/// entry must also carry `attribute == value`. Implementations report
/// transport failures as [`FilterError::DirectoryUnavailable`]; timeouts and
/// retries are theirs to handle.
pub trait DirectoryLookup: Send + Sync {
    fn find_one(
        &self,
        base: &Identifier,
        attribute: IdentifyingAttribute,
        value: &str,
        requested: &[&str],
    ) -> Result<Option<Entry>, FilterError>;
}

impl<T: DirectoryLookup + ?Sized> DirectoryLookup for Arc<T> {
    fn find_one(
        &self,
        base: &Identifier,
        attribute: IdentifyingAttribute,
        value: &str,
        requested: &[&str],
    ) -> Result<Option<Entry>, FilterError> {
        (**self).find_one(base, attribute, value, requested)
    }
}

/// A directory snapshot held in memory, keyed by identifier.
///
/// Identifier keys are compared case-insensitively, as a directory would.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    entries: RwLock<BTreeMap<String, Entry>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, entry: Entry) -> Self {
        self.insert(entry);
        self
    }

    pub fn insert(&self, entry: Entry) {
        let key = entry.id().as_str().to_lowercase();
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        guard.insert(key, entry);
    }

    pub fn remove(&self, id: &Identifier) -> Option<Entry> {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        guard.remove(&id.as_str().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|g| g.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DirectoryLookup for InMemoryDirectory {
    fn find_one(
        &self,
        base: &Identifier,
        attribute: IdentifyingAttribute,
        value: &str,
        requested: &[&str],
    ) -> Result<Option<Entry>, FilterError> {
        let guard = self
            .entries
            .read()
            .map_err(|e| FilterError::DirectoryUnavailable(e.to_string()))?;

        let Some(entry) = guard.get(&base.as_str().to_lowercase()) else {
            return Ok(None);
        };

        let matches = entry
            .values(attribute.as_ref())
            .iter()
            .any(|v| v.eq_ignore_ascii_case(value));

        Ok(matches.then(|| entry.project(requested)))
    }
}
