use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::util::FastHashSet;

/// Join character used to render a multi-valued tag as a single string.
pub const MULTI_VALUED_JOINER: &str = "; ";

/// Rewrite the documented hidden-tag convention: a leading `_` becomes `~`.
/// Scripts and stored metadata agree on this normalized form; the rewrite is
/// total and idempotent.
pub fn normalize_tagname(name: &str) -> String {
    match name.strip_prefix('_') {
        Some(rest) => format!("~{rest}"),
        None => name.to_string(),
    }
}

/// Multi-valued tag store scripts are evaluated against.
///
/// Tag keys are stored with any trailing `:` trimmed, so `performer:` and
/// `performer` address the same tag. Values are ordered; lookups of missing
/// tags yield empty results, never errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    store: BTreeMap<String, Vec<String>>,
    deleted_tags: FastHashSet<String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    fn normalize_key(name: &str) -> &str {
        name.trim_end_matches(':')
    }

    /// Single-string rendering of a tag: values joined with the
    /// multi-value joiner, or empty when the tag is absent.
    pub fn get(&self, name: &str) -> String {
        match self.store.get(Self::normalize_key(name)) {
            Some(values) if !values.is_empty() => values.join(MULTI_VALUED_JOINER),
            _ => String::new(),
        }
    }

    /// The full ordered value list of a tag, empty when absent.
    pub fn getall(&self, name: &str) -> &[String] {
        self.store
            .get(Self::normalize_key(name))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Replace the values of a tag. Empty values are dropped; if nothing
    /// remains the tag is deleted.
    pub fn set(&mut self, name: &str, values: Vec<String>) {
        let name = Self::normalize_key(name);
        let values: Vec<String> = values.into_iter().filter(|v| !v.is_empty()).collect();
        if values.is_empty() {
            if self.store.contains_key(name) {
                self.delete(name);
            }
        } else {
            self.store.insert(name.to_string(), values);
            self.deleted_tags.remove(name);
        }
    }

    /// Convenience for setting a single value.
    pub fn set_text(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, vec![value.into()]);
    }

    /// Append one value to a tag; empty values are ignored.
    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            return;
        }
        let name = Self::normalize_key(name);
        self.store.entry(name.to_string()).or_default().push(value);
        self.deleted_tags.remove(name);
    }

    /// Remove a tag without marking it for deletion.
    pub fn unset(&mut self, name: &str) {
        self.store.remove(Self::normalize_key(name));
    }

    /// Remove a tag and remember it as deleted.
    pub fn delete(&mut self, name: &str) {
        let name = Self::normalize_key(name);
        self.store.remove(name);
        self.deleted_tags.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains_key(Self::normalize_key(name))
    }

    pub fn is_deleted(&self, name: &str) -> bool {
        self.deleted_tags.contains(Self::normalize_key(name))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.store.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
