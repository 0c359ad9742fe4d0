//! Output column set that only ever grows, in first-seen order.

use std::collections::HashSet;

/// Running superset of output columns: the input header followed by every
/// new key in the order it was first seen. Append-only.
#[derive(Debug, Clone)]
pub struct SchemaAccumulator {
    base_columns: Vec<String>,
    extra_columns: Vec<String>,
    seen: HashSet<String>,
}

impl SchemaAccumulator {
    pub fn new(base_columns: Vec<String>) -> Self {
        let seen = base_columns.iter().cloned().collect();
        Self {
            base_columns,
            extra_columns: Vec::new(),
            seen,
        }
    }

    /// Appends keys not seen before, preserving their order. Returns how many
    /// were new.
    pub fn observe<I, S>(&mut self, keys: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0usize;
        for key in keys {
            let key = key.as_ref();
            if !self.seen.contains(key) {
                self.seen.insert(key.to_string());
                self.extra_columns.push(key.to_string());
                added += 1;
            }
        }
        added
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn base_columns(&self) -> &[String] {
        &self.base_columns
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Final layout, `base ++ extra`.
    pub fn into_columns(self) -> Vec<String> {
        let mut columns = self.base_columns;
        columns.extend(self.extra_columns);
        columns
    }
}
