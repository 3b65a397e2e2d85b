//! Column-value assignments produced by expansion

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One concrete assignment of values to columns.
///
/// Keys are unique. Insertion order is kept so tables render
/// deterministically, but equality ignores it.
#[derive(Debug, Clone, Default)]
pub struct Combo {
    entries: Vec<(String, String)>,
}

impl Combo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combo holding a single assignment
    pub fn single(column: &str, value: &str) -> Self {
        Self {
            entries: vec![(column.to_string(), value.to_string())],
        }
    }

    /// Build from pairs; a repeated key keeps its first position and the last value
    pub fn from_pairs<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Self {
        let mut combo = Self::new();
        for (k, v) in pairs {
            combo.insert(k.as_ref(), v.as_ref());
        }
        combo
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == column)
    }

    /// Set a value, replacing in place when the column already exists
    pub fn insert(&mut self, column: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == column) {
            Some((_, v)) => *v = value.to_string(),
            None => self.entries.push((column.to_string(), value.to_string())),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge two combos, or `None` when a shared column has different values
    pub fn merge(&self, other: &Combo) -> Option<Combo> {
        let mut merged = self.clone();
        for (k, v) in &other.entries {
            match merged.get(k) {
                Some(existing) if existing != v => return None,
                Some(_) => {}
                None => merged.entries.push((k.clone(), v.clone())),
            }
        }
        Some(merged)
    }
}

impl PartialEq for Combo {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Combo {}

impl FromIterator<(String, String)> for Combo {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut combo = Combo::new();
        for (k, v) in iter {
            combo.insert(&k, &v);
        }
        combo
    }
}

impl Serialize for Combo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
