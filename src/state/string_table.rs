//! String tables owned by a single state table.

use std::collections::{BTreeMap, HashMap};

use crate::frames::StringTableEntry;

/// Named string tables, each mapping slot index to text.
#[derive(Debug, Clone, Default)]
pub struct StringTables {
    tables: HashMap<String, BTreeMap<u16, String>>,
}

impl StringTables {
    /// Creates an empty set of tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `entries` into `table`, replacing slots that already exist.
    pub fn update(&mut self, table: &str, entries: &[StringTableEntry]) {
        let slots = self.tables.entry(table.to_owned()).or_default();
        for entry in entries {
            slots.insert(entry.index, entry.text.clone());
        }
    }

    /// Looks up a single slot.
    #[must_use]
    pub fn get(&self, table: &str, index: u16) -> Option<&str> {
        self.tables.get(table)?.get(&index).map(String::as_str)
    }

    /// Iterates the slots of `table` in index order.
    pub fn entries(&self, table: &str) -> impl Iterator<Item = (u16, &str)> {
        self.tables
            .get(table)
            .into_iter()
            .flat_map(|slots| slots.iter().map(|(i, s)| (*i, s.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: u16, text: &str) -> StringTableEntry {
        StringTableEntry {
            index,
            text: text.to_owned(),
        }
    }

    #[test]
    fn test_update_and_lookup() {
        let mut tables = StringTables::new();
        tables.update("propnames", &[entry(0, "health"), entry(2, "class")]);
        tables.update("propnames", &[entry(0, "max_health")]);

        assert_eq!(tables.get("propnames", 0), Some("max_health"));
        assert_eq!(tables.get("propnames", 2), Some("class"));
        assert_eq!(tables.get("propnames", 1), None);
        assert_eq!(tables.get("userinfo", 0), None);

        let all: Vec<_> = tables.entries("propnames").collect();
        assert_eq!(all, vec![(0, "max_health"), (2, "class")]);
        assert_eq!(tables.entries("missing").count(), 0);
    }
}
