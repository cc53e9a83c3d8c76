use std::collections::HashMap;

use crate::model::{Id, ReferenceEntry};

/// `id → display label` lookup for one reference collection.
///
/// Tables are built whole from a fetch and replaced whole on the next one;
/// there is no in-place insert or remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    labels: HashMap<Id, String>,
}

impl ReferenceTable {
    /// Build a table from fetched records. Duplicate ids: the last one wins.
    pub fn build<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ReferenceEntry>,
    {
        let labels = entries
            .into_iter()
            .map(Into::into)
            .map(|entry: ReferenceEntry| (entry.id, entry.label))
            .collect();
        Self { labels }
    }

    pub fn get(&self, id: &Id) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Entries in a stable order (label, then id) for selection lists.
    pub fn options(&self) -> Vec<ReferenceEntry> {
        let mut options: Vec<ReferenceEntry> = self
            .labels
            .iter()
            .map(|(id, label)| ReferenceEntry::new(id.clone(), label.clone()))
            .collect();
        options.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, User};

    fn categories() -> Vec<Category> {
        vec![
            Category {
                id: Id::new("1"),
                name: "Tech".into(),
            },
            Category {
                id: Id::new("2"),
                name: "Science".into(),
            },
        ]
    }

    #[test]
    fn empty_input_builds_empty_table() {
        let table = ReferenceTable::build(Vec::<ReferenceEntry>::new());
        assert!(table.is_empty());
        assert_eq!(table.get(&Id::new("1")), None);
    }

    #[test]
    fn duplicate_ids_last_write_wins() {
        let table = ReferenceTable::build([
            ReferenceEntry::new(Id::new("1"), "Old"),
            ReferenceEntry::new(Id::new("2"), "Other"),
            ReferenceEntry::new(Id::new("1"), "New"),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&Id::new("1")), Some("New"));
    }

    #[test]
    fn build_is_deterministic() {
        assert_eq!(
            ReferenceTable::build(categories()),
            ReferenceTable::build(categories())
        );
    }

    #[test]
    fn users_map_username() {
        let table = ReferenceTable::build([User {
            id: Id::new("9"),
            username: "ada".into(),
        }]);
        assert_eq!(table.get(&Id::new("9")), Some("ada"));
    }

    #[test]
    fn options_sorted_by_label() {
        let table = ReferenceTable::build(categories());
        let labels: Vec<String> = table.options().into_iter().map(|e| e.label).collect();
        assert_eq!(labels, ["Science", "Tech"]);
    }
}
