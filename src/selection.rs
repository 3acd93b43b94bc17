use serde::{Deserialize, Serialize};

use crate::endpoint::{Candidate, CandidateId};

/// Chosen candidates in the order they were picked, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(Vec<Candidate>);

impl SelectionSet {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends `candidate` unless one with the same id is already selected.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        if self.contains(candidate.id) {
            return false;
        }
        self.0.push(candidate);
        true
    }

    /// Removes the candidate with `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: CandidateId) -> Option<Candidate> {
        let index = self.0.iter().position(|c| c.id == id)?;
        Some(self.0.remove(index))
    }

    pub fn contains(&self, id: CandidateId) -> bool {
        self.0.iter().any(|c| c.id == id)
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.0.iter().any(|c| c.label == label)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.0.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = CandidateId> + '_ {
        self.0.iter().map(|c| c.id)
    }

    /// Ids in display order, joined with `separator`.
    pub fn joined_ids(&self, separator: char) -> String {
        let mut joined = String::new();
        for (i, id) in self.ids().enumerate() {
            if i > 0 {
                joined.push(separator);
            }
            joined.push_str(&id.to_string());
        }
        joined
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<Candidate> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        let mut selection = Self::new();
        for candidate in iter {
            selection.insert(candidate);
        }
        selection
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(selection: &SelectionSet) -> Vec<&str> {
        selection.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_insert_keeps_order_and_uniqueness() {
        let mut selection = SelectionSet::new();
        assert!(selection.insert(Candidate::new(3, "Gluten")));
        assert!(selection.insert(Candidate::new(1, "Lactose")));
        assert!(!selection.insert(Candidate::new(3, "Gluten (wheat)")));
        assert_eq!(labels(&selection), vec!["Gluten", "Lactose"]);
    }

    #[test]
    fn test_remove_by_id() {
        let mut selection: SelectionSet = [
            Candidate::new(1, "Lactose"),
            Candidate::new(2, "Peanut"),
            Candidate::new(3, "Shrimp"),
        ]
        .into_iter()
        .collect();

        let removed = selection.remove(CandidateId::new(2)).unwrap();
        assert_eq!(removed.label, "Peanut");
        assert_eq!(labels(&selection), vec!["Lactose", "Shrimp"]);
        assert!(selection.remove(CandidateId::new(2)).is_none());
    }

    #[test]
    fn test_from_iter_drops_duplicates() {
        let selection: SelectionSet = [Candidate::new(1, "Lactose"), Candidate::new(1, "Lactose")]
            .into_iter()
            .collect();
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_joined_ids() {
        let selection: SelectionSet = [Candidate::new(12, "Lactose"), Candidate::new(4, "Peanut")]
            .into_iter()
            .collect();
        assert_eq!(selection.joined_ids('&'), "12&4");
        assert_eq!(SelectionSet::new().joined_ids('&'), "");
    }

    #[test]
    fn test_contains_label() {
        let selection: SelectionSet = [Candidate::new(1, "Lactose")].into_iter().collect();
        assert!(selection.contains_label("Lactose"));
        assert!(!selection.contains_label("lactose"));
    }
}
