use serde::{Deserialize, Serialize};

/// Module ids chosen by the user. Unique; keeps insertion order for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(Vec<String>);

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the id if absent, removes it otherwise. Returns whether the id is
    /// selected afterwards.
    pub fn toggle(&mut self, module_id: &str) -> bool {
        if let Some(pos) = self.0.iter().position(|id| id == module_id) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(module_id.to_string());
            true
        }
    }

    pub fn contains(&self, module_id: &str) -> bool {
        self.0.iter().any(|id| id == module_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    /// Drops ids not present in `known`.
    pub fn retain_known<'a>(&mut self, known: impl IntoIterator<Item = &'a str>) {
        let known: Vec<&str> = known.into_iter().collect();
        self.0.retain(|id| known.contains(&id.as_str()));
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SelectionSet::new();
        for id in iter {
            let id = id.into();
            if !set.contains(&id) {
                set.0.push(id);
            }
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = SelectionSet::new();
        assert!(selection.toggle("accueil-telephonique"));
        assert!(selection.contains("accueil-telephonique"));
        assert!(!selection.toggle("accueil-telephonique"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut selection = SelectionSet::new();
        selection.toggle("b");
        selection.toggle("a");
        selection.toggle("c");
        selection.toggle("a");
        assert_eq!(selection.ids(), &["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_from_iter_deduplicates() {
        let selection: SelectionSet = ["a", "b", "a"].into_iter().collect();
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_retain_known_drops_stale_ids() {
        let mut selection: SelectionSet = ["a", "gone", "b"].into_iter().collect();
        selection.retain_known(["a", "b", "c"]);
        assert_eq!(selection.ids(), &["a".to_string(), "b".to_string()]);
    }
}
