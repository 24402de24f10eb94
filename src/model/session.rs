use std::collections::HashMap;

use super::candidate::Candidate;
use super::catalog::Category;

/// Per-category search results and selections for the running session.
/// Only ever mutated from the UI thread.
#[derive(Debug, Default)]
pub struct SessionState {
    results: HashMap<Category, Vec<Candidate>>,
    selections: HashMap<Category, usize>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the result set for `category`. Any previous selection for that
    /// category is dropped since it referred to the old set.
    pub fn set_results(&mut self, category: Category, candidates: Vec<Candidate>) {
        self.selections.remove(&category);
        self.results.insert(category, candidates);
    }

    pub fn clear_results(&mut self, category: Category) {
        self.selections.remove(&category);
        self.results.remove(&category);
    }

    pub fn results(&self, category: Category) -> &[Candidate] {
        self.results
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Returns false (and changes nothing) when `index` is outside the current
    /// result set.
    pub fn select(&mut self, category: Category, index: usize) -> bool {
        if index >= self.results(category).len() {
            return false;
        }
        self.selections.insert(category, index);
        true
    }

    pub fn selection(&self, category: Category) -> Option<usize> {
        self.selections.get(&category).copied()
    }

    pub fn selected_candidate(&self, category: Category) -> Option<&Candidate> {
        let index = self.selection(category)?;
        self.results(category).get(index)
    }
}
