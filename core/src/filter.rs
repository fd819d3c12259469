//! Category and search filtering over the published menu.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::models::MenuItem;

/// UI selection state: lower-cased categories plus a search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFilter {
    categories: BTreeSet<String>,
    search: String,
}

impl MenuFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.categories.insert(category.to_lowercase());
        self
    }

    #[must_use]
    pub fn with_categories<'a>(self, categories: impl IntoIterator<Item = &'a str>) -> Self {
        categories
            .into_iter()
            .fold(self, |f, c| f.with_category(c))
    }

    /// Select the category if unselected, otherwise unselect it.
    #[must_use]
    pub fn toggle_category(mut self, category: &str) -> Self {
        let key = category.to_lowercase();
        if !self.categories.remove(&key) {
            self.categories.insert(key);
        }
        self
    }

    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    #[must_use]
    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// The search term with surrounding whitespace removed.
    #[must_use]
    pub fn search(&self) -> &str {
        self.search.trim()
    }

    #[must_use]
    pub fn has_search(&self) -> bool {
        !self.search().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    Matches { items: Vec<MenuItem> },
    NoResults { message: String },
}

impl SearchOutcome {
    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        match self {
            Self::Matches { items } => items,
            Self::NoResults { .. } => &[],
        }
    }

    #[must_use]
    pub fn is_no_results(&self) -> bool {
        matches!(self, Self::NoResults { .. })
    }
}

/// Keep items whose lower-cased category is selected. An empty selection
/// keeps everything.
#[must_use]
pub fn filter_by_category(items: Vec<MenuItem>, categories: &BTreeSet<String>) -> Vec<MenuItem> {
    if categories.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| categories.contains(&item.category_key()))
        .collect()
}

/// Apply the category selection to `candidates` (already narrowed by search
/// when a term is set) and wrap the result.
#[must_use]
pub fn apply_filter(candidates: Vec<MenuItem>, filter: &MenuFilter) -> SearchOutcome {
    let items = filter_by_category(candidates, filter.categories());
    if items.is_empty() {
        SearchOutcome::NoResults {
            message: no_results_message(filter),
        }
    } else {
        SearchOutcome::Matches { items }
    }
}

#[must_use]
pub fn no_results_message(filter: &MenuFilter) -> String {
    let cats = filter
        .categories()
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match (filter.has_search(), cats.is_empty()) {
        (true, true) => format!("No menu items match \"{}\"", filter.search()),
        (true, false) => format!(
            "No menu items match \"{}\" in {cats}",
            filter.search()
        ),
        (false, false) => format!("No menu items in {cats}"),
        (false, true) => "The menu is empty".to_string(),
    }
}

/// Distinct lower-cased categories, in first-seen order. Blank categories
/// are skipped.
#[must_use]
pub fn categories(items: &[MenuItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(MenuItem::category_key)
        .filter(|c| !c.trim().is_empty())
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
