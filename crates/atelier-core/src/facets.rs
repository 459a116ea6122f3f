//! Sidebar facets: the selectable values per dimension and their counters.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::stone::StoneRecord;

/// Baseline facet values that are always offered, even when no stone in the
/// current catalog carries them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetDefaults {
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facets {
    pub locations: Vec<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCounts {
    pub locations: BTreeMap<String, usize>,
    pub categories: BTreeMap<String, usize>,
}

impl FacetCounts {
    /// Count for an exact location value; `0` when nothing carries it.
    #[must_use]
    pub fn location(&self, value: &str) -> usize {
        self.locations.get(value).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn category(&self, value: &str) -> usize {
        self.categories.get(value).copied().unwrap_or(0)
    }
}

/// Case-insensitive ordering. Values differing only in case put the
/// lowercase form first, as browser `localeCompare` does, which keeps the
/// order total and repeatable.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn merge_sorted<'a, I>(defaults: &'a [String], observed: I) -> Vec<String>
where
    I: Iterator<Item = Option<&'a str>>,
{
    let unique: BTreeSet<&str> = defaults
        .iter()
        .map(String::as_str)
        .chain(observed.flatten())
        .filter(|v| !v.trim().is_empty())
        .collect();

    let mut values: Vec<String> = unique.into_iter().map(str::to_string).collect();
    values.sort_by(|a, b| locale_cmp(a, b));
    values
}

/// Derives the selectable locations and categories.
///
/// Each dimension is the union of the baseline values and the values present
/// on `stones`, deduplicated by exact string and sorted case-insensitively.
#[must_use]
pub fn derive_facets(stones: &[StoneRecord], defaults: &FacetDefaults) -> Facets {
    Facets {
        locations: merge_sorted(
            &defaults.locations,
            stones.iter().map(|s| s.origin.as_deref()),
        ),
        categories: merge_sorted(
            &defaults.categories,
            stones.iter().map(|s| s.category.as_deref()),
        ),
    }
}

/// Counts stones per exact origin and category value.
#[must_use]
pub fn count_facets(stones: &[StoneRecord]) -> FacetCounts {
    let mut counts = FacetCounts::default();
    for stone in stones {
        if let Some(origin) = stone.origin.as_deref().filter(|v| !v.trim().is_empty()) {
            *counts.locations.entry(origin.to_string()).or_insert(0) += 1;
        }
        if let Some(category) = stone.category.as_deref().filter(|v| !v.trim().is_empty()) {
            *counts.categories.entry(category.to_string()).or_insert(0) += 1;
        }
    }
    counts
}
