//! Catalog filter state and the visibility predicate.
//!
//! Facet values keep the casing the user clicked on; every comparison goes
//! through [`facet_key`] so display values are never rewritten.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::stone::StoneRecord;

/// Upper bound of the minimum-carat slider.
pub const MAX_MIN_CARAT: u8 = 8;

/// Normalized comparison key for a facet value.
#[must_use]
pub fn facet_key(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Filter selections for one catalog page view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub selected_locations: BTreeSet<String>,
    #[serde(default)]
    pub selected_categories: BTreeSet<String>,
    /// `0` means no minimum. Always within `0..=MAX_MIN_CARAT`.
    #[serde(default, deserialize_with = "deserialize_min_carat")]
    min_carat: u8,
}

fn deserialize_min_carat<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = u8::deserialize(deserializer)?;
    Ok(raw.min(MAX_MIN_CARAT))
}

/// User interactions with the filter sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterAction {
    ToggleLocation(String),
    ToggleCategory(String),
    SetMinCarat(u8),
    ClearLocations,
    ClearCategories,
    Reset,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn min_carat(&self) -> u8 {
        self.min_carat
    }

    /// Sets the minimum carat, clamping to [`MAX_MIN_CARAT`].
    pub fn set_min_carat(&mut self, value: u8) {
        self.min_carat = value.min(MAX_MIN_CARAT);
    }

    #[must_use]
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_locations
            .extend(locations.into_iter().map(Into::into).filter(|s| !s.trim().is_empty()));
        self
    }

    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_categories
            .extend(categories.into_iter().map(Into::into).filter(|s| !s.trim().is_empty()));
        self
    }

    #[must_use]
    pub fn with_min_carat(mut self, value: u8) -> Self {
        self.set_min_carat(value);
        self
    }

    /// Returns `true` when no constraint is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_locations.is_empty()
            && self.selected_categories.is_empty()
            && self.min_carat == 0
    }

    /// Number of active constraints, shown as a badge on the filter toggle.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.selected_locations.len()
            + self.selected_categories.len()
            + usize::from(self.min_carat > 0)
    }

    /// Applies one sidebar interaction and returns the next state.
    #[must_use]
    pub fn apply(mut self, action: FilterAction) -> Self {
        match action {
            FilterAction::ToggleLocation(value) => {
                toggle_value(&mut self.selected_locations, value);
            }
            FilterAction::ToggleCategory(value) => {
                toggle_value(&mut self.selected_categories, value);
            }
            FilterAction::SetMinCarat(value) => self.set_min_carat(value),
            FilterAction::ClearLocations => self.selected_locations.clear(),
            FilterAction::ClearCategories => self.selected_categories.clear(),
            FilterAction::Reset => self = Self::default(),
        }
        self
    }
}

/// Toggles a facet value. A value already selected under a different casing
/// counts as selected and is removed.
fn toggle_value(set: &mut BTreeSet<String>, value: String) {
    if value.trim().is_empty() {
        return;
    }
    let key = facet_key(&value);
    let before = set.len();
    set.retain(|existing| facet_key(existing) != key);
    if set.len() == before {
        set.insert(value);
    }
}

fn facet_matches(selected: &BTreeSet<String>, value: Option<&str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return false;
    };
    let key = facet_key(value);
    selected.iter().any(|s| facet_key(s) == key)
}

/// Decides whether `stone` is visible under `state`.
///
/// Dimensions are AND-ed; values within one dimension are OR-ed.
#[must_use]
pub fn matches(stone: &StoneRecord, state: &FilterState) -> bool {
    if !facet_matches(&state.selected_locations, stone.origin.as_deref()) {
        return false;
    }
    if !facet_matches(&state.selected_categories, stone.category.as_deref()) {
        return false;
    }
    if state.min_carat > 0 {
        return stone
            .carat
            .is_some_and(|carat| carat >= f64::from(state.min_carat));
    }
    true
}

/// Returns the visible stones, preserving input order.
#[must_use]
pub fn apply_filter<'a>(stones: &'a [StoneRecord], state: &FilterState) -> Vec<&'a StoneRecord> {
    stones.iter().filter(|s| matches(s, state)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone(id: &str, origin: Option<&str>, category: Option<&str>, carat: Option<f64>) -> StoneRecord {
        let mut s = StoneRecord::new(id, format!("Stone {id}"));
        s.origin = origin.map(str::to_string);
        s.category = category.map(str::to_string);
        s.carat = carat;
        s
    }

    fn catalog() -> Vec<StoneRecord> {
        vec![
            stone("a", Some("Sri Lanka"), Some("Sapphire"), Some(2.0)),
            stone("b", Some("USA"), Some("Ruby"), Some(5.0)),
            stone("c", Some("sri lanka"), Some("Spinel"), Some(3.5)),
            stone("d", None, Some("Sapphire"), None),
            stone("e", Some("Madagascar"), None, Some(8.0)),
        ]
    }

    fn ids(stones: &[&StoneRecord]) -> Vec<String> {
        stones.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn empty_state_matches_everything() {
        let state = FilterState::new();
        assert!(state.is_empty());
        for s in catalog() {
            assert!(matches(&s, &state), "stone {} should be visible", s.id);
        }
    }

    #[test]
    fn location_filter_is_case_insensitive() {
        let stones = catalog();
        let state = FilterState::new().with_locations(["SRI LANKA"]);
        assert_eq!(ids(&apply_filter(&stones, &state)), vec!["a", "c"]);
    }

    #[test]
    fn missing_origin_never_matches_location_filter() {
        let s = stone("x", None, Some("Sapphire"), Some(1.0));
        let state = FilterState::new().with_locations(["Sri Lanka"]);
        assert!(!matches(&s, &state));

        let blank = stone("y", Some("  "), Some("Sapphire"), Some(1.0));
        assert!(!matches(&blank, &state));
    }

    #[test]
    fn missing_category_never_matches_category_filter() {
        let stones = catalog();
        let state = FilterState::new().with_categories(["sapphire", "ruby"]);
        assert_eq!(ids(&apply_filter(&stones, &state)), vec!["a", "b", "d"]);
    }

    #[test]
    fn dimensions_are_anded() {
        let stones = catalog();
        let state = FilterState::new()
            .with_locations(["Sri Lanka"])
            .with_categories(["Spinel"]);
        assert_eq!(ids(&apply_filter(&stones, &state)), vec!["c"]);
    }

    #[test]
    fn min_carat_boundary() {
        let state = FilterState::new().with_min_carat(3);
        assert!(matches(&stone("eq", None, None, Some(3.0)), &state));
        assert!(!matches(&stone("lt", None, None, Some(2.99)), &state));
        assert!(!matches(&stone("none", None, None, None), &state));
    }

    #[test]
    fn min_carat_zero_and_eight_are_valid() {
        let s = stone("e", None, None, Some(8.0));
        assert!(matches(&s, &FilterState::new().with_min_carat(0)));
        assert!(matches(&s, &FilterState::new().with_min_carat(8)));
        assert!(matches(&stone("n", None, None, None), &FilterState::new().with_min_carat(0)));
    }

    #[test]
    fn min_carat_is_clamped() {
        let state = FilterState::new().with_min_carat(20);
        assert_eq!(state.min_carat(), MAX_MIN_CARAT);
    }

    #[test]
    fn filter_preserves_order_and_is_idempotent() {
        let stones = catalog();
        let state = FilterState::new().with_min_carat(2);
        let once = apply_filter(&stones, &state);
        assert_eq!(ids(&once), vec!["a", "b", "c", "e"]);

        let owned: Vec<StoneRecord> = once.into_iter().cloned().collect();
        let twice = apply_filter(&owned, &state);
        assert_eq!(ids(&twice), vec!["a", "b", "c", "e"]);
    }

    #[test]
    fn adding_constraints_never_grows_result() {
        let stones = catalog();
        let base = FilterState::new();
        let with_location = base.clone().with_locations(["Sri Lanka"]);
        let with_category = with_location.clone().with_categories(["Sapphire"]);
        let with_carat = with_category.clone().with_min_carat(1);

        let sizes: Vec<usize> = [&base, &with_location, &with_category, &with_carat]
            .iter()
            .map(|state| apply_filter(&stones, state).len())
            .collect();
        assert!(sizes.windows(2).all(|w| w[1] <= w[0]), "sizes: {sizes:?}");
    }

    #[test]
    fn end_to_end_location_then_carat() {
        let stones = vec![
            stone("first", Some("Sri Lanka"), Some("Sapphire"), Some(2.0)),
            stone("second", Some("USA"), Some("Ruby"), Some(5.0)),
        ];
        let state = FilterState::new().apply(FilterAction::ToggleLocation("Sri Lanka".into()));
        assert_eq!(ids(&apply_filter(&stones, &state)), vec!["first"]);

        let state = state.apply(FilterAction::SetMinCarat(3));
        assert!(apply_filter(&stones, &state).is_empty());
    }

    #[test]
    fn toggle_removes_value_selected_under_other_casing() {
        let state = FilterState::new()
            .apply(FilterAction::ToggleCategory("Sapphire".into()))
            .apply(FilterAction::ToggleCategory("SAPPHIRE".into()));
        assert!(state.selected_categories.is_empty());
    }

    #[test]
    fn toggle_keeps_display_casing() {
        let state = FilterState::new().apply(FilterAction::ToggleLocation("Sri Lanka".into()));
        assert!(state.selected_locations.contains("Sri Lanka"));
    }

    #[test]
    fn reset_and_clear_actions() {
        let state = FilterState::new()
            .with_locations(["USA"])
            .with_categories(["Ruby"])
            .with_min_carat(4);
        assert_eq!(state.active_count(), 3);

        let cleared = state.clone().apply(FilterAction::ClearLocations);
        assert!(cleared.selected_locations.is_empty());
        assert_eq!(cleared.selected_categories.len(), 1);

        let cleared = cleared.apply(FilterAction::ClearCategories);
        assert!(cleared.selected_categories.is_empty());
        assert_eq!(cleared.min_carat(), 4);

        assert!(state.apply(FilterAction::Reset).is_empty());
    }

    #[test]
    fn blank_toggle_is_ignored() {
        let state = FilterState::new().apply(FilterAction::ToggleLocation("   ".into()));
        assert!(state.is_empty());
    }

    #[test]
    fn deserialized_min_carat_is_clamped() {
        let state: FilterState = serde_json::from_str(r#"{"min_carat":12}"#).expect("parse");
        assert_eq!(state.min_carat(), MAX_MIN_CARAT);
    }

    #[test]
    fn action_serde_shape() {
        let action: FilterAction =
            serde_json::from_str(r#"{"type":"set_min_carat","value":3}"#).expect("parse");
        assert_eq!(action, FilterAction::SetMinCarat(3));
        let reset: FilterAction = serde_json::from_str(r#"{"type":"reset"}"#).expect("parse");
        assert_eq!(reset, FilterAction::Reset);
    }
}
