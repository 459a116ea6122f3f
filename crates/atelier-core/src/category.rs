//! Category groups used by the per-family catalog pages.
//!
//! Editors type categories freely, so each primary family lists the spellings
//! seen upstream. Anything outside every alias list lands in the "other"
//! page. A new spelling that nobody adds here is silently treated as other.

use serde::{Deserialize, Serialize};

use crate::filter::facet_key;

/// Slug of the catch-all page.
pub const OTHER_GROUP: &str = "other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    /// URL slug, e.g. `"sapphire"`.
    pub slug: String,
    pub label: String,
    /// Category spellings that belong to this family, compared
    /// case-insensitively.
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CategoryGroup {
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        let key = facet_key(category);
        facet_key(&self.label) == key || self.aliases.iter().any(|a| facet_key(a) == key)
    }

    /// Label plus aliases, the value list sent to the catalog query.
    #[must_use]
    pub fn query_values(&self) -> Vec<String> {
        let mut values = Vec::with_capacity(self.aliases.len() + 1);
        values.push(self.label.clone());
        for alias in &self.aliases {
            if !values.iter().any(|v| v == alias) {
                values.push(alias.clone());
            }
        }
        values
    }
}

/// Built-in families used when the site config does not list any.
#[must_use]
pub fn default_groups() -> Vec<CategoryGroup> {
    let group = |slug: &str, label: &str, aliases: &[&str]| CategoryGroup {
        slug: slug.to_string(),
        label: label.to_string(),
        aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
    };
    vec![
        group(
            "sapphire",
            "Sapphire",
            &["Sapphires", "Blue Sapphire", "Pink Sapphire", "Yellow Sapphire", "Padparadscha"],
        ),
        group("ruby", "Ruby", &["Rubies", "Star Ruby"]),
        group("spinel", "Spinel", &["Spinels"]),
        group("emerald", "Emerald", &["Emeralds"]),
    ]
}

#[must_use]
pub fn find_group<'a>(groups: &'a [CategoryGroup], slug: &str) -> Option<&'a CategoryGroup> {
    groups.iter().find(|g| g.slug.eq_ignore_ascii_case(slug))
}

/// Family a category belongs to, if any.
#[must_use]
pub fn group_for<'a>(groups: &'a [CategoryGroup], category: &str) -> Option<&'a CategoryGroup> {
    groups.iter().find(|g| g.contains(category))
}

/// `true` when `category` is outside every primary family.
#[must_use]
pub fn is_other(groups: &[CategoryGroup], category: &str) -> bool {
    group_for(groups, category).is_none()
}

/// Every primary alias, for the "other" page's exclusion query.
#[must_use]
pub fn primary_values(groups: &[CategoryGroup]) -> Vec<String> {
    groups.iter().flat_map(CategoryGroup::query_values).collect()
}
