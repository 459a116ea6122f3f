use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::{default_groups, CategoryGroup, OTHER_GROUP};
use crate::configurator::RingShape;
use crate::facets::FacetDefaults;
use crate::filter::facet_key;
use crate::ConfigError;

/// Static site content that does not live in the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub default_locations: Vec<String>,
    #[serde(default)]
    pub default_categories: Vec<String>,
    #[serde(default = "default_groups")]
    pub category_groups: Vec<CategoryGroup>,
    pub rings: Vec<RingShape>,
}

impl SiteConfig {
    #[must_use]
    pub fn facet_defaults(&self) -> FacetDefaults {
        FacetDefaults {
            locations: self.default_locations.clone(),
            categories: self.default_categories.clone(),
        }
    }

    #[must_use]
    pub fn ring(&self, id: &str) -> Option<&RingShape> {
        self.rings.iter().find(|r| r.id.eq_ignore_ascii_case(id))
    }
}

/// Load and validate the site configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_site_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SiteFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_site_config(&content)
}

/// Parse and validate site configuration YAML.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML does not parse or fails validation.
pub fn parse_site_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let site: SiteConfig = serde_yaml::from_str(content)?;
    validate_site(&site)?;
    Ok(site)
}

fn validate_site(site: &SiteConfig) -> Result<(), ConfigError> {
    if site.rings.is_empty() {
        return Err(ConfigError::Validation(
            "at least one ring setting must be configured".to_string(),
        ));
    }

    let mut seen_rings = HashSet::new();
    for ring in &site.rings {
        if ring.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "ring id must be non-empty".to_string(),
            ));
        }
        if ring.label.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "ring '{}' has an empty label",
                ring.id
            )));
        }
        if !seen_rings.insert(ring.id.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate ring id: '{}'",
                ring.id
            )));
        }
    }

    let mut seen_slugs = HashSet::new();
    let mut alias_owner: HashMap<String, &str> = HashMap::new();
    for group in &site.category_groups {
        if group.slug.trim().is_empty() || group.slug.eq_ignore_ascii_case(OTHER_GROUP) {
            return Err(ConfigError::Validation(format!(
                "invalid category group slug: '{}'",
                group.slug
            )));
        }
        if !seen_slugs.insert(group.slug.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category group: '{}'",
                group.slug
            )));
        }
        for value in group.query_values() {
            if let Some(owner) = alias_owner.insert(facet_key(&value), &group.slug) {
                if owner != group.slug {
                    return Err(ConfigError::Validation(format!(
                        "category '{value}' is listed under both '{owner}' and '{}'",
                        group.slug
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configurator::Metal;

    const SITE_YAML: &str = r"
default_locations: [Sri Lanka, Madagascar]
default_categories: [Sapphire, Ruby]
rings:
  - id: oval
    label: Oval
    images:
      yellow-gold: rings/oval-yellow.png
      white-gold: rings/oval-white.png
  - id: halo
    label: Halo
    description: Centre stone framed by pavé
";

    #[test]
    fn parses_rings_and_defaults() {
        let site = parse_site_config(SITE_YAML).expect("valid site config");
        assert_eq!(site.rings.len(), 2);
        assert_eq!(site.default_locations, vec!["Sri Lanka", "Madagascar"]);
        let oval = site.ring("OVAL").expect("oval ring");
        assert_eq!(oval.image_for(Metal::YellowGold), Some("rings/oval-yellow.png"));
        assert_eq!(oval.image_for(Metal::SilverPlatinum), None);
        assert_eq!(site.facet_defaults().categories, vec!["Sapphire", "Ruby"]);
    }

    #[test]
    fn missing_category_groups_fall_back_to_defaults() {
        let site = parse_site_config(SITE_YAML).expect("valid site config");
        assert_eq!(site.category_groups, default_groups());
    }

    #[test]
    fn rejects_empty_rings() {
        let result = parse_site_config("rings: []");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_duplicate_ring_ids() {
        let yaml = "rings:\n  - {id: oval, label: Oval}\n  - {id: Oval, label: Oval 2}\n";
        let result = parse_site_config(yaml);
        assert!(
            matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("duplicate ring id")),
            "got: {result:?}"
        );
    }

    #[test]
    fn rejects_blank_ring_label() {
        let yaml = "rings:\n  - {id: oval, label: '  '}\n";
        assert!(matches!(
            parse_site_config(yaml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_alias_listed_under_two_groups() {
        let yaml = r"
rings: [{id: oval, label: Oval}]
category_groups:
  - {slug: sapphire, label: Sapphire, aliases: [Padparadscha]}
  - {slug: padparadscha, label: Padparadscha}
";
        let result = parse_site_config(yaml);
        assert!(
            matches!(result, Err(ConfigError::Validation(ref m)) if m.contains("listed under both")),
            "got: {result:?}"
        );
    }

    #[test]
    fn rejects_other_as_group_slug() {
        let yaml = "rings: [{id: oval, label: Oval}]\ncategory_groups: [{slug: other, label: Other}]\n";
        assert!(matches!(
            parse_site_config(yaml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn unknown_metal_key_is_a_parse_error() {
        let yaml = "rings:\n  - id: oval\n    label: Oval\n    images: {rose-gold: x.png}\n";
        assert!(matches!(
            parse_site_config(yaml),
            Err(ConfigError::SiteFileParse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = load_site_config(Path::new("/nonexistent/site.yaml"));
        assert!(matches!(result, Err(ConfigError::SiteFileIo { .. })));
    }

    #[test]
    fn shipped_site_config_is_valid() {
        let site = parse_site_config(include_str!("../../../config/site.yaml"))
            .expect("config/site.yaml should parse and validate");
        assert!(site.ring("solitaire").is_some());
        assert_eq!(site.category_groups.len(), 4);
        assert!(site
            .rings
            .iter()
            .all(|ring| ring.images.len() == crate::Metal::ALL.len()));
    }
}
