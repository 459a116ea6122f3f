//! `config check`: site config sanity plus category drift report.

use std::collections::BTreeMap;

use atelier_core::category::is_other;

use crate::Context;

/// Categories in the catalog that match no primary group, with stone counts.
pub(crate) fn other_categories<'a>(
    groups: &[atelier_core::CategoryGroup],
    categories: impl IntoIterator<Item = &'a str>,
) -> BTreeMap<&'a str, usize> {
    let mut other = BTreeMap::new();
    for category in categories {
        if is_other(groups, category) {
            *other.entry(category).or_insert(0) += 1;
        }
    }
    other
}

/// Prints the loaded site config and lists catalog categories that land on
/// the "other" page. A spelling listed here that belongs to a primary family
/// needs adding to that group's aliases.
///
/// # Errors
///
/// Returns an error if the catalog fetch fails.
pub(crate) async fn run_config_check(ctx: &Context) -> anyhow::Result<()> {
    println!("site config: {}", ctx.config.site_config_path.display());
    println!("  rings: {}", ctx.site.rings.len());
    for group in &ctx.site.category_groups {
        println!(
            "  group {:<12}{} alias(es)",
            group.slug,
            group.query_values().len()
        );
    }

    let stones = ctx.cms.fetch_available_stones().await?;
    let other = other_categories(
        &ctx.site.category_groups,
        stones.iter().filter_map(|s| s.category.as_deref()),
    );

    if other.is_empty() {
        println!("every catalog category belongs to a primary group");
        return Ok(());
    }

    println!("categories shown under \"other\":");
    for (category, count) in &other {
        println!("  {category:<30}{count}");
    }
    tracing::warn!(
        count = other.len(),
        "catalog categories outside every primary group"
    );

    Ok(())
}
