//! Read-only catalog commands.

use atelier_core::{apply_filter, count_facets, derive_facets, FilterState, StoneRecord};

use crate::Context;

async fn load_page(ctx: &Context, group: Option<&str>) -> anyhow::Result<Vec<StoneRecord>> {
    ctx.cms
        .fetch_catalog_page(&ctx.site.category_groups, group)
        .await?
        .ok_or_else(|| anyhow::anyhow!("unknown category group '{}'", group.unwrap_or_default()))
}

fn fmt_carat(carat: Option<f64>) -> String {
    carat.map_or_else(|| "-".to_string(), |c| format!("{c} ct"))
}

/// Prints stones matching the sidebar filter.
///
/// # Errors
///
/// Returns an error if the group is unknown or the catalog fetch fails.
pub(crate) async fn run_stones(
    ctx: &Context,
    locations: Vec<String>,
    categories: Vec<String>,
    min_carat: u8,
    group: Option<&str>,
) -> anyhow::Result<()> {
    let stones = load_page(ctx, group).await?;
    let filter = FilterState::new()
        .with_locations(locations)
        .with_categories(categories)
        .with_min_carat(min_carat);
    let visible = apply_filter(&stones, &filter);

    if visible.is_empty() {
        println!(
            "no stones match ({} in catalog, {} active filters)",
            stones.len(),
            filter.active_count()
        );
        return Ok(());
    }

    println!(
        "{:<28}{:<32}{:<16}{:<18}{:<10}PRICE",
        "ID", "NAME", "CATEGORY", "ORIGIN", "CARAT"
    );
    for stone in &visible {
        println!(
            "{:<28}{:<32}{:<16}{:<18}{:<10}{}",
            stone.id,
            stone.name,
            stone.category.as_deref().unwrap_or("-"),
            stone.origin.as_deref().unwrap_or("-"),
            fmt_carat(stone.carat),
            stone.price_display()
        );
    }
    println!("\n{} of {} stones", visible.len(), stones.len());

    Ok(())
}

/// Prints every facet value with its count, defaults included.
///
/// # Errors
///
/// Returns an error if the catalog fetch fails.
pub(crate) async fn run_facets(ctx: &Context) -> anyhow::Result<()> {
    let stones = ctx.cms.fetch_available_stones().await?;
    let facets = derive_facets(&stones, &ctx.site.facet_defaults());
    let counts = count_facets(&stones);

    println!("LOCATIONS");
    for location in &facets.locations {
        println!("  {location:<30}{}", counts.location(location));
    }
    println!("CATEGORIES");
    for category in &facets.categories {
        println!("  {category:<30}{}", counts.category(category));
    }

    Ok(())
}

pub(crate) fn run_rings(ctx: &Context) {
    println!("{:<16}{:<28}METALS WITH PREVIEW", "ID", "LABEL");
    for ring in &ctx.site.rings {
        let metals: Vec<&str> = ring.images.keys().map(|m| m.slug()).collect();
        println!(
            "{:<16}{:<28}{}",
            ring.id,
            ring.label,
            if metals.is_empty() {
                "-".to_string()
            } else {
                metals.join(", ")
            }
        );
    }
}
