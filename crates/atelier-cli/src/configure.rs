//! Runs the ring configurator end to end from the command line.

use atelier_core::{Configurator, Metal, StoneChoice};

use crate::Context;

/// Selects `stone`, `ring` and `metal` in order and prints the summary
/// message with its WhatsApp link.
///
/// # Errors
///
/// Returns an error if the stone is not available, the ring id is unknown, or
/// the catalog fetch fails.
pub(crate) async fn run_configure(
    ctx: &Context,
    stone_key: &str,
    ring_id: &str,
    metal: Metal,
) -> anyhow::Result<()> {
    let stone = ctx
        .cms
        .fetch_stone(stone_key)
        .await?
        .filter(|stone| stone.available)
        .ok_or_else(|| anyhow::anyhow!("stone '{stone_key}' is not available"))?;
    let ring = ctx
        .site
        .ring(ring_id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("ring setting '{ring_id}' not found in site config"))?;

    let wizard = Configurator::new()
        .select_stone(StoneChoice::from(&stone))
        .select_ring(ring)
        .select_metal(metal);

    let summary = wizard
        .summary_message()
        .ok_or_else(|| anyhow::anyhow!("configurator did not reach the enquiry step"))?;
    println!("{summary}\n");
    if let Some(url) = wizard.whatsapp_url(&ctx.config.whatsapp_number) {
        println!("{url}");
    }

    Ok(())
}
