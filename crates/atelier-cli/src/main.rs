mod catalog;
mod config_check;
mod configure;

use atelier_cms::{CmsClient, CmsSettings};
use atelier_core::{AppConfig, Metal, SiteConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "atelier-cli")]
#[command(about = "Atelier catalog and configurator operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List available stones, optionally filtered like the catalog sidebar
    Stones {
        /// Origin to include; repeat or comma-separate for several
        #[arg(long, value_delimiter = ',')]
        location: Vec<String>,

        /// Category to include; repeat or comma-separate for several
        #[arg(long, value_delimiter = ',')]
        category: Vec<String>,

        /// Minimum carat weight (whole carats, 0 disables)
        #[arg(long, default_value_t = 0)]
        min_carat: u8,

        /// Restrict to one category group page (`other` for the catch-all)
        #[arg(long)]
        group: Option<String>,
    },
    /// Show sidebar facet values with their counts
    Facets,
    /// List ring settings from the site config
    Rings,
    /// Walk the ring configurator and print the enquiry message
    Configure {
        /// Stone id or slug
        #[arg(long)]
        stone: String,

        /// Ring setting id
        #[arg(long)]
        ring: String,

        /// Metal slug or label
        #[arg(long, default_value = "silver-platinum")]
        metal: Metal,
    },
    /// Site configuration checks
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Validate the site config and list catalog categories that fall into "other"
    Check,
}

/// Config, site file and catalog client shared by every command.
pub(crate) struct Context {
    pub config: AppConfig,
    pub site: SiteConfig,
    pub cms: CmsClient,
}

impl Context {
    fn load() -> anyhow::Result<Self> {
        let config = atelier_core::load_app_config()?;
        let site = atelier_core::load_site_config(&config.site_config_path)?;
        let cms = CmsClient::new(&CmsSettings::from_app_config(&config))?;
        Ok(Self { config, site, cms })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("atelier-cli ready; run with --help to list commands");
        return Ok(());
    };

    let ctx = Context::load()?;
    match command {
        Commands::Stones {
            location,
            category,
            min_carat,
            group,
        } => {
            catalog::run_stones(&ctx, location, category, min_carat, group.as_deref()).await?;
        }
        Commands::Facets => catalog::run_facets(&ctx).await?,
        Commands::Rings => catalog::run_rings(&ctx),
        Commands::Configure { stone, ring, metal } => {
            configure::run_configure(&ctx, &stone, &ring, metal).await?;
        }
        Commands::Config {
            command: ConfigCommands::Check,
        } => config_check::run_config_check(&ctx).await?,
    }

    Ok(())
}
