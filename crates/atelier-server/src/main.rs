mod api;
mod middleware;

use std::sync::Arc;

use atelier_cms::{CmsClient, CmsSettings, ImageUrlBuilder};
use atelier_core::{MailRouting, UploadLimits};
use atelier_mail::MailClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = atelier_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let site = atelier_core::load_site_config(&config.site_config_path)?;
    tracing::info!(
        env = %config.env,
        rings = site.rings.len(),
        category_groups = site.category_groups.len(),
        "site config loaded"
    );

    let state = AppState {
        cms: CmsClient::new(&CmsSettings::from_app_config(&config))?,
        mail: MailClient::with_base_url(
            &config.mail_api_key,
            config.http_timeout_secs,
            &config.http_user_agent,
            &config.mail_api_base,
        )?,
        images: ImageUrlBuilder::new(
            &config.cms_cdn_base,
            &config.cms_project_id,
            &config.cms_dataset,
        ),
        site: Arc::new(site),
        routing: Arc::new(MailRouting {
            from: config.mail_from.clone(),
            to: config.mail_to.clone(),
        }),
        whatsapp_number: Arc::from(config.whatsapp_number.as_str()),
        upload_limits: UploadLimits {
            max_bytes: config.upload_max_bytes,
        },
    };
    let app = build_app(
        state,
        RateLimitState::per_minute(config.form_rate_limit_per_minute),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
