/*
 * Responsibility
 * - tracing / panic hook setup
 * - Config -> services -> Router
 * - axum::serve()
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::assertion::ClientAssertionGenerator;
use crate::services::oauth2::{PdndOAuth2Service, TokenClient};
use crate::state::AppState;
use crate::{api, middleware};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,pdnd_client_assertion=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr can be hidden depending on how the process is launched.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting client assertion API in {:?} mode on {} (token endpoint {})",
        config.app_env,
        config.addr,
        config.signing.server_url
    );

    let state = build_state(&config)?;
    // Leave headroom for signing on top of the upstream deadline.
    let http_timeout = config
        .request_timeout
        .map(|t| t + Duration::from_secs(5))
        .unwrap_or(DEFAULT_HTTP_TIMEOUT);
    let app = build_router(state, http_timeout);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    let mut client = TokenClient::new(config.signing.server_url.clone())?;
    if let Some(timeout) = config.request_timeout {
        client = client.with_timeout(timeout);
    }

    let generator = ClientAssertionGenerator::new(config.signing.clone());
    let oauth2 = Arc::new(PdndOAuth2Service::new(generator, client));

    Ok(AppState::new(oauth2))
}

pub fn build_router(state: AppState, timeout: Duration) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes())
        .with_state(state);

    middleware::http::apply(router, timeout)
}
