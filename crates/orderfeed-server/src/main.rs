mod api;
mod middleware;

use std::sync::Arc;

use orderfeed_commerce::{CommerceClient, CommerceSettings};
use orderfeed_jobs::ReceiveRecentLineItemsJob;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = orderfeed_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = orderfeed_db::PoolConfig::from_app_config(&config);
    let pool = orderfeed_db::connect_pool(&config.database_url, pool_config).await?;
    orderfeed_db::run_migrations(&pool).await?;

    let settings = CommerceSettings::from_app_config(&config)?;
    let commerce = Arc::new(CommerceClient::new(&settings)?);
    let job = Arc::new(ReceiveRecentLineItemsJob::new(commerce, pool.clone()));

    let auth = AuthState::from_env(matches!(
        config.env,
        orderfeed_core::Environment::Development
    ))?;
    let app = build_app(AppState { pool, job }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "orderfeed-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
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
