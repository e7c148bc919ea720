use std::time::Duration;

use anyhow::Context;
use orgdesk_infra::config::Config;
use tracing::{info, warn};

/// In-flight requests get this long to finish after Ctrl-C.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    orgdesk_observability::init();

    let config = Config::from_env().context("invalid configuration")?;

    let store = orgdesk_api::app::services::build_store(&config)
        .await
        .context("failed to open storage")?;
    orgdesk_api::app::services::migrate(&*store)
        .await
        .context("migrations failed")?;

    let app = orgdesk_api::app::build_app(store);

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.http_addr))?;
    info!("listening on {}", listener.local_addr()?);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("shutting down");
    let _ = stop_tx.send(());

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(joined) => joined.context("server task panicked")?.context("server error")?,
        Err(_) => warn!(grace = ?SHUTDOWN_GRACE, "in-flight requests did not finish; exiting"),
    }
    Ok(())
}
