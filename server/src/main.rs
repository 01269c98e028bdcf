use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cookbook_server::config::Config;
use cookbook_server::service::RecipeService;
use cookbook_server::store::SqliteRecipeStore;
use cookbook_server::{api, app, db, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Dump the OpenAPI spec and exit
    if config.openapi {
        let spec = api::openapi()
            .to_pretty_json()
            .context("Failed to serialize OpenAPI spec")?;
        println!("{}", spec);
        return Ok(());
    }

    let telemetry = telemetry::init_telemetry(&config);

    let pool = db::create_pool(&config.database_url, config.db_max_connections)
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let service = Arc::new(RecipeService::new(Arc::new(SqliteRecipeStore::new(pool))));

    let app = app(service, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", local_addr);
    tracing::info!(
        "OpenAPI spec available at http://{}/api-docs/openapi.json",
        local_addr
    );
    if config.track_db_query_count {
        tracing::info!("DB query counting enabled (X-DB-Query-Count header)");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
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
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
