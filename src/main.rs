use std::sync::Arc;

use crate::api::routes::{AppState, router};
use crate::clients::hevy::HevyClient;
use crate::config::Config;
use crate::services::coordinator::Coordinator;
use tokio::task::JoinHandle;

mod api;
mod clients;
mod config;
mod scheduler;
mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        name = %config.name,
        credentials = ?config.credentials,
        interval_secs = config.scan_interval.as_secs(),
        page_size = config.workouts_page_size,
        "config.loaded"
    );

    let hevy_client = HevyClient::new(&config)?;
    let coordinator = Arc::new(Coordinator::new(
        hevy_client,
        config.name.clone(),
        config.workouts_page_size,
    ));

    scheduler::first_refresh(&coordinator).await?;
    let mut job_scheduler =
        scheduler::start_scheduler(Arc::clone(&coordinator), config.scan_interval).await?;

    let app = router(AppState {
        coordinator: Arc::clone(&coordinator),
    });
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = %config.port, "server.listening");
    let mut server = tokio::spawn(async move { axum::serve(listener, app).await });

    let exit = wait_for_exit(&coordinator, &mut server).await;

    coordinator.shutdown();
    job_scheduler.shutdown().await?;
    server.abort();

    match exit {
        Exit::Interrupted => {}
        Exit::AuthenticationFailed => anyhow::bail!(
            "Hevy rejected the configured credentials; update HEVY_API_KEY or HEVY_AUTH_TOKEN and restart"
        ),
        Exit::ServerStopped => anyhow::bail!("HTTP server stopped unexpectedly"),
    }

    tracing::info!("shutdown.complete");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Exit {
    Interrupted,
    AuthenticationFailed,
    ServerStopped,
}

async fn wait_for_exit(
    coordinator: &Coordinator,
    server: &mut JoinHandle<std::io::Result<()>>,
) -> Exit {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown.requested");
            Exit::Interrupted
        }
        _ = coordinator.wait_for_auth_failure() => Exit::AuthenticationFailed,
        result = server => {
            match result {
                Ok(Ok(())) => tracing::error!("server.stopped"),
                Ok(Err(e)) => tracing::error!(error = %e, "server.failed"),
                Err(e) => tracing::error!(error = %e, "server.task_failed"),
            }
            Exit::ServerStopped
        }
    }
}
