use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::services::coordinator::{Coordinator, RefreshError, RefreshOutcome};

pub async fn start_scheduler(
    coordinator: Arc<Coordinator>,
    interval: Duration,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let coordinator_clone = Arc::clone(&coordinator);

    scheduler
        .add(Job::new_repeated_async(interval, move |_uuid, _l| {
            let coordinator = Arc::clone(&coordinator_clone);
            Box::pin(async move {
                run_refresh(&coordinator).await;
            })
        })?)
        .await?;

    scheduler.start().await?;
    tracing::info!(interval_secs = interval.as_secs(), "scheduler.started");
    Ok(scheduler)
}

pub async fn run_refresh(coordinator: &Coordinator) {
    if coordinator.status().auth_failed {
        tracing::debug!("scheduler.tick_skipped_auth_required");
        return;
    }

    match coordinator.refresh().await {
        Ok(RefreshOutcome::Published(snapshot)) => {
            tracing::debug!(workout_count = snapshot.workout_count, "scheduler.tick_published")
        }
        Ok(RefreshOutcome::Skipped) => tracing::debug!("scheduler.tick_overlapped"),
        Err(RefreshError::Cancelled) => {}
        Err(e) => tracing::debug!(error = %e, "scheduler.tick_failed"),
    }
}

pub async fn first_refresh(coordinator: &Coordinator) -> anyhow::Result<()> {
    match coordinator.refresh().await {
        Err(e) if e.is_authentication_required() => Err(e.into()),
        Err(e) => {
            tracing::warn!(error = %e, "scheduler.first_refresh_failed");
            Ok(())
        }
        Ok(_) => Ok(()),
    }
}
