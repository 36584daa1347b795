use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;
use tokio::sync::{Mutex, watch};

use crate::clients::error::HevyApiError;
use crate::clients::hevy::HevyClient;
use crate::services::normalizer::{self, NormalizeError};
use crate::services::snapshot::Snapshot;

const FIRST_PAGE: u32 = 1;

#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    pub data: Option<Arc<Snapshot>>,
    pub last_update_success: bool,
    pub auth_failed: bool,
    pub last_error: Option<String>,
}

#[derive(Debug, Error)]
pub enum RefreshError {
    /// Credentials were rejected. Needs reconfiguration, not a retry.
    #[error("Authentication failed: {0}")]
    AuthenticationRequired(#[source] HevyApiError),

    #[error("Error communicating with API: {0}")]
    UpdateFailed(#[source] HevyApiError),

    #[error("Invalid workout data: {0}")]
    InvalidData(#[from] NormalizeError),

    #[error("Refresh cancelled by shutdown")]
    Cancelled,
}

impl RefreshError {
    pub fn is_authentication_required(&self) -> bool {
        matches!(self, Self::AuthenticationRequired(_))
    }
}

impl From<HevyApiError> for RefreshError {
    fn from(err: HevyApiError) -> Self {
        if err.is_authentication() {
            Self::AuthenticationRequired(err)
        } else {
            Self::UpdateFailed(err)
        }
    }
}

#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Published(Arc<Snapshot>),
    /// Another cycle was already running.
    Skipped,
}

pub struct Coordinator {
    client: HevyClient,
    name: String,
    page_size: u32,
    state: watch::Sender<CoordinatorState>,
    shutdown: watch::Sender<bool>,
    refresh_lock: Mutex<()>,
}

impl Coordinator {
    pub fn new(client: HevyClient, name: impl Into<String>, page_size: u32) -> Self {
        let (state, _) = watch::channel(CoordinatorState::default());
        let (shutdown, _) = watch::channel(false);

        Self {
            client,
            name: name.into(),
            page_size,
            state,
            shutdown,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> Option<Arc<Snapshot>> {
        self.state.borrow().data.clone()
    }

    pub fn status(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    pub async fn wait_for_auth_failure(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|state| state.auth_failed).await;
    }

    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        self.refresh_at(Local::now()).await
    }

    pub async fn refresh_at<Tz>(&self, now: DateTime<Tz>) -> Result<RefreshOutcome, RefreshError>
    where
        Tz: TimeZone + Send + Sync,
        Tz::Offset: Send + Sync,
    {
        let Ok(_guard) = self.refresh_lock.try_lock() else {
            tracing::debug!("coordinator.refresh_skipped_in_flight");
            return Ok(RefreshOutcome::Skipped);
        };

        let mut shutdown = self.shutdown.subscribe();
        if *shutdown.borrow() {
            return Err(RefreshError::Cancelled);
        }

        tracing::debug!(name = %self.name, "coordinator.refresh_started");

        let result = tokio::select! {
            result = self.fetch_snapshot(&now) => result,
            _ = async {
                let _ = shutdown.wait_for(|stopped| *stopped).await;
            } => Err(RefreshError::Cancelled),
        };

        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.publish(Arc::clone(&snapshot));
                tracing::info!(
                    workout_count = snapshot.workout_count,
                    fetched = snapshot.workouts.len(),
                    today_count = snapshot.today_count,
                    week_count = snapshot.week_count,
                    "coordinator.refresh_succeeded"
                );
                Ok(RefreshOutcome::Published(snapshot))
            }
            Err(RefreshError::Cancelled) => {
                tracing::info!("coordinator.refresh_cancelled");
                Err(RefreshError::Cancelled)
            }
            Err(e) => {
                self.record_failure(&e);
                Err(e)
            }
        }
    }

    async fn fetch_snapshot<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Snapshot, RefreshError> {
        let count = self.client.get_workout_count().await?;
        let page = self.client.get_workouts(FIRST_PAGE, self.page_size).await?;

        tracing::debug!(
            workout_count = count.workout_count,
            fetched = page.workouts.len(),
            "coordinator.fetched"
        );

        let snapshot =
            normalizer::build_snapshot(&self.name, count.workout_count, &page.workouts, now)?;
        Ok(snapshot)
    }

    fn publish(&self, snapshot: Arc<Snapshot>) {
        self.state.send_modify(|state| {
            state.data = Some(snapshot);
            state.last_update_success = true;
            state.auth_failed = false;
            state.last_error = None;
        });
    }

    // The previous snapshot stays in place; only the status flips.
    fn record_failure(&self, err: &RefreshError) {
        let kind = match err {
            RefreshError::AuthenticationRequired(e) | RefreshError::UpdateFailed(e) => e.kind(),
            RefreshError::InvalidData(_) => "invalid_data",
            RefreshError::Cancelled => "cancelled",
        };

        if err.is_authentication_required() {
            tracing::error!(error = %err, kind, "coordinator.authentication_failed");
        } else {
            tracing::warn!(error = %err, kind, "coordinator.refresh_failed");
        }

        self.state.send_modify(|state| {
            state.last_update_success = false;
            state.auth_failed = err.is_authentication_required();
            state.last_error = Some(err.to_string());
        });
    }
}
