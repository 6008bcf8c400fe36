use std::time::Duration;

use tokio::sync::watch;

use crate::state::SharedState;

/// How often expired sessions and stale limiter entries are dropped.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Periodic cleanup loop. Runs until `shutdown` flips to true.
pub async fn run(state: SharedState, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!("Housekeeping started");

    loop {
        tokio::select! {
            _ = tokio::time::sleep(SWEEP_INTERVAL) => {}
            _ = shutdown.changed() => {}
        }

        if *shutdown.borrow() {
            break;
        }

        sweep(&state).await;
    }

    tracing::debug!("Housekeeping stopped");
}

pub async fn sweep(state: &SharedState) {
    match state.store.purge_expired_sessions().await {
        Ok(0) => {}
        Ok(n) => tracing::info!("Purged {n} expired sessions"),
        Err(e) => tracing::error!("Failed to purge expired sessions: {e}"),
    }

    state.login_limiter.cleanup();
    state.reset_limiter.cleanup();
}
