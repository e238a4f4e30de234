//! Session status polling
//!
//! Runs as a spawned task per generation cycle. Polls immediately, then once
//! per interval, until the session resolves, a request fails, the attempt
//! budget runs out, or the task is cancelled.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::state::{PollTarget, WorkflowState};
use crate::api::{GenerationApi, SessionStatus};
use crate::config::GenerationConfig;
use crate::error::FlashgenError;

/// Delay between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// Status checks before giving up (two minutes at the default interval)
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 48;

/// Polling cadence and budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

impl PollingConfig {
    /// Build from the `[generation]` config section
    pub fn from_config(config: &GenerationConfig) -> Result<Self, FlashgenError> {
        if config.poll_interval_ms == 0 {
            return Err(FlashgenError::InvalidConfig(
                "generation.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if config.max_poll_attempts == 0 {
            return Err(FlashgenError::InvalidConfig(
                "generation.max_poll_attempts must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_poll_attempts,
        })
    }
}

enum Tick {
    Continue,
    Done,
}

/// Poll `target` until it resolves
///
/// Ticks never overlap. Ticks stay on the interval grid while requests
/// return within it; a tick whose requests overrun fires the next one as soon
/// as they return and shifts the grid from there.
pub(crate) async fn run_polling<A: GenerationApi>(
    api: Arc<A>,
    state: Arc<Mutex<WorkflowState>>,
    target: PollTarget,
    config: PollingConfig,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attempts: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::debug!("Polling for session {} cancelled", target.session_id);
                return;
            }
            _ = ticker.tick() => {}
        }

        attempts += 1;
        if attempts > config.max_attempts {
            log::warn!(
                "Session {} still pending after {} checks, giving up",
                target.session_id,
                config.max_attempts
            );
            state.lock().polling_timed_out(&target);
            return;
        }

        match poll_once(api.as_ref(), &state, &target, &cancel).await {
            Tick::Continue => {}
            Tick::Done => return,
        }
    }
}

async fn poll_once<A: GenerationApi>(
    api: &A,
    state: &Mutex<WorkflowState>,
    target: &PollTarget,
    cancel: &CancellationToken,
) -> Tick {
    let session = match api.get_session(&target.session_id).await {
        Ok(session) => session,
        Err(e) => {
            log::warn!("Status check for session {} failed: {}", target.session_id, e);
            if !cancel.is_cancelled() {
                state.lock().polling_failed(target);
            }
            return Tick::Done;
        }
    };

    if cancel.is_cancelled() || !state.lock().observe_status(target, session.status) {
        log::debug!("Dropping stale status for session {}", target.session_id);
        return Tick::Done;
    }

    match session.status {
        SessionStatus::Pending => Tick::Continue,
        SessionStatus::Failed => {
            log::info!("Session {} failed on the backend", target.session_id);
            state.lock().generation_failed(target);
            Tick::Done
        }
        SessionStatus::Completed => {
            match api.get_suggestions(&target.session_id).await {
                Ok(response) => {
                    log::info!(
                        "Session {} completed with {} suggestions",
                        target.session_id,
                        response.suggestions.len()
                    );
                    if !cancel.is_cancelled() {
                        state.lock().complete(target, response.suggestions);
                    }
                }
                Err(e) => {
                    log::warn!(
                        "Fetching suggestions for session {} failed: {}",
                        target.session_id,
                        e
                    );
                    if !cancel.is_cancelled() {
                        state.lock().polling_failed(target);
                    }
                }
            }
            Tick::Done
        }
    }
}
