use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::api::JobApi;
use crate::error::ApiError;
use crate::render::{render, StatusView};
use crate::session::SharedSession;
use crate::task::{TaskSnapshot, TaskStatus};
use crate::view::ViewSink;

pub use crate::session::PollState;

/// Polls one task at a fixed interval until it reaches a terminal status
/// or a fetch fails. Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct Poller {
    api: Arc<dyn JobApi>,
    view: Arc<dyn ViewSink>,
    session: SharedSession,
    interval: Duration,
}

/// What a single tick decided.
enum Tick {
    Continue,
    Stop,
}

impl Poller {
    pub fn new(
        api: Arc<dyn JobApi>,
        view: Arc<dyn ViewSink>,
        session: SharedSession,
        interval: Duration,
    ) -> Self {
        Self {
            api,
            view,
            session,
            interval,
        }
    }

    pub fn state(&self) -> PollState {
        self.session.state()
    }

    pub fn active_task(&self) -> Option<String> {
        self.session.active_task()
    }

    /// Start polling `task_id`. Any running session is torn down first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, task_id: impl Into<String>) {
        let task_id = task_id.into();

        let (generation, stop_rx) = {
            let mut session = self.session.lock();
            let (generation, stop_rx, replaced) = session.begin_poll(task_id.clone());
            if let Some(previous) = replaced {
                info!("Tearing down poll session for task {}", previous);
            }
            (generation, stop_rx)
        };

        info!(
            "Polling task {} every {} ms",
            task_id,
            self.interval.as_millis()
        );

        let worker = self.clone();
        tokio::spawn(async move {
            worker.run(generation, task_id, stop_rx).await;
        });
    }

    /// Cancel the active session and return to a submittable state.
    ///
    /// Calling this with nothing active is a no-op. In particular a
    /// submission still waiting on the backend keeps its in-flight flag.
    pub fn stop(&self) {
        let mut session = self.session.lock();
        let Some(task_id) = session.cancel_poll() else {
            debug!("Stop requested with no active poll session");
            return;
        };
        info!("Stopped polling task {}", task_id);
        session.set_state(PollState::Idle);
        session.release();
        self.view.set_submit_enabled(true);
    }

    /// Wait until no session is active and return the state it ended in.
    pub async fn wait_until_stopped(&self) -> PollState {
        let mut rx = self.session.lock().subscribe();
        let result = rx.wait_for(|state| *state != PollState::Active).await;
        match result {
            Ok(state) => *state,
            Err(_) => self.state(),
        }
    }

    async fn run(self, generation: u64, task_id: String, mut stop_rx: watch::Receiver<bool>) {
        // First fetch happens one interval after start
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // Wait for the next tick unless the session is torn down first
            tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                _ = ticker.tick() => {}
            }

            // Fetch the snapshot; a stop during the request abandons it
            let fetched = tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                fetched = self.api.fetch_status(&task_id) => fetched,
            };

            // Render and decide whether the session ends here
            match self.apply(generation, &task_id, fetched) {
                Tick::Continue => continue,
                Tick::Stop => break,
            }
        }

        debug!("Poll loop for task {} exited", task_id);
    }

    /// Render a fetch result and, when it ends the session, stop it.
    /// Results for a session that has since been replaced are dropped.
    fn apply(
        &self,
        generation: u64,
        task_id: &str,
        fetched: Result<TaskSnapshot, ApiError>,
    ) -> Tick {
        let mut session = self.session.lock();
        if !session.is_current(generation) {
            debug!("Dropping result for superseded poll of task {}", task_id);
            return Tick::Stop;
        }

        let end_state = match fetched {
            // Snapshot: render it, stop only on a terminal status
            Ok(snapshot) => {
                debug!(
                    "Task {}: {} {:.1}%",
                    task_id,
                    snapshot.status.as_str(),
                    snapshot.progress
                );
                for message in &snapshot.failed_messages {
                    debug!("Task {} item failed: {}", task_id, message);
                }
                self.view.show(render(&snapshot));

                match snapshot.status {
                    TaskStatus::Completed => PollState::StoppedSuccess,
                    TaskStatus::Error => {
                        warn!(
                            "Task {} failed: {}",
                            task_id,
                            snapshot.error.as_deref().unwrap_or("no error message")
                        );
                        PollState::StoppedError
                    }
                    TaskStatus::Queued | TaskStatus::Downloading | TaskStatus::Processing => {
                        return Tick::Continue;
                    }
                }
            }
            // Backend answered with a non-success status
            Err(ApiError::Status { code, message }) => {
                error!(
                    "Status request for task {} returned HTTP {}: {}",
                    task_id,
                    code,
                    message.as_deref().unwrap_or("no error message")
                );
                self.view.show(StatusView::error("Failed to fetch status"));
                PollState::StoppedError
            }
            Err(ApiError::UnknownStatus(status)) => {
                warn!("Task {} reported unrecognized status {:?}", task_id, status);
                self.view.show(StatusView::error(format!(
                    "Unrecognized task status: {}",
                    status
                )));
                PollState::StoppedError
            }
            // Transport or decode failure
            Err(e) => {
                error!("Poll error for task {}: {}", task_id, e);
                self.view.show(StatusView::error("Connection lost"));
                PollState::StoppedError
            }
        };

        // Terminal transition: drop the session, clear the flag, re-enable submit
        if let Some(finished) = session.finish_poll(generation) {
            let elapsed = Utc::now() - finished.started_at;
            info!(
                "Poll session for task {} ended ({:?}) after {}s",
                task_id,
                end_state,
                elapsed.num_seconds()
            );
        }
        session.release();
        session.set_state(end_state);
        self.view.set_submit_enabled(true);

        Tick::Stop
    }
}
