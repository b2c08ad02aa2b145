use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// Lifecycle of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Active,
    StoppedSuccess,
    StoppedError,
}

/// The poll session currently bound to a task.
#[derive(Debug)]
pub struct ActivePoll {
    pub generation: u64,
    pub task_id: String,
    pub started_at: DateTime<Utc>,
    stop: watch::Sender<bool>,
}

impl ActivePoll {
    fn cancel(self) {
        // A closed channel means the loop already exited
        let _ = self.stop.send(true);
    }
}

/// In-flight flag and poll session, owned together so that every change to
/// one is made under the same lock as the other.
#[derive(Debug)]
pub struct Session {
    in_flight: bool,
    active: Option<ActivePoll>,
    next_generation: u64,
    state: watch::Sender<PollState>,
}

impl Session {
    fn new() -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            in_flight: false,
            active: None,
            next_generation: 0,
            state,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Mark a submission as started. Returns false if one already is.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    pub fn release(&mut self) {
        self.in_flight = false;
    }

    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    pub fn set_state(&self, state: PollState) {
        self.state.send_replace(state);
    }

    pub fn active(&self) -> Option<&ActivePoll> {
        self.active.as_ref()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .map(|a| a.generation == generation)
            .unwrap_or(false)
    }

    /// Bind a new poll session, cancelling any existing one first.
    /// Returns the new generation, the stop signal receiver and the
    /// session that was torn down, if any.
    pub fn begin_poll(&mut self, task_id: String) -> (u64, watch::Receiver<bool>, Option<String>) {
        let replaced = self.cancel_poll();

        let generation = self.next_generation;
        self.next_generation += 1;

        let (stop, stop_rx) = watch::channel(false);
        self.active = Some(ActivePoll {
            generation,
            task_id,
            started_at: Utc::now(),
            stop,
        });
        self.set_state(PollState::Active);

        (generation, stop_rx, replaced)
    }

    /// Signal the active loop to stop. No-op when nothing is active.
    pub fn cancel_poll(&mut self) -> Option<String> {
        self.active.take().map(|active| {
            let task_id = active.task_id.clone();
            active.cancel();
            task_id
        })
    }

    /// Remove the session if `generation` is still the current one.
    pub fn finish_poll(&mut self, generation: u64) -> Option<ActivePoll> {
        if self.is_current(generation) {
            self.active.take()
        } else {
            None
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }
}

/// Cloneable handle to the session shared by the controller and its poller.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Session::new())),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Session> {
        // Session updates never leave it half-written, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().is_in_flight()
    }

    pub fn state(&self) -> PollState {
        self.lock().state()
    }

    pub fn active_task(&self) -> Option<String> {
        self.lock().active().map(|a| a.task_id.clone())
    }
}

impl Default for SharedSession {
    fn default() -> Self {
        Self::new()
    }
}
