use crate::render::StatusView;

/// The surface the controller draws on: a status area plus the submit control.
///
/// Implementations must be cheap and non-blocking; they are called while the
/// session lock is held so that a view update and the state change it reflects
/// are observed together.
pub trait ViewSink: Send + Sync {
    /// Replace the contents of the status area.
    fn show(&self, view: StatusView);

    /// Enable or disable the submit control.
    fn set_submit_enabled(&self, enabled: bool);
}
