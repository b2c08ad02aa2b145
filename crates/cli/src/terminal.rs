use indicatif::{ProgressBar, ProgressStyle};
use mdl_client::render::StatusView;
use mdl_client::view::ViewSink;
use std::sync::Mutex;
use tracing::debug;

// Bar resolution: tenths of a percent
const BAR_LENGTH: u64 = 1000;

/// Draws status views on the terminal.
///
/// While a view carries a progress element it is shown as a live bar with
/// the remaining rows as its message; other views are printed as lines.
pub struct TerminalView {
    html: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl TerminalView {
    pub fn new(html: bool) -> Self {
        Self {
            html,
            bar: Mutex::new(None),
        }
    }

    fn new_bar() -> ProgressBar {
        let bar = ProgressBar::new(BAR_LENGTH);
        let style = ProgressStyle::default_bar()
            .template("{bar:40} {msg}")
            .map(|s| s.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar
    }
}

impl ViewSink for TerminalView {
    fn show(&self, view: StatusView) {
        if self.html {
            println!("{}", view.to_html());
            return;
        }

        let mut bar = self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        match view.progress_bar() {
            Some(percent) => {
                let message = view
                    .rows()
                    .map(|r| format!("{}: {}", r.label, r.value))
                    .collect::<Vec<_>>()
                    .join(" | ");
                let bar = bar.get_or_insert_with(Self::new_bar);
                bar.set_position((percent * 10.0).round() as u64);
                bar.set_message(message);
            }
            None => {
                if let Some(bar) = bar.take() {
                    bar.finish_and_clear();
                }
                println!("{}", view);
            }
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        debug!("Submission {}", if enabled { "enabled" } else { "disabled" });
    }
}
