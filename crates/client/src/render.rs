//! Status rendering: maps a task snapshot to a view description.
//!
//! Everything here is pure. The poller and controller hand the resulting
//! `StatusView` to a `ViewSink`; the sink decides whether it becomes markup
//! (`to_html`) or terminal text (`Display`).

use std::fmt;

use crate::task::{TaskSnapshot, TaskStatus};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Visual severity of a status box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Neutral,
    Warning,
    Success,
    Error,
}

impl Tier {
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            Tier::Neutral => None,
            Tier::Warning => Some("warning"),
            Tier::Success => Some("success"),
            Tier::Error => Some("error"),
        }
    }
}

/// Emphasis applied to a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Plain,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusRow {
    pub label: &'static str,
    pub value: String,
    pub style: RowStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Row(StatusRow),
    /// Fill width in percent, strictly between 0 and 100.
    ProgressBar(f64),
}

/// Everything needed to draw the status area once.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub tier: Tier,
    pub sections: Vec<Section>,
}

impl StatusView {
    /// Transient view shown between submit and the first snapshot.
    pub fn starting() -> Self {
        Self {
            tier: Tier::Neutral,
            sections: vec![row("Status", "Starting download...", RowStyle::Plain)],
        }
    }

    /// Error box with a single message row.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tier: Tier::Error,
            sections: vec![row("Error", message, RowStyle::Error)],
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &StatusRow> {
        self.sections.iter().filter_map(|s| match s {
            Section::Row(r) => Some(r),
            Section::ProgressBar(_) => None,
        })
    }

    /// Value of the first row with this label.
    pub fn row(&self, label: &str) -> Option<&str> {
        self.rows()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }

    pub fn progress_bar(&self) -> Option<f64> {
        self.sections.iter().find_map(|s| match s {
            Section::ProgressBar(pct) => Some(*pct),
            Section::Row(_) => None,
        })
    }

    pub fn has_progress_bar(&self) -> bool {
        self.progress_bar().is_some()
    }

    /// Whether any row value contains `needle`.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.rows().any(|r| r.value.contains(needle))
    }

    /// Markup for the status element. All row text is escaped.
    pub fn to_html(&self) -> String {
        let mut classes = String::from("status-box");
        if let Some(class) = self.tier.css_class() {
            classes.push(' ');
            classes.push_str(class);
        }

        let mut body = String::new();
        for section in &self.sections {
            match section {
                Section::Row(r) => body.push_str(&row_html(r)),
                Section::ProgressBar(pct) => body.push_str(&format!(
                    "<div class=\"progress-bar\"><div class=\"progress-fill\" style=\"width: {:.1}%\"></div></div>",
                    round_half_up(*pct, 1)
                )),
            }
        }

        format!("<div class=\"{}\">{}</div>", classes, body)
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for r in self.rows() {
            if !first {
                writeln!(f)?;
            }
            first = false;
            write!(f, "{}: {}", r.label, r.value)?;
        }
        Ok(())
    }
}

fn row(label: &'static str, value: impl Into<String>, style: RowStyle) -> Section {
    Section::Row(StatusRow {
        label,
        value: value.into(),
        style,
    })
}

fn row_html(r: &StatusRow) -> String {
    let class = match r.style {
        RowStyle::Plain => "",
        RowStyle::Warning => " warning",
        RowStyle::Error => " error",
    };
    format!(
        "<div class=\"status-row\"><span class=\"status-label{class}\">{}:</span><span class=\"status-value{class}\">{}</span></div>",
        escape_html(r.label),
        escape_html(&r.value),
    )
}

/// Map a snapshot to its view. Total over every snapshot.
pub fn render(task: &TaskSnapshot) -> StatusView {
    let tier = match task.status {
        TaskStatus::Error => Tier::Error,
        TaskStatus::Completed => Tier::Success,
        _ if task.failed_items > 0 => Tier::Warning,
        _ => Tier::Neutral,
    };

    let mut sections = vec![row("Status", capitalize(task.status.as_str()), RowStyle::Plain)];

    if task.playlist_total > 1 {
        sections.push(row(
            "Item",
            format!("{}/{}", task.playlist_index, task.playlist_total),
            RowStyle::Plain,
        ));
        if let Some(title) = non_empty(&task.playlist_title) {
            sections.push(row("Playlist", title, RowStyle::Plain));
        }
    }

    if task.progress > 0.0 && task.progress < 100.0 {
        sections.push(Section::ProgressBar(task.progress));
        sections.push(row("Progress", format_percent(task.progress), RowStyle::Plain));
    }

    if let (Some(speed), Some(eta)) = (task.speed, task.eta) {
        if is_truthy(speed) && is_truthy(eta) {
            sections.push(row("Speed", format_speed(speed), RowStyle::Plain));
            sections.push(row("ETA", format_eta(Some(eta)), RowStyle::Plain));
        }
    }

    if let Some(filename) = non_empty(&task.filename) {
        sections.push(row("File", filename, RowStyle::Plain));
    }

    if task.failed_items > 0 {
        sections.push(row("Failed Items", task.failed_items.to_string(), RowStyle::Warning));
    }

    if let Some(error) = non_empty(&task.error) {
        sections.push(row("Error", error, RowStyle::Error));
    }

    StatusView { tier, sections }
}

/// Human-readable remaining time, rounded to the nearest whole unit.
pub fn format_eta(seconds: Option<f64>) -> String {
    let secs = match seconds {
        Some(s) if is_truthy(s) && s > 0.0 => s,
        _ => return "Unknown".to_string(),
    };

    if secs < 60.0 {
        format!("{}s", secs.round())
    } else if secs < 3600.0 {
        format!("{}m", (secs / 60.0).round())
    } else {
        format!("{}h", (secs / 3600.0).round())
    }
}

/// Bytes per second as megabytes per second with two decimals.
pub fn format_speed(bytes_per_sec: f64) -> String {
    format!("{:.2} MB/s", round_half_up(bytes_per_sec / BYTES_PER_MB, 2))
}

pub fn format_percent(progress: f64) -> String {
    format!("{:.1}%", round_half_up(progress, 1))
}

// `{:.N}` alone rounds exact ties to even; displayed values round them up.
fn round_half_up(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape text for insertion into element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// Zero and NaN count as absent.
fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
