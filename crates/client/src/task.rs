use serde::Deserialize;

use crate::error::ApiError;

/// Lifecycle status reported by the backend for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Queued,
    Downloading,
    Processing,
    Completed,
    Error,
}

impl TaskStatus {
    /// Parse a wire status. The backend reports `pending` before the first
    /// progress update, which is treated as queued.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "queued" | "pending" => Some(TaskStatus::Queued),
            "downloading" => Some(TaskStatus::Downloading),
            "processing" => Some(TaskStatus::Processing),
            "completed" => Some(TaskStatus::Completed),
            "error" => Some(TaskStatus::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::Downloading => "downloading",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Error)
    }
}

/// Point-in-time state of a task as returned by `GET /api/status/{id}`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSnapshot {
    pub status: TaskStatus,
    /// Percent complete, 0–100.
    pub progress: f64,
    /// Bytes per second.
    pub speed: Option<f64>,
    /// Seconds remaining.
    pub eta: Option<f64>,
    pub filename: Option<String>,
    pub failed_items: u32,
    pub failed_messages: Vec<String>,
    pub error: Option<String>,
    pub playlist_index: u32,
    pub playlist_total: u32,
    pub playlist_title: Option<String>,
}

impl TaskSnapshot {
    pub fn new(status: TaskStatus) -> Self {
        Self {
            status,
            progress: 0.0,
            speed: None,
            eta: None,
            filename: None,
            failed_items: 0,
            failed_messages: Vec::new(),
            error: None,
            playlist_index: 0,
            playlist_total: 0,
            playlist_title: None,
        }
    }

    /// Decode a status response body.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        let wire: WireSnapshot =
            serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        TaskSnapshot::try_from(wire)
    }
}

/// `failed_items` arrives either as a count or as the list of per-item errors.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FailedItems {
    Count(u32),
    List(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct WireSnapshot {
    status: String,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    speed: Option<f64>,
    #[serde(default)]
    eta: Option<f64>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    failed_items: Option<FailedItems>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    playlist_index: Option<u32>,
    #[serde(default)]
    playlist_total: Option<u32>,
    #[serde(default)]
    playlist_title: Option<String>,
}

impl TryFrom<WireSnapshot> for TaskSnapshot {
    type Error = ApiError;

    fn try_from(wire: WireSnapshot) -> Result<Self, Self::Error> {
        let status =
            TaskStatus::parse(&wire.status).ok_or(ApiError::UnknownStatus(wire.status))?;

        let (failed_items, failed_messages) = match wire.failed_items {
            Some(FailedItems::Count(n)) => (n, Vec::new()),
            Some(FailedItems::List(messages)) => (messages.len() as u32, messages),
            None => (0, Vec::new()),
        };

        Ok(TaskSnapshot {
            status,
            progress: wire.progress.unwrap_or(0.0),
            speed: wire.speed,
            eta: wire.eta,
            filename: wire.filename,
            failed_items,
            failed_messages,
            error: wire.error,
            playlist_index: wire.playlist_index.unwrap_or(0),
            playlist_total: wire.playlist_total.unwrap_or(0),
            playlist_title: wire.playlist_title,
        })
    }
}
