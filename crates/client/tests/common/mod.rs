#![allow(dead_code)]

use async_trait::async_trait;
use mdl_client::api::{DownloadAccepted, JobApi, RemoteConfig};
use mdl_client::catalog::{Format, Location};
use mdl_client::controller::SubmissionRequest;
use mdl_client::error::ApiError;
use mdl_client::render::StatusView;
use mdl_client::task::{TaskSnapshot, TaskStatus};
use mdl_client::view::ViewSink;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory backend that replays scripted responses and records every call.
#[derive(Default)]
pub struct ScriptedApi {
    config: Mutex<Option<Result<RemoteConfig, ApiError>>>,
    creates: Mutex<VecDeque<Result<DownloadAccepted, ApiError>>>,
    statuses: Mutex<HashMap<String, VecDeque<Result<TaskSnapshot, ApiError>>>>,
    create_delay: Mutex<Option<Duration>>,
    pub config_calls: Mutex<usize>,
    pub create_calls: Mutex<Vec<SubmissionRequest>>,
    pub status_calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_config(&self, response: Result<RemoteConfig, ApiError>) {
        *self.config.lock().unwrap() = Some(response);
    }

    pub fn script_create(&self, response: Result<DownloadAccepted, ApiError>) {
        self.creates.lock().unwrap().push_back(response);
    }

    pub fn accept(&self, task_id: &str) {
        self.script_create(Ok(DownloadAccepted {
            task_id: Some(task_id.to_string()),
            error: None,
        }));
    }

    /// Responses for successive polls of `task_id`. The last one repeats.
    pub fn script_status(&self, task_id: &str, responses: Vec<Result<TaskSnapshot, ApiError>>) {
        self.statuses
            .lock()
            .unwrap()
            .insert(task_id.to_string(), responses.into());
    }

    pub fn delay_creates(&self, delay: Duration) {
        *self.create_delay.lock().unwrap() = Some(delay);
    }

    pub fn status_calls(&self) -> Vec<String> {
        self.status_calls.lock().unwrap().clone()
    }

    pub fn status_call_count(&self) -> usize {
        self.status_calls.lock().unwrap().len()
    }

    pub fn create_calls(&self) -> Vec<SubmissionRequest> {
        self.create_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobApi for ScriptedApi {
    async fn fetch_config(&self) -> Result<RemoteConfig, ApiError> {
        *self.config_calls.lock().unwrap() += 1;
        self.config
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(ApiError::Status { code: 404, message: None }))
    }

    async fn create_download(
        &self,
        request: &SubmissionRequest,
    ) -> Result<DownloadAccepted, ApiError> {
        self.create_calls.lock().unwrap().push(request.clone());
        let delay = *self.create_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.creates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".to_string())))
    }

    async fn fetch_status(&self, task_id: &str) -> Result<TaskSnapshot, ApiError> {
        self.status_calls.lock().unwrap().push(task_id.to_string());
        let mut statuses = self.statuses.lock().unwrap();
        match statuses.get_mut(task_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(ApiError::Status {
                code: 404,
                message: Some("Task not found".to_string()),
            }),
        }
    }
}

/// View sink that keeps everything it was asked to show.
#[derive(Default)]
pub struct RecordingView {
    views: Mutex<Vec<StatusView>>,
    submit_toggles: Mutex<Vec<bool>>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn views(&self) -> Vec<StatusView> {
        self.views.lock().unwrap().clone()
    }

    pub fn last(&self) -> StatusView {
        self.views
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("nothing was shown")
    }

    pub fn submit_toggles(&self) -> Vec<bool> {
        self.submit_toggles.lock().unwrap().clone()
    }

    /// The submit control starts enabled.
    pub fn submit_enabled(&self) -> bool {
        self.submit_toggles
            .lock()
            .unwrap()
            .last()
            .copied()
            .unwrap_or(true)
    }
}

impl ViewSink for RecordingView {
    fn show(&self, view: StatusView) {
        self.views.lock().unwrap().push(view);
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.submit_toggles.lock().unwrap().push(enabled);
    }
}

pub const INTERVAL: Duration = Duration::from_millis(2000);

pub fn request(url: &str) -> SubmissionRequest {
    SubmissionRequest {
        url: url.to_string(),
        format: Format::Mp3,
        quality: "192".to_string(),
        location: Location::Default,
        is_album: false,
    }
}

pub fn downloading(progress: f64) -> TaskSnapshot {
    TaskSnapshot {
        progress,
        ..TaskSnapshot::new(TaskStatus::Downloading)
    }
}

pub fn completed(filename: &str) -> TaskSnapshot {
    TaskSnapshot {
        progress: 100.0,
        filename: Some(filename.to_string()),
        ..TaskSnapshot::new(TaskStatus::Completed)
    }
}

pub fn failed(message: &str) -> TaskSnapshot {
    TaskSnapshot {
        error: Some(message.to_string()),
        ..TaskSnapshot::new(TaskStatus::Error)
    }
}
