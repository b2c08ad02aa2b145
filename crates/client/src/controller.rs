use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::api::{DownloadAccepted, JobApi};
use crate::catalog::{Format, Location};
use crate::error::{ApiError, SubmitError};
use crate::poller::Poller;
use crate::render::StatusView;
use crate::session::SharedSession;
use crate::view::ViewSink;

const EMPTY_URL_MESSAGE: &str = "URL cannot be empty";
const REJECTED_FALLBACK: &str = "Failed to start download";
const NETWORK_MESSAGE: &str = "Network error. Please try again.";

/// Body of `POST /api/download`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRequest {
    pub url: String,
    pub format: Format,
    pub quality: String,
    pub location: Location,
    #[serde(rename = "isAlbum")]
    pub is_album: bool,
}

/// Owns the in-flight guard and the poller for one form.
pub struct DownloadController {
    api: Arc<dyn JobApi>,
    view: Arc<dyn ViewSink>,
    session: SharedSession,
    poller: Poller,
}

impl DownloadController {
    pub fn new(api: Arc<dyn JobApi>, view: Arc<dyn ViewSink>, poll_interval: Duration) -> Self {
        let session = SharedSession::new();
        let poller = Poller::new(
            Arc::clone(&api),
            Arc::clone(&view),
            session.clone(),
            poll_interval,
        );
        Self {
            api,
            view,
            session,
            poller,
        }
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub fn is_in_flight(&self) -> bool {
        self.session.is_in_flight()
    }

    /// Submit a new job and start polling it.
    ///
    /// Returns the backend task id once a poll session is running. While a
    /// previous job is still in flight this returns `SubmitError::Busy`
    /// without touching the view or the backend.
    pub async fn submit(&self, request: SubmissionRequest) -> Result<String, SubmitError> {
        let request = {
            let mut session = self.session.lock();

            // Step 1: Claim the flag, or drop the submission while one is in flight
            if !session.try_begin() {
                debug!("Ignoring submission while a download is in flight");
                return Err(SubmitError::Busy);
            }

            // Step 2: Validate the URL
            let url = request.url.trim().to_string();
            if url.is_empty() {
                session.release();
                self.view.show(StatusView::error(EMPTY_URL_MESSAGE));
                return Err(SubmitError::Validation(EMPTY_URL_MESSAGE.to_string()));
            }

            // Step 3: Lock the form and show the starting view
            self.view.set_submit_enabled(false);
            self.view.show(StatusView::starting());

            SubmissionRequest { url, ..request }
        };

        info!(
            "Submitting {} ({} {}, location {}, album {})",
            request.url, request.format, request.quality, request.location, request.is_album
        );

        // Step 4: Create the job on the backend
        match self.api.create_download(&request).await {
            Ok(DownloadAccepted {
                task_id: Some(task_id),
                ..
            }) if !task_id.is_empty() => {
                // Step 5: Hand the task over to the poller
                info!("Backend accepted download as task {}", task_id);
                self.poller.start(task_id.clone());
                Ok(task_id)
            }
            Ok(DownloadAccepted { error: message, .. })
            | Err(ApiError::Status { message, .. }) => {
                let message = message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| REJECTED_FALLBACK.to_string());
                warn!("Backend rejected download: {}", message);
                Err(self.fail(SubmitError::Rejected(message)))
            }
            Err(e) => {
                error!("Submit error: {}", e);
                Err(self.fail(SubmitError::Network(NETWORK_MESSAGE.to_string())))
            }
        }
    }

    /// Show the failure and return to an idle, submittable state.
    fn fail(&self, err: SubmitError) -> SubmitError {
        let mut session = self.session.lock();
        self.view.show(StatusView::error(err.to_string()));
        session.release();
        self.view.set_submit_enabled(true);
        err
    }
}
