// Core client library modules

pub mod api;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod labels;
pub mod poller;
pub mod render;
pub mod session;
pub mod task;
pub mod view;

// Re-export commonly used types
pub use api::{HttpJobApi, JobApi};
pub use catalog::{Format, Location};
pub use config::ClientConfig;
pub use controller::{DownloadController, SubmissionRequest};
pub use error::{ApiError, SubmitError};
pub use poller::{PollState, Poller};
pub use render::{render, StatusView, Tier};
pub use task::{TaskSnapshot, TaskStatus};
pub use view::ViewSink;
