use tracing::{info, warn};

use crate::api::JobApi;
use crate::catalog::Location;

/// Display labels for the two storage locations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationLabels {
    pub default: Option<String>,
    pub alt: Option<String>,
}

impl LocationLabels {
    /// Selector text for `location`, with the server path when known.
    pub fn label_for(&self, location: Location) -> String {
        let (name, path) = match location {
            Location::Default => ("Default", &self.default),
            Location::Alt => ("Alternative", &self.alt),
        };
        match path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => format!("{} ({})", name, path),
            None => name.to_string(),
        }
    }
}

/// Fetch storage-location labels from the backend.
///
/// Failure is not fatal: it is logged and yields empty labels, which fall
/// back to the generic location names.
pub async fn fetch_location_labels(api: &dyn JobApi) -> LocationLabels {
    match api.fetch_config().await {
        Ok(remote) => {
            info!(
                "Storage locations: default={:?} alt={:?}",
                remote.default_path, remote.alt_path
            );
            LocationLabels {
                default: remote.default_path,
                alt: remote.alt_path,
            }
        }
        Err(e) => {
            warn!("Failed to fetch config: {}", e);
            LocationLabels::default()
        }
    }
}
