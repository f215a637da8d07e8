//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{ProcessedArrival, Stop};

/// Query for the browse page. Both fields present selects a stop.
#[derive(Debug, Default, Deserialize)]
pub struct StopsPageRequest {
    /// Stop ID to select
    pub stop: Option<String>,

    /// Display name of the selected stop
    pub name: Option<String>,
}

impl StopsPageRequest {
    /// The stop to auto-select, if both parameters are non-empty.
    pub fn selection(&self) -> Option<(&str, &str)> {
        let stop = self.stop.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let name = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((stop, name))
    }
}

/// Stop search query.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    #[serde(default)]
    pub q: String,
}

/// Response for stop search.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    pub stops: Vec<Stop>,
}

/// Query for a stop's arrivals.
#[derive(Debug, Deserialize)]
pub struct ArrivalsRequest {
    /// Display name, echoed back in the panel heading
    pub name: Option<String>,
}

/// Response for a stop's arrivals.
#[derive(Debug, Serialize)]
pub struct ArrivalsResponse {
    pub stop_id: String,
    /// Soonest first
    pub arrivals: Vec<ProcessedArrival>,
}

/// Form posted by "save to favorites".
#[derive(Debug, Deserialize)]
pub struct SaveStopForm {
    pub name: String,
}

/// Form posted by the add-favorite form.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteForm {
    #[serde(default)]
    pub stop_id: String,
    #[serde(default)]
    pub name: String,
}

/// Form posted by a rename.
#[derive(Debug, Deserialize)]
pub struct RenameFavoriteForm {
    #[serde(default)]
    pub name: String,
}

/// JSON request to add a favorite.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    pub stop_id: String,
    pub name: String,
}

/// JSON request to rename a favorite.
#[derive(Debug, Deserialize)]
pub struct RenameFavoriteRequest {
    pub name: String,
}

/// JSON response to a removal.
#[derive(Debug, Serialize)]
pub struct RemoveFavoriteResponse {
    pub removed: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
