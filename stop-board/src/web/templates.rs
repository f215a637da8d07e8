//! Askama templates for the web frontend.

use askama::Template;
use url::form_urlencoded;

use crate::domain::{ProcessedArrival, Stop};
use crate::favorites::{FavoriteStop, PendingFavorite};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Browse page: stop list, search box, and the selected stop's arrivals.
#[derive(Template)]
#[template(path = "stops.html")]
pub struct StopsTemplate {
    pub stops: Vec<StopView>,
    pub load_error: Option<String>,
    pub selected: Option<SelectedStopView>,
    /// Pre-rendered [`ArrivalsTemplate`] for the selected stop.
    pub arrivals_html: Option<String>,
}

/// Favorites page: saved stops and the add form.
#[derive(Template)]
#[template(path = "favorites.html")]
pub struct FavoritesTemplate {
    pub favorites: Vec<FavoriteView>,
    pub form: AddFormView,
    pub message: Option<String>,
}

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

// ============================================================================
// Fragment Templates (AJAX responses, no base.html)
// ============================================================================

/// Stop list fragment (search results).
#[derive(Template)]
#[template(path = "stop_list.html")]
pub struct StopListTemplate {
    pub stops: Vec<StopView>,
    pub empty_message: &'static str,
}

/// Arrivals panel for one stop.
#[derive(Template)]
#[template(path = "arrivals.html")]
pub struct ArrivalsTemplate {
    pub stop: SelectedStopView,
    pub arrivals: Vec<ArrivalView>,
    pub error: Option<String>,
}

impl ArrivalsTemplate {
    /// The soonest arrival, shown as a headline.
    pub fn next(&self) -> Option<&ArrivalView> {
        self.arrivals.first()
    }
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Link to the browse page with a stop pre-selected.
pub fn browse_url(stop_id: &str, name: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("stop", stop_id)
        .append_pair("name", name)
        .finish();
    format!("/stops?{query}")
}

/// Stop row in a list.
#[derive(Debug, Clone)]
pub struct StopView {
    pub id: String,
    pub name_primary: String,
    pub name_secondary: String,
    pub select_url: String,
}

impl StopView {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            id: stop.id.clone(),
            name_primary: stop.name_primary.clone(),
            name_secondary: stop.name_secondary.clone(),
            select_url: browse_url(&stop.id, &stop.name_primary),
        }
    }
}

/// The stop whose arrivals are being shown.
#[derive(Debug, Clone)]
pub struct SelectedStopView {
    pub id: String,
    pub name: String,
    /// Full-page reload of this selection.
    pub page_url: String,
    /// Arrivals fragment for in-place refresh.
    pub arrivals_url: String,
}

impl SelectedStopView {
    pub fn new(id: &str, name: &str) -> Self {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("name", name)
            .finish();

        Self {
            id: id.to_string(),
            name: name.to_string(),
            page_url: browse_url(id, name),
            arrivals_url: format!("/stops/{id}/arrivals?{query}"),
        }
    }
}

/// One row of the arrivals table.
#[derive(Debug, Clone)]
pub struct ArrivalView {
    pub route: String,
    pub destination: String,
    pub clock_time: String,
    pub wait_minutes: u32,
    pub remark: Option<String>,
}

impl ArrivalView {
    /// Create from a processed arrival, filling blanks with "N/A".
    pub fn from_processed(arrival: &ProcessedArrival) -> Self {
        let or_na = |s: &str| {
            if s.trim().is_empty() {
                "N/A".to_string()
            } else {
                s.to_string()
            }
        };

        Self {
            route: or_na(&arrival.record.route),
            destination: or_na(&arrival.record.destination_primary),
            clock_time: arrival.clock_time(),
            wait_minutes: arrival.wait_minutes,
            remark: arrival.record.remark.clone(),
        }
    }
}

/// Saved stop row.
#[derive(Debug, Clone)]
pub struct FavoriteView {
    pub id: String,
    pub stop_id: String,
    pub name: String,
    pub view_url: String,
}

impl FavoriteView {
    pub fn from_favorite(favorite: &FavoriteStop) -> Self {
        Self {
            id: favorite.id.clone(),
            stop_id: favorite.stop_id.clone(),
            name: favorite.name.clone(),
            view_url: browse_url(&favorite.stop_id, &favorite.name),
        }
    }
}

/// Values in the add-favorite form.
#[derive(Debug, Clone, Default)]
pub struct AddFormView {
    pub stop_id: String,
    pub name: String,
}

impl AddFormView {
    /// Pre-fill from a browse-page handoff.
    pub fn from_pending(pending: &PendingFavorite) -> Self {
        Self {
            stop_id: pending.stop_id.clone(),
            name: pending.suggested_name(),
        }
    }
}
