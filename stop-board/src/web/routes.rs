//! HTTP route handlers.

use askama::Template;
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
};
use chrono::Utc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::directory::{BROWSE_PAGE_SIZE, MIN_QUERY_CHARS, NetworkError, SEARCH_LIMIT};
use crate::domain::{InvalidStopId, ProcessedArrival, StopId, process};
use crate::favorites::{FavoriteStop, FavoritesError, PendingFavorite};
use crate::storage::StorageError;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Shown when the stop list cannot be fetched.
const STOP_LIST_ERROR: &str = "Could not load bus stop list. Please refresh.";

/// Shown when a stop's arrivals cannot be fetched.
const ARRIVALS_ERROR: &str = "Failed to fetch arrival data. Please try again.";

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<std::path::Path>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/stops", get(stops_page))
        .route("/stops/search", get(search_stops))
        .route("/stops/:id/arrivals", get(stop_arrivals))
        .route("/stops/:id/save", post(save_stop))
        .route("/favorites", get(favorites_page).post(add_favorite_form))
        .route("/favorites/:id/rename", post(rename_favorite_form))
        .route("/favorites/:id/delete", post(delete_favorite_form))
        .route(
            "/api/favorites",
            get(api_list_favorites).post(api_add_favorite),
        )
        .route(
            "/api/favorites/:id",
            put(api_rename_favorite).delete(api_delete_favorite),
        )
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Redirect {
    Redirect::to("/stops")
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> Response {
    error_page(
        StatusCode::NOT_FOUND,
        "Not found",
        "There is nothing at this address.",
    )
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

fn render<T: Template>(template: &T) -> Result<String, AppError> {
    template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })
}

/// Full error page. Rendered through the askama_axum integration, which
/// falls back to a bare 500 if the template itself fails.
fn error_page(status: StatusCode, title: &str, message: &str) -> Response {
    let page = ErrorTemplate {
        title: title.to_string(),
        message: message.to_string(),
    };
    (status, page).into_response()
}

// ============================================================================
// Browsing
// ============================================================================

/// Browse page.
///
/// With `?stop=..&name=..` the stop is selected straight away and its
/// arrivals shown; otherwise the stop list is fetched afresh.
async fn stops_page(
    State(state): State<AppState>,
    Query(req): Query<StopsPageRequest>,
) -> Result<Response, AppError> {
    if let Some((stop, name)) = req.selection() {
        let stop_id = match StopId::parse(stop) {
            Ok(id) => id,
            Err(e) => {
                return Ok(error_page(
                    StatusCode::BAD_REQUEST,
                    "Invalid stop",
                    &e.to_string(),
                ));
            }
        };

        let panel = arrivals_panel(&state, &stop_id, name).await;
        let template = StopsTemplate {
            stops: Vec::new(),
            load_error: None,
            selected: Some(panel.stop.clone()),
            arrivals_html: Some(render(&panel)?),
        };
        return Ok(Html(render(&template)?).into_response());
    }

    let (stops, load_error) = match state.directory.reload().await {
        Ok(_) => {
            let stops = state.directory.browse(BROWSE_PAGE_SIZE).await;
            (stops.iter().map(StopView::from_stop).collect(), None)
        }
        Err(e) => {
            warn!(error = %e, "failed to load stop list");
            (Vec::new(), Some(STOP_LIST_ERROR.to_string()))
        }
    };

    let template = StopsTemplate {
        stops,
        load_error,
        selected: None,
        arrivals_html: None,
    };
    Ok(Html(render(&template)?).into_response())
}

/// Search the loaded stop list by name.
async fn search_stops(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(req): Query<StopSearchRequest>,
) -> Result<Response, AppError> {
    let stops = state.directory.search(&req.q, SEARCH_LIMIT).await?;

    if accepts_html(&headers) {
        // Too short to search: clear the results area
        if req.q.trim().chars().count() < MIN_QUERY_CHARS {
            return Ok(Html(String::new()).into_response());
        }

        let template = StopListTemplate {
            stops: stops.iter().map(StopView::from_stop).collect(),
            empty_message: "No matching stops found",
        };
        Ok(Html(render(&template)?).into_response())
    } else {
        Ok(Json(StopSearchResponse { stops }).into_response())
    }
}

/// Arrivals for one stop, as a panel fragment or JSON.
async fn stop_arrivals(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(req): Query<ArrivalsRequest>,
) -> Result<Response, AppError> {
    let stop_id = StopId::parse(&id)?;

    if accepts_html(&headers) {
        let name = req
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(stop_id.as_str());

        let panel = arrivals_panel(&state, &stop_id, name).await;
        let status = if panel.error.is_some() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::OK
        };
        Ok((status, Html(render(&panel)?)).into_response())
    } else {
        let arrivals = fetch_processed(&state, &stop_id).await?;
        Ok(Json(ArrivalsResponse {
            stop_id: stop_id.to_string(),
            arrivals,
        })
        .into_response())
    }
}

/// Hand the stop over to the favorites page.
///
/// A blank name falls back to the stop ID.
async fn save_stop(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SaveStopForm>,
) -> Result<Redirect, AppError> {
    let stop_id = StopId::parse(&id)?;

    let name = form.name.trim();
    let stop_name = if name.is_empty() {
        stop_id.to_string()
    } else {
        name.to_string()
    };

    state.pending.put(&PendingFavorite {
        stop_id: stop_id.to_string(),
        stop_name,
    })?;

    Ok(Redirect::to("/favorites"))
}

async fn fetch_processed(
    state: &AppState,
    stop_id: &StopId,
) -> Result<Vec<ProcessedArrival>, NetworkError> {
    let records = state.directory.client().fetch_arrivals(stop_id).await?;
    Ok(process(&records, Utc::now()))
}

/// Fetch and lay out a stop's arrivals. Fetch failures become an inline
/// message rather than an error response.
async fn arrivals_panel(state: &AppState, stop_id: &StopId, name: &str) -> ArrivalsTemplate {
    let stop = SelectedStopView::new(stop_id.as_str(), name);

    match fetch_processed(state, stop_id).await {
        Ok(arrivals) => ArrivalsTemplate {
            stop,
            arrivals: arrivals.iter().map(ArrivalView::from_processed).collect(),
            error: None,
        },
        Err(e) => {
            warn!(stop_id = %stop_id, error = %e, "failed to fetch arrivals");
            ArrivalsTemplate {
                stop,
                arrivals: Vec::new(),
                error: Some(ARRIVALS_ERROR.to_string()),
            }
        }
    }
}

// ============================================================================
// Favorites pages
// ============================================================================

/// Favorites page. Consumes any pending handoff into the add form.
async fn favorites_page(State(state): State<AppState>) -> Result<Response, AppError> {
    let form = match state.pending.take() {
        Ok(Some(pending)) => AddFormView::from_pending(&pending),
        Ok(None) => AddFormView::default(),
        Err(e) => {
            warn!(error = %e, "failed to read pending favorite");
            AddFormView::default()
        }
    };

    render_favorites(&state, form, None, StatusCode::OK).await
}

async fn add_favorite_form(
    State(state): State<AppState>,
    Form(form): Form<AddFavoriteForm>,
) -> Result<Response, AppError> {
    let result = state.favorites.lock().await.add(&form.stop_id, &form.name);

    // Keep what the user typed if the add is rejected
    let retained = AddFormView {
        stop_id: form.stop_id,
        name: form.name,
    };
    after_change(&state, result, retained).await
}

async fn rename_favorite_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<RenameFavoriteForm>,
) -> Result<Response, AppError> {
    let result = state.favorites.lock().await.rename(&id, &form.name);
    after_change(&state, result, AddFormView::default()).await
}

/// Removing an unknown favorite is not an error.
async fn delete_favorite_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    state.favorites.lock().await.remove(&id)?;
    Ok(Redirect::to("/favorites"))
}

/// Redirect back to the list on success; re-render it with the message
/// on a user-facing rejection.
async fn after_change<T>(
    state: &AppState,
    result: Result<T, FavoritesError>,
    form: AddFormView,
) -> Result<Response, AppError> {
    let err = match result {
        Ok(_) => return Ok(Redirect::to("/favorites").into_response()),
        Err(e) => AppError::from(e),
    };

    if err.status().is_server_error() {
        return Err(err);
    }

    let message = err.message().to_string();
    render_favorites(state, form, Some(message), err.status()).await
}

async fn render_favorites(
    state: &AppState,
    form: AddFormView,
    message: Option<String>,
    status: StatusCode,
) -> Result<Response, AppError> {
    let favorites = state.favorites.lock().await.list()?;

    let template = FavoritesTemplate {
        favorites: favorites.iter().map(FavoriteView::from_favorite).collect(),
        form,
        message,
    };
    Ok((status, Html(render(&template)?)).into_response())
}

// ============================================================================
// Favorites JSON API
// ============================================================================

async fn api_list_favorites(
    State(state): State<AppState>,
) -> Result<Json<Vec<FavoriteStop>>, AppError> {
    let favorites = state.favorites.lock().await.list()?;
    Ok(Json(favorites))
}

async fn api_add_favorite(
    State(state): State<AppState>,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<FavoriteStop>), AppError> {
    let favorite = state.favorites.lock().await.add(&req.stop_id, &req.name)?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

async fn api_rename_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenameFavoriteRequest>,
) -> Result<Json<FavoriteStop>, AppError> {
    let favorite = state.favorites.lock().await.rename(&id, &req.name)?;
    Ok(Json(favorite))
}

async fn api_delete_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemoveFavoriteResponse>, AppError> {
    let removed = state.favorites.lock().await.remove(&id)?;
    Ok(Json(RemoveFavoriteResponse { removed }))
}

// ============================================================================
// Errors
// ============================================================================

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Unprocessable { message: String },
    Upstream { message: String },
    Internal { message: String },
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Conflict { message }
            | AppError::Unprocessable { message }
            | AppError::Upstream { message }
            | AppError::Internal { message } => message,
        }
    }
}

impl From<InvalidStopId> for AppError {
    fn from(e: InvalidStopId) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<NetworkError> for AppError {
    fn from(e: NetworkError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl From<FavoritesError> for AppError {
    fn from(e: FavoritesError) -> Self {
        match e {
            FavoritesError::Validation { .. } | FavoritesError::InvalidStopId(_) => {
                AppError::Unprocessable {
                    message: e.to_string(),
                }
            }
            FavoritesError::Duplicate { .. } => AppError::Conflict {
                message: e.to_string(),
            },
            FavoritesError::NotFound { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            FavoritesError::Storage(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message().to_string();

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
