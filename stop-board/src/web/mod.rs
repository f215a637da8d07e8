//! Web layer for the stop board.
//!
//! Server-rendered pages for browsing stops and managing favorites, plus
//! a small JSON API over the same operations.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
