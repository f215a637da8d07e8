//! Favorite stops.
//!
//! The favorites collection is the only long-lived user state. It lives
//! in one storage slot and is rewritten whole on every change. A second,
//! transient slot hands a stop over from the browse view to the add form
//! on the favorites view.

mod error;
mod pending;
mod store;

pub use error::FavoritesError;
pub use pending::{PendingFavorite, PendingFavoriteSlot};
pub use store::{FavoriteStop, FavoritesStore};
