pub mod admin;
pub mod assets;
pub mod auth;
pub mod home;
pub mod listing;

use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/properties/{id}", get(listing::show))
        .route("/assets/{*path}", get(assets::serve))
        .merge(auth::router())
        .merge(admin::router())
        .fallback(fallback)
}

/// Unknown paths land on the marketing home.
async fn fallback() -> Redirect {
    Redirect::to("/")
}
