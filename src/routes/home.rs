use askama::Template;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::catalog::{self, PropertyCard};
use crate::extractors::MaybeUser;
use crate::models::{Photo, Property};
use crate::state::AppState;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub agency_name: String,
    pub cards: Vec<PropertyCard>,
    pub load_error: bool,
    pub signed_in: bool,
}

/// Marketing home: hero plus every listing as a card. The two collections
/// are fetched together and the page renders only once both settle; one
/// failure means an empty, stable render with a notice.
pub async fn index(State(state): State<AppState>, maybe_user: MaybeUser) -> Response {
    let (cards, load_error) = match tokio::try_join!(
        state.api.list::<Property>(),
        state.api.list::<Photo>(),
    ) {
        Ok((properties, photos)) => (catalog::property_cards(&properties, &photos), false),
        Err(e) => {
            tracing::error!("Failed to load the home page data: {}", e);
            (Vec::new(), true)
        }
    };

    Html(HomeTemplate {
        agency_name: state.config.agency.name.clone(),
        cards,
        load_error,
        signed_in: maybe_user.0.is_some(),
    })
    .into_response()
}
