use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use url::form_urlencoded;

use crate::catalog::{self, PropertyDetail};
use crate::error::{AppError, AppResult};
use crate::models::{Photo, Property};
use crate::routes::home::Html;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/property_detail.html")]
struct DetailTemplate {
    agency_name: String,
    detail: PropertyDetail,
    whatsapp_url: String,
}

/// Public property detail page. Tries the single-record endpoint first and
/// falls back to scanning the full list, which some backend deployments
/// need because the single GET is unreliable there.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let (property, photos) = match tokio::try_join!(
        state.api.fetch::<Property>(id),
        state.api.list::<Photo>(),
    ) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!("Single property fetch failed, scanning the list: {}", e);
            let (properties, photos) = tokio::try_join!(
                state.api.list::<Property>(),
                state.api.list::<Photo>(),
            )?;
            let property = properties
                .into_iter()
                .find(|p| p.id == Some(id))
                .ok_or(AppError::NotFound)?;
            (property, photos)
        }
    };

    let detail = catalog::property_detail(&property, &photos).ok_or(AppError::NotFound)?;
    let whatsapp_url = whatsapp_url(&state.config.agency.whatsapp, &detail.card.title);

    Ok(Html(DetailTemplate {
        agency_name: state.config.agency.name.clone(),
        detail,
        whatsapp_url,
    })
    .into_response())
}

fn whatsapp_url(phone: &str, title: &str) -> String {
    let message = format!("Hello, I would like to know more about the property: {}", title);
    let encoded: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("https://wa.me/{}?text={}", phone, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whatsapp_url_encodes_the_message() {
        let url = whatsapp_url("5597178810", "Garden house");
        assert!(url.starts_with("https://wa.me/5597178810?text="));
        assert!(!url.contains(' '));
        assert!(url.contains("Garden+house"));
    }
}
