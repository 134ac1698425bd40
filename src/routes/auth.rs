use askama::Template;
use axum::extract::State;
use axum::http::header::{HeaderMap, SET_COOKIE};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::extractors::{cookie_value, MaybeUser};
use crate::routes::home::Html;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", post(logout))
}

#[derive(Template)]
#[template(path = "pages/login.html")]
struct LoginTemplate {
    agency_name: String,
    error: Option<String>,
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

// Sessions persist until logout; the cookie lifetime just has to outlast
// any realistic gap between visits.
const SESSION_COOKIE_MAX_AGE: u64 = 365 * 24 * 3600;

fn session_cookie(name: &str, token: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, SESSION_COOKIE_MAX_AGE
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

/// GET /login. Already signed-in visitors go straight to the dashboard.
async fn login_page(State(state): State<AppState>, maybe_user: MaybeUser) -> Response {
    if maybe_user.0.is_some() {
        return Redirect::to("/admin/properties").into_response();
    }
    Html(LoginTemplate {
        agency_name: state.config.agency.name.clone(),
        error: None,
    })
    .into_response()
}

/// POST /login. Forwards the credentials to the backend and caches the user
/// record it returns. The backend's own error text stays off this page; a
/// rejected login always reads the same.
async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let failed = |message: &str| {
        Html(LoginTemplate {
            agency_name: state.config.agency.name.clone(),
            error: Some(message.to_string()),
        })
        .into_response()
    };

    if form.email.trim().is_empty() || form.password.is_empty() {
        return failed("Invalid email or password");
    }

    match state.api.login(form.email.trim(), &form.password).await {
        Ok(user) => match state.sessions.insert(&user) {
            Ok(token) => {
                tracing::info!("User {} signed in", user.email);
                (
                    AppendHeaders([(
                        SET_COOKIE,
                        session_cookie(&state.config.session.cookie_name, &token),
                    )]),
                    Redirect::to("/admin/properties"),
                )
                    .into_response()
            }
            Err(e) => {
                tracing::error!("Could not persist the session: {}", e);
                failed("Could not start a session. Try again.")
            }
        },
        Err(e) => {
            tracing::warn!("Login rejected: {}", e);
            failed("Invalid email or password")
        }
    }
}

/// POST /logout. Drops the cached record and expires the cookie.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = cookie_value(&headers, &state.config.session.cookie_name) {
        if let Err(e) = state.sessions.clear(token) {
            tracing::error!("Could not clear the session: {}", e);
        }
    }
    (
        AppendHeaders([(
            SET_COOKIE,
            clear_session_cookie(&state.config.session.cookie_name),
        )]),
        Redirect::to("/"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_and_long_lived() {
        let cookie = session_cookie("varanda_session", "tok");
        assert!(cookie.starts_with("varanda_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=31536000"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(clear_session_cookie("varanda_session").contains("Max-Age=0"));
    }
}
