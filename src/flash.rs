//! One-shot notifications carried across the post/redirect/get cycle.
//!
//! Mutations redirect back to their page with the outcome in a short-lived
//! cookie; the next render shows it once and clears it. The Max-Age backstop
//! keeps an unread flash from lingering.

use axum::extract::FromRequestParts;
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use url::form_urlencoded;

use crate::extractors::cookie_value;
use crate::state::AppState;

pub const COOKIE: &str = "varanda_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Success,
    Error,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Kind::Success => "success",
            Kind::Error => "error",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "success" => Some(Kind::Success),
            "error" => Some(Kind::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub kind: Kind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Error,
            message: message.into(),
        }
    }

    /// CSS class hook for the notification slot.
    pub fn class(&self) -> &'static str {
        match self.kind {
            Kind::Success => "flash-success",
            Kind::Error => "flash-error",
        }
    }

    /// Cookie delivering this flash to the next render. The payload is
    /// form-urlencoded so arbitrary message text stays cookie-safe.
    pub fn cookie(&self) -> String {
        let payload = form_urlencoded::Serializer::new(String::new())
            .append_pair("kind", self.kind.as_str())
            .append_pair("message", &self.message)
            .finish();
        format!("{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age=60", COOKIE, payload)
    }

    pub fn decode(raw: &str) -> Option<Flash> {
        let mut kind = None;
        let mut message = None;
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "kind" => kind = Kind::parse(value.as_ref()),
                "message" => message = Some(value.into_owned()),
                _ => {}
            }
        }
        Some(Flash {
            kind: kind?,
            message: message?,
        })
    }
}

pub fn clear_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", COOKIE)
}

/// Redirect carrying a flash for the target page.
pub fn redirect(to: &str, flash: Flash) -> Response {
    (
        AppendHeaders([(SET_COOKIE, flash.cookie())]),
        Redirect::to(to),
    )
        .into_response()
}

/// Finalize a page render that consumed a flash: attach the clearing cookie
/// so the notification shows exactly once.
pub fn page(body: impl IntoResponse, consumed: bool) -> Response {
    let mut response = body.into_response();
    if consumed {
        if let Ok(value) = HeaderValue::from_str(&clear_cookie()) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// Read-side extractor; pages take it and render the message, if any, into
/// their notification slot.
pub struct IncomingFlash(pub Option<Flash>);

impl FromRequestParts<AppState> for IncomingFlash {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let flash = cookie_value(&parts.headers, COOKIE).and_then(Flash::decode);
        Ok(IncomingFlash(flash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_payload_roundtrips() {
        let flash = Flash::error("Could not save the user. Check the data & try again.");
        let cookie = flash.cookie();
        let payload = cookie
            .strip_prefix("varanda_flash=")
            .unwrap()
            .split(';')
            .next()
            .unwrap();
        assert_eq!(Flash::decode(payload), Some(flash));
    }

    #[test]
    fn payload_is_cookie_safe() {
        let flash = Flash::success("saved; with = tricky, chars");
        let cookie = flash.cookie();
        let payload = cookie
            .strip_prefix("varanda_flash=")
            .unwrap()
            .split(';')
            .next()
            .unwrap();
        assert!(!payload.contains(' '));
        assert!(!payload.contains(';'));
        assert_eq!(Flash::decode(payload), Some(flash));
    }

    #[test]
    fn garbage_does_not_decode() {
        assert_eq!(Flash::decode("kind=warning&message=x"), None);
        assert_eq!(Flash::decode("message=x"), None);
        assert_eq!(Flash::decode(""), None);
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(clear_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn page_attaches_the_clearing_cookie_only_when_consumed() {
        let response = page("body", true);
        let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 1);

        let response = page("body", false);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
