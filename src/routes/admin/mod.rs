//! Gated CRUD pages. Every resource follows the same two-state pattern:
//! a list page that fetches on entry, and a form page holding one draft
//! that saves through create-or-update and redirects back to the list.

pub mod neighborhoods;
pub mod photos;
pub mod properties;
pub mod property_types;
pub mod users;

use axum::Router;

use crate::flash::Flash;
use crate::models::User;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(neighborhoods::router())
        .merge(property_types::router())
        .merge(properties::router())
        .merge(photos::router())
}

/// Everything the admin chrome needs on every page: who is signed in, what
/// their role lets them see, and the pending notification, if any.
pub(crate) struct PageContext {
    pub user_name: String,
    pub role_label: &'static str,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub flash: Option<Flash>,
}

impl PageContext {
    pub fn new(user: &User, flash: Option<Flash>) -> Self {
        Self {
            user_name: user.name.clone(),
            role_label: user.role.label(),
            can_create: user.role.can_create(),
            can_edit: user.role.can_edit(),
            can_delete: user.role.can_delete(),
            flash,
        }
    }
}

pub(crate) const NO_PERMISSION: &str = "You do not have permission to do that.";

/// A `<select>` entry with its selection state resolved ahead of render.
pub(crate) struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

pub(crate) fn options(pairs: Vec<(String, String)>, selected: &str) -> Vec<SelectOption> {
    pairs
        .into_iter()
        .map(|(value, label)| SelectOption {
            selected: value == selected,
            value,
            label,
        })
        .collect()
}

/// Hidden-field id: blank means "new record".
pub(crate) fn parse_id(raw: &Option<String>) -> Option<i64> {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}
