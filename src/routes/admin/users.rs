use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::api::Resource;
use crate::extractors::CurrentUser;
use crate::flash::{self, Flash, IncomingFlash};
use crate::models::{Role, User};
use crate::routes::admin::{options, parse_id, PageContext, SelectOption, NO_PERMISSION};
use crate::routes::home::Html;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/users";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(index).post(save))
        .route("/admin/users/new", get(new_form))
        .route("/admin/users/{id}/edit", get(edit_form))
        .route("/admin/users/{id}/delete", post(remove))
}

#[derive(Template)]
#[template(path = "pages/admin/users_list.html")]
struct ListTemplate {
    ctx: PageContext,
    active: &'static str,
    rows: Vec<Row>,
}

struct Row {
    id: i64,
    name: String,
    email: String,
    role_label: &'static str,
}

#[derive(Template)]
#[template(path = "pages/admin/users_form.html")]
struct FormTemplate {
    ctx: PageContext,
    active: &'static str,
    id: String,
    name: String,
    email: String,
    roles: Vec<SelectOption>,
    is_new: bool,
}

fn form_template(ctx: PageContext, draft: &User, role_value: &str) -> FormTemplate {
    FormTemplate {
        ctx,
        active: "users",
        id: draft.id.map(|id| id.to_string()).unwrap_or_default(),
        name: draft.name.clone(),
        email: draft.email.clone(),
        roles: options(
            vec![
                ("".into(), "Select a role...".into()),
                (Role::Administrator.as_wire().into(), "Administrator".into()),
                (Role::Broker.as_wire().into(), "Broker".into()),
                (Role::Client.as_wire().into(), "Client".into()),
            ],
            role_value,
        ),
        is_new: draft.id.is_none(),
    }
}

async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    IncomingFlash(flash): IncomingFlash,
) -> Response {
    let consumed = flash.is_some();
    let (rows, flash) = match state.api.list::<User>().await {
        Ok(users) => (
            users
                .into_iter()
                .filter_map(|u| {
                    Some(Row {
                        id: u.id?,
                        name: u.name,
                        email: u.email,
                        role_label: u.role.label(),
                    })
                })
                .collect(),
            flash,
        ),
        Err(e) => {
            tracing::error!("Failed to load users: {}", e);
            (
                Vec::new(),
                Some(Flash::error("Could not load users. Try again.")),
            )
        }
    };

    let template = ListTemplate {
        ctx: PageContext::new(&user.0, flash),
        active: "users",
        rows,
    };
    flash::page(Html(template), consumed)
}

async fn new_form(user: CurrentUser) -> Response {
    if !user.0.role.can_create() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }
    let ctx = PageContext::new(&user.0, None);
    Html(form_template(ctx, &User::default(), "")).into_response()
}

async fn edit_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Response {
    if !user.0.role.can_edit() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }
    // The backend exposes no single-user GET; edits start from the list.
    let draft = match state.api.list::<User>().await {
        Ok(users) => users.into_iter().find(|u| u.id == Some(id)),
        Err(e) => {
            tracing::error!("Failed to load users: {}", e);
            return flash::redirect(LIST_PATH, Flash::error("Could not load the user. Try again."));
        }
    };
    match draft {
        Some(draft) => {
            let role_value = draft.role.as_wire();
            let ctx = PageContext::new(&user.0, None);
            Html(form_template(ctx, &draft, role_value)).into_response()
        }
        None => flash::redirect(LIST_PATH, Flash::error("User not found.")),
    }
}

#[derive(Deserialize)]
struct UserForm {
    id: Option<String>,
    name: String,
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    role: String,
}

async fn save(State(state): State<AppState>, user: CurrentUser, Form(form): Form<UserForm>) -> Response {
    let id = parse_id(&form.id);
    let allowed = match id {
        Some(_) => user.0.role.can_edit(),
        None => user.0.role.can_create(),
    };
    if !allowed {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }

    let password = Some(form.password.clone()).filter(|p| !p.trim().is_empty());
    let draft = User {
        id,
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        password,
        role: Role::from_wire(&form.role),
    };

    let rerender = |message: String| {
        let ctx = PageContext::new(&user.0, Some(Flash::error(message)));
        Html(form_template(ctx, &draft, &form.role)).into_response()
    };

    if form.role.is_empty() {
        return rerender("Select a role".into());
    }
    if let Err(message) = draft.validate() {
        return rerender(message);
    }

    match state.api.save(&draft).await {
        Ok(()) => {
            let message = if id.is_some() {
                "User updated."
            } else {
                "User created."
            };
            flash::redirect(LIST_PATH, Flash::success(message))
        }
        Err(e) => {
            tracing::error!("Failed to save the user: {}", e);
            rerender("Could not save the user. Check the data and try again.".into())
        }
    }
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Response {
    if !user.0.role.can_delete() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }
    match state.api.remove::<User>(id).await {
        Ok(()) => flash::redirect(LIST_PATH, Flash::success("User deleted.")),
        Err(e) => {
            tracing::error!("Failed to delete the user: {}", e);
            flash::redirect(LIST_PATH, Flash::error("Could not delete the user. Try again."))
        }
    }
}
