use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::api::Resource;
use crate::extractors::CurrentUser;
use crate::flash::{self, Flash, IncomingFlash};
use crate::models::Neighborhood;
use crate::routes::admin::{parse_id, PageContext, NO_PERMISSION};
use crate::routes::home::Html;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/neighborhoods";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/neighborhoods", get(index).post(save))
        .route("/admin/neighborhoods/new", get(new_form))
        .route("/admin/neighborhoods/{id}/edit", get(edit_form))
        .route("/admin/neighborhoods/{id}/delete", post(remove))
}

#[derive(Template)]
#[template(path = "pages/admin/neighborhoods_list.html")]
struct ListTemplate {
    ctx: PageContext,
    active: &'static str,
    rows: Vec<Row>,
}

struct Row {
    id: i64,
    name: String,
    city: String,
    state: String,
}

#[derive(Template)]
#[template(path = "pages/admin/neighborhoods_form.html")]
struct FormTemplate {
    ctx: PageContext,
    active: &'static str,
    id: String,
    name: String,
    city: String,
    state: String,
    is_new: bool,
}

fn form_template(ctx: PageContext, draft: &Neighborhood) -> FormTemplate {
    FormTemplate {
        ctx,
        active: "neighborhoods",
        id: draft.id.map(|id| id.to_string()).unwrap_or_default(),
        name: draft.name.clone(),
        city: draft.city.clone(),
        state: draft.state.clone(),
        is_new: draft.id.is_none(),
    }
}

/// Defaults for a fresh draft: the agency operates in one town, so the
/// form starts there.
fn new_draft() -> Neighborhood {
    Neighborhood {
        id: None,
        name: String::new(),
        city: "Panambi".into(),
        state: "RS".into(),
    }
}

async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    IncomingFlash(flash): IncomingFlash,
) -> Response {
    let consumed = flash.is_some();
    let (rows, flash) = match state.api.list::<Neighborhood>().await {
        Ok(neighborhoods) => (
            neighborhoods
                .into_iter()
                .filter_map(|n| {
                    Some(Row {
                        id: n.id?,
                        name: n.name,
                        city: n.city,
                        state: n.state,
                    })
                })
                .collect(),
            flash,
        ),
        Err(e) => {
            tracing::error!("Failed to load neighborhoods: {}", e);
            (
                Vec::new(),
                Some(Flash::error("Could not load neighborhoods. Try again.")),
            )
        }
    };

    let template = ListTemplate {
        ctx: PageContext::new(&user.0, flash),
        active: "neighborhoods",
        rows,
    };
    flash::page(Html(template), consumed)
}

async fn new_form(user: CurrentUser) -> Response {
    if !user.0.role.can_create() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }
    let ctx = PageContext::new(&user.0, None);
    Html(form_template(ctx, &new_draft())).into_response()
}

async fn edit_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Response {
    if !user.0.role.can_edit() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }
    let draft = match state.api.list::<Neighborhood>().await {
        Ok(neighborhoods) => neighborhoods.into_iter().find(|n| n.id == Some(id)),
        Err(e) => {
            tracing::error!("Failed to load neighborhoods: {}", e);
            return flash::redirect(
                LIST_PATH,
                Flash::error("Could not load the neighborhood. Try again."),
            );
        }
    };
    match draft {
        Some(draft) => {
            let ctx = PageContext::new(&user.0, None);
            Html(form_template(ctx, &draft)).into_response()
        }
        None => flash::redirect(LIST_PATH, Flash::error("Neighborhood not found.")),
    }
}

#[derive(Deserialize)]
struct NeighborhoodForm {
    id: Option<String>,
    name: String,
    city: String,
    state: String,
}

async fn save(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<NeighborhoodForm>,
) -> Response {
    let id = parse_id(&form.id);
    let allowed = match id {
        Some(_) => user.0.role.can_edit(),
        None => user.0.role.can_create(),
    };
    if !allowed {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }

    let draft = Neighborhood {
        id,
        name: form.name.trim().to_string(),
        city: form.city.trim().to_string(),
        state: form.state.trim().to_string(),
    };

    if let Err(message) = draft.validate() {
        let ctx = PageContext::new(&user.0, Some(Flash::error(message)));
        return Html(form_template(ctx, &draft)).into_response();
    }

    match state.api.save(&draft).await {
        Ok(()) => {
            let message = if id.is_some() {
                "Neighborhood updated."
            } else {
                "Neighborhood created."
            };
            flash::redirect(LIST_PATH, Flash::success(message))
        }
        Err(e) => {
            tracing::error!("Failed to save the neighborhood: {}", e);
            let ctx = PageContext::new(
                &user.0,
                Some(Flash::error("Could not save the neighborhood. Try again.")),
            );
            Html(form_template(ctx, &draft)).into_response()
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
    match state.api.remove::<Neighborhood>(id).await {
        Ok(()) => flash::redirect(LIST_PATH, Flash::success("Neighborhood deleted.")),
        Err(e) => {
            tracing::error!("Failed to delete the neighborhood: {}", e);
            flash::redirect(
                LIST_PATH,
                Flash::error("Could not delete the neighborhood. Try again."),
            )
        }
    }
}
