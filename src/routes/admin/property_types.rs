use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::api::Resource;
use crate::extractors::CurrentUser;
use crate::flash::{self, Flash, IncomingFlash};
use crate::models::PropertyType;
use crate::routes::admin::{parse_id, PageContext, NO_PERMISSION};
use crate::routes::home::Html;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/property-types";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/property-types", get(index).post(save))
        .route("/admin/property-types/new", get(new_form))
        .route("/admin/property-types/{id}/edit", get(edit_form))
        .route("/admin/property-types/{id}/delete", post(remove))
}

#[derive(Template)]
#[template(path = "pages/admin/property_types_list.html")]
struct ListTemplate {
    ctx: PageContext,
    active: &'static str,
    rows: Vec<Row>,
}

struct Row {
    id: i64,
    name: String,
    description: String,
}

#[derive(Template)]
#[template(path = "pages/admin/property_types_form.html")]
struct FormTemplate {
    ctx: PageContext,
    active: &'static str,
    id: String,
    name: String,
    description: String,
    is_new: bool,
}

fn form_template(ctx: PageContext, draft: &PropertyType) -> FormTemplate {
    FormTemplate {
        ctx,
        active: "property-types",
        id: draft.id.map(|id| id.to_string()).unwrap_or_default(),
        name: draft.name.clone(),
        description: draft.description.clone(),
        is_new: draft.id.is_none(),
    }
}

async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    IncomingFlash(flash): IncomingFlash,
) -> Response {
    let consumed = flash.is_some();
    let (rows, flash) = match state.api.list::<PropertyType>().await {
        Ok(types) => (
            types
                .into_iter()
                .filter_map(|t| {
                    Some(Row {
                        id: t.id?,
                        name: t.name,
                        description: t.description,
                    })
                })
                .collect(),
            flash,
        ),
        Err(e) => {
            tracing::error!("Failed to load property types: {}", e);
            (
                Vec::new(),
                Some(Flash::error("Could not load property types. Try again.")),
            )
        }
    };

    let template = ListTemplate {
        ctx: PageContext::new(&user.0, flash),
        active: "property-types",
        rows,
    };
    flash::page(Html(template), consumed)
}

async fn new_form(user: CurrentUser) -> Response {
    if !user.0.role.can_create() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }
    let ctx = PageContext::new(&user.0, None);
    Html(form_template(ctx, &PropertyType::default())).into_response()
}

async fn edit_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Response {
    if !user.0.role.can_edit() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }
    let draft = match state.api.list::<PropertyType>().await {
        Ok(types) => types.into_iter().find(|t| t.id == Some(id)),
        Err(e) => {
            tracing::error!("Failed to load property types: {}", e);
            return flash::redirect(
                LIST_PATH,
                Flash::error("Could not load the property type. Try again."),
            );
        }
    };
    match draft {
        Some(draft) => {
            let ctx = PageContext::new(&user.0, None);
            Html(form_template(ctx, &draft)).into_response()
        }
        None => flash::redirect(LIST_PATH, Flash::error("Property type not found.")),
    }
}

#[derive(Deserialize)]
struct PropertyTypeForm {
    id: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
}

async fn save(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<PropertyTypeForm>,
) -> Response {
    let id = parse_id(&form.id);
    let allowed = match id {
        Some(_) => user.0.role.can_edit(),
        None => user.0.role.can_create(),
    };
    if !allowed {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }

    let draft = PropertyType {
        id,
        name: form.name.trim().to_string(),
        description: form.description.trim().to_string(),
    };

    if let Err(message) = draft.validate() {
        let ctx = PageContext::new(&user.0, Some(Flash::error(message)));
        return Html(form_template(ctx, &draft)).into_response();
    }

    match state.api.save(&draft).await {
        Ok(()) => {
            let message = if id.is_some() {
                "Property type updated."
            } else {
                "Property type created."
            };
            flash::redirect(LIST_PATH, Flash::success(message))
        }
        Err(e) => {
            tracing::error!("Failed to save the property type: {}", e);
            let ctx = PageContext::new(
                &user.0,
                Some(Flash::error("Could not save the property type. Try again.")),
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
    match state.api.remove::<PropertyType>(id).await {
        Ok(()) => flash::redirect(LIST_PATH, Flash::success("Property type deleted.")),
        Err(e) => {
            tracing::error!("Failed to delete the property type: {}", e);
            flash::redirect(
                LIST_PATH,
                Flash::error("Could not delete the property type. Try again."),
            )
        }
    }
}
