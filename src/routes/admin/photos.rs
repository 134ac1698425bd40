use askama::Template;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use bytes::Bytes;
use serde::Deserialize;

use crate::api::{PhotoUpload, Resource};
use crate::catalog;
use crate::extractors::CurrentUser;
use crate::flash::{self, Flash, IncomingFlash};
use crate::models::{Photo, Property};
use crate::routes::admin::{options, PageContext, SelectOption, NO_PERMISSION};
use crate::routes::home::Html;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/photos";

// Generous enough for phone photos; the backend does its own checking.
const UPLOAD_LIMIT: usize = 8 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/photos", get(index).post(create))
        .route("/admin/photos/new", get(new_form))
        .route("/admin/photos/{id}/edit", get(edit_form))
        .route("/admin/photos/{id}", post(update))
        .route("/admin/photos/{id}/delete", post(remove))
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
}

#[derive(Template)]
#[template(path = "pages/admin/photos_list.html")]
struct ListTemplate {
    ctx: PageContext,
    active: &'static str,
    rows: Vec<Row>,
}

struct Row {
    id: i64,
    path: String,
    file_name: String,
    property_title: String,
    is_cover: bool,
    has_image: bool,
}

#[derive(Template)]
#[template(path = "pages/admin/photos_form.html")]
struct FormTemplate {
    ctx: PageContext,
    active: &'static str,
    id: String,
    path: String,
    file_name: String,
    properties: Vec<SelectOption>,
    is_cover: bool,
    order: String,
    is_new: bool,
}

fn form_template(ctx: PageContext, draft: &Photo, properties: &[Property]) -> FormTemplate {
    let selected = draft
        .property_id()
        .map(|id| id.to_string())
        .unwrap_or_default();
    let mut property_options = vec![("".to_string(), "Select a property...".to_string())];
    property_options.extend(
        properties
            .iter()
            .filter_map(|p| Some((p.id?.to_string(), p.title.clone()))),
    );

    FormTemplate {
        ctx,
        active: "photos",
        id: draft.id.map(|id| id.to_string()).unwrap_or_default(),
        path: draft.path.clone(),
        file_name: draft.file_name.clone(),
        properties: options(property_options, &selected),
        is_cover: draft.is_cover,
        order: draft.order.unwrap_or(1).to_string(),
        is_new: draft.id.is_none(),
    }
}

async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    IncomingFlash(flash): IncomingFlash,
) -> Response {
    let consumed = flash.is_some();
    let (rows, flash) = match tokio::try_join!(
        state.api.list::<Photo>(),
        state.api.list::<Property>(),
    ) {
        Ok((photos, properties)) => (
            catalog::with_known_property(&photos, &properties)
                .into_iter()
                .filter_map(|photo| {
                    Some(Row {
                        id: photo.id?,
                        path: photo.path.clone(),
                        file_name: photo.file_name.clone(),
                        property_title: photo
                            .property
                            .as_ref()
                            .map(|p| p.title.clone())
                            .unwrap_or_default(),
                        is_cover: photo.is_cover,
                        has_image: !photo.path.is_empty(),
                    })
                })
                .collect(),
            flash,
        ),
        Err(e) => {
            tracing::error!("Failed to load photos: {}", e);
            (
                Vec::new(),
                Some(Flash::error("Could not load photos. Try again.")),
            )
        }
    };

    let template = ListTemplate {
        ctx: PageContext::new(&user.0, flash),
        active: "photos",
        rows,
    };
    flash::page(Html(template), consumed)
}

async fn new_form(State(state): State<AppState>, user: CurrentUser) -> Response {
    if !user.0.role.can_create() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }
    match state.api.list::<Property>().await {
        Ok(properties) => {
            let ctx = PageContext::new(&user.0, None);
            Html(form_template(ctx, &Photo::default(), &properties)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load properties for the photo form: {}", e);
            flash::redirect(LIST_PATH, Flash::error("Could not load the form. Try again."))
        }
    }
}

async fn edit_form(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Response {
    if !user.0.role.can_edit() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }
    match tokio::try_join!(
        state.api.list::<Photo>(),
        state.api.list::<Property>(),
    ) {
        Ok((photos, properties)) => {
            match photos.into_iter().find(|p| p.id == Some(id)) {
                Some(draft) => {
                    let ctx = PageContext::new(&user.0, None);
                    Html(form_template(ctx, &draft, &properties)).into_response()
                }
                None => flash::redirect(LIST_PATH, Flash::error("Photo not found.")),
            }
        }
        Err(e) => {
            tracing::error!("Failed to load the photo form data: {}", e);
            flash::redirect(LIST_PATH, Flash::error("Could not load the form. Try again."))
        }
    }
}

/// POST /admin/photos. Multipart upload of a new photo; the picker only
/// exists in create mode; edits go through the metadata route below.
async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Response {
    if !user.0.role.can_create() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }

    let mut file: Option<(String, Bytes)> = None;
    let mut property_id = String::new();
    let mut is_cover = false;
    let mut order: i64 = 1;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Malformed upload request: {}", e);
                return flash::redirect(
                    LIST_PATH,
                    Flash::error("Could not read the upload. Try again."),
                );
            }
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(data) if !file_name.is_empty() && !data.is_empty() => {
                        file = Some((file_name, data));
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("Failed to read the uploaded file: {}", e);
                        return flash::redirect(
                            LIST_PATH,
                            Flash::error("Could not read the upload. Try again."),
                        );
                    }
                }
            }
            "property_id" => property_id = field.text().await.unwrap_or_default(),
            "is_cover" => is_cover = true,
            "order" => {
                order = field
                    .text()
                    .await
                    .ok()
                    .and_then(|raw| raw.trim().parse().ok())
                    .unwrap_or(1);
            }
            _ => {}
        }
    }

    let draft = Photo {
        is_cover,
        order: Some(order),
        property: parse_opt_id(&property_id).map(|id| Property {
            id: Some(id),
            ..Property::default()
        }),
        ..Photo::default()
    };

    let Some((file_name, data)) = file else {
        return rerender_create_form(&state, &user, &draft, "Choose an image to upload").await;
    };
    let Some(property_id) = parse_opt_id(&property_id) else {
        return rerender_create_form(&state, &user, &draft, "Select a property").await;
    };

    let upload = PhotoUpload {
        file_name,
        data,
        property_id,
        is_cover,
        order,
    };
    match state.api.upload_photo(upload).await {
        Ok(()) => flash::redirect(LIST_PATH, Flash::success("Photo uploaded.")),
        Err(e) => {
            tracing::error!("Failed to upload the photo: {}", e);
            rerender_create_form(&state, &user, &draft, "Could not save the photo. Try again.").await
        }
    }
}

/// Bring the create form back with the draft and an error flash; if even the
/// property list is gone, fall back to the gallery with the same message.
async fn rerender_create_form(
    state: &AppState,
    user: &CurrentUser,
    draft: &Photo,
    message: &str,
) -> Response {
    match state.api.list::<Property>().await {
        Ok(properties) => {
            let ctx = PageContext::new(&user.0, Some(Flash::error(message)));
            Html(form_template(ctx, draft, &properties)).into_response()
        }
        Err(_) => flash::redirect(LIST_PATH, Flash::error(message)),
    }
}

#[derive(Deserialize)]
struct PhotoForm {
    #[serde(default)]
    property_id: String,
    #[serde(default)]
    is_cover: Option<String>,
    #[serde(default)]
    order: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    file_name: String,
}

/// POST /admin/photos/{id}. Metadata-only update; the stored image is kept.
async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Form(form): Form<PhotoForm>,
) -> Response {
    if !user.0.role.can_edit() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }

    let properties = match state.api.list::<Property>().await {
        Ok(properties) => properties,
        Err(e) => {
            tracing::error!("Failed to load properties for the photo update: {}", e);
            return flash::redirect(LIST_PATH, Flash::error("Could not save the photo. Try again."));
        }
    };

    let property = parse_opt_id(&form.property_id)
        .and_then(|pid| properties.iter().find(|p| p.id == Some(pid)).cloned());
    let draft = Photo {
        id: Some(id),
        path: form.path.clone(),
        file_name: form.file_name.clone(),
        is_cover: form.is_cover.is_some(),
        order: form.order.trim().parse().ok(),
        property,
    };

    if let Err(message) = draft.validate() {
        let ctx = PageContext::new(&user.0, Some(Flash::error(message)));
        return Html(form_template(ctx, &draft, &properties)).into_response();
    }

    match state.api.update(id, &draft).await {
        Ok(()) => flash::redirect(LIST_PATH, Flash::success("Photo updated.")),
        Err(e) => {
            tracing::error!("Failed to update the photo: {}", e);
            let ctx = PageContext::new(
                &user.0,
                Some(Flash::error("Could not save the photo. Try again.")),
            );
            Html(form_template(ctx, &draft, &properties)).into_response()
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
    match state.api.remove::<Photo>(id).await {
        Ok(()) => flash::redirect(LIST_PATH, Flash::success("Photo deleted.")),
        Err(e) => {
            tracing::error!("Failed to delete the photo: {}", e);
            flash::redirect(LIST_PATH, Flash::error("Could not delete the photo. Try again."))
        }
    }
}

fn parse_opt_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}
