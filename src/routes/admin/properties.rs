use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::api::Resource;
use crate::catalog::{self, PropertyCard};
use crate::extractors::CurrentUser;
use crate::flash::{self, Flash, IncomingFlash};
use crate::models::{Neighborhood, Photo, Property, PropertyType};
use crate::routes::admin::{options, parse_id, PageContext, SelectOption, NO_PERMISSION};
use crate::routes::home::Html;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/properties";

const PURPOSES: &[(&str, &str)] = &[
    ("Venda", "Sale"),
    ("Aluguel", "Rent"),
    ("Residencial", "Residential"),
    ("Comercial", "Commercial"),
];

const STATUSES: &[(&str, &str)] = &[
    ("Ativo", "Active"),
    ("Inativo", "Inactive"),
    ("Vendido", "Sold"),
    ("Alugado", "Rented"),
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/properties", get(index).post(save))
        .route("/admin/properties/new", get(new_form))
        .route("/admin/properties/{id}/edit", get(edit_form))
        .route("/admin/properties/{id}/delete", post(remove))
}

#[derive(Template)]
#[template(path = "pages/admin/properties_list.html")]
struct ListTemplate {
    ctx: PageContext,
    active: &'static str,
    cards: Vec<PropertyCard>,
}

#[derive(Template)]
#[template(path = "pages/admin/properties_form.html")]
struct FormTemplate {
    ctx: PageContext,
    active: &'static str,
    id: String,
    title: String,
    sale_price: String,
    rent_price: String,
    purposes: Vec<SelectOption>,
    statuses: Vec<SelectOption>,
    bedrooms: String,
    bathrooms: String,
    garages: String,
    total_area: String,
    built_area: String,
    street: String,
    number: String,
    unit: String,
    postal_code: String,
    description: String,
    features: String,
    neighborhoods: Vec<SelectOption>,
    types: Vec<SelectOption>,
    featured: bool,
    is_new: bool,
}

fn form_template(
    ctx: PageContext,
    draft: &Property,
    neighborhoods: &[Neighborhood],
    types: &[PropertyType],
) -> FormTemplate {
    let selected_neighborhood = draft
        .neighborhood
        .as_ref()
        .and_then(|n| n.id)
        .map(|id| id.to_string())
        .unwrap_or_default();
    let selected_type = draft
        .property_type
        .as_ref()
        .and_then(|t| t.id)
        .map(|id| id.to_string())
        .unwrap_or_default();

    let mut neighborhood_options = vec![("".to_string(), "Select...".to_string())];
    neighborhood_options.extend(
        neighborhoods
            .iter()
            .filter_map(|n| Some((n.id?.to_string(), n.name.clone()))),
    );
    let mut type_options = vec![("".to_string(), "Select...".to_string())];
    type_options.extend(
        types
            .iter()
            .filter_map(|t| Some((t.id?.to_string(), t.name.clone()))),
    );

    FormTemplate {
        ctx,
        active: "properties",
        id: draft.id.map(|id| id.to_string()).unwrap_or_default(),
        title: draft.title.clone(),
        sale_price: opt_f64_field(draft.sale_price),
        rent_price: opt_f64_field(draft.rent_price),
        purposes: options(
            PURPOSES
                .iter()
                .map(|(v, l)| (v.to_string(), l.to_string()))
                .collect(),
            &draft.purpose,
        ),
        statuses: options(
            STATUSES
                .iter()
                .map(|(v, l)| (v.to_string(), l.to_string()))
                .collect(),
            &draft.status,
        ),
        bedrooms: opt_i64_field(draft.bedrooms),
        bathrooms: opt_i64_field(draft.bathrooms),
        garages: opt_i64_field(draft.garages),
        total_area: opt_f64_field(draft.total_area),
        built_area: opt_f64_field(draft.built_area),
        street: draft.street.clone(),
        number: draft.number.clone(),
        unit: draft.unit.clone(),
        postal_code: draft.postal_code.clone(),
        description: draft.description.clone(),
        features: draft.features.clone(),
        neighborhoods: options(neighborhood_options, &selected_neighborhood),
        types: options(type_options, &selected_type),
        featured: draft.featured,
        is_new: draft.id.is_none(),
    }
}

fn opt_f64_field(value: Option<f64>) -> String {
    value.map(|v| format!("{}", v)).unwrap_or_default()
}

fn opt_i64_field(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn new_draft() -> Property {
    Property {
        purpose: "Venda".into(),
        status: "Ativo".into(),
        ..Property::default()
    }
}

async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    IncomingFlash(flash): IncomingFlash,
) -> Response {
    let consumed = flash.is_some();
    let (cards, flash) = match tokio::try_join!(
        state.api.list::<Property>(),
        state.api.list::<Photo>(),
    ) {
        Ok((properties, photos)) => (catalog::property_cards(&properties, &photos), flash),
        Err(e) => {
            tracing::error!("Failed to load properties: {}", e);
            (
                Vec::new(),
                Some(Flash::error("Could not load properties. Try again.")),
            )
        }
    };

    let template = ListTemplate {
        ctx: PageContext::new(&user.0, flash),
        active: "properties",
        cards,
    };
    flash::page(Html(template), consumed)
}

async fn new_form(State(state): State<AppState>, user: CurrentUser) -> Response {
    if !user.0.role.can_create() {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }
    match tokio::try_join!(
        state.api.list::<Neighborhood>(),
        state.api.list::<PropertyType>(),
    ) {
        Ok((neighborhoods, types)) => {
            let ctx = PageContext::new(&user.0, None);
            Html(form_template(ctx, &new_draft(), &neighborhoods, &types)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load the property form data: {}", e);
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
        state.api.list::<Property>(),
        state.api.list::<Neighborhood>(),
        state.api.list::<PropertyType>(),
    ) {
        Ok((properties, neighborhoods, types)) => {
            match properties.into_iter().find(|p| p.id == Some(id)) {
                Some(draft) => {
                    let ctx = PageContext::new(&user.0, None);
                    Html(form_template(ctx, &draft, &neighborhoods, &types)).into_response()
                }
                None => flash::redirect(LIST_PATH, Flash::error("Property not found.")),
            }
        }
        Err(e) => {
            tracing::error!("Failed to load the property form data: {}", e);
            flash::redirect(LIST_PATH, Flash::error("Could not load the form. Try again."))
        }
    }
}

#[derive(Deserialize)]
struct PropertyForm {
    id: Option<String>,
    title: String,
    #[serde(default)]
    sale_price: String,
    #[serde(default)]
    rent_price: String,
    #[serde(default)]
    purpose: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    bedrooms: String,
    #[serde(default)]
    bathrooms: String,
    #[serde(default)]
    garages: String,
    #[serde(default)]
    total_area: String,
    #[serde(default)]
    built_area: String,
    #[serde(default)]
    street: String,
    #[serde(default)]
    number: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    postal_code: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    features: String,
    #[serde(default)]
    neighborhood_id: String,
    #[serde(default)]
    type_id: String,
    #[serde(default)]
    featured: Option<String>,
}

fn parse_opt_f64(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}

fn parse_opt_i64(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse().ok()
    }
}

fn build_draft(
    form: &PropertyForm,
    neighborhoods: &[Neighborhood],
    types: &[PropertyType],
) -> Property {
    // The backend stores embedded records, so the selected ids are resolved
    // against the freshly fetched lists before submitting.
    let neighborhood = parse_opt_i64(&form.neighborhood_id)
        .and_then(|id| neighborhoods.iter().find(|n| n.id == Some(id)).cloned());
    let property_type =
        parse_opt_i64(&form.type_id).and_then(|id| types.iter().find(|t| t.id == Some(id)).cloned());

    Property {
        id: parse_id(&form.id),
        title: form.title.trim().to_string(),
        sale_price: parse_opt_f64(&form.sale_price),
        rent_price: parse_opt_f64(&form.rent_price),
        purpose: form.purpose.trim().to_string(),
        status: form.status.trim().to_string(),
        bedrooms: parse_opt_i64(&form.bedrooms),
        bathrooms: parse_opt_i64(&form.bathrooms),
        garages: parse_opt_i64(&form.garages),
        total_area: parse_opt_f64(&form.total_area),
        built_area: parse_opt_f64(&form.built_area),
        street: form.street.trim().to_string(),
        number: form.number.trim().to_string(),
        unit: form.unit.trim().to_string(),
        postal_code: form.postal_code.trim().to_string(),
        description: form.description.clone(),
        features: form.features.clone(),
        featured: form.featured.is_some(),
        neighborhood,
        property_type,
    }
}

async fn save(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(form): Form<PropertyForm>,
) -> Response {
    let id = parse_id(&form.id);
    let allowed = match id {
        Some(_) => user.0.role.can_edit(),
        None => user.0.role.can_create(),
    };
    if !allowed {
        return flash::redirect(LIST_PATH, Flash::error(NO_PERMISSION));
    }

    let (neighborhoods, types) = match tokio::try_join!(
        state.api.list::<Neighborhood>(),
        state.api.list::<PropertyType>(),
    ) {
        Ok(lists) => lists,
        Err(e) => {
            tracing::error!("Failed to load the property form data: {}", e);
            return flash::redirect(
                LIST_PATH,
                Flash::error("Could not save the property. Try again."),
            );
        }
    };

    let draft = build_draft(&form, &neighborhoods, &types);

    if let Err(message) = draft.validate() {
        let ctx = PageContext::new(&user.0, Some(Flash::error(message)));
        return Html(form_template(ctx, &draft, &neighborhoods, &types)).into_response();
    }

    match state.api.save(&draft).await {
        Ok(()) => {
            let message = if id.is_some() {
                "Property updated."
            } else {
                "Property created."
            };
            flash::redirect(LIST_PATH, Flash::success(message))
        }
        Err(e) => {
            tracing::error!("Failed to save the property: {}", e);
            let ctx = PageContext::new(
                &user.0,
                Some(Flash::error(
                    "Could not save the property. Check the data and try again.",
                )),
            );
            Html(form_template(ctx, &draft, &neighborhoods, &types)).into_response()
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
    match state.api.remove::<Property>(id).await {
        Ok(()) => flash::redirect(LIST_PATH, Flash::success("Property deleted.")),
        Err(e) => {
            tracing::error!("Failed to delete the property: {}", e);
            flash::redirect(
                LIST_PATH,
                Flash::error("Could not delete the property. Try again."),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PropertyForm {
        PropertyForm {
            id: None,
            title: "Garden house".into(),
            sale_price: "450000".into(),
            rent_price: "".into(),
            purpose: "Venda".into(),
            status: "Ativo".into(),
            bedrooms: "3".into(),
            bathrooms: "".into(),
            garages: "junk".into(),
            total_area: "220.5".into(),
            built_area: "".into(),
            street: " Main street ".into(),
            number: "42".into(),
            unit: "".into(),
            postal_code: "".into(),
            description: "Nice".into(),
            features: "Pool, Barbecue".into(),
            neighborhood_id: "1".into(),
            type_id: "9".into(),
            featured: Some("on".into()),
        }
    }

    #[test]
    fn draft_resolves_embedded_records_from_the_lists() {
        let neighborhoods = vec![Neighborhood {
            id: Some(1),
            name: "Centro".into(),
            city: "Panambi".into(),
            state: "RS".into(),
        }];
        let types = vec![PropertyType {
            id: Some(9),
            name: "House".into(),
            description: String::new(),
        }];

        let draft = build_draft(&form(), &neighborhoods, &types);
        assert_eq!(draft.neighborhood.as_ref().unwrap().name, "Centro");
        assert_eq!(draft.property_type.as_ref().unwrap().id, Some(9));
        assert_eq!(draft.sale_price, Some(450000.0));
        assert_eq!(draft.rent_price, None);
        assert_eq!(draft.bedrooms, Some(3));
        assert_eq!(draft.garages, None);
        assert_eq!(draft.street, "Main street");
        assert!(draft.featured);
    }

    #[test]
    fn unknown_selection_ids_leave_the_references_empty() {
        let draft = build_draft(&form(), &[], &[]);
        assert!(draft.neighborhood.is_none());
        assert!(draft.property_type.is_none());
    }
}
