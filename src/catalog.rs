//! Client-side joins over the backend collections.
//!
//! The backend returns flat lists and offers no per-property photo query,
//! so every view that needs a cover image fetches the full photo collection
//! and filters here. All resolution is pure and order-preserving: backend
//! fetch order decides ties, the `ordem` field is not consulted.

use crate::models::{Photo, Property};

/// Resolve the photo that represents a property in list and summary views.
///
/// The first photo flagged as cover wins; with no flagged photo the first
/// photo for the property stands in; a property without photos has none.
pub fn resolve_cover(property_id: i64, photos: &[Photo]) -> Option<&Photo> {
    let mut first = None;
    for photo in photos.iter().filter(|p| p.property_id() == Some(property_id)) {
        if photo.is_cover {
            return Some(photo);
        }
        if first.is_none() {
            first = Some(photo);
        }
    }
    first
}

/// All photos belonging to a property, in fetch order.
pub fn photos_for(property_id: i64, photos: &[Photo]) -> Vec<&Photo> {
    photos
        .iter()
        .filter(|p| p.property_id() == Some(property_id))
        .collect()
}

/// Photos whose owning property still exists in the property list. The
/// gallery page hides orphans left behind by property deletion.
pub fn with_known_property<'a>(photos: &'a [Photo], properties: &[Property]) -> Vec<&'a Photo> {
    photos
        .iter()
        .filter(|photo| {
            photo
                .property_id()
                .is_some_and(|id| properties.iter().any(|p| p.id == Some(id)))
        })
        .collect()
}

/// Price label for a listing: rentals show the monthly price suffixed
/// `/month`, everything else shows the sale price; a missing price reads 0.
pub fn display_price(property: &Property) -> String {
    if property.is_rental() {
        format!("{}/month", format_amount(property.rent_price))
    } else {
        format_amount(property.sale_price)
    }
}

fn format_amount(amount: Option<f64>) -> String {
    match amount {
        Some(value) => format!("{}", value),
        None => "0".to_string(),
    }
}

/// English label for the backend's purpose vocabulary; unknown values pass
/// through untouched so old data still renders.
pub fn purpose_label(purpose: &str) -> String {
    match purpose {
        "Venda" => "Sale".to_string(),
        "Aluguel" => "Rent".to_string(),
        "Residencial" => "Residential".to_string(),
        "Comercial" => "Commercial".to_string(),
        other => other.to_string(),
    }
}

/// English label for the backend's status vocabulary.
pub fn status_label(status: &str) -> String {
    match status {
        "Ativo" => "Active".to_string(),
        "Inativo" => "Inactive".to_string(),
        "Vendido" => "Sold".to_string(),
        "Alugado" => "Rented".to_string(),
        other => other.to_string(),
    }
}

/// Display-ready card for the marketing home and the admin property grid.
#[derive(Debug, Clone)]
pub struct PropertyCard {
    pub id: i64,
    pub title: String,
    pub price_label: String,
    pub purpose_label: String,
    pub location_label: String,
    pub cover_path: String,
    pub has_cover: bool,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub garages: i64,
    pub total_area_label: String,
}

/// Join properties with their resolved covers into cards, skipping records
/// the backend returned without an id.
pub fn property_cards(properties: &[Property], photos: &[Photo]) -> Vec<PropertyCard> {
    properties
        .iter()
        .filter_map(|property| {
            let id = property.id?;
            let cover = resolve_cover(id, photos);
            Some(PropertyCard {
                id,
                title: property.title.clone(),
                price_label: display_price(property),
                purpose_label: purpose_label(&property.purpose),
                location_label: location_label(property),
                cover_path: cover.map(|c| c.path.clone()).unwrap_or_default(),
                has_cover: cover.is_some(),
                bedrooms: property.bedrooms.unwrap_or(0),
                bathrooms: property.bathrooms.unwrap_or(0),
                garages: property.garages.unwrap_or(0),
                total_area_label: format_amount(property.total_area),
            })
        })
        .collect()
}

/// Display-ready detail view: the card data plus the full gallery,
/// description and feature tags.
#[derive(Debug, Clone)]
pub struct PropertyDetail {
    pub card: PropertyCard,
    pub status_label: String,
    pub type_label: String,
    pub address_label: String,
    pub built_area_label: String,
    pub description: String,
    pub features: Vec<String>,
    pub gallery: Vec<String>,
}

pub fn property_detail(property: &Property, photos: &[Photo]) -> Option<PropertyDetail> {
    let id = property.id?;
    let card = property_cards(std::slice::from_ref(property), photos).pop()?;
    let gallery = photos_for(id, photos)
        .into_iter()
        .map(|p| p.path.clone())
        .collect();
    Some(PropertyDetail {
        card,
        status_label: status_label(&property.status),
        type_label: property
            .property_type
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_default(),
        address_label: address_label(property),
        built_area_label: format_amount(property.built_area),
        description: property.description.clone(),
        features: split_features(&property.features),
        gallery,
    })
}

fn location_label(property: &Property) -> String {
    match &property.neighborhood {
        Some(n) if !n.city.is_empty() => format!("{}, {}", n.name, n.city),
        Some(n) => n.name.clone(),
        None => String::new(),
    }
}

fn address_label(property: &Property) -> String {
    let mut label = property.street.clone();
    if !property.number.is_empty() {
        if !label.is_empty() {
            label.push_str(", ");
        }
        label.push_str(&property.number);
    }
    if !property.unit.is_empty() {
        if !label.is_empty() {
            label.push_str(" - ");
        }
        label.push_str(&property.unit);
    }
    label
}

fn split_features(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
