use std::num::IntErrorKind;

use atelier_cms::ImageTransform;
use atelier_core::{
    apply_filter, count_facets, derive_facets, stone_enquiry_message, whatsapp_link, FacetCounts,
    Facets, FilterState, StoneRecord, ValidationError,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{fetch_available_stone, map_cms_error, validation_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct StoneItem {
    id: String,
    name: String,
    slug: Option<String>,
    category: Option<String>,
    origin: Option<String>,
    carat: Option<f64>,
    price: Option<Decimal>,
    currency: String,
    price_display: String,
    image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct StoneDetail {
    #[serde(flatten)]
    item: StoneItem,
    description: Option<String>,
    image_urls: Vec<String>,
    whatsapp_url: String,
}

#[derive(Debug, Serialize)]
pub(super) struct StoneList {
    stones: Vec<StoneItem>,
    total: usize,
    active_filters: usize,
    facets: Facets,
    counts: FacetCounts,
}

/// Catalog query string. `location` and `category` may repeat and may hold
/// comma-separated values.
#[derive(Debug, Default, PartialEq)]
pub(super) struct StoneQuery {
    pub group: Option<String>,
    pub filter: FilterState,
}

fn split_values(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|v| !v.is_empty())
}

/// Whole carats. Values above the slider range saturate and are clamped by
/// [`FilterState::with_min_carat`].
fn parse_min_carat(raw: &str) -> Result<u8, ValidationError> {
    match raw.trim().parse::<u64>() {
        Ok(value) => Ok(u8::try_from(value).unwrap_or(u8::MAX)),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u8::MAX),
        Err(_) => Err(ValidationError {
            field: "min_carat",
            message: "must be a whole number of carats".to_string(),
        }),
    }
}

pub(super) fn parse_stone_query(pairs: &[(String, String)]) -> Result<StoneQuery, ValidationError> {
    let mut locations = Vec::new();
    let mut categories = Vec::new();
    let mut min_carat = 0;
    let mut group = None;

    for (key, value) in pairs {
        match key.as_str() {
            "location" => locations.extend(split_values(value)),
            "category" => categories.extend(split_values(value)),
            "min_carat" if value.trim().is_empty() => {}
            "min_carat" => min_carat = parse_min_carat(value)?,
            "group" => group = Some(value.trim().to_string()).filter(|g| !g.is_empty()),
            _ => {}
        }
    }

    Ok(StoneQuery {
        group,
        filter: FilterState::new()
            .with_locations(locations)
            .with_categories(categories)
            .with_min_carat(min_carat),
    })
}

impl StoneItem {
    fn from_record(stone: &StoneRecord, state: &AppState) -> Self {
        Self {
            id: stone.id.clone(),
            name: stone.name.clone(),
            slug: stone.slug.clone(),
            category: stone.category.clone(),
            origin: stone.origin.clone(),
            carat: stone.carat,
            price: stone.price,
            currency: stone.currency.clone(),
            price_display: stone.price_display().to_string(),
            image_url: stone
                .cover_image()
                .and_then(|reference| state.images.url(reference, ImageTransform::card())),
        }
    }
}

pub(super) async fn list_stones(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ApiResponse<StoneList>>, ApiError> {
    let query = parse_stone_query(&pairs).map_err(|e| validation_error(req_id.0.clone(), &e))?;
    let stones = state
        .cms
        .fetch_catalog_page(&state.site.category_groups, query.group.as_deref())
        .await
        .map_err(|e| map_cms_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!(
                    "unknown category group '{}'",
                    query.group.as_deref().unwrap_or_default()
                ),
            )
        })?;

    let facets = derive_facets(&stones, &state.site.facet_defaults());
    let counts = count_facets(&stones);
    let items: Vec<StoneItem> = apply_filter(&stones, &query.filter)
        .into_iter()
        .map(|stone| StoneItem::from_record(stone, &state))
        .collect();

    Ok(ApiResponse::new(
        req_id.0,
        StoneList {
            total: items.len(),
            active_filters: query.filter.active_count(),
            stones: items,
            facets,
            counts,
        },
    ))
}

pub(super) async fn get_stone(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StoneDetail>>, ApiError> {
    let stone = fetch_available_stone(&state, &req_id.0, &id).await?;

    let image_urls = stone
        .images
        .iter()
        .filter_map(|reference| state.images.url(reference, ImageTransform::detail()))
        .collect();
    let whatsapp_url = whatsapp_link(&state.whatsapp_number, &stone_enquiry_message(&stone));

    Ok(ApiResponse::new(
        req_id.0,
        StoneDetail {
            item: StoneItem::from_record(&stone, &state),
            description: stone.description.clone(),
            image_urls,
            whatsapp_url,
        },
    ))
}
