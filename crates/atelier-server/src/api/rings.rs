use std::collections::BTreeMap;

use atelier_cms::ImageTransform;
use atelier_core::{Metal, RingShape};
use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct RingItem {
    id: String,
    label: String,
    description: Option<String>,
    /// Preview URL keyed by metal slug.
    image_urls: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize)]
pub(super) struct MetalItem {
    slug: &'static str,
    label: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct RingCatalog {
    rings: Vec<RingItem>,
    metals: Vec<MetalItem>,
}

impl RingItem {
    pub(super) fn from_shape(ring: &RingShape, state: &AppState) -> Self {
        Self {
            id: ring.id.clone(),
            label: ring.label.clone(),
            description: ring.description.clone(),
            image_urls: ring
                .images
                .iter()
                .filter_map(|(metal, reference)| {
                    state
                        .images
                        .url(reference, ImageTransform::detail())
                        .map(|url| (metal.slug(), url))
                })
                .collect(),
        }
    }
}

pub(super) async fn list_rings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<RingCatalog>> {
    let rings = state
        .site
        .rings
        .iter()
        .map(|ring| RingItem::from_shape(ring, &state))
        .collect();
    let metals = Metal::ALL
        .iter()
        .map(|metal| MetalItem {
            slug: metal.slug(),
            label: metal.label(),
        })
        .collect();

    ApiResponse::new(req_id.0, RingCatalog { rings, metals })
}
