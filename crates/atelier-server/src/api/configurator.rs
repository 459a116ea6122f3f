use atelier_cms::ImageTransform;
use atelier_core::{Configurator, ConfiguratorAction, Metal, Step, StoneChoice, ValidationError};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{fetch_available_stone, find_ring, validation_error, ApiError, ApiResponse, AppState};

/// Wizard action as sent by the browser. Stones and rings are referenced by
/// id and resolved server-side so prices and labels come from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub(super) enum ActionRequest {
    SelectStone(String),
    SelectRing(String),
    SelectMetal(Metal),
    GoTo(Step),
    ChangeStone,
    ChangeRing,
    Reset,
}

/// `state` stays raw JSON so a malformed or inconsistent state is reported
/// as a field error rather than a body rejection.
#[derive(Debug, Deserialize)]
pub(super) struct ConfiguratorRequest {
    #[serde(default)]
    state: Option<serde_json::Value>,
    action: ActionRequest,
}

fn parse_state(req_id: &str, raw: Option<serde_json::Value>) -> Result<Configurator, ApiError> {
    let Some(raw) = raw.filter(|raw| !raw.is_null()) else {
        return Ok(Configurator::new());
    };
    serde_json::from_value(raw).map_err(|e| {
        validation_error(
            req_id.to_string(),
            &ValidationError {
                field: "state",
                message: e.to_string(),
            },
        )
    })
}

/// Replaces the posted stone and ring with current catalog records, so
/// names, prices and labels never come from the browser.
async fn refresh_selections(
    app: &AppState,
    req_id: &str,
    mut state: Configurator,
    action: &ConfiguratorAction,
) -> Result<Configurator, ApiError> {
    let leaving_stone_step = state.step != Step::Stone;
    let (keeps_stone, keeps_ring) = match action {
        ConfiguratorAction::Reset => (false, false),
        ConfiguratorAction::SelectStone(_) => (false, true),
        ConfiguratorAction::ChangeStone => (!leaving_stone_step, !leaving_stone_step),
        ConfiguratorAction::ChangeRing => (true, state.step != Step::Enquire),
        _ => (true, true),
    };

    if keeps_ring {
        if let Some(ring) = state.selected_ring.take() {
            state.selected_ring = Some(find_ring(app, req_id, "state", &ring.id)?);
        }
    }
    if keeps_stone {
        if let Some(stone) = state.selected_stone.take() {
            let record = fetch_available_stone(app, req_id, &stone.id).await?;
            state.selected_stone = Some(StoneChoice::from(&record));
        }
    }
    Ok(state)
}

#[derive(Debug, Serialize)]
pub(super) struct ConfiguratorView {
    state: Configurator,
    step_title: &'static str,
    can_visit_ring: bool,
    can_visit_enquire: bool,
    ring_preview_url: Option<String>,
    summary: Option<String>,
    whatsapp_url: Option<String>,
}

impl ConfiguratorView {
    pub(super) fn new(state: Configurator, app: &AppState) -> Self {
        Self {
            step_title: state.step.title(),
            can_visit_ring: state.can_visit(Step::Ring),
            can_visit_enquire: state.can_visit(Step::Enquire),
            ring_preview_url: state
                .ring_preview()
                .and_then(|reference| app.images.url(reference, ImageTransform::detail())),
            summary: state.summary_message(),
            whatsapp_url: state.whatsapp_url(&app.whatsapp_number),
            state,
        }
    }
}

async fn resolve_action(
    app: &AppState,
    req_id: &str,
    action: ActionRequest,
) -> Result<ConfiguratorAction, ApiError> {
    Ok(match action {
        ActionRequest::SelectStone(key) => {
            let stone = fetch_available_stone(app, req_id, &key).await?;
            ConfiguratorAction::SelectStone(StoneChoice::from(&stone))
        }
        ActionRequest::SelectRing(id) => {
            ConfiguratorAction::SelectRing(find_ring(app, req_id, "ring", &id)?)
        }
        ActionRequest::SelectMetal(metal) => ConfiguratorAction::SelectMetal(metal),
        ActionRequest::GoTo(step) => ConfiguratorAction::GoTo(step),
        ActionRequest::ChangeStone => ConfiguratorAction::ChangeStone,
        ActionRequest::ChangeRing => ConfiguratorAction::ChangeRing,
        ActionRequest::Reset => ConfiguratorAction::Reset,
    })
}

/// Applies one wizard action to the posted state. The server keeps no
/// session; the browser round-trips `state`.
pub(super) async fn apply_action(
    State(app): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ConfiguratorRequest>,
) -> Result<Json<ApiResponse<ConfiguratorView>>, ApiError> {
    let state = parse_state(&req_id.0, request.state)?;
    let action = resolve_action(&app, &req_id.0, request.action).await?;
    let state = refresh_selections(&app, &req_id.0, state, &action).await?;
    let next = state.apply(action);
    Ok(ApiResponse::new(req_id.0, ConfiguratorView::new(next, &app)))
}
