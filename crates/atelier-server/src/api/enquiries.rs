use atelier_core::{
    stone_enquiry_message, whatsapp_link, Attachment, Configurator, ConfiguratorEnquiry,
    ContactForm, CustomJewelryRequest, Metal, OutboundMail, StoneChoice, StoneEnquiry,
    ValidationError,
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    fetch_available_stone, find_ring, map_mail_error, validation_error, ApiError, ApiResponse,
    AppState,
};

#[derive(Debug, Serialize)]
pub(super) struct Receipt {
    sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    whatsapp_url: Option<String>,
}

/// A file returned by the upload route, resubmitted with the form.
#[derive(Debug, Deserialize)]
pub(super) struct UploadedFileRef {
    filename: String,
    data_url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CustomRequestBody {
    #[serde(flatten)]
    form: CustomJewelryRequest,
    #[serde(default)]
    files: Vec<UploadedFileRef>,
}

/// Configurator enquiry as posted: the selection travels as ids and is
/// resolved against the catalog before anything is mailed.
#[derive(Debug, Deserialize)]
pub(super) struct ConfiguratorEnquiryBody {
    name: String,
    email: String,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    stone_id: String,
    #[serde(default)]
    ring_id: String,
    #[serde(default)]
    metal: Metal,
}

async fn send(state: &AppState, req_id: &str, mail: OutboundMail) -> Result<(), ApiError> {
    state
        .mail
        .send(mail)
        .await
        .map(|_| ())
        .map_err(|e| map_mail_error(req_id.to_string(), &e))
}

pub(super) async fn submit_contact(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ApiResponse<Receipt>>, ApiError> {
    form.validate()
        .map_err(|e| validation_error(req_id.0.clone(), &e))?;

    send(&state, &req_id.0, form.into_mail(&state.routing)).await?;
    Ok(ApiResponse::new(
        req_id.0,
        Receipt {
            sent: true,
            whatsapp_url: None,
        },
    ))
}

/// Looks the stone up first so an enquiry for a sold stone is refused, and
/// both the mail and the WhatsApp follow-up carry catalog details.
pub(super) async fn submit_stone(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(mut form): Json<StoneEnquiry>,
) -> Result<Json<ApiResponse<Receipt>>, ApiError> {
    form.validate()
        .map_err(|e| validation_error(req_id.0.clone(), &e))?;

    let stone = fetch_available_stone(&state, &req_id.0, form.stone_id.trim()).await?;
    form.stone_id.clone_from(&stone.id);
    form.stone_name.clone_from(&stone.name);

    send(&state, &req_id.0, form.into_mail(&state.routing)).await?;
    Ok(ApiResponse::new(
        req_id.0,
        Receipt {
            sent: true,
            whatsapp_url: Some(whatsapp_link(
                &state.whatsapp_number,
                &stone_enquiry_message(&stone),
            )),
        },
    ))
}

pub(super) async fn submit_custom(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CustomRequestBody>,
) -> Result<Json<ApiResponse<Receipt>>, ApiError> {
    let CustomRequestBody { mut form, files } = body;
    for file in files {
        let attachment = Attachment::from_data_url(
            &file.filename,
            &file.data_url,
            &state.upload_limits,
        )
        .map_err(|e| {
            validation_error(
                req_id.0.clone(),
                &ValidationError {
                    field: "attachments",
                    message: e.to_string(),
                },
            )
        })?;
        form.attachments.push(attachment);
    }

    form.validate()
        .map_err(|e| validation_error(req_id.0.clone(), &e))?;

    send(&state, &req_id.0, form.into_mail(&state.routing)).await?;
    Ok(ApiResponse::new(
        req_id.0,
        Receipt {
            sent: true,
            whatsapp_url: None,
        },
    ))
}

pub(super) async fn submit_configurator(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ConfiguratorEnquiryBody>,
) -> Result<Json<ApiResponse<Receipt>>, ApiError> {
    let mut form = ConfiguratorEnquiry {
        name: body.name,
        email: body.email,
        phone: body.phone,
        note: body.note,
        selection: Configurator::new(),
    };
    form.validate_contact()
        .map_err(|e| validation_error(req_id.0.clone(), &e))?;

    let stone_id = body.stone_id.trim();
    if stone_id.is_empty() {
        return Err(validation_error(
            req_id.0,
            &ValidationError {
                field: "stone_id",
                message: "choose a stone and a setting first".to_string(),
            },
        ));
    }
    let ring = find_ring(&state, &req_id.0, "ring_id", body.ring_id.trim())?;
    let stone = fetch_available_stone(&state, &req_id.0, stone_id).await?;

    form.selection = Configurator::new()
        .select_stone(StoneChoice::from(&stone))
        .select_ring(ring)
        .select_metal(body.metal);
    form.validate()
        .map_err(|e| validation_error(req_id.0.clone(), &e))?;

    let whatsapp_url = form.selection.whatsapp_url(&state.whatsapp_number);
    send(&state, &req_id.0, form.into_mail(&state.routing)).await?;
    Ok(ApiResponse::new(
        req_id.0,
        Receipt {
            sent: true,
            whatsapp_url,
        },
    ))
}
