use crate::error::MissingInput;
use crate::stylist::Submission;
use crate::web::page::{self, PageState, DEFAULT_OCCASION};
use crate::web::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::{info, warn};

/// Field names used by the stylist form
pub const IMAGE_FIELD: &str = "wardrobe";
pub const OCCASION_FIELD: &str = "occasion";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&state.theme, &PageState::Idle, DEFAULT_OCCASION))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "backend": state.stylist.kind(),
        "model": state.stylist.model(),
    }))
}

/// Handle one press of the submit button: at most one backend call per request.
pub async fn suggest(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Rejected stylist form: {}", e);
            let state_view = PageState::Warning {
                message: format!("Could not read the submitted form: {}", e),
                preview: None,
            };
            return (
                StatusCode::BAD_REQUEST,
                Html(page::render(&state.theme, &state_view, "")),
            )
                .into_response();
        }
    };

    let submission = match Submission::new(form.image.clone(), &form.occasion) {
        Ok(submission) => submission,
        Err(missing) => return missing_input_page(&state, &missing, form).await,
    };

    info!(
        upload_bytes = submission.image().len(),
        "Received stylist submission"
    );

    let consultation = state.stylist.consult(&submission).await;
    let view = PageState::Showing {
        preview: consultation.image.as_ref().map(|image| image.to_data_uri()),
        suggestion: consultation.suggestion,
    };

    Html(page::render(&state.theme, &view, submission.occasion())).into_response()
}

/// Warning page for an incomplete form; an upload that did arrive is still previewed.
async fn missing_input_page(state: &AppState, missing: &MissingInput, form: StylistForm) -> Response {
    warn!(
        missing_image = missing.image,
        missing_occasion = missing.occasion,
        "Submission blocked"
    );

    let preview = match form.image {
        Some(bytes) => match state.stylist.prepare_image(bytes).await {
            Ok(image) => Some(image.to_data_uri()),
            Err(e) => {
                warn!("Could not preview upload: {}", e);
                None
            }
        },
        None => None,
    };

    let view = PageState::Warning {
        message: missing.to_string(),
        preview,
    };
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(page::render(&state.theme, &view, &form.occasion)),
    )
        .into_response()
}

#[derive(Debug, Default)]
struct StylistForm {
    image: Option<Bytes>,
    occasion: String,
}

async fn read_form(
    mut multipart: Multipart,
) -> Result<StylistForm, axum::extract::multipart::MultipartError> {
    let mut form = StylistForm::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            IMAGE_FIELD => {
                let data = field.bytes().await?;
                if !data.is_empty() {
                    form.image = Some(data);
                }
            }
            OCCASION_FIELD => {
                form.occasion = field.text().await?;
            }
            _ => {}
        }
    }

    Ok(form)
}
