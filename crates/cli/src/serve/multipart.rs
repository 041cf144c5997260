//! Reading the upload form.

use axum::extract::Multipart;
use checkin_core::{AudioUpload, DemoMode};

use super::error::ApiError;

/// Multipart field carrying the audio file.
const AUDIO_FIELD: &str = "audio";
/// Optional multipart field carrying the demo-mode flag as text.
const DEMO_MODE_FIELD: &str = "demoMode";

#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub(crate) audio: Option<AudioUpload>,
    pub(crate) demo_mode: DemoMode,
}

/// Drain the multipart body. Unknown fields are skipped.
///
/// Nothing touches disk here; the whole form is buffered first so a bad
/// request never leaves a stray file behind.
pub(crate) async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(AUDIO_FIELD) => {
                if form.audio.is_some() {
                    return Err(ApiError::BadRequest(
                        "only one 'audio' file may be uploaded per request".to_string(),
                    ));
                }
                let original_name = field.file_name().map(str::to_string);
                let mime_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                form.audio = Some(AudioUpload {
                    original_name,
                    mime_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some(DEMO_MODE_FIELD) => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                form.demo_mode = DemoMode::from_form_value(Some(value.as_str()));
            }
            _ => {}
        }
    }

    Ok(form)
}
