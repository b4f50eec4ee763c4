// src/models/extraction.rs

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::grading::RawKey;

const MISSING_IMAGE: &str = "Missing imageData or imageMimeType.";

/// DTO for uploading an answer-key image.
/// Field names match the browser front end (camelCase).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadAnswerKeyRequest {
    /// Base64 image bytes, without the `data:` URL prefix.
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing imageData or imageMimeType."))]
    pub image_data: String,

    #[serde(default)]
    #[validate(
        length(min = 1, message = "Missing imageData or imageMimeType."),
        custom(function = validate_image_mime)
    )]
    pub image_mime_type: String,
}

impl UploadAnswerKeyRequest {
    /// Validates the request and decodes the image.
    pub fn decode(&self) -> Result<Vec<u8>, AppError> {
        if self.image_data.is_empty() || self.image_mime_type.is_empty() {
            return Err(AppError::BadRequest(MISSING_IMAGE.to_string()));
        }
        self.validate()?;

        STANDARD
            .decode(self.image_data.trim())
            .map_err(|e| AppError::BadRequest(format!("imageData is not valid base64: {}", e)))
    }
}

fn validate_image_mime(mime: &str) -> Result<(), validator::ValidationError> {
    if mime.is_empty() || mime.starts_with("image/") {
        return Ok(());
    }
    Err(validator::ValidationError::new("mime_type_must_be_image"))
}

/// Response of the legacy proxy route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadAnswerKeyResponse {
    pub answer_key: RawKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(data: &str, mime: &str) -> UploadAnswerKeyRequest {
        UploadAnswerKeyRequest {
            image_data: data.to_string(),
            image_mime_type: mime.to_string(),
        }
    }

    #[test]
    fn test_decode_valid_image() {
        let bytes = request(&STANDARD.encode(b"\x89PNG"), "image/png").decode().unwrap();
        assert_eq!(bytes, b"\x89PNG");
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(request("", "image/png").decode(), Err(AppError::BadRequest(_))));
        assert!(matches!(request("aGVsbG8=", "").decode(), Err(AppError::BadRequest(_))));
        assert!(matches!(
            request("aGVsbG8=", "application/pdf").decode(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            request("%%%not base64%%%", "image/jpeg").decode(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_camel_case_fields() {
        let req: UploadAnswerKeyRequest =
            serde_json::from_str(r#"{"imageData": "aGk=", "imageMimeType": "image/png"}"#).unwrap();
        assert_eq!(req.image_mime_type, "image/png");

        let req: UploadAnswerKeyRequest = serde_json::from_str("{}").unwrap();
        assert!(req.image_data.is_empty());
    }
}
