//! Validated JSON extractor.
//!
//! Deserializes a JSON body and validates it with the `validator` crate.
//! Both malformed bodies and invalid fields are answered with 400 and an
//! [`ErrorResponse`]; validation failures carry field-level details.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use tasktrack_core::{field_errors, validation_errors_to_track_error, ErrorResponse};
use validator::{Validate, ValidationErrors};

/// JSON extractor that validates the deserialized value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejection type for validated JSON extraction.
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    /// Body missing, not JSON, or of the wrong shape.
    JsonError(JsonRejection),
    /// Well-formed body with invalid fields.
    ValidationError(ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        let body = match self {
            Self::JsonError(rejection) => ErrorResponse {
                status_code: status.as_u16(),
                code: "INVALID_JSON".to_string(),
                message: format!("Invalid JSON: {}", rejection.body_text()),
                details: None,
            },
            Self::ValidationError(errors) => {
                let details = field_errors(&errors);
                ErrorResponse::from_error(&validation_errors_to_track_error(errors))
                    .with_details(details)
            }
        };
        (status, Json(body)).into_response()
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use http_body_util::BodyExt;
    use tasktrack_service::TaskPayload;

    fn request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/tasks")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn rejection_body(rejection: ValidatedJsonRejection) -> serde_json::Value {
        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_valid_payload_is_extracted() {
        let ValidatedJson(payload) =
            ValidatedJson::<TaskPayload>::from_request(request(r#"{"email":"a@x.com"}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.email.as_deref(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn test_invalid_fields_are_listed() {
        let rejection =
            ValidatedJson::<TaskPayload>::from_request(request(r#"{"email":"nope","progress":101}"#), &())
                .await
                .unwrap_err();
        let body = rejection_body(rejection).await;

        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["details"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let rejection = ValidatedJson::<TaskPayload>::from_request(request("{"), &())
            .await
            .unwrap_err();
        let body = rejection_body(rejection).await;
        assert_eq!(body["code"], "INVALID_JSON");
    }
}
