//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tasktrack_core::{ErrorResponse, TrackError};
use tasktrack_service::{Envelope, HealthReport, MutationResponse};
use tracing::error;

/// Header naming where a read was served from.
pub const DATA_SOURCE_HEADER: &str = "x-data-source";

/// Application error type for Axum.
#[derive(Debug)]
pub struct AppError(pub TrackError);

impl From<TrackError> for AppError {
    fn from(err: TrackError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        (status, Json(ErrorResponse::from_error(&self.0))).into_response()
    }
}

/// A read envelope, sent with its source in the `x-data-source` header.
#[derive(Debug)]
pub struct Sourced<T>(pub Envelope<T>);

impl<T: Serialize> IntoResponse for Sourced<T> {
    fn into_response(self) -> Response {
        let source = self.0.source.as_str();
        ([(DATA_SOURCE_HEADER, source)], Json(self.0)).into_response()
    }
}

/// Result type for read handlers.
pub type ReadResult<T> = Result<Sourced<T>, AppError>;

/// Result type for write handlers.
pub type WriteResult<T> = Result<(StatusCode, Json<MutationResponse<T>>), AppError>;

/// Wraps a read envelope.
pub fn sourced<T>(envelope: Envelope<T>) -> ReadResult<T> {
    Ok(Sourced(envelope))
}

/// Sends a write response with the status code it carries.
pub fn mutation<T>(response: MutationResponse<T>) -> WriteResult<T> {
    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::OK);
    Ok((status, Json(response)))
}

/// 200 when every dependency is healthy, 503 otherwise.
pub fn health(report: HealthReport) -> (StatusCode, Json<HealthReport>) {
    let status = if report.overall == tasktrack_service::HealthStatus::Healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
