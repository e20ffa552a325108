pub mod inventories;
pub mod orders;

use actix_web::{error, web, HttpResponse};
use serde::Serialize;

use crate::errors::AppError;

/// Single resources are wrapped as `{"object": ...}`.
#[derive(Debug, Serialize)]
pub struct Object<T> {
    pub object: T,
}

/// Collections are wrapped as `{"objects": [...]}`.
#[derive(Debug, Serialize)]
pub struct Objects<T> {
    pub objects: Vec<T>,
}

pub fn object<T: Serialize>(builder: &mut actix_web::HttpResponseBuilder, value: T) -> HttpResponse {
    builder.json(Object { object: value })
}

pub fn objects<T: Serialize>(values: Vec<T>) -> HttpResponse {
    HttpResponse::Ok().json(Objects { objects: values })
}

/// Malformed JSON bodies get the same `{"errors": ...}` shape as every other
/// failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            error::JsonPayloadError::Deserialize(e) => e.to_string(),
            other => other.to_string(),
        };
        AppError::bad_request(message).into()
    })
}

pub(crate) fn blocking_error(e: error::BlockingError) -> AppError {
    AppError::Internal(e.to_string())
}
