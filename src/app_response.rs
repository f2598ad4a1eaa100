use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::contact_form::ContactFormErrors;
use crate::store_error::StoreError;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<StoreError> for AppResponse {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Serialization(e) => AppResponse::from(e),
            StoreError::Corrupt { .. } => AppResponse::SerializationError(err.to_string()),
            StoreError::UnknownDomain(name) => {
                AppResponse::BadRequest(format!("Unknown domain '{}'", name))
            }
            StoreError::InvalidRecord(msg) => AppResponse::ValidationError(msg),
            StoreError::Config(msg) => AppResponse::BadRequest(format!("Configuration: {}", msg)),
            StoreError::Lmdb(_) | StoreError::Io(_) | StoreError::QuotaExceeded { .. } => {
                AppResponse::DatabaseError(err.to_string())
            }
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<ContactFormErrors> for AppResponse {
    fn from(errors: ContactFormErrors) -> Self {
        match serde_json::to_string(&errors.0) {
            Ok(json) => AppResponse::ValidationError(json),
            Err(_) => AppResponse::ValidationError(errors.to_string()),
        }
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }
}
