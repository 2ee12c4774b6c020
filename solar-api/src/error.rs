use thiserror::Error;

use crate::bill::BillError;

/// Longest part of an error response body kept in [`ApiError::Status`].
pub const MAX_ERROR_BODY_CHARS: usize = 200;

/// Remote service an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Calculation,
    Sizing,
}

impl Service {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Service::Calculation => "Error en el cálculo",
            Service::Sizing => "Error al procesar la factura",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not reach the service: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{} ({status}). {body}", .service.failure_message())]
    Status {
        service: Service,
        status: u16,
        body: String,
    },

    #[error("unexpected response from the service: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Bill(#[from] BillError),
}

/// Keeps the first [`MAX_ERROR_BODY_CHARS`] characters of an error body.
pub fn truncate_body(body: &str) -> String {
    body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect()
}
