//! JSON response bodies and reply helpers

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};

/// `{ "error": ... }` — every non-2xx body has this shape
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

/// `{ "id": ..., "message": ... }` — creations and survey deletions
#[derive(Debug, Serialize)]
pub(crate) struct IdMessageBody {
    pub(crate) id: String,
    pub(crate) message: &'static str,
}

/// `{ "message": ... }` — consent deletions
#[derive(Debug, Serialize)]
pub(crate) struct MessageBody {
    pub(crate) message: &'static str,
}

/// `{ "status": "ok" }`
#[derive(Debug, Serialize)]
pub(crate) struct HealthBody {
    pub(crate) status: &'static str,
}

/// JSON body with an explicit status
pub(crate) fn json_with(status: StatusCode, body: &impl Serialize) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(body), status)
}

/// `{error}` body with the given status
pub(crate) fn error(status: StatusCode, message: impl Into<String>) -> WithStatus<Json> {
    json_with(
        status,
        &ErrorBody {
            error: message.into(),
        },
    )
}

/// Generic 500, used after the fault has been logged
pub(crate) fn server_error() -> WithStatus<Json> {
    error(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
}
