//! Route tree and handlers
//!
//! One filter per endpoint, composed in order: API routes, the API 404
//! catch-all, then the static client with its SPA fallback. Handlers never
//! reject; every outcome is an explicit status + JSON body, so the only
//! rejections left for [`recover`](warp::Filter::recover) are transport-level
//! ones (oversized bodies, method mismatches on static files).

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use rdc_core::{
    validate_consent, validate_survey, validate_survey_update, ConsentPayload, SubmissionId,
    SurveyPayload, SurveyUpdate,
};
use rdc_store::{StoreError, SubmissionStore, SurveyFilter};
use serde::Deserialize;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

use crate::reply::{self, HealthBody, IdMessageBody, MessageBody};

/// Request body cap, matching the original service's `10kb` JSON limit
const BODY_LIMIT: u64 = 10 * 1024;

/// Build the complete route tree: API + static client + SPA fallback
pub fn routes(
    store: Arc<SubmissionStore>,
    static_dir: PathBuf,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    api_routes(store)
        .or(site_routes(&static_dir))
        .with(warp::trace::request())
        .recover(handle_rejection)
}

/// All `/api/...` endpoints, ending in the JSON 404 catch-all
fn api_routes(
    store: Arc<SubmissionStore>,
) -> impl Filter<Extract = (WithStatus<Json>,), Error = Rejection> + Clone {
    let health = warp::path!("api" / "health")
        .and(warp::get())
        .map(|| reply::json_with(StatusCode::OK, &HealthBody { status: "ok" }));

    let create_consent = warp::path!("api" / "consent")
        .and(warp::post())
        .and(json_body())
        .and(warp::addr::remote())
        .and(warp::header::optional::<String>("user-agent"))
        .and(with_store(store.clone()))
        .and_then(create_consent);

    let delete_consent = warp::path!("api" / "consent" / String)
        .and(warp::delete())
        .and(with_store(store.clone()))
        .and_then(delete_consent);

    let create_survey = warp::path!("api" / "surveys")
        .and(warp::post())
        .and(json_body())
        .and(warp::addr::remote())
        .and(with_store(store.clone()))
        .and_then(create_survey);

    let list_surveys = warp::path!("api" / "surveys")
        .and(warp::get())
        .and(warp::query::<ListQuery>())
        .and(with_store(store.clone()))
        .and_then(list_surveys);

    let get_survey = warp::path!("api" / "surveys" / String)
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(get_survey);

    let update_survey = warp::path!("api" / "surveys" / String)
        .and(warp::patch())
        .and(json_body())
        .and(with_store(store.clone()))
        .and_then(update_survey);

    let delete_survey = warp::path!("api" / "surveys" / String)
        .and(warp::delete())
        .and(with_store(store))
        .and_then(delete_survey);

    // Anything else under /api is a JSON 404, never the SPA fallback
    let api_fallback =
        warp::path("api").map(|| reply::error(StatusCode::NOT_FOUND, "Not Found"));

    health
        .or(create_consent)
        .unify()
        .or(delete_consent)
        .unify()
        .or(create_survey)
        .unify()
        .or(list_surveys)
        .unify()
        .or(get_survey)
        .unify()
        .or(update_survey)
        .unify()
        .or(delete_survey)
        .unify()
        .or(api_fallback)
        .unify()
}

/// Static client files, falling back to the entry page for client routing
fn site_routes(
    static_dir: &std::path::Path,
) -> impl Filter<Extract = (warp::fs::File,), Error = Rejection> + Clone {
    warp::fs::dir(static_dir.to_path_buf())
        .or(warp::fs::file(static_dir.join("index.html")))
        .unify()
}

fn with_store(
    store: Arc<SubmissionStore>,
) -> impl Filter<Extract = (Arc<SubmissionStore>,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

/// Raw request body; size and JSON shape are checked in [`parse_json`] so
/// an oversized or malformed payload is an explicit status, never a
/// framework rejection that could fall through to the wrong route
fn json_body() -> impl Filter<Extract = (Bytes,), Error = Rejection> + Clone {
    warp::body::bytes()
}

/// Parse a JSON body, yielding the ready-made error reply on failure
fn parse_json<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, WithStatus<Json>> {
    if body.len() as u64 > BODY_LIMIT {
        return Err(reply::error(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
        ));
    }
    serde_json::from_slice(body)
        .map_err(|_| reply::error(StatusCode::BAD_REQUEST, "Invalid JSON payload"))
}

/// Listing query parameters, parsed leniently like the original service
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
    reviewed: Option<String>,
    #[serde(rename = "respondentId")]
    respondent_id: Option<String>,
}

async fn create_consent(
    body: Bytes,
    remote: Option<SocketAddr>,
    user_agent: Option<String>,
    store: Arc<SubmissionStore>,
) -> Result<WithStatus<Json>, Infallible> {
    let payload: ConsentPayload = match parse_json(&body) {
        Ok(payload) => payload,
        Err(rejection) => return Ok(rejection),
    };

    let mut new_consent = match validate_consent(&payload) {
        Ok(sanitized) => sanitized,
        Err(err) => return Ok(reply::error(StatusCode::BAD_REQUEST, err.to_string())),
    };
    new_consent.ip_address = remote.map(|addr| addr.ip().to_string());
    new_consent.user_agent = user_agent;

    match store.create_consent(new_consent) {
        Ok(id) => Ok(reply::json_with(
            StatusCode::CREATED,
            &IdMessageBody {
                id: id.to_string(),
                message: "Consent stored",
            },
        )),
        Err(err) => {
            tracing::error!(error = %err, "consent write failed");
            Ok(reply::server_error())
        }
    }
}

async fn delete_consent(
    id: String,
    store: Arc<SubmissionStore>,
) -> Result<WithStatus<Json>, Infallible> {
    let Ok(id) = id.parse::<SubmissionId>() else {
        return Ok(reply::error(StatusCode::NOT_FOUND, "Not found"));
    };

    match store.delete_consent(&id) {
        Ok(()) => Ok(reply::json_with(
            StatusCode::OK,
            &MessageBody { message: "Deleted" },
        )),
        Err(StoreError::NotFound) => Ok(reply::error(StatusCode::NOT_FOUND, "Not found")),
        Err(err) => {
            tracing::error!(error = %err, "consent delete failed");
            Ok(reply::server_error())
        }
    }
}

async fn create_survey(
    body: Bytes,
    remote: Option<SocketAddr>,
    store: Arc<SubmissionStore>,
) -> Result<WithStatus<Json>, Infallible> {
    let payload: SurveyPayload = match parse_json(&body) {
        Ok(payload) => payload,
        Err(rejection) => return Ok(rejection),
    };

    let mut new_survey = match validate_survey(&payload, chrono::Utc::now()) {
        Ok(normalized) => normalized,
        Err(err) => return Ok(reply::error(StatusCode::BAD_REQUEST, err.to_string())),
    };
    // The observed peer address wins over anything the client claimed
    if let Some(addr) = remote {
        new_survey.metadata.ip = Some(addr.ip().to_string());
    }

    match store.create_survey(new_survey) {
        Ok(id) => Ok(reply::json_with(
            StatusCode::CREATED,
            &IdMessageBody {
                id: id.to_string(),
                message: "Survey saved",
            },
        )),
        Err(StoreError::Validation(err)) => {
            Ok(reply::error(StatusCode::BAD_REQUEST, err.to_string()))
        }
        Err(err) => {
            tracing::error!(error = %err, "survey write failed");
            Ok(reply::server_error())
        }
    }
}

async fn list_surveys(
    query: ListQuery,
    store: Arc<SubmissionStore>,
) -> Result<WithStatus<Json>, Infallible> {
    let page = parse_or(query.page.as_deref(), 1);
    let limit = parse_or(query.limit.as_deref(), 25);
    let filter = SurveyFilter {
        reviewed: query.reviewed.as_deref().map(|v| v == "true"),
        respondent_id: query.respondent_id.filter(|id| !id.is_empty()),
    };

    let listing = store.list_surveys(&filter, page, limit);
    Ok(reply::json_with(StatusCode::OK, &listing))
}

async fn get_survey(
    id: String,
    store: Arc<SubmissionStore>,
) -> Result<WithStatus<Json>, Infallible> {
    let Ok(id) = id.parse::<SubmissionId>() else {
        return Ok(reply::error(StatusCode::NOT_FOUND, "Survey not found"));
    };

    match store.get_survey(&id) {
        Ok(record) => Ok(reply::json_with(StatusCode::OK, &record)),
        Err(StoreError::NotFound) => Ok(reply::error(StatusCode::NOT_FOUND, "Survey not found")),
        Err(err) => {
            tracing::error!(error = %err, "survey read failed");
            Ok(reply::server_error())
        }
    }
}

async fn update_survey(
    id: String,
    body: Bytes,
    store: Arc<SubmissionStore>,
) -> Result<WithStatus<Json>, Infallible> {
    let Ok(id) = id.parse::<SubmissionId>() else {
        return Ok(reply::error(StatusCode::NOT_FOUND, "Survey not found"));
    };
    let payload: SurveyUpdate = match parse_json(&body) {
        Ok(payload) => payload,
        Err(rejection) => return Ok(rejection),
    };

    let patch = match validate_survey_update(&payload) {
        Ok(patch) => patch,
        Err(err) => return Ok(reply::error(StatusCode::BAD_REQUEST, err.to_string())),
    };

    match store.update_survey(&id, patch) {
        Ok(updated) => Ok(reply::json_with(StatusCode::OK, &updated)),
        Err(StoreError::NotFound) => Ok(reply::error(StatusCode::NOT_FOUND, "Survey not found")),
        Err(StoreError::Validation(err)) => {
            Ok(reply::error(StatusCode::BAD_REQUEST, err.to_string()))
        }
        Err(err) => {
            tracing::error!(error = %err, "survey update failed");
            Ok(reply::server_error())
        }
    }
}

async fn delete_survey(
    id: String,
    store: Arc<SubmissionStore>,
) -> Result<WithStatus<Json>, Infallible> {
    let Ok(id) = id.parse::<SubmissionId>() else {
        return Ok(reply::error(StatusCode::NOT_FOUND, "Survey not found"));
    };

    match store.delete_survey(&id) {
        Ok(removed) => Ok(reply::json_with(
            StatusCode::OK,
            &IdMessageBody {
                id: removed.id.to_string(),
                message: "Deleted",
            },
        )),
        Err(StoreError::NotFound) => Ok(reply::error(StatusCode::NOT_FOUND, "Survey not found")),
        Err(err) => {
            tracing::error!(error = %err, "survey delete failed");
            Ok(reply::server_error())
        }
    }
}

/// Lenient integer query parsing: anything unparseable falls back
fn parse_or(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// Map the remaining transport-level rejections to JSON bodies
async fn handle_rejection(err: Rejection) -> Result<WithStatus<Json>, Infallible> {
    if err.is_not_found() {
        return Ok(reply::error(StatusCode::NOT_FOUND, "Not Found"));
    }
    if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(reply::error(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request body too large",
        ));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(reply::error(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method Not Allowed",
        ));
    }

    tracing::error!(?err, "unhandled rejection");
    Ok(reply::server_error())
}
