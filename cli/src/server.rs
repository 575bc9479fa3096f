//! HTTP front end: `/resource/{identifier}` negotiates between the RDF and human views,
//! `/data/{identifier}` serves the RDF/XML description.

use axum::extract::{OriginalUri, Path, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE, HOST, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use easylod::consts::DATA_CONTENT_TYPE;
use easylod::options::Representation;
use easylod::paths::{absolute_url, swap_to_data, swap_to_resource};
use easylod::{ResolveError, Resolver};
use log::{error, info};
use std::sync::Arc;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    /// Scheme and authority for generated URLs; taken from the `Host` header when unset.
    pub base_url: Option<String>,
}

impl AppState {
    pub fn new(resolver: Arc<Resolver>, base_url: Option<String>) -> Self {
        Self { resolver, base_url }
    }
}

/// Error response for a failed request.
#[derive(Debug)]
pub enum ApiError {
    Resolve(ResolveError),
    BadRequest(String),
    Internal(String),
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        ApiError::Resolve(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Resolve(e) => {
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if e.is_server_fault() {
                    error!("{}", e);
                } else {
                    info!("{}", e);
                }
                (status, e.to_string())
            }
            ApiError::BadRequest(msg) => {
                info!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        (status, message).into_response()
    }
}

fn request_base(state: &AppState, headers: &HeaderMap, uri: &Uri) -> Result<String, ApiError> {
    if let Some(base) = &state.base_url {
        return Ok(base.clone());
    }
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .ok_or_else(|| ApiError::BadRequest("Missing Host header".to_string()))?;
    let base = format!("http://{}", host);
    match Url::parse(&base) {
        Ok(url) if url.has_host() => Ok(base),
        _ => Err(ApiError::BadRequest(format!("Invalid Host header '{}'", host))),
    }
}

fn path_and_query(uri: &Uri) -> &str {
    uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path())
}

fn see_other(location: &str) -> Result<Response, ApiError> {
    let value = HeaderValue::from_str(location)
        .map_err(|_| ApiError::BadRequest(format!("Cannot redirect to '{}'", location)))?;
    Ok((StatusCode::SEE_OTHER, [(LOCATION, value)]).into_response())
}

async fn resource_handler(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let accept = headers.get(ACCEPT).and_then(|h| h.to_str().ok());
    if Representation::from_accept(accept).is_rdf() {
        // reject identifiers the data route could never serve
        state.resolver.check(&identifier)?;
        let base = request_base(&state, &headers, &uri)?;
        let target = absolute_url(&base, &swap_to_data(path_and_query(&uri)));
        return see_other(&target);
    }
    let target = state.resolver.human_page(&identifier)?;
    see_other(&target)
}

async fn data_handler(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let base = request_base(&state, &headers, &uri)?;
    let subject = absolute_url(&base, &swap_to_resource(path_and_query(&uri)));
    let resolver = state.resolver.clone();
    // backend queries block; keep them off the async workers
    let xml = tokio::task::spawn_blocking(move || resolver.describe(&identifier, &subject))
        .await
        .map_err(|e| ApiError::Internal(format!("Describe task failed: {}", e)))??;
    Ok(([(CONTENT_TYPE, DATA_CONTENT_TYPE)], xml).into_response())
}

/// Build the HTTP router for the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/resource/{identifier}", get(resource_handler))
        .route("/data/{identifier}", get(data_handler))
        .with_state(state)
}

/// Serves `router` on `listener` until Ctrl-C is received.
pub async fn serve(listener: tokio::net::TcpListener, router: Router) -> anyhow::Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
