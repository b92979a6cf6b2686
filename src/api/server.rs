use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{Next, from_fn};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Json;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::instrument;

use crate::api::handler::*;
use crate::db::DbError;
use crate::db::prelude::Store;
use crate::util::env::{EnvErr, Var};
use crate::var;

pub type JsonResult<T> = core::result::Result<Json<T>, RouteError>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

pub fn router(store: Arc<dyn Store>) -> Router {
    let state = Arc::new(AppState { store });

    Router::new()
        .route("/player/{platform}/{region}/{player_id}", get(player))
        .route("/changes/{platform}/{region}/{player_id}", get(player_changes))
        .route("/scores/{platform}/{score_id}", get(score_by_id))
        .route("/scores/{platform}/{region}/{player_id}", get(player_scores))
        .route("/leaderboard/{platform}/{region}", get(region_leaderboard))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method();
                let uri = req.uri();

                let matched_path = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|matched| matched.as_str());

                tracing::debug_span!("api_request", ?method, ?uri, ?matched_path)
            }),
        )
        .layer(from_fn(log_route_errors))
        .with_state(state)
}

/// Surfaces handler-side errors into the trace stream; the response itself
/// is already shaped by `RouteError::into_response`.
#[instrument(skip(request, next), fields(uri = request.uri().to_string()))]
async fn log_route_errors(request: Request, next: Next) -> Response {
    let res = next.run(request).await;
    if let Some(err) = res.extensions().get::<Arc<RouteError>>() {
        tracing::error!(error = ?err, "error occurred inside route handler");
    }

    res
}

#[instrument(skip(store))]
pub async fn start_server(store: Arc<dyn Store>) -> Result<Vec<JoinHandle<()>>, RouteError> {
    let port = var!(Var::ServerApiPort).await?.parse::<u16>()?;
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "api listening");

    let app = router(store);
    let server_handle = tokio::task::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = ?e, "api server exited");
        }
    });

    Ok(vec![server_handle])
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    QueryError(#[from] DbError),

    #[error(transparent)]
    EnvError(#[from] EnvErr),

    #[error(transparent)]
    BindError(#[from] std::io::Error),

    #[error("invalid api port: {0}")]
    PortError(#[from] std::num::ParseIntError),

    #[error("invalid platform '{0}', use 1 for ScoreSaber or 2 for BeatLeader")]
    InvalidPlatform(String),

    #[error("invalid page {0}")]
    InvalidPage(i64),

    #[error("{0} not found")]
    NotFound(&'static str),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            message: String,
        }

        let status = match &self {
            RouteError::InvalidPlatform(_) | RouteError::InvalidPage(_) => {
                StatusCode::BAD_REQUEST
            }
            RouteError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.to_string();
        let mut response = (status, Json(ErrorResponse { message })).into_response();
        response.extensions_mut().insert(Arc::new(self));

        response
    }
}
