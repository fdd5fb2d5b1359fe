//! HTTP server for the reviewer service.
//!
//! Assembles the API routes behind request logging, a per-request timeout
//! and panic recovery, and serves them until a shutdown signal arrives.

use crate::db::pool::DbPool;
use crate::services::api::{internal_error_response, pull_request_routes, team_routes, user_routes};
use crate::services::pull_requests::PullRequestService;
use crate::services::reviewer_picker::{RandomPicker, ReviewerPicker};
use crate::services::store::SqliteStore;
use crate::services::teams::TeamService;
use crate::services::users::UserService;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;

/// Shared state for the axum routes.
#[derive(Clone)]
pub struct AppState {
    pub pull_requests: Arc<PullRequestService>,
    pub teams: Arc<TeamService>,
    pub users: Arc<UserService>,
}

impl AppState {
    /// State backed by SQLite with random reviewer selection.
    pub fn new(pool: DbPool) -> Self {
        Self::with_picker(pool, Arc::new(RandomPicker))
    }

    /// State backed by SQLite with a caller-supplied picker.
    pub fn with_picker(pool: DbPool, picker: Arc<dyn ReviewerPicker>) -> Self {
        let store = Arc::new(SqliteStore::new(pool));
        Self {
            pull_requests: Arc::new(PullRequestService::new(store.clone(), store.clone(), picker)),
            teams: Arc::new(TeamService::new(store.clone())),
            users: Arc::new(UserService::new(store)),
        }
    }
}

/// Build the full router with middleware applied.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let app = Router::new()
        .merge(team_routes())
        .merge(user_routes())
        .merge(pull_request_routes())
        .with_state(state);
    with_middleware(app, request_timeout)
}

/// Request logging, per-request timeout (408) and panic recovery (500).
fn with_middleware(app: Router, request_timeout: Duration) -> Router {
    app.layer(middleware::from_fn(log_requests))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CatchPanicLayer::custom(recover_panic))
}

/// Log method, path, status and latency of every request.
async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        log::warn!("[http] {} {} -> {} ({} ms)", method, path, status, elapsed_ms);
    } else {
        log::info!("[http] {} {} -> {} ({} ms)", method, path, status, elapsed_ms);
    }

    response
}

fn recover_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    log::error!("[http] Handler panicked: {}", detail);
    internal_error_response()
}

/// Serve `app` on `addr` until `shutdown` completes.
///
/// After the signal, in-flight requests get `grace` to finish; the server
/// task is abandoned if they take longer.
pub async fn serve(
    addr: SocketAddr,
    app: Router,
    shutdown: impl Future<Output = ()>,
    grace: Duration,
) -> Result<(), String> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    log::info!("[server] Listening on http://{}", addr);

    let cancel_token = CancellationToken::new();
    let cancel_clone = cancel_token.clone();

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_clone.cancelled().await;
            })
            .await
    });

    shutdown.await;
    log::info!("[server] Shutting down, waiting up to {:?} for in-flight requests", grace);
    cancel_token.cancel();

    match tokio::time::timeout(grace, server).await {
        Ok(Ok(Ok(()))) => {
            log::info!("[server] Server stopped");
            Ok(())
        }
        Ok(Ok(Err(e))) => Err(format!("Server error: {}", e)),
        Ok(Err(e)) => Err(format!("Server task failed: {}", e)),
        Err(_) => {
            log::warn!("[server] Forced shutdown after {:?}", grace);
            Ok(())
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("[server] Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("[server] Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use tempfile::tempdir;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let dir = tempdir().unwrap();
        let pool = db::initialize(&dir.path().join("test.db"), 1).await.unwrap();
        let app = router(AppState::new(pool), Duration::from_secs(5));

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let app = Router::new().route(
            "/slow",
            axum::routing::get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "done"
            }),
        );
        let app = with_middleware(app, Duration::from_millis(50));

        let response = app
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_panicking_handler_returns_internal_error() {
        async fn boom() -> &'static str {
            panic!("boom")
        }
        let app = Router::new().route("/boom", axum::routing::get(boom));
        let app = with_middleware(app, Duration::from_secs(5));

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_recover_panic_returns_internal_error() {
        let response = recover_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let dir = tempdir().unwrap();
        let pool = db::initialize(&dir.path().join("test.db"), 1).await.unwrap();
        let app = router(AppState::new(pool), Duration::from_secs(5));
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();

        let result = serve(addr, app, async {}, Duration::from_secs(2)).await;
        assert!(result.is_ok());
    }
}
