//! HTTP server — exposes a [`SearchService`] over axum.
//!
//! Every call gets a [`CallContext`] that is a child of the server's root
//! token, bounded by the caller's [`TIMEOUT_HEADER`] if present, and
//! cancelled when the caller goes away (the handler future or the response
//! body is dropped).
//!
//! Watch sessions run on their own task and feed the response body through a
//! bounded channel, so a stalled reader applies backpressure to the session.

use crate::wire::{
    self, Code, Status, WatchFrame, NDJSON_CONTENT_TYPE, SEARCH_PATH, TIMEOUT_HEADER, WATCH_PATH,
};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use fauxsearch_core::{CallContext, SearchRequest, SearchService};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Frames buffered between a Watch session and its response body.
const WATCH_BUFFER: usize = 4;

/// State shared by all handlers.
#[derive(Clone)]
struct AppState {
    service: SearchService,
    shutdown: CancellationToken,
}

impl IntoResponse for Status {
    fn into_response(self) -> Response {
        (self.code.http_status(), Json(self)).into_response()
    }
}

/// Build the router. Cancelling `shutdown` cancels every in-flight call.
pub fn router(service: SearchService, shutdown: CancellationToken) -> Router {
    Router::new()
        .route(SEARCH_PATH, post(search))
        .route(WATCH_PATH, post(watch))
        .with_state(AppState { service, shutdown })
}

/// Serve until `shutdown` is cancelled. In-flight Watch sessions end with a
/// cancelled frame so their connections can drain.
pub async fn serve(
    listener: TcpListener,
    service: SearchService,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = router(service, shutdown.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled_owned().await })
        .await
}

fn call_context(state: &AppState, headers: &HeaderMap) -> CallContext {
    let ctx = CallContext::child_of(&state.shutdown);
    let timeout = headers
        .get(TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(wire::decode_timeout);
    match timeout {
        Some(timeout) => ctx.with_timeout(timeout),
        None => ctx,
    }
}

/// Any body the JSON extractor refuses (bad syntax, wrong shape, missing
/// content type) is an `invalid_argument` status.
fn parse_request(
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<SearchRequest, Status> {
    body.map(|Json(request)| request).map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected request");
        Status::new(Code::InvalidArgument, rejection.body_text())
    })
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let request = match parse_request(body) {
        Ok(request) => request,
        Err(status) => return status.into_response(),
    };
    let ctx = call_context(&state, &headers);
    let _cancel_on_drop = ctx.token().clone().drop_guard();

    match state.service.search(&request, &ctx).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => {
            tracing::debug!(error = %err, "search failed");
            Status::from(&err).into_response()
        }
    }
}

async fn watch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let request = match parse_request(body) {
        Ok(request) => request,
        Err(status) => return status.into_response(),
    };
    let ctx = call_context(&state, &headers);
    let cancel_on_drop = ctx.token().clone().drop_guard();
    let (mut tx, rx) = mpsc::channel::<WatchFrame>(WATCH_BUFFER);

    let service = state.service.clone();
    tokio::spawn(async move {
        match service.watch(request, ctx, &mut tx).await {
            Ok(emitted) => tracing::debug!(emitted, "watch completed"),
            Err(err) if err.is_cancellation() => {
                tracing::debug!(error = %err, "watch ended");
                if tx.send(WatchFrame::Error(Status::from(&err))).await.is_err() {
                    tracing::debug!("watch: peer gone before terminal frame");
                }
            }
            Err(err) => tracing::debug!(error = %err, "watch: peer gone"),
        }
    });

    // The guard lives as long as the body; dropping the body cancels the session.
    let stream = futures::stream::unfold((rx, cancel_on_drop), |(mut rx, guard)| async move {
        let frame = rx.recv().await?;
        let line = frame.to_line().map_err(std::io::Error::other);
        Some((line, (rx, guard)))
    });

    (
        [(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)],
        Body::from_stream(stream),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::JSON_CONTENT_TYPE;
    use axum::http::{Request, StatusCode};
    use fauxsearch_core::{BackendId, SearchResult, ServiceTimings};
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(timings: ServiceTimings) -> Router {
        let service = SearchService::with_timings(BackendId::new("router-test"), timings);
        router(service, CancellationToken::new())
    }

    fn post_json(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn search_returns_json_result() {
        let resp = app(ServiceTimings::default())
            .oneshot(post_json(SEARCH_PATH, r#"{"query":"golang"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let result: SearchResult = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(result.title, "result for [golang] from backend router-test");
    }

    #[tokio::test]
    async fn search_honors_timeout_header() {
        let timings = ServiceTimings {
            search_max_delay: Duration::from_secs(10),
            ..ServiceTimings::default()
        };
        let mut request = post_json(SEARCH_PATH, r#"{"query":"slow"}"#);
        request.headers_mut().insert(TIMEOUT_HEADER, "20".parse().unwrap());

        let resp = app(timings).oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let status: Status = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(status.code, Code::DeadlineExceeded);
    }

    async fn assert_invalid_argument(request: Request<Body>) {
        let resp = app(ServiceTimings::default()).oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let status: Status = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(status.code, Code::InvalidArgument);
        assert!(!status.message.is_empty());
    }

    #[tokio::test]
    async fn wrong_shape_is_invalid_argument() {
        assert_invalid_argument(post_json(SEARCH_PATH, r#"{"q":1}"#)).await;
        assert_invalid_argument(post_json(WATCH_PATH, r#"{"q":1}"#)).await;
    }

    #[tokio::test]
    async fn bad_json_is_invalid_argument() {
        assert_invalid_argument(post_json(SEARCH_PATH, "not json")).await;
        assert_invalid_argument(post_json(WATCH_PATH, "not json")).await;
    }

    #[tokio::test]
    async fn missing_content_type_is_invalid_argument() {
        let request = Request::builder()
            .method("POST")
            .uri(SEARCH_PATH)
            .body(Body::from(r#"{"query":"x"}"#))
            .unwrap();
        assert_invalid_argument(request).await;
    }

    #[tokio::test]
    async fn bounded_watch_streams_ndjson_then_ends() {
        let timings = ServiceTimings {
            watch_max_delay: Duration::from_millis(20),
            watch_max_emissions: Some(3),
            ..ServiceTimings::default()
        };
        let resp = app(timings)
            .oneshot(post_json(WATCH_PATH, r#"{"query":"x"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], NDJSON_CONTENT_TYPE);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let frames: Vec<WatchFrame> = bytes
            .split(|b| *b == b'\n')
            .filter(|line| !line.is_empty())
            .map(|line| serde_json::from_slice(line).unwrap())
            .collect();
        let titles: Vec<String> = frames
            .into_iter()
            .map(|frame| match frame {
                WatchFrame::Result(result) => result.title,
                WatchFrame::Error(status) => panic!("unexpected error frame: {status}"),
            })
            .collect();
        assert_eq!(
            titles,
            vec![
                "result 0 for [x] from backend router-test",
                "result 1 for [x] from backend router-test",
                "result 2 for [x] from backend router-test",
            ]
        );
    }

    #[tokio::test]
    async fn watch_deadline_ends_with_error_frame() {
        let timings = ServiceTimings {
            watch_max_delay: Duration::from_millis(20),
            ..ServiceTimings::default()
        };
        let mut request = post_json(WATCH_PATH, r#"{"query":"x"}"#);
        request.headers_mut().insert(TIMEOUT_HEADER, "100".parse().unwrap());

        let resp = app(timings).oneshot(request).await.unwrap();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let last = bytes
            .split(|b| *b == b'\n')
            .filter(|line| !line.is_empty())
            .last()
            .unwrap();
        let frame: WatchFrame = serde_json::from_slice(last).unwrap();
        assert_eq!(
            frame,
            WatchFrame::Error(Status::new(Code::DeadlineExceeded, "deadline exceeded"))
        );
    }
}
