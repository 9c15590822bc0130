//! HTTP client — one connection to a fauxsearch backend.
//!
//! [`SearchClient::connect`] dials the address and performs the HTTP/1
//! handshake up front, so an unreachable backend surfaces as
//! [`ClientError::ConnectFailed`] before any call is made. Calls on one
//! client are sequential (`&mut self`); open another client for parallel
//! calls.
//!
//! Every call takes a [`CallContext`]. Its remaining deadline is sent to the
//! server in the [`TIMEOUT_HEADER`], and the call is also raced locally
//! against the context, so a slow or silent server cannot outlive it.

use crate::error::ClientError;
use crate::wire::{
    Status, WatchFrame, JSON_CONTENT_TYPE, SEARCH_PATH, TIMEOUT_HEADER, WATCH_PATH,
};
use bytes::{Bytes, BytesMut};
use fauxsearch_core::{CallContext, CallError, SearchRequest, SearchResult};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper::{header, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

pub struct SearchClient {
    sender: http1::SendRequest<Full<Bytes>>,
    authority: String,
}

impl SearchClient {
    /// Connect to `addr` (`host:port`).
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::ConnectFailed {
                addr: addr.to_string(),
                source,
            })?;
        let (sender, conn) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| ClientError::ConnectFailed {
                addr: addr.to_string(),
                source: std::io::Error::other(e),
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection closed with error");
            }
        });
        tracing::debug!(%addr, "connected");

        Ok(Self {
            sender,
            authority: addr.to_string(),
        })
    }

    /// Unary Search.
    pub async fn search(
        &mut self,
        request: &SearchRequest,
        ctx: &CallContext,
    ) -> Result<SearchResult, ClientError> {
        tokio::select! {
            biased;
            cause = ctx.done() => Err(cause.into()),
            result = self.unary(request, ctx) => result,
        }
    }

    /// Open a Watch stream that stays bound to `ctx`.
    pub async fn watch(
        &mut self,
        request: &SearchRequest,
        ctx: CallContext,
    ) -> Result<WatchStream, ClientError> {
        let response = tokio::select! {
            biased;
            cause = ctx.done() => return Err(cause.into()),
            response = self.post(WATCH_PATH, request, &ctx) => response?,
        };

        if !response.status().is_success() {
            let status = response.status();
            let bytes = response.into_body().collect().await?.to_bytes();
            return Err(ClientError::Status(Status::from_response(status, &bytes)));
        }

        Ok(WatchStream {
            body: Some(response.into_body()),
            buf: BytesMut::new(),
            ctx,
            finished: false,
        })
    }

    async fn unary(
        &mut self,
        request: &SearchRequest,
        ctx: &CallContext,
    ) -> Result<SearchResult, ClientError> {
        let response = self.post(SEARCH_PATH, request, ctx).await?;
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await?.to_bytes();
        if !parts.status.is_success() {
            return Err(ClientError::Status(Status::from_response(
                parts.status,
                &bytes,
            )));
        }
        serde_json::from_slice(&bytes).map_err(ClientError::Decode)
    }

    async fn post(
        &mut self,
        path: &str,
        request: &SearchRequest,
        ctx: &CallContext,
    ) -> Result<Response<Incoming>, ClientError> {
        let payload = serde_json::to_vec(request).map_err(ClientError::Encode)?;
        let mut builder = Request::post(path)
            .header(header::HOST, self.authority.as_str())
            .header(header::CONTENT_TYPE, JSON_CONTENT_TYPE);
        if let Some(remaining) = ctx.remaining() {
            builder = builder.header(TIMEOUT_HEADER, crate::wire::encode_timeout(remaining));
        }
        let request = builder.body(Full::new(Bytes::from(payload)))?;

        self.sender.ready().await?;
        Ok(self.sender.send_request(request).await?)
    }
}

/// Receiving half of a Watch call.
pub struct WatchStream {
    /// `None` once the call is cancelled; dropping the body closes the
    /// connection so the server ends the session.
    body: Option<Incoming>,
    buf: BytesMut,
    ctx: CallContext,
    finished: bool,
}

impl WatchStream {
    /// Next result. `Ok(None)` is the server's clean end-of-stream; an error
    /// frame from the server surfaces as [`ClientError::Status`].
    pub async fn message(&mut self) -> Result<Option<SearchResult>, ClientError> {
        loop {
            if let Some(line) = self.next_line() {
                return match serde_json::from_slice(&line).map_err(ClientError::Decode)? {
                    WatchFrame::Result(result) => Ok(Some(result)),
                    WatchFrame::Error(status) => Err(ClientError::Status(status)),
                };
            }
            if self.finished {
                return if self.buf.is_empty() {
                    Ok(None)
                } else {
                    Err(ClientError::Truncated)
                };
            }

            let Some(body) = self.body.as_mut() else {
                return Err(CallError::Cancelled.into());
            };
            let frame = tokio::select! {
                biased;
                cause = self.ctx.done() => return Err(cause.into()),
                frame = body.frame() => frame,
            };
            match frame {
                Some(frame) => {
                    if let Ok(data) = frame?.into_data() {
                        self.buf.extend_from_slice(&data);
                    }
                }
                None => self.finished = true,
            }
        }
    }

    /// Cancel the call. Later [`message`](Self::message) calls fail with
    /// `Cancelled`, and the response body is dropped so the server sees the
    /// disconnect and ends the session.
    pub fn cancel(&mut self) {
        self.ctx.cancel();
        self.body = None;
        self.buf.clear();
    }

    fn next_line(&mut self) -> Option<Bytes> {
        let pos = self.buf.iter().position(|b| *b == b'\n')?;
        let line = self.buf.split_to(pos + 1).freeze();
        Some(line.slice(..pos))
    }
}
