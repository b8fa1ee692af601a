// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Request/response transport over TCP.
//!
//! Messages are JSON documents carried in length-delimited frames. A
//! `Skeleton` accepts connections and hands each decoded `Request` to a
//! `Dispatch` implementation; `call` is the matching client half. Failures
//! to connect, send or receive are reported as `Error::Transport` and are
//! never retried here.

use crate::error::{Error, Result};
use crate::wire::{Reply, Request, Response};
use async_trait::async_trait;
use bytes::Bytes;
use diagnostics::{log_debug, log_warn};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_util::codec::{Framed, LengthDelimitedCodec};
use tokio_util::sync::CancellationToken;

/// Largest frame either side will accept
pub const MAX_FRAME_LENGTH: usize = 64 * 1024 * 1024;

fn codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .max_frame_length(MAX_FRAME_LENGTH)
        .new_codec()
}

/// Server-side handler for one interface
#[async_trait]
pub trait Dispatch: Send + Sync + 'static {
    async fn dispatch(&self, request: Request) -> Result<Response>;
}

/// Send one request to `addr` and wait for its reply.
pub async fn call(addr: SocketAddr, request: Request) -> Result<Response> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| Error::transport(format!("connect to {addr}: {e}")))?;
    let mut framed = Framed::new(stream, codec());

    let payload = serde_json::to_vec(&request)
        .map_err(|e| Error::transport(format!("encode {}: {e}", request.method())))?;
    framed
        .send(Bytes::from(payload))
        .await
        .map_err(|e| Error::transport(format!("send to {addr}: {e}")))?;

    let frame = framed
        .next()
        .await
        .ok_or_else(|| Error::transport(format!("{addr} closed the connection")))?
        .map_err(|e| Error::transport(format!("receive from {addr}: {e}")))?;
    let reply: Reply = serde_json::from_slice(&frame)
        .map_err(|e| Error::transport(format!("decode reply from {addr}: {e}")))?;
    reply
}

/// A listening endpoint serving one `Dispatch`
pub struct Skeleton {
    addr: SocketAddr,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Skeleton {
    /// Bind `bind` and start accepting. Port 0 picks a free port; see
    /// [`Skeleton::local_addr`].
    pub async fn start(bind: SocketAddr, dispatcher: Arc<dyn Dispatch>) -> Result<Self> {
        let listener = TcpListener::bind(bind)
            .await
            .map_err(|e| Error::transport(format!("bind {bind}: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| Error::transport(format!("local address of {bind}: {e}")))?;
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(accept_loop(listener, dispatcher, shutdown.clone()));

        let listening = addr.to_string();
        log_debug!("Skeleton listening on {listening}", listening: listening);
        Ok(Self {
            addr,
            shutdown,
            task: Some(task),
        })
    }

    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting, close open connections and wait for the accept loop.
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            _ = task.await;
        }
    }
}

impl Drop for Skeleton {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn accept_loop(
    listener: TcpListener,
    dispatcher: Arc<dyn Dispatch>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _peer)) => {
                    _ = tokio::spawn(serve_connection(
                        stream,
                        dispatcher.clone(),
                        shutdown.child_token(),
                    ));
                }
                Err(e) => {
                    let err = e.to_string();
                    log_warn!("Accept failed: {error}", error: err);
                }
            }
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    dispatcher: Arc<dyn Dispatch>,
    shutdown: CancellationToken,
) {
    let mut framed = Framed::new(stream, codec());
    loop {
        let frame = tokio::select! {
            _ = shutdown.cancelled() => break,
            frame = framed.next() => frame,
        };
        let frame = match frame {
            None => break,
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                let err = e.to_string();
                log_warn!("Dropping connection: {error}", error: err);
                break;
            }
        };

        let reply: Reply = match serde_json::from_slice::<Request>(&frame) {
            Ok(request) => {
                let method = request.method();
                log_debug!("Dispatching {method}", method: method);
                dispatcher.dispatch(request).await
            }
            Err(e) => Err(Error::invalid_argument(format!("malformed request: {e}"))),
        };

        let payload = match serde_json::to_vec(&reply) {
            Ok(payload) => payload,
            Err(e) => {
                let err = e.to_string();
                log_warn!("Could not encode reply: {error}", error: err);
                break;
            }
        };
        if framed.send(Bytes::from(payload)).await.is_err() {
            break;
        }
    }
}
