// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The loopback RPC transport: a length-prefixed JSON request/response
//! protocol over a Unix domain socket, mirroring the in-process channel's
//! semantics byte-for-byte so the same `redact()` and status-code mapping
//! apply to both transports.
//!
//! Wire shape: a 4-byte big-endian length prefix followed by that many
//! bytes of JSON, in both directions.

use crate::dispatcher::Dispatcher;
use crate::envelope::ActionEnvelope;
use nodeagent_core::{NodeAgentError, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Longest request/response body this transport accepts. An action
/// envelope is small JSON; this guards against a misbehaving peer rather
/// than any realistic payload.
const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum WireStatusCode {
    InvalidArgument,
    Internal,
}

impl From<StatusCode> for WireStatusCode {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::InvalidArgument => Self::InvalidArgument,
            StatusCode::Internal => Self::Internal,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RpcResponse {
    ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    envelope: Option<ActionEnvelope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_code: Option<WireStatusCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl RpcResponse {
    fn ok(envelope: ActionEnvelope) -> Self {
        Self { ok: true, envelope: Some(envelope), error_code: None, error_message: None }
    }

    fn err(error: &NodeAgentError) -> Self {
        Self {
            ok: false,
            envelope: None,
            error_code: Some(error.status_code().into()),
            error_message: Some(error.to_string()),
        }
    }
}

async fn write_frame<W: AsyncWriteExt + Unpin>(writer: &mut W, bytes: &[u8]) -> std::io::Result<()> {
    writer.write_u32(bytes.len() as u32).await?;
    writer.write_all(bytes).await
}

async fn read_frame<R: AsyncReadExt + Unpin>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>> {
    let len = match reader.read_u32().await {
        Ok(len) => len,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    };
    if len > MAX_FRAME_BYTES {
        return Err(std::io::Error::other(format!("frame of {len} bytes exceeds the {MAX_FRAME_BYTES} byte cap")));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    Ok(Some(buf))
}

/// Run the loopback RPC server until `cancellation` fires. Binds a Unix
/// domain socket at `socket_path`, removing any stale socket file left
/// behind by a previous run first.
pub async fn serve(
    socket_path: &std::path::Path,
    dispatcher: Dispatcher,
    cancellation: CancellationToken,
) -> std::io::Result<()> {
    let _ = std::fs::remove_file(socket_path);
    if let Some(parent) = socket_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let listener = UnixListener::bind(socket_path)?;
    info!(path = %socket_path.display(), "dispatch bus: listening on loopback socket");

    loop {
        tokio::select! {
            _ = cancellation.cancelled() => {
                info!("dispatch bus: shutting down loopback listener");
                let _ = std::fs::remove_file(socket_path);
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, _addr) = accepted?;
                let dispatcher = dispatcher.clone();
                let conn_cancellation = cancellation.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, dispatcher, conn_cancellation).await {
                        warn!(error = %e, "dispatch bus: connection ended with an error");
                    }
                });
            }
        }
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    dispatcher: Dispatcher,
    cancellation: CancellationToken,
) -> std::io::Result<()> {
    loop {
        let frame = tokio::select! {
            _ = cancellation.cancelled() => return Ok(()),
            frame = read_frame(&mut stream) => frame?,
        };
        let Some(bytes) = frame else {
            return Ok(());
        };

        let response = match serde_json::from_slice::<ActionEnvelope>(&bytes) {
            Ok(envelope) => {
                debug!(type_url = %envelope.metadata.type_url, "dispatch bus: received request");
                match dispatcher.apply(envelope).await {
                    Ok(result) => RpcResponse::ok(result),
                    Err(e) => {
                        error!(error = %e, "dispatch bus: apply failed");
                        RpcResponse::err(&e)
                    }
                }
            }
            Err(e) => RpcResponse::err(&NodeAgentError::InvalidArgument(format!("malformed request: {e}"))),
        };

        let out = serde_json::to_vec(&response)
            .map_err(|e| std::io::Error::other(format!("failed to serialize response: {e}")))?;
        write_frame(&mut stream, &out).await?;
    }
}

/// Client-side call over the loopback socket, used by the out-of-band
/// `apply` CLI.
pub async fn call(socket_path: &std::path::Path, envelope: &ActionEnvelope) -> Result<ActionEnvelope, NodeAgentError> {
    let mut stream = UnixStream::connect(socket_path)
        .await
        .map_err(|e| NodeAgentError::Transient(format!("connecting to {}: {e}", socket_path.display())))?;

    let request = serde_json::to_vec(envelope)?;
    write_frame(&mut stream, &request)
        .await
        .map_err(|e| NodeAgentError::Transient(format!("writing request: {e}")))?;

    let frame = read_frame(&mut stream)
        .await
        .map_err(|e| NodeAgentError::Transient(format!("reading response: {e}")))?
        .ok_or_else(|| NodeAgentError::Transient("connection closed before a response arrived".to_string()))?;

    let response: RpcResponse = serde_json::from_slice(&frame)?;
    if response.ok {
        response
            .envelope
            .ok_or_else(|| NodeAgentError::Internal("server reported success with no envelope".to_string()))
    } else {
        Err(NodeAgentError::Internal(
            response.error_message.unwrap_or_else(|| "unknown RPC error".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build;
    use nodeagent_actions::test_support::test_context_single_root;
    use nodeagent_core::{ActionMetadata, TypeUrl};

    #[tokio::test]
    async fn round_trips_a_request_over_the_socket() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("nodeagent.sock");
        let (ctx, _fakes) = test_context_single_root(dir.path().join("root"));
        let dispatcher = Dispatcher::new(build().expect("registry builds"), ctx);

        let cancellation = CancellationToken::new();
        let server_cancellation = cancellation.clone();
        let server_dispatcher = dispatcher.clone();
        let server_socket_path = socket_path.clone();
        let server = tokio::spawn(async move {
            serve(&server_socket_path, server_dispatcher, server_cancellation).await.unwrap();
        });

        // Give the listener a moment to bind.
        for _ in 0..50 {
            if socket_path.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let envelope = ActionEnvelope::new(
            ActionMetadata::new(TypeUrl::new("nodeagent.v1.ConfigureBaseOS"), "configure-os"),
            serde_json::json!({ "packages": ["conntrack"] }),
        );
        let response = call(&socket_path, &envelope).await.unwrap();
        assert!(response.status.is_some());

        cancellation.cancel();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unknown_type_url_surfaces_as_an_rpc_error() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("nodeagent.sock");
        let (ctx, _fakes) = test_context_single_root(dir.path().join("root"));
        let dispatcher = Dispatcher::new(build().expect("registry builds"), ctx);

        let cancellation = CancellationToken::new();
        let server_cancellation = cancellation.clone();
        let server_dispatcher = dispatcher.clone();
        let server_socket_path = socket_path.clone();
        let server = tokio::spawn(async move {
            serve(&server_socket_path, server_dispatcher, server_cancellation).await.unwrap();
        });
        for _ in 0..50 {
            if socket_path.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        let envelope = ActionEnvelope::new(
            ActionMetadata::new(TypeUrl::new("nodeagent.v1.Unknown"), "bogus"),
            serde_json::json!({}),
        );
        let err = call(&socket_path, &envelope).await.unwrap_err();
        assert!(err.to_string().contains("unknown action type"));

        cancellation.cancel();
        server.await.unwrap();
    }
}
