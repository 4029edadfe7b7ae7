//! Per-connection session handling
//!
//! Each accepted connection gets a reader loop (this task) and a writer task
//! that owns the write half. The writer drains the session's outbound
//! channel, which is the connection handle held by the registry.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use relay_protocol::{ClientFrame, CodecError, ServerCodec};
use relay_utils::RelayError;

use crate::handlers::HandlerContext;
use crate::notice;
use crate::observability::Metrics;
use crate::registry::SessionId;
use crate::SharedState;

/// How long a departing session's writer may keep flushing queued lines
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Serve one client until it hangs up or its connection fails
///
/// The session is registered under `peer` (the remote address) as its
/// initial display name.
pub async fn handle_client<R, W>(reader: R, writer: W, peer: String, state: SharedState)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let config = &state.config.server;
    let broadcaster = &state.broadcaster;

    let mut frames = FramedRead::new(reader, ServerCodec::with_max_length(config.max_line_length));
    let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_buffer);

    let session_id = broadcaster.registry().add(outbound_tx, peer.clone()).id;
    Metrics::global().record_session_opened();
    info!("New connection from {} ({})", peer, session_id);

    let mut writer_task = tokio::spawn(write_loop(
        writer,
        outbound_rx,
        config.write_timeout(),
        session_id,
    ));
    let mut writer_done = false;

    broadcaster
        .broadcast(&notice::joined(&peer), Some(session_id), true)
        .await;

    let ctx = HandlerContext::new(broadcaster.clone(), session_id);

    loop {
        tokio::select! {
            frame = frames.next() => {
                match frame {
                    Some(Ok(ClientFrame::Request(request))) => {
                        ctx.dispatch(request).await;
                    }
                    Some(Ok(ClientFrame::Hangup)) => {
                        debug!("{} sent an empty line, closing", session_id);
                        break;
                    }
                    Some(Err(e)) => {
                        let err = read_error(e);
                        if err.is_connection_scoped() {
                            info!("Connection {} ended: {}", session_id, err);
                        } else {
                            warn!("Read from {} failed: {}", session_id, err);
                        }
                        break;
                    }
                    None => {
                        debug!("{} closed the connection", session_id);
                        break;
                    }
                }
            }
            _ = &mut writer_task => {
                writer_done = true;
                debug!("Writer for {} finished, closing", session_id);
                break;
            }
        }
    }

    // Removing the session drops the last sender, so the writer finishes
    // once everything already queued has been written.
    broadcaster.disconnect(session_id).await;

    if !writer_done {
        let abort = writer_task.abort_handle();
        if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer_task)
            .await
            .is_err()
        {
            debug!("Writer for {} did not drain in time", session_id);
            abort.abort();
        }
    }
}

/// Write queued lines until the channel closes or a write fails
async fn write_loop<W>(
    writer: W,
    mut outbound: mpsc::Receiver<String>,
    write_timeout: Option<Duration>,
    session_id: SessionId,
) where
    W: AsyncWrite + Unpin,
{
    let mut sink = FramedWrite::new(writer, ServerCodec::new());

    while let Some(line) = outbound.recv().await {
        let result = match write_timeout {
            Some(limit) => match tokio::time::timeout(limit, sink.send(line)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("Write to {} timed out after {:?}", session_id, limit);
                    return;
                }
            },
            None => sink.send(line).await,
        };

        if let Err(e) = result {
            debug!("Write to {} failed: {}", session_id, e);
            return;
        }
    }
}

fn read_error(err: CodecError) -> RelayError {
    match err {
        CodecError::Io(e) => match e.kind() {
            std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::UnexpectedEof => RelayError::ConnectionClosed,
            _ => RelayError::Io(e),
        },
        other => RelayError::protocol(other.to_string()),
    }
}
