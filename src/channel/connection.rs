//! Tokio driver for the realtime chat channel.
//!
//! Owns the socket lifecycle: connect, read/write pumping, and the
//! reconnect timer. All decisions come from the shared
//! [`ChannelMachine`]; this module only executes them.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        Message,
        protocol::{CloseFrame, frame::coding::CloseCode},
    },
};

use super::machine::{ChannelMachine, CloseKind, CloseOutcome};
use crate::infrastructure::dto::websocket::{ClientFrame, ServerFrame};

/// Commands from the channel facade to the driver task
#[derive(Debug)]
pub(crate) enum Command {
    Send(ClientFrame),
    Shutdown,
}

/// Events surfaced to the UI loop
#[derive(Debug)]
pub enum ChannelEvent {
    /// The connection is established (first connect or reconnect)
    Opened,
    /// A frame arrived from the server
    Frame(ServerFrame),
    /// The connection dropped abnormally; a retry is scheduled
    Reconnecting { delay: std::time::Duration },
    /// The retry budget is exhausted; the channel is closed
    GaveUp,
    /// The channel is closed for good (normal close or shutdown)
    Closed,
}

/// Spawn the connection loop for a single room/topic scope.
///
/// The task runs until the machine reaches `Closed`: either a normal
/// close from the server, a `Shutdown` command, or an exhausted retry
/// budget. At most one reconnect sleep is in flight at any time since
/// this loop is the only scheduler.
pub(crate) fn spawn_connection(
    url: String,
    machine: Arc<Mutex<ChannelMachine>>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<ChannelEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        'outer: loop {
            machine.lock().await.connect_started();

            // Connect, but stay responsive to Shutdown while dialing
            let connect = connect_async(url.as_str());
            tokio::pin!(connect);
            let stream = loop {
                tokio::select! {
                    result = &mut connect => break result,
                    cmd = commands.recv() => match cmd {
                        Some(Command::Shutdown) | None => {
                            machine.lock().await.close_requested();
                            let _ = events.send(ChannelEvent::Closed);
                            break 'outer;
                        }
                        Some(Command::Send(_)) => {
                            tracing::debug!("Dropping outbound frame while connecting");
                        }
                    },
                }
            };

            let close_kind = match stream {
                Ok((stream, _response)) => {
                    machine.lock().await.established();
                    let _ = events.send(ChannelEvent::Opened);
                    pump(stream, &mut commands, &events).await
                }
                Err(e) => {
                    tracing::warn!("WebSocket connect failed: {}", e);
                    CloseKind::Abnormal
                }
            };

            let outcome = machine.lock().await.connection_closed(close_kind);
            match outcome {
                CloseOutcome::Reconnect(delay) => {
                    let _ = events.send(ChannelEvent::Reconnecting { delay });
                    tracing::info!("Reconnecting in {:?}", delay);
                    let sleep = tokio::time::sleep(delay);
                    tokio::pin!(sleep);
                    loop {
                        tokio::select! {
                            _ = &mut sleep => {
                                machine.lock().await.reconnect_fired();
                                break;
                            }
                            cmd = commands.recv() => match cmd {
                                Some(Command::Shutdown) | None => {
                                    machine.lock().await.close_requested();
                                    let _ = events.send(ChannelEvent::Closed);
                                    break 'outer;
                                }
                                Some(Command::Send(_)) => {
                                    tracing::debug!("Dropping outbound frame while reconnecting");
                                }
                            },
                        }
                    }
                }
                CloseOutcome::GiveUp => {
                    tracing::warn!("Retry budget exhausted, giving up");
                    let _ = events.send(ChannelEvent::GaveUp);
                    break;
                }
                CloseOutcome::Stop | CloseOutcome::AlreadyPending => {
                    let _ = events.send(ChannelEvent::Closed);
                    break;
                }
            }
        }
    })
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Pump one established connection until it ends. Returns how it ended.
async fn pump(
    stream: WsStream,
    commands: &mut mpsc::UnboundedReceiver<Command>,
    events: &mpsc::UnboundedSender<ChannelEvent>,
) -> CloseKind {
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => match ServerFrame::parse(text.as_str()) {
                    Ok(frame) => {
                        let _ = events.send(ChannelEvent::Frame(frame));
                    }
                    Err(e) => tracing::warn!("Dropping malformed frame: {}", e),
                },
                Some(Ok(Message::Close(frame))) => {
                    // Only close code 1000 counts as a clean shutdown
                    let normal = frame
                        .map(|f| f.code == CloseCode::Normal)
                        .unwrap_or(false);
                    return if normal {
                        CloseKind::Normal
                    } else {
                        CloseKind::Abnormal
                    };
                }
                Some(Ok(Message::Ping(_))) => {
                    // Pong is handled automatically by tungstenite
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return CloseKind::Abnormal;
                }
                None => return CloseKind::Abnormal,
            },
            cmd = commands.recv() => match cmd {
                Some(Command::Send(frame)) => match serde_json::to_string(&frame) {
                    Ok(json) => {
                        if let Err(e) = write.send(Message::Text(json.into())).await {
                            tracing::warn!("WebSocket send failed: {}", e);
                            return CloseKind::Abnormal;
                        }
                    }
                    Err(e) => tracing::error!("Failed to serialize outbound frame: {}", e),
                },
                Some(Command::Shutdown) | None => {
                    let close = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "".into(),
                    };
                    if let Err(e) = write.send(Message::Close(Some(close))).await {
                        tracing::debug!("Close frame not delivered: {}", e);
                    }
                    return CloseKind::Normal;
                }
            },
        }
    }
}
