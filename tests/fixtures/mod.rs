//! In-process WebSocket server fixture for channel integration tests.
//!
//! Accepts real connections on a loopback port and hands each one to
//! the test as a [`ServerConn`] that can observe client frames, inject
//! server frames, and end the connection either cleanly or abruptly.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{
    accept_hdr_async,
    tungstenite::{
        Message,
        handshake::server::{ErrorResponse, Request, Response},
        protocol::{CloseFrame, frame::coding::CloseCode},
    },
};

const WAIT: Duration = Duration::from_secs(5);

/// A fixture chat server listening on a random loopback port
pub struct ChatServer {
    addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<ServerConn>,
    accept_task: JoinHandle<()>,
}

impl ChatServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (conn_tx, connections) = mpsc::unbounded_channel();
        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let conn_tx = conn_tx.clone();
                tokio::spawn(serve_connection(stream, conn_tx));
            }
        });
        Self {
            addr,
            connections,
            accept_task,
        }
    }

    /// HTTP-style base URL clients derive the ws:// URL from
    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Wait for the next client connection
    pub async fn next_connection(&mut self) -> ServerConn {
        timeout(WAIT, self.connections.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("server stopped")
    }

    /// Stop accepting; the port starts refusing new connections
    pub fn stop(&self) {
        self.accept_task.abort();
    }
}

impl Drop for ChatServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

/// One accepted client connection, driven by the test
pub struct ServerConn {
    /// Request path + query as the client sent it
    pub path: String,
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<Message>,
    abort: Option<oneshot::Sender<()>>,
}

impl ServerConn {
    /// Next text frame received from the client
    pub async fn expect_text(&mut self) -> String {
        timeout(WAIT, self.inbound.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("connection closed while waiting for a frame")
    }

    /// Assert the client closed the connection
    pub async fn expect_closed(&mut self) {
        let frame = timeout(WAIT, self.inbound.recv())
            .await
            .expect("timed out waiting for the client to close");
        assert!(frame.is_none(), "expected close, got frame: {frame:?}");
    }

    /// Send a text frame to the client
    pub fn send_text(&self, text: &str) {
        let _ = self.outbound.send(Message::Text(text.to_string().into()));
    }

    /// Close the connection cleanly with code 1000
    pub fn close_normal(&self) {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        };
        let _ = self.outbound.send(Message::Close(Some(frame)));
    }

    /// Tear the TCP connection down without a close handshake
    pub fn drop_abruptly(&mut self) {
        if let Some(abort) = self.abort.take() {
            let _ = abort.send(());
        }
    }
}

async fn serve_connection(stream: TcpStream, conn_tx: mpsc::UnboundedSender<ServerConn>) {
    let mut path = String::new();
    let callback = |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        path = req.uri().to_string();
        Ok(resp)
    };
    let ws = match accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(_) => return,
    };

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<String>();
    let (abort_tx, mut abort_rx) = oneshot::channel::<()>();
    if conn_tx
        .send(ServerConn {
            path,
            inbound: inbound_rx,
            outbound: outbound_tx,
            abort: Some(abort_tx),
        })
        .is_err()
    {
        return;
    }

    let (mut write, mut read) = ws.split();
    loop {
        tokio::select! {
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = inbound_tx.send(text.to_string());
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            out = outbound_rx.recv() => match out {
                Some(message) => {
                    if write.send(message).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            _ = &mut abort_rx => {
                // Drop the socket without a close handshake
                return;
            }
        }
    }
}
