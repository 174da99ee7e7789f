//! End-to-end tests against a live listener

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use live_notepad::{NotepadServer, ServerConfig};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    server: Arc<NotepadServer>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start(config: ServerConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(NotepadServer::new(config));
        let (tx, rx) = oneshot::channel();

        let running = Arc::clone(&server);
        tokio::spawn(async move {
            running
                .serve(listener, async move {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            server,
            shutdown: Some(tx),
        }
    }

    async fn client(&self) -> Client {
        let (ws, _) = connect_async(format!("ws://{}/", self.addr)).await.unwrap();
        ws
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn recv_text(client: &mut Client) -> String {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for message")
            .expect("stream ended")
            .expect("transport error");
        match message {
            Message::Text(text) => return text.to_string(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("expected text, got {:?}", other),
        }
    }
}

/// Poll until `check` holds, for counters updated after the client observes a result
async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

/// Send a raw HTTP/1.1 request and read the response until the server closes
async fn http_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    tokio::time::timeout(Duration::from_secs(2), stream.read_to_string(&mut response))
        .await
        .expect("timed out waiting for response")
        .unwrap();
    response
}

async fn assert_silent(client: &mut Client) {
    let next = tokio::time::timeout(Duration::from_millis(100), client.next()).await;
    assert!(next.is_err(), "unexpected message: {:?}", next);
}

#[tokio::test]
async fn late_joiner_receives_current_text() {
    let server = TestServer::start(ServerConfig::default()).await;

    let mut a = server.client().await;
    assert_eq!(recv_text(&mut a).await, "");

    a.send(Message::Text("hello".into())).await.unwrap();
    assert_eq!(recv_text(&mut a).await, "hello");

    let mut late = server.client().await;
    assert_eq!(recv_text(&mut late).await, "hello");
    assert_silent(&mut late).await;
}

#[tokio::test]
async fn edits_fan_out_to_all_clients() {
    let server = TestServer::start(ServerConfig::default()).await;

    let mut a = server.client().await;
    let mut b = server.client().await;
    let mut c = server.client().await;
    for client in [&mut a, &mut b, &mut c] {
        assert_eq!(recv_text(client).await, "");
    }

    a.send(Message::Text("abc".into())).await.unwrap();

    for client in [&mut a, &mut b, &mut c] {
        assert_eq!(recv_text(client).await, "abc");
    }
    assert_eq!(server.server.broadcaster().document().await.as_str(), "abc");
}

#[tokio::test]
async fn binary_payload_changes_nothing() {
    let server = TestServer::start(ServerConfig::default()).await;

    let mut a = server.client().await;
    let mut b = server.client().await;
    recv_text(&mut a).await;
    recv_text(&mut b).await;

    a.send(Message::Text("foo".into())).await.unwrap();
    assert_eq!(recv_text(&mut a).await, "foo");
    assert_eq!(recv_text(&mut b).await, "foo");

    a.send(Message::Binary(Bytes::from_static(b"\x00\x01"))).await.unwrap();

    assert_silent(&mut a).await;
    assert_silent(&mut b).await;
    assert_eq!(server.server.broadcaster().document().await.as_str(), "foo");
}

#[tokio::test]
async fn departures_are_silent() {
    let server = TestServer::start(ServerConfig::default()).await;

    let mut a = server.client().await;
    let mut b = server.client().await;
    recv_text(&mut a).await;
    recv_text(&mut b).await;

    b.close(None).await.unwrap();
    drop(b);
    assert_silent(&mut a).await;

    a.send(Message::Text("after".into())).await.unwrap();
    assert_eq!(recv_text(&mut a).await, "after");
    let notepad = &server.server;
    eventually(|| async move { notepad.broadcaster().member_count().await == 1 }).await;
}

#[tokio::test]
async fn plain_http_serves_client_page() {
    let server = TestServer::start(ServerConfig::default()).await;

    let response = http_request(
        server.addr,
        "GET /script.js HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("text/javascript"));
    assert!(response.contains("new WebSocket"));
    let notepad = &server.server;
    eventually(|| async move { notepad.stats().pages_served == 1 }).await;
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = TestServer::start(ServerConfig::default()).await;

    let response = http_request(
        server.addr,
        "GET /missing.css HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(response.ends_with("Error."));
    assert_eq!(server.server.stats().pages_served, 0);
}

#[tokio::test]
async fn disabled_client_page_is_not_found() {
    let server = TestServer::start(ServerConfig::default().disable_client()).await;

    let response = http_request(
        server.addr,
        "GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;

    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));

    // Sessions are still accepted
    let mut a = server.client().await;
    assert_eq!(recv_text(&mut a).await, "");
}

#[tokio::test]
async fn upgrade_without_connection_token_is_not_a_session() {
    let server = TestServer::start(ServerConfig::default()).await;

    let handshake = "Host: localhost\r\n\
                     Upgrade: websocket\r\n\
                     Sec-WebSocket-Version: 13\r\n\
                     Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
                     Connection: close\r\n\r\n";

    // On `/` the request falls back to the page
    let response = http_request(server.addr, &format!("GET / HTTP/1.1\r\n{}", handshake)).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("<textarea"));

    // Elsewhere it is simply not found
    let response =
        http_request(server.addr, &format!("GET /room HTTP/1.1\r\n{}", handshake)).await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));

    assert_eq!(server.server.stats().total_connections, 0);
    assert_eq!(server.server.broadcaster().member_count().await, 0);
}

#[tokio::test]
async fn any_path_accepts_a_session() {
    let server = TestServer::start(ServerConfig::default()).await;

    let mut a = server.client().await;
    assert_eq!(recv_text(&mut a).await, "");
    a.send(Message::Text("shared".into())).await.unwrap();
    assert_eq!(recv_text(&mut a).await, "shared");

    let (mut b, _) = connect_async(format!("ws://{}/some/room", server.addr))
        .await
        .unwrap();
    assert_eq!(recv_text(&mut b).await, "shared");
}

#[tokio::test]
async fn connection_limit_rejects_extra_clients() {
    let server = TestServer::start(ServerConfig::default().max_connections(1)).await;

    let mut a = server.client().await;
    recv_text(&mut a).await;

    let second = connect_async(format!("ws://{}/", server.addr)).await;
    match second {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), 503);
        }
        other => panic!("expected HTTP rejection, got {:?}", other.map(|_| ())),
    }
    assert_eq!(server.server.stats().rejected_connections, 1);
    assert_eq!(server.server.stats().total_connections, 2);
}
