//! Responses must be consumable by a real HTTP/1 client stack.

use std::time::Duration;

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{Request, StatusCode};
use hyper_util::rt::TokioIo;
use loopserve::server::{self, ServerSettings};
use loopserve::AssetStore;
use tokio::net::TcpStream;

async fn fetch(addr: std::net::SocketAddr, path: &str) -> (StatusCode, Option<String>, Bytes) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(async move {
        let _ = conn.await;
    });

    let request = Request::builder()
        .uri(path)
        .header("Host", addr.to_string())
        .body(Empty::<Bytes>::new())
        .unwrap();
    let response = tokio::time::timeout(Duration::from_secs(5), sender.send_request(request))
        .await
        .unwrap()
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, body)
}

#[tokio::test]
async fn test_hyper_client_reads_responses() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
    std::fs::write(dir.path().join("index.js"), "console.log(1);").unwrap();

    let mut settings = ServerSettings::new("127.0.0.1:0".parse().unwrap());
    settings.connection.access_log = false;
    let handle = server::start(settings, AssetStore::new(dir.path())).unwrap();
    let addr = handle.local_addr();

    let (status, content_type, body) = fetch(addr, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html"));
    assert_eq!(&body[..], b"<h1>hi</h1>");

    let (status, content_type, body) = fetch(addr, "/index.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/javascript"));
    assert_eq!(&body[..], b"console.log(1);");

    let (status, content_type, body) = fetch(addr, "/favicon.ico").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/x-icon"));
    assert!(body.is_empty());

    let (status, _, body) = fetch(addr, "/gone.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(&body[..], b"File not found");

    handle.shutdown().await;
}
