use super::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Duration, timeout};
use uuid::Uuid;

async fn serve(static_dir: Option<PathBuf>) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    let app = app(AppState::new(16), static_dir);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test relay failed");
    });
    addr
}

/// Raw HTTP/1.1 GET with an `Origin` header; returns the full response, lowercased.
async fn get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("tcp connect");
    let request = format!(
        "GET {path} HTTP/1.1\r\nHost: localhost\r\nOrigin: http://example.test\r\nConnection: close\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.expect("write request");

    let mut response = String::new();
    timeout(Duration::from_secs(1), stream.read_to_string(&mut response))
        .await
        .expect("response timed out")
        .expect("read response");
    response.to_lowercase()
}

fn static_fixture() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("arpaint-static-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create static dir");
    std::fs::write(dir.join("index.html"), "<html>paint</html>").expect("write index");
    dir
}

#[tokio::test]
async fn static_assets_pass_through_http_layers() {
    let dir = static_fixture();
    let addr = serve(Some(dir.clone())).await;

    let response = get(addr, "/index.html").await;
    assert!(response.starts_with("http/1.1 200"), "unexpected response: {response}");
    assert!(response.contains("access-control-allow-origin: *"), "no cors header: {response}");
    assert!(response.contains("<html>paint</html>"));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn root_serves_index_html() {
    let dir = static_fixture();
    let addr = serve(Some(dir.clone())).await;

    let response = get(addr, "/").await;
    assert!(response.starts_with("http/1.1 200"), "unexpected response: {response}");
    assert!(response.contains("<html>paint</html>"));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn unknown_path_without_static_dir_is_not_found() {
    let addr = serve(None).await;
    let response = get(addr, "/index.html").await;
    assert!(response.starts_with("http/1.1 404"), "unexpected response: {response}");
}

#[tokio::test]
async fn healthz_carries_cors_header() {
    let addr = serve(None).await;
    let response = get(addr, "/healthz").await;
    assert!(response.starts_with("http/1.1 200"), "unexpected response: {response}");
    assert!(response.contains("access-control-allow-origin: *"));
}
