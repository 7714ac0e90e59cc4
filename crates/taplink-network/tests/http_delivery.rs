//! Integration tests for the reqwest transport
//!
//! These tests run the delivery client against a bare TCP listener that
//! answers with canned HTTP responses, so they exercise real sockets,
//! headers and timeouts without a web framework.

use chrono::DateTime;
use std::net::SocketAddr;
use std::time::Duration;
use taplink_core::CanonicalUid;
use taplink_network::{
    DeliveryClient, DeliveryConfig, DeliveryOutcome, HttpRequest, HttpTransport, ReadMetadata,
    ReqwestTransport, TransportError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// Read one HTTP/1.1 request (headers plus Content-Length body).
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);

            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Serve a single request with the given status line and hand the raw
/// request back to the test.
async fn spawn_canned_server(status_line: &'static str) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;

        let response = format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();

        tx.send(request).ok();
    });

    (addr, rx)
}

fn client_for(addr: SocketAddr, timeout: Duration) -> DeliveryClient<ReqwestTransport> {
    let transport = ReqwestTransport::new(timeout).unwrap();
    DeliveryClient::new(
        transport,
        DeliveryConfig {
            url: format!("http://{addr}/api/rfid"),
            timeout,
        },
    )
}

fn uid() -> CanonicalUid {
    CanonicalUid::from_bytes(&[0x04, 0xA3, 0x1B, 0x9C]).unwrap()
}

fn metadata() -> ReadMetadata {
    ReadMetadata::new(
        "taplink-test",
        DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    )
}

/// Test a 200 response is delivered and the request carries the JSON body
#[tokio::test]
async fn test_delivered_on_200() {
    let (addr, request_rx) = spawn_canned_server("200 OK").await;
    let client = client_for(addr, Duration::from_millis(2000));

    let outcome = client.send(&true, &uid(), &metadata()).await;
    assert_eq!(outcome, DeliveryOutcome::Delivered(200));

    let request = request_rx.await.unwrap();
    assert!(request.starts_with("POST /api/rfid HTTP/1.1"));
    assert!(
        request
            .to_ascii_lowercase()
            .contains("content-type: application/json")
    );
    assert!(request.contains(r#""uid_hex":"04A31B9C""#));
    assert!(request.contains(r#""uid_dec":"77798300""#));
    assert!(request.contains(r#""device":"taplink-test""#));
    assert!(request.contains(r#""timestamp":1700000000"#));
}

/// Test a 500 response is reported as a server rejection
#[tokio::test]
async fn test_rejected_on_500() {
    let (addr, _request_rx) = spawn_canned_server("500 Internal Server Error").await;
    let client = client_for(addr, Duration::from_millis(2000));

    let outcome = client.send(&true, &uid(), &metadata()).await;
    assert_eq!(outcome, DeliveryOutcome::RejectedByServer(500));
}

/// Test a 201 response still counts as delivered
#[tokio::test]
async fn test_delivered_on_201() {
    let (addr, _request_rx) = spawn_canned_server("201 Created").await;
    let client = client_for(addr, Duration::from_millis(2000));

    let outcome = client.send(&true, &uid(), &metadata()).await;
    assert_eq!(outcome, DeliveryOutcome::Delivered(201));
}

/// Test a redirect is reported as a rejection and never followed
#[tokio::test]
async fn test_redirect_is_not_followed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let mut requests = Vec::new();
        let first = tokio::time::timeout(Duration::from_secs(2), listener.accept()).await;
        if let Ok(Ok((mut stream, _))) = first {
            requests.push(read_request(&mut stream).await);
            let response = "HTTP/1.1 302 Found\r\nLocation: /other\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }

        // Any follow-up request would land here
        while let Ok(Ok((mut stream, _))) =
            tokio::time::timeout(Duration::from_millis(300), listener.accept()).await
        {
            requests.push(read_request(&mut stream).await);
            let response = "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }

        tx.send(requests).ok();
    });

    let client = client_for(addr, Duration::from_millis(2000));
    let outcome = client.send(&true, &uid(), &metadata()).await;
    assert_eq!(outcome, DeliveryOutcome::RejectedByServer(302));

    let requests = rx.await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("POST /api/rfid HTTP/1.1"));
}

/// Test a refused connection becomes a transport failure
#[tokio::test]
async fn test_transport_failed_on_refused_port() {
    // Reserve a port, then free it so nothing is listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr, Duration::from_millis(2000));

    let outcome = client.send(&true, &uid(), &metadata()).await;
    assert!(
        matches!(
            outcome,
            DeliveryOutcome::TransportFailed(TransportError::Connect(_))
        ),
        "unexpected outcome: {outcome:?}"
    );
}

/// Test a server that never answers is cut off by the request timeout
#[tokio::test]
async fn test_transport_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _request = read_request(&mut stream).await;
        // Hold the connection open without responding
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let transport = ReqwestTransport::new(Duration::from_millis(200)).unwrap();
    let request = HttpRequest {
        url: format!("http://{addr}/api/rfid"),
        content_type: "application/json",
        body: b"{\"uid_hex\":\"01\"}".to_vec(),
        timeout: Duration::from_millis(200),
    };

    let result = transport.post(request).await;
    assert_eq!(result, Err(TransportError::Timeout(200)));
}

/// Test the link precondition holds with a real transport too
#[tokio::test]
async fn test_link_down_skips_network() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let client = client_for(addr, Duration::from_millis(500));
    let outcome = client.send(&false, &uid(), &metadata()).await;
    assert_eq!(outcome, DeliveryOutcome::LinkUnavailable);

    // Nothing ever connected
    let accept = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
    assert!(accept.is_err());
}
