use std::sync::Arc;
use std::time::Duration;

use promingest::config::{self, ScrapeConfig};
use promingest::prom::test_data::FEDERATE_MIXED;
use promingest::prom::FetchError;
use promingest::{scrape_into, ScrapeError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::rustls;
use tokio_rustls::TlsAcceptor;

/// Reads one request head, answers it and returns the request line.
async fn respond<S>(stream: &mut S, status: &str, body: &str) -> String
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: text/plain; version=0.0.4\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    let _ = stream.shutdown().await;
    String::from_utf8_lossy(&request)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Serves a single HTTP response and hands back the request line it saw.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        respond(&mut socket, status, body).await
    });
    (format!("http://{addr}/federate"), handle)
}

fn self_signed_acceptor() -> TlsAcceptor {
    let key_pair = rcgen::KeyPair::generate().unwrap();
    let params = rcgen::CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    let cert = params.self_signed(&key_pair).unwrap();
    let key = rustls::pki_types::PrivateKeyDer::try_from(key_pair.serialize_der()).unwrap();
    let config = rustls::ServerConfig::builder_with_provider(
        rustls::crypto::ring::default_provider().into(),
    )
    .with_safe_default_protocol_versions()
    .unwrap()
    .with_no_client_auth()
    .with_single_cert(vec![cert.der().clone()], key)
    .unwrap();
    TlsAcceptor::from(Arc::new(config))
}

/// Serves one response over TLS with a self-signed certificate. The handle
/// yields `false` if the client abandoned the handshake.
async fn serve_tls_once(body: &'static str) -> (String, JoinHandle<bool>) {
    let acceptor = self_signed_acceptor();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let Ok(mut tls) = acceptor.accept(socket).await else {
            return false;
        };
        respond(&mut tls, "200 OK", body).await;
        true
    });
    (format!("https://{addr}/metrics"), handle)
}

#[tokio::test]
async fn scrapes_federation_endpoint_end_to_end() {
    let (uri, server) = serve_once("200 OK", FEDERATE_MIXED).await;
    let envelope = format!(
        r#"<input>
  <server_host>splunk-01</server_host>
  <configuration>
    <stanza name="prometheus://federate">
      <param name="URI">{uri}</param>
      <param name="match">{{job="a"}},{{job="b"}}</param>
      <param name="timeout">5</param>
    </stanza>
  </configuration>
</input>"#
    );
    let config = config::resolve(&envelope).unwrap();

    let mut out = Vec::new();
    let summary = scrape_into(&config, &mut out).await.unwrap();

    assert_eq!(summary.emitted, 4);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        concat!(
            "up{job=\"api\",instance=\"a:9100\"} 1.000000 1600000000000\n",
            "up{job=\"api\",instance=\"b:9100\"} 0.000000 1600000000000\n",
            "process_open_fds{job=\"db\"} 12.000000 1600000005000\n",
            "node_load15 0.001200 1600000010000\n",
        )
    );

    let request_line = server.await.unwrap();
    assert_eq!(
        request_line,
        "GET /federate?match%5B%5D=%7Bjob%3D%22a%22%7D&match%5B%5D=%7Bjob%3D%22b%22%7D HTTP/1.1"
    );
}

#[tokio::test]
async fn no_match_expressions_sends_no_query() {
    let (uri, server) = serve_once("200 OK", "up 1 5\n").await;
    let mut out = Vec::new();
    scrape_into(&ScrapeConfig::new(uri), &mut out).await.unwrap();
    assert_eq!(out, b"up 1.000000 5\n");
    assert_eq!(server.await.unwrap(), "GET /federate HTTP/1.1");
}

#[tokio::test]
async fn missing_timestamps_use_scrape_start() {
    let (uri, server) = serve_once("200 OK", "up 1\n").await;
    let before = chrono::Utc::now().timestamp_millis();
    let mut out = Vec::new();
    scrape_into(&ScrapeConfig::new(uri), &mut out).await.unwrap();
    let after = chrono::Utc::now().timestamp_millis();
    server.await.unwrap();

    let line = String::from_utf8(out).unwrap();
    let ts: i64 = line
        .trim_end()
        .strip_prefix("up 1.000000 ")
        .unwrap()
        .parse()
        .unwrap();
    assert!(before <= ts && ts <= after, "{before} <= {ts} <= {after}");
}

#[tokio::test]
async fn error_status_body_is_still_parsed() {
    let (uri, server) = serve_once("500 Internal Server Error", "up 0 42\n").await;
    let mut out = Vec::new();
    let summary = scrape_into(&ScrapeConfig::new(uri), &mut out).await.unwrap();
    server.await.unwrap();
    assert_eq!(summary.emitted, 1);
    assert_eq!(out, b"up 0.000000 42\n");
}

#[tokio::test]
async fn connection_failure_is_fatal() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut out = Vec::new();
    let err = scrape_into(&ScrapeConfig::new(format!("http://{addr}/metrics")), &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Fetch(FetchError::Transport(_))), "{err:?}");
    assert!(out.is_empty());
}

#[tokio::test]
async fn slow_endpoint_hits_the_deadline() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let mut config = ScrapeConfig::new(format!("http://{addr}/metrics"));
    config.timeout = Duration::from_millis(200);
    let mut out = Vec::new();
    let err = scrape_into(&config, &mut out).await.unwrap_err();
    match err {
        ScrapeError::Fetch(FetchError::Transport(inner)) => assert!(inner.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
    server.abort();
}

#[tokio::test]
async fn invalid_uri_is_fatal_before_any_request() {
    let mut out = Vec::new();
    let err = scrape_into(&ScrapeConfig::new("not a uri"), &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::Fetch(FetchError::InvalidUri { .. })));
}

#[tokio::test]
async fn skip_verify_accepts_self_signed_certificate() {
    let (uri, server) = serve_tls_once("up 1 7\n").await;
    let mut config = ScrapeConfig::new(uri);
    config.insecure_skip_verify = true;

    let mut out = Vec::new();
    let summary = scrape_into(&config, &mut out).await.unwrap();
    assert_eq!(summary.emitted, 1);
    assert_eq!(out, b"up 1.000000 7\n");
    assert!(server.await.unwrap());
}

#[tokio::test]
async fn self_signed_certificate_is_rejected_by_default() {
    let (uri, server) = serve_tls_once("up 1 7\n").await;
    let config = ScrapeConfig::new(uri);
    assert!(!config.insecure_skip_verify);

    let mut out = Vec::new();
    let err = scrape_into(&config, &mut out).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Fetch(FetchError::Transport(_))), "{err:?}");
    assert!(out.is_empty());
    assert!(!server.await.unwrap());
}
