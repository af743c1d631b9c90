use std::time::Duration;

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use futures_util::{Stream, StreamExt, stream};
use log::{debug, info};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::dev::config::ProxyRule;
use crate::dev::error::DevError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_HEAD_SIZE: usize = 16 * 1024;
const READ_CHUNK: usize = 8 * 1024;

/// Parsed status line and headers of the backend's handshake reply.
#[derive(Debug)]
pub struct ResponseHead {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

/// `Connection: upgrade` plus `Upgrade: websocket`.
///
/// actix-http only hands over the raw byte stream after a websocket
/// handshake, so other protocols are left to plain forwarding.
pub fn is_upgrade_request(req: &HttpRequest) -> bool {
    let wants_upgrade = req
        .headers()
        .get_all(header::CONNECTION)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .any(|token| token.trim().eq_ignore_ascii_case("upgrade"));

    let is_websocket = req
        .headers()
        .get(header::UPGRADE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("websocket"));

    wants_upgrade && is_websocket
}

/// Splice the client connection onto a fresh backend connection.
///
/// The backend's handshake reply is relayed as the 101 response; after that
/// bytes are copied in both directions until either side closes.
pub async fn tunnel(
    req: &HttpRequest,
    payload: web::Payload,
    rule: &ProxyRule,
) -> Result<HttpResponse, DevError> {
    let (host, port) = rule.socket_addr()?;
    debug!("Opening upgrade tunnel for {} to {}:{}", req.path(), host, port);

    let socket = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host.as_str(), port)))
        .await
        .map_err(|_| DevError::ConnectTimeout)??;
    let (mut reader, mut writer) = socket.into_split();

    writer.write_all(&request_head(req, rule)).await?;
    let (head, leftover) = read_response_head(&mut reader).await?;

    if head.status != 101 {
        return Err(DevError::UpgradeRejected(head.status));
    }

    let mut reply = HttpResponse::SwitchingProtocols();
    let mut protocol = None;
    for (name, value) in head.headers {
        if name.eq_ignore_ascii_case("upgrade") {
            protocol = Some(value);
        } else if !name.eq_ignore_ascii_case("connection") {
            reply.append_header((name, value));
        }
    }
    let protocol = protocol
        .or_else(|| {
            req.headers()
                .get(header::UPGRADE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "websocket".to_string());
    reply.upgrade(protocol.as_str());

    info!("Upgraded {} to {} via {}", req.path(), protocol, rule.target);

    actix_web::rt::spawn(pump_client(payload, writer));
    Ok(reply.streaming(backend_stream(reader, leftover)))
}

/// Request line and headers for the backend, `Host`/`Origin` rewritten if the rule asks.
fn request_head(req: &HttpRequest, rule: &ProxyRule) -> Vec<u8> {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut head = format!("{} {} HTTP/1.1\r\n", req.method(), target).into_bytes();
    let mut has_host = false;

    for (name, value) in req.headers().iter() {
        if rule.change_origin && (name == header::HOST || name == header::ORIGIN) {
            continue;
        }
        if name == header::HOST {
            has_host = true;
        }
        push_header(&mut head, name.as_str(), value.as_bytes());
    }

    if rule.change_origin || !has_host {
        push_header(&mut head, "host", rule.authority().as_bytes());
    }
    if rule.change_origin && req.headers().contains_key(header::ORIGIN) {
        push_header(&mut head, "origin", rule.origin().as_bytes());
    }

    head.extend_from_slice(b"\r\n");
    head
}

fn push_header(head: &mut Vec<u8>, name: &str, value: &[u8]) {
    head.extend_from_slice(name.as_bytes());
    head.extend_from_slice(b": ");
    head.extend_from_slice(value);
    head.extend_from_slice(b"\r\n");
}

/// Read up to the blank line ending the response head. Anything read past it
/// already belongs to the upgraded protocol and is returned alongside.
async fn read_response_head<R>(reader: &mut R) -> Result<(ResponseHead, web::BytesMut), DevError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = web::BytesMut::with_capacity(1024);
    loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let rest = buf.split_off(end + 4);
            let head = parse_response_head(&buf[..end])?;
            return Ok((head, rest));
        }
        if buf.len() >= MAX_HEAD_SIZE {
            return Err(DevError::MalformedHandshake(format!(
                "response head exceeds {} bytes",
                MAX_HEAD_SIZE
            )));
        }
        if reader.read_buf(&mut buf).await? == 0 {
            return Err(DevError::MalformedHandshake(
                "backend closed the connection during the handshake".to_string(),
            ));
        }
    }
}

pub fn parse_response_head(raw: &[u8]) -> Result<ResponseHead, DevError> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| DevError::MalformedHandshake("response head is not UTF-8".to_string()))?;
    let mut lines = text.split("\r\n");

    let status_line = lines.next().unwrap_or_default();
    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/1.") {
        return Err(DevError::MalformedHandshake(format!(
            "unexpected status line: {}",
            status_line
        )));
    }
    let status = parts
        .next()
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| DevError::MalformedHandshake(format!("bad status line: {}", status_line)))?;

    let mut headers = Vec::new();
    for line in lines.filter(|line| !line.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| DevError::MalformedHandshake(format!("bad header line: {}", line)))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(ResponseHead { status, headers })
}

async fn pump_client(mut payload: web::Payload, mut writer: OwnedWriteHalf) {
    while let Some(chunk) = payload.next().await {
        match chunk {
            Ok(bytes) => {
                if let Err(e) = writer.write_all(&bytes).await {
                    debug!("Backend write failed, closing tunnel: {}", e);
                    break;
                }
            }
            Err(e) => {
                debug!("Client side of tunnel ended: {}", e);
                break;
            }
        }
    }
    let _ = writer.shutdown().await;
}

fn backend_stream(
    reader: OwnedReadHalf,
    leftover: web::BytesMut,
) -> impl Stream<Item = Result<web::Bytes, std::io::Error>> {
    let first = (!leftover.is_empty()).then(|| Ok(leftover.freeze()));

    stream::iter(first).chain(stream::unfold(Some(reader), |state| async move {
        let Some(mut reader) = state else {
            return None;
        };
        let mut buf = web::BytesMut::with_capacity(READ_CHUNK);
        match reader.read_buf(&mut buf).await {
            Ok(0) => None,
            Ok(_) => Some((Ok(buf.freeze()), Some(reader))),
            Err(e) => Some((Err(e), None)),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn detects_upgrade_requests() {
        let req = TestRequest::get()
            .uri("/socket.io/?EIO=4&transport=websocket")
            .insert_header(("connection", "keep-alive, Upgrade"))
            .insert_header(("upgrade", "websocket"))
            .to_http_request();
        assert!(is_upgrade_request(&req));

        let polling = TestRequest::get()
            .uri("/socket.io/?EIO=4&transport=polling")
            .insert_header(("connection", "keep-alive"))
            .to_http_request();
        assert!(!is_upgrade_request(&polling));

        let h2c = TestRequest::get()
            .uri("/socket.io/")
            .insert_header(("connection", "Upgrade, HTTP2-Settings"))
            .insert_header(("upgrade", "h2c"))
            .to_http_request();
        assert!(!is_upgrade_request(&h2c));
    }

    #[test]
    fn parses_switching_protocols_head() {
        let head = parse_response_head(
            b"HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Accept: abc=",
        )
        .unwrap();

        assert_eq!(head.status, 101);
        assert_eq!(head.headers.len(), 3);
        assert_eq!(
            head.headers[2],
            ("Sec-WebSocket-Accept".to_string(), "abc=".to_string())
        );
    }

    #[test]
    fn rejects_garbage_head() {
        assert!(matches!(
            parse_response_head(b"SSH-2.0-OpenSSH_9.6"),
            Err(DevError::MalformedHandshake(_))
        ));
        assert!(matches!(
            parse_response_head(b"HTTP/1.1 101 OK\r\nno-colon-here"),
            Err(DevError::MalformedHandshake(_))
        ));
    }

    #[test]
    fn request_head_rewrites_host_when_asked() {
        let rule = ProxyRule::new("/socket.io", "http://localhost:5001", true, true).unwrap();
        let req = TestRequest::get()
            .uri("/socket.io/?EIO=4")
            .insert_header(("host", "localhost:3000"))
            .insert_header(("origin", "http://localhost:3000"))
            .to_http_request();

        let head = String::from_utf8(request_head(&req, &rule)).unwrap();
        assert!(head.starts_with("GET /socket.io/?EIO=4 HTTP/1.1\r\n"));
        assert!(head.contains("host: localhost:5001\r\n"));
        assert!(head.contains("origin: http://localhost:5001\r\n"));
        assert!(!head.contains("localhost:3000"));
        assert!(head.ends_with("\r\n\r\n"));
    }

    #[test]
    fn request_head_keeps_host_by_default() {
        let rule = ProxyRule::new("/socket.io", "http://localhost:5001", false, true).unwrap();
        let req = TestRequest::get()
            .uri("/socket.io/")
            .insert_header(("host", "localhost:3000"))
            .to_http_request();

        let head = String::from_utf8(request_head(&req, &rule)).unwrap();
        assert!(head.contains("host: localhost:3000\r\n"));
        assert!(!head.contains("localhost:5001"));
    }

    #[actix_web::test]
    async fn leftover_bytes_survive_head_parsing() {
        let mut input: &[u8] = b"HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\n\r\n\x81\x02hi";
        let (head, rest) = read_response_head(&mut input).await.unwrap();

        assert_eq!(head.status, 101);
        assert_eq!(&rest[..], b"\x81\x02hi");
    }
}
