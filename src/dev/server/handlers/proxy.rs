use actix_web::{HttpRequest, HttpResponse, http, web};
use futures_util::StreamExt;
use log::{debug, trace};
use url::Url;

use crate::dev::config::ProxyRule;
use crate::dev::error::DevError;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Extra per-connection headers named by the `Connection` header, lowercased.
pub fn connection_tokens<'a>(values: impl Iterator<Item = &'a http::header::HeaderValue>) -> Vec<String> {
    values
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

fn is_connection_scoped(name: &str, tokens: &[String]) -> bool {
    is_hop_by_hop(name) || tokens.iter().any(|token| name.eq_ignore_ascii_case(token))
}

/// Rule target with the request path and query carried over unchanged.
pub fn target_url(rule: &ProxyRule, path: &str, query: &str) -> Url {
    let mut url = rule.target.clone();
    url.set_path(path);
    url.set_query((!query.is_empty()).then_some(query));
    url
}

/// Forward a plain request/response exchange to the rule's backend.
pub async fn forward(
    req: &HttpRequest,
    mut payload: web::Payload,
    rule: &ProxyRule,
    client: &reqwest::Client,
) -> Result<HttpResponse, DevError> {
    let url = target_url(rule, req.path(), req.query_string());
    debug!("Proxying {} {} to {}", req.method(), req.path(), url);

    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| DevError::IoError(std::io::Error::other(e.to_string())))?;
        body.extend_from_slice(&chunk);
    }

    let request_tokens = connection_tokens(req.headers().get_all(http::header::CONNECTION));
    let mut builder = client.request(req.method().clone(), url.as_str());
    for (name, value) in req.headers().iter() {
        if is_connection_scoped(name.as_str(), &request_tokens) || name == http::header::CONTENT_LENGTH {
            continue;
        }
        if rule.change_origin && (name == http::header::HOST || name == http::header::ORIGIN) {
            continue;
        }
        trace!("  Forwarding header: {}: {:?}", name, value);
        builder = builder.header(name.clone(), value.clone());
    }

    if rule.change_origin {
        builder = builder.header(http::header::HOST, rule.authority());
        if req.headers().contains_key(http::header::ORIGIN) {
            builder = builder.header(http::header::ORIGIN, rule.origin());
        }
    }

    let response = builder.body(body.freeze()).send().await?;

    let status = http::StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(http::StatusCode::BAD_GATEWAY);
    debug!("Proxy response status: {}", status);

    let response_tokens = connection_tokens(response.headers().get_all(http::header::CONNECTION).iter());
    let mut reply = HttpResponse::build(status);
    for (name, value) in response.headers().iter() {
        if is_connection_scoped(name.as_str(), &response_tokens) || name == http::header::CONTENT_LENGTH {
            continue;
        }
        reply.append_header((name.clone(), value.clone()));
    }

    // A HEAD reply has no body; its length must come from the backend's header.
    let declared_len = if req.method() == http::Method::HEAD {
        response
            .headers()
            .get(http::header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
    } else {
        response.content_length()
    };
    if let Some(len) = declared_len {
        reply.no_chunking(len);
    }

    Ok(reply.streaming(response.bytes_stream()))
}
