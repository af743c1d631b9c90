use serde::Serialize;
use url::Url;

use crate::dev::error::DevError;

/// Prefix for HTTP API calls.
pub const API_PREFIX: &str = "/api";
pub const API_TARGET: &str = "http://localhost:5000";

/// Prefix for the persistent messaging channel.
pub const CHANNEL_PREFIX: &str = "/socket.io";
pub const CHANNEL_TARGET: &str = "http://localhost:5001";

/// A path prefix forwarded to a backend origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyRule {
    pub prefix: String,
    pub target: Url,
    /// Rewrite `Host`/`Origin` so the backend sees same-origin requests.
    pub change_origin: bool,
    /// Tunnel upgrade requests instead of doing a single request/response.
    pub ws: bool,
}

impl ProxyRule {
    pub fn new(prefix: &str, target: &str, change_origin: bool, ws: bool) -> Result<Self, DevError> {
        Ok(Self {
            prefix: prefix.to_string(),
            target: Url::parse(target)?,
            change_origin,
            ws,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(self.prefix.as_str())
    }

    /// `scheme://host[:port]` of the target.
    pub fn origin(&self) -> String {
        self.target.origin().ascii_serialization()
    }

    /// `host[:port]` of the target, as it belongs in a `Host` header.
    pub fn authority(&self) -> String {
        let host = self.target.host_str().unwrap_or_default();
        match self.target.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    /// Host and port to open a socket to, falling back to the scheme's default port.
    pub fn socket_addr(&self) -> Result<(String, u16), DevError> {
        let host = self
            .target
            .host_str()
            .ok_or_else(|| DevError::InvalidTarget(format!("target {} has no host", self.target)))?;
        let port = self
            .target
            .port_or_known_default()
            .ok_or_else(|| DevError::InvalidTarget(format!("target {} has no port", self.target)))?;
        Ok((host.to_string(), port))
    }
}

/// Ordered prefix table; the first matching rule owns the request.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ProxyTable {
    rules: Vec<ProxyRule>,
}

impl ProxyTable {
    pub fn new(rules: Vec<ProxyRule>) -> Self {
        Self { rules }
    }

    /// `/api` to the HTTP backend, `/socket.io` to the messaging backend.
    pub fn default_rules() -> Result<Self, DevError> {
        Ok(Self::new(vec![
            ProxyRule::new(API_PREFIX, API_TARGET, true, false)?,
            ProxyRule::new(CHANNEL_PREFIX, CHANNEL_TARGET, false, true)?,
        ]))
    }

    pub fn route(&self, path: &str) -> Option<&ProxyRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    pub fn rules(&self) -> &[ProxyRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_paths_select_the_plain_forwarding_rule() {
        let table = ProxyTable::default_rules().unwrap();

        for path in ["/api", "/api/mails", "/api/emails/3/check?force=1"] {
            let rule = table.route(path).unwrap();
            assert_eq!(rule.prefix, API_PREFIX);
            assert!(rule.change_origin);
            assert!(!rule.ws);
            assert_eq!(rule.origin(), "http://localhost:5000");
        }
    }

    #[test]
    fn channel_paths_select_the_upgrade_rule() {
        let table = ProxyTable::default_rules().unwrap();

        let rule = table.route("/socket.io/?EIO=4&transport=websocket").unwrap();
        assert_eq!(rule.prefix, CHANNEL_PREFIX);
        assert!(rule.ws);
        assert_eq!(rule.authority(), "localhost:5001");
    }

    #[test]
    fn other_paths_are_not_proxied() {
        let table = ProxyTable::default_rules().unwrap();
        assert!(table.route("/").is_none());
        assert!(table.route("/assets/index.js").is_none());
        assert!(table.route("/inbox/api").is_none());
    }

    #[test]
    fn first_matching_rule_wins() {
        let table = ProxyTable::new(vec![
            ProxyRule::new("/api", "http://localhost:1", false, false).unwrap(),
            ProxyRule::new("/api/v2", "http://localhost:2", false, false).unwrap(),
        ]);
        assert_eq!(table.route("/api/v2/mails").unwrap().authority(), "localhost:1");
    }

    #[test]
    fn socket_addr_uses_default_port() {
        let rule = ProxyRule::new("/x", "https://backend.internal", true, false).unwrap();
        assert_eq!(
            rule.socket_addr().unwrap(),
            ("backend.internal".to_string(), 443)
        );
        assert_eq!(rule.authority(), "backend.internal");
    }

    #[test]
    fn invalid_target_is_rejected() {
        assert!(matches!(
            ProxyRule::new("/x", "not a url", false, false),
            Err(DevError::UrlParseError(_))
        ));
    }
}
