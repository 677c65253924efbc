//! Request view used by the strategy: cookies, query, headers, and the
//! externally visible URL behind a reverse proxy.

use axum::http::request::Parts;
use axum::http::{HeaderMap, Uri, header};
use url::Url;

/// Marker extension set by the server when the connection itself is TLS.
#[derive(Debug, Clone, Copy)]
pub struct EncryptedConnection;

/// What the strategy may look at on an inbound request.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    uri: Uri,
    headers: HeaderMap,
    encrypted: bool,
}

impl AuthRequest {
    pub fn new(uri: Uri, headers: HeaderMap) -> Self {
        let encrypted = uri.scheme_str() == Some("https");
        Self {
            uri,
            headers,
            encrypted,
        }
    }

    pub fn from_parts(parts: &Parts) -> Self {
        let mut request = Self::new(parts.uri.clone(), parts.headers.clone());
        if parts.extensions.get::<EncryptedConnection>().is_some() {
            request.encrypted = true;
        }
        request
    }

    pub fn with_encrypted(mut self, encrypted: bool) -> Self {
        self.encrypted = encrypted;
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Path plus query string as received.
    pub fn path_and_query(&self) -> &str {
        self.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("")
    }

    /// First value of a query parameter, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Value of cookie `name` across all `Cookie` headers.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|raw| parse_cookie(raw, name))
            .map(String::from)
    }

    /// The URL the client actually requested, honouring proxy headers.
    pub fn original_url(&self) -> String {
        let forwarded_https = self
            .header("x-forwarded-proto")
            .map(|p| first_entry(p).eq_ignore_ascii_case("https"))
            .unwrap_or(false);
        let scheme = if self.encrypted || forwarded_https {
            "https"
        } else {
            "http"
        };

        let host = self
            .header("x-forwarded-host")
            .map(first_entry)
            .filter(|h| !h.is_empty())
            .or_else(|| self.header(header::HOST.as_str()))
            .or_else(|| self.uri.authority().map(|a| a.as_str()))
            .unwrap_or("");

        let forwarded_port = self
            .header("x-forwarded-port")
            .map(first_entry)
            .filter(|p| !p.is_empty());

        match forwarded_port {
            Some(port) => format!(
                "{scheme}://{}:{port}{}",
                strip_port(host),
                self.path_and_query()
            ),
            None => format!("{scheme}://{host}{}", self.path_and_query()),
        }
    }

    /// Post-login return address: the configured callback (resolved
    /// against the original URL when relative) or the original URL itself.
    pub fn return_url(&self, callback_url: Option<&str>) -> String {
        let original = self.original_url();
        let Some(callback) = callback_url else {
            return original;
        };
        if Url::parse(callback).is_ok() {
            return callback.to_string();
        }
        Url::parse(&original)
            .and_then(|base| base.join(callback))
            .map(String::from)
            .unwrap_or_else(|_| callback.to_string())
    }
}

fn first_entry(value: &str) -> &str {
    value.split(',').next().unwrap_or("").trim()
}

/// Host without a trailing `:port`. Bracketed IPv6 literals keep their
/// brackets.
fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Parse a specific cookie from a Cookie header value.
///
/// Best effort: segments without `=` are skipped, whitespace around names
/// and values is trimmed.
pub fn parse_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn request(uri: &str, headers: &[(&'static str, &'static str)]) -> AuthRequest {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.append(*k, HeaderValue::from_static(v));
        }
        AuthRequest::new(uri.parse().unwrap(), map)
    }

    #[test]
    fn test_parse_cookie_found() {
        let header = "iPlanetDirectoryPro=AQIC5w; other=xyz";
        assert_eq!(parse_cookie(header, "iPlanetDirectoryPro"), Some("AQIC5w"));
    }

    #[test]
    fn test_parse_cookie_trims_whitespace() {
        let header = "a=1;   iPlanetDirectoryPro =  tok  ;b=2";
        assert_eq!(parse_cookie(header, "iPlanetDirectoryPro"), Some("tok"));
    }

    #[test]
    fn test_parse_cookie_not_found() {
        assert_eq!(parse_cookie("other=xyz", "iPlanetDirectoryPro"), None);
        assert_eq!(parse_cookie("", "iPlanetDirectoryPro"), None);
    }

    #[test]
    fn test_parse_cookie_malformed_segments_ignored() {
        let header = ";;garbage; =nokey; iPlanetDirectoryPro=tok==";
        assert_eq!(parse_cookie(header, "iPlanetDirectoryPro"), Some("tok=="));
    }

    #[test]
    fn test_parse_cookie_prefix_name_does_not_match() {
        assert_eq!(parse_cookie("iPlanetDirectoryProX=1", "iPlanetDirectoryPro"), None);
    }

    #[test]
    fn test_cookie_across_headers() {
        let req = request(
            "/",
            &[("cookie", "a=1"), ("cookie", "iPlanetDirectoryPro=tok")],
        );
        assert_eq!(req.cookie("iPlanetDirectoryPro").as_deref(), Some("tok"));
        assert_eq!(req.cookie("missing"), None);
    }

    #[test]
    fn test_query_param() {
        let req = request("/login?error=access%20denied&x=1", &[]);
        assert_eq!(req.query_param("error").as_deref(), Some("access denied"));
        assert_eq!(req.query_param("nope"), None);
        assert_eq!(request("/plain", &[]).query_param("error"), None);
    }

    #[test]
    fn test_original_url_behind_proxy() {
        let req = request(
            "/account",
            &[
                ("host", "app.local"),
                ("x-forwarded-proto", "https"),
                ("x-forwarded-host", "public.example,internal.example"),
                ("x-forwarded-port", "8443"),
            ],
        );
        assert_eq!(req.original_url(), "https://public.example:8443/account");
    }

    #[test]
    fn test_original_url_plain() {
        let req = request("/account?tab=2", &[("host", "app.local:3000")]);
        assert_eq!(req.original_url(), "http://app.local:3000/account?tab=2");
    }

    #[test]
    fn test_original_url_encrypted_connection() {
        let req = request("/a", &[("host", "app.local")]).with_encrypted(true);
        assert_eq!(req.original_url(), "https://app.local/a");
    }

    #[test]
    fn test_from_parts_reads_encrypted_marker() {
        let (mut parts, _) = Request::builder()
            .uri("/secure")
            .header("host", "app.local")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(EncryptedConnection);
        let req = AuthRequest::from_parts(&parts);
        assert_eq!(req.original_url(), "https://app.local/secure");
    }

    #[test]
    fn test_return_url_variants() {
        let req = request("/account", &[("host", "app.local")]);
        assert_eq!(req.return_url(None), "http://app.local/account");
        assert_eq!(
            req.return_url(Some("https://cb.example/done")),
            "https://cb.example/done"
        );
        assert_eq!(req.return_url(Some("/welcome")), "http://app.local/welcome");
    }

    #[test]
    fn test_forwarded_port_replaces_host_port() {
        let req = request(
            "/account",
            &[("host", "app.local:3000"), ("x-forwarded-port", "8443")],
        );
        let original = req.original_url();
        assert_eq!(original, "http://app.local:8443/account");
        assert!(Url::parse(&original).is_ok());
    }

    #[test]
    fn test_forwarded_port_keeps_ipv6_host() {
        let req = request(
            "/account",
            &[("host", "[::1]:3000"), ("x-forwarded-port", "8443")],
        );
        assert_eq!(req.original_url(), "http://[::1]:8443/account");

        let bare = request("/a", &[("host", "[::1]"), ("x-forwarded-port", "8443")]);
        assert_eq!(bare.original_url(), "http://[::1]:8443/a");
    }

    #[test]
    fn test_relative_callback_with_host_port_and_forwarded_port() {
        let req = request(
            "/account",
            &[("host", "app.local:3000"), ("x-forwarded-port", "8443")],
        );
        assert_eq!(req.return_url(Some("/cb")), "http://app.local:8443/cb");
    }
}
