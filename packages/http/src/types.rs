use std::fmt;

use bytes::Bytes;
use url::Url;

/// HTTP method for requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::HEAD => http::Method::HEAD,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
            Method::PATCH => http::Method::PATCH,
            Method::OPTIONS => http::Method::OPTIONS,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", http::Method::from(*self))
    }
}

/// An outgoing request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,

    /// Fully resolved target URL
    pub url: Url,

    /// Value for the `Host` header; the executor derives one when unset
    pub host: Option<String>,

    /// Extra request headers, sent in order
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            host: None,
            headers: Vec::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}

/// Response headers grouped by name.
///
/// Names keep the order in which they were first seen; values keep arrival
/// order. Names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMultiMap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMultiMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value under `name`, after any values already there.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
    }

    /// Iterate over `(name, values)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderMultiMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = HeaderMultiMap::new();
        for (name, value) in iter {
            map.append(name, value);
        }
        map
    }
}

/// HTTP response from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Status text (e.g., "OK", "Not Found")
    pub status_text: String,

    /// Response headers
    pub headers: HeaderMultiMap,

    /// The complete response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status indicates a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_builds_bare_request() {
        let url = Url::parse("http://example.com/a").unwrap();
        let req = HttpRequest::get(url.clone());
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url, url);
        assert!(req.host.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn builders_accumulate() {
        let req = HttpRequest::get(Url::parse("http://example.com/").unwrap())
            .with_host("example.com")
            .with_header("Accept", "text/plain")
            .with_header("Accept", "text/html");
        assert_eq!(req.host.as_deref(), Some("example.com"));
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn method_converts_and_displays() {
        assert_eq!(http::Method::from(Method::PATCH), http::Method::PATCH);
        assert_eq!(Method::DELETE.to_string(), "DELETE");
        assert_eq!(Method::default(), Method::GET);
    }

    #[test]
    fn multimap_groups_values_case_insensitively() {
        let mut headers = HeaderMultiMap::new();
        headers.append("Set-Cookie", "a=1");
        headers.append("Content-Type", "text/plain");
        headers.append("set-cookie", "b=2");

        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.get("SET-COOKIE").unwrap(),
            &["a=1".to_string(), "b=2".to_string()]
        );
        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Set-Cookie", "Content-Type"]);
    }

    #[test]
    fn multimap_from_iter() {
        let headers: HeaderMultiMap = vec![("x-a", "1"), ("x-b", "2"), ("x-a", "3")]
            .into_iter()
            .collect();
        assert_eq!(headers.get("x-a").unwrap().len(), 2);
        assert!(headers.get("x-c").is_none());
    }

    #[test]
    fn status_classes() {
        let mut resp = HttpResponse {
            status: 204,
            status_text: "No Content".to_string(),
            headers: HeaderMultiMap::new(),
            body: Bytes::new(),
        };
        assert!(resp.is_success());
        resp.status = 404;
        assert!(resp.is_client_error());
        resp.status = 503;
        assert!(resp.is_server_error());
    }
}
