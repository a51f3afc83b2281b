//! HTTP request type.

use std::collections::HashMap;

use fleet_table::{parse_query, url_decode};

/// HTTP request methods the admin pages answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// DELETE method
    Delete,
}

impl Method {
    /// Parses a method from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path, without the query string.
    pub path: String,
    /// Query string parameters.
    pub query: HashMap<String, String>,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Vec<u8>,
}

impl Request {
    /// Creates a request. A query string in `target` is split off into
    /// [`query`](Self::query).
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        let target = target.into();
        let (path, query) = match target.split_once('?') {
            Some((path, qs)) => (path.to_string(), Self::parse_query_string(qs)),
            None => (target, HashMap::new()),
        };
        Self {
            method,
            path,
            query,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a GET request.
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::Get, target)
    }

    /// Creates a POST request.
    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::Post, target)
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets an `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn form_body(self, encoded: impl Into<String>) -> Self {
        self.header("Content-Type", "application/x-www-form-urlencoded")
            .body(encoded.into())
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Gets a header value.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Gets a query parameter.
    pub fn get_query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Parses the body as JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Decodes an urlencoded form body. Later duplicates win.
    pub fn form(&self) -> HashMap<String, String> {
        Self::parse_query_string(&String::from_utf8_lossy(&self.body))
    }

    /// Returns all cookies sent with the request.
    pub fn cookies(&self) -> HashMap<String, String> {
        self.get_header("Cookie")
            .map(|header| {
                header
                    .split(';')
                    .filter_map(|pair| {
                        let (name, value) = pair.trim().split_once('=')?;
                        Some((name.trim().to_string(), value.trim().to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns a cookie's raw value.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.cookies().remove(name)
    }

    /// Returns the `Content-Type` without parameters, lowercased.
    pub fn content_type(&self) -> Option<String> {
        self.get_header("Content-Type")
            .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
    }

    /// Splits a `multipart/form-data` body into its parts.
    ///
    /// Returns `None` when the body is not multipart or carries no boundary.
    pub fn multipart(&self) -> Option<Vec<Part>> {
        let content_type = self.get_header("Content-Type")?;
        if !content_type.trim_start().starts_with("multipart/form-data") {
            return None;
        }
        let boundary = content_type
            .split(';')
            .find_map(|param| param.trim().strip_prefix("boundary="))?
            .trim_matches('"');
        if boundary.is_empty() {
            return None;
        }

        let delimiter = format!("--{boundary}");
        let mut parts = Vec::new();
        for chunk in split_bytes(&self.body, delimiter.as_bytes()).into_iter().skip(1) {
            if chunk.starts_with(b"--") {
                break;
            }
            let chunk = chunk.strip_prefix(b"\r\n").unwrap_or(chunk);
            let chunk = chunk.strip_suffix(b"\r\n").unwrap_or(chunk);
            if let Some(part) = Part::parse(chunk) {
                parts.push(part);
            }
        }
        Some(parts)
    }

    /// Returns whether the client asked for a JSON response.
    pub fn wants_json(&self) -> bool {
        self.get_header("Accept")
            .is_some_and(|accept| accept.contains("application/json"))
    }

    /// Parses query parameters from a query string.
    pub fn parse_query_string(query: &str) -> HashMap<String, String> {
        parse_query(query).into_iter().collect()
    }

    /// Returns the path split into decoded, non-empty segments.
    pub fn segments(&self) -> Vec<String> {
        self.path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(url_decode)
            .collect()
    }
}

/// One part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Form field name.
    pub name: String,
    /// Original file name, for file inputs.
    pub filename: Option<String>,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Raw contents.
    pub data: Vec<u8>,
}

impl Part {
    fn parse(chunk: &[u8]) -> Option<Self> {
        let split = find_bytes(chunk, b"\r\n\r\n")?;
        let head = String::from_utf8_lossy(&chunk[..split]);

        let mut name = None;
        let mut filename = None;
        let mut content_type = None;
        for line in head.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case("Content-Disposition") {
                for param in value.split(';').skip(1) {
                    match param.trim().split_once('=') {
                        Some(("name", v)) => name = Some(v.trim_matches('"').to_string()),
                        Some(("filename", v)) => filename = Some(v.trim_matches('"').to_string()),
                        _ => {}
                    }
                }
            } else if key.trim().eq_ignore_ascii_case("Content-Type") {
                content_type = Some(value.trim().to_string());
            }
        }

        Some(Self {
            name: name?,
            filename,
            content_type,
            data: chunk[split + 4..].to_vec(),
        })
    }

    /// Returns the contents as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn split_bytes<'a>(mut haystack: &'a [u8], needle: &[u8]) -> Vec<&'a [u8]> {
    let mut pieces = Vec::new();
    while let Some(at) = find_bytes(haystack, needle) {
        pieces.push(&haystack[..at]);
        haystack = &haystack[at + needle.len()..];
    }
    pieces.push(haystack);
    pieces
}
