//! HTTP response type.

use std::collections::HashMap;

use serde::Serialize;

const HTML: &str = "text/html; charset=utf-8";
const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// What a handler answers with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code.
    pub status: u16,
    /// Headers; names keep the case they were set with.
    pub headers: HashMap<String, String>,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200)
    }
}

impl Response {
    /// An empty response with `status`.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    fn with_body(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status)
            .header("Content-Type", content_type)
            .body(body)
    }

    /// A page.
    pub fn html(body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::with_body(200, HTML, body)
    }

    /// `data` as JSON, or a bare 500 when it does not serialize.
    pub fn json<T: Serialize>(data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self::with_body(200, JSON, body),
            Err(_) => Self::plain(500),
        }
    }

    /// A 302 to `url`.
    pub fn redirect(url: impl Into<String>) -> Self {
        Self::new(302).header("Location", url)
    }

    /// A plain-text response whose body is the status text.
    pub fn plain(status: u16) -> Self {
        let res = Self::new(status);
        let text = res.status_text();
        Self::with_body(status, TEXT, text)
    }

    /// 400.
    pub fn bad_request() -> Self {
        Self::plain(400)
    }

    /// 405.
    pub fn method_not_allowed() -> Self {
        Self::plain(405)
    }

    /// 500.
    pub fn internal_server_error() -> Self {
        Self::plain(500)
    }

    /// Sets a header, replacing one of the same name in any case.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value.into());
        self
    }

    /// Sets the `Set-Cookie` header.
    #[must_use]
    pub fn set_cookie(self, cookie: impl Into<String>) -> Self {
        self.header("Set-Cookie", cookie)
    }

    /// Replaces the status code.
    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Looks a header up by name, ignoring case.
    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find_map(|(k, v)| k.eq_ignore_ascii_case(key).then_some(v.as_str()))
    }

    /// The redirect target, for 3xx responses.
    pub fn location(&self) -> Option<&str> {
        (300..400)
            .contains(&self.status)
            .then(|| self.get_header("Location"))
            .flatten()
    }

    /// The body as UTF-8, if it is.
    pub fn body_string(&self) -> Option<String> {
        std::str::from_utf8(&self.body).ok().map(str::to_string)
    }

    /// Reason phrase of the status code.
    pub fn status_text(&self) -> &'static str {
        match self.status {
            200 => "OK",
            201 => "Created",
            302 => "Found",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            422 => "Unprocessable Entity",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}
