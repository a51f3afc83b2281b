//! Query-string form of a [`TableViewState`].
//!
//! `q` carries the search, `o` the sort key (prefixed with `-` for
//! descending) and `page` the page number.

use std::collections::HashMap;

use crate::view::{SortDirection, TableViewState};

/// Percent-encodes a query component; spaces become `+`.
pub fn url_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

/// Decodes a percent-encoded query component. Malformed escapes are kept
/// verbatim.
pub fn url_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(b) => {
                        out.push(b);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Splits a query string (with or without the leading `?`) into decoded
/// key/value pairs.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (url_decode(k), url_decode(v)),
            None => (url_decode(pair), String::new()),
        })
        .collect()
}

impl TableViewState {
    /// Reads the state from query parameters. Missing or malformed values
    /// fall back to the defaults.
    pub fn from_params(params: &HashMap<String, String>, page_size: usize) -> Self {
        let mut state = Self::new(page_size);
        if let Some(q) = params.get("q") {
            state.search = q.clone();
        }
        if let Some(o) = params.get("o").filter(|o| !o.is_empty()) {
            match o.strip_prefix('-') {
                Some(key) if !key.is_empty() => {
                    state.sort_key = Some(key.to_string());
                    state.sort_dir = SortDirection::Desc;
                }
                Some(_) => {}
                None => state.sort_key = Some(o.clone()),
            }
        }
        if let Some(page) = params.get("page").and_then(|p| p.parse::<usize>().ok()) {
            state.set_page(page);
        }
        state
    }

    /// Reads the state from a raw query string.
    pub fn from_query(query: &str, page_size: usize) -> Self {
        let params: HashMap<String, String> = parse_query(query).into_iter().collect();
        Self::from_params(&params, page_size)
    }

    /// Returns the `o` parameter for the current sort.
    pub fn ordering(&self) -> Option<String> {
        self.sort_key.as_ref().map(|key| match self.sort_dir {
            SortDirection::Asc => key.clone(),
            SortDirection::Desc => format!("-{key}"),
        })
    }

    /// Builds the query string, starting with `?`, or an empty string when
    /// every setting is at its default.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();

        if !self.search.is_empty() {
            parts.push(format!("q={}", url_encode(&self.search)));
        }
        if let Some(o) = self.ordering() {
            parts.push(format!("o={}", url_encode(&o)));
        }
        if self.page > 1 {
            parts.push(format!("page={}", self.page));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        assert_eq!(url_encode("Volvo FH/16"), "Volvo+FH%2F16");
        assert_eq!(url_encode("Škoda"), "%C5%A0koda");
        assert_eq!(url_decode("Volvo+FH%2F16"), "Volvo FH/16");
        assert_eq!(url_decode("%C5%A0koda"), "Škoda");
        assert_eq!(url_decode("100%"), "100%");
        assert_eq!(url_decode("%zz"), "%zz");
    }

    #[test]
    fn test_parse_query() {
        let pairs = parse_query("?q=ab+12&o=-reg&flag");
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "ab 12".to_string()),
                ("o".to_string(), "-reg".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_state_from_query() {
        let state = TableViewState::from_query("q=volvo&o=-mot_due&page=3", 25);
        assert_eq!(state.search, "volvo");
        assert_eq!(state.sort_key.as_deref(), Some("mot_due"));
        assert_eq!(state.sort_dir, SortDirection::Desc);
        assert_eq!(state.page, 3);
        assert_eq!(state.page_size, 25);
    }

    #[test]
    fn test_malformed_params_fall_back() {
        let state = TableViewState::from_query("page=abc&o=-", 10);
        assert_eq!(state.page, 1);
        assert_eq!(state.sort_key, None);

        let state = TableViewState::from_query("page=0", 10);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_query_string_round_trip() {
        let state = TableViewState::new(10)
            .with_search("ab 12")
            .with_sort("reg", SortDirection::Desc)
            .with_page(2);
        let query = state.to_query_string();
        assert_eq!(query, "?q=ab+12&o=-reg&page=2");
        assert_eq!(TableViewState::from_query(&query, 10), state);
        assert_eq!(TableViewState::new(10).to_query_string(), "");
    }
}
