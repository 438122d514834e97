pub mod client;
pub mod envelope;
pub mod navigator;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::ClientError;

pub use client::ApiClient;
pub use envelope::{decode_list, ListShape};
pub use navigator::{ChannelNavigator, HeadlessNavigator, Navigator};

/// Which dispatch of a logical request this is.
///
/// Threaded through each call instead of being stored on the request;
/// only the first attempt may trigger the logout redirect on a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Attempt(u8);

impl Attempt {
    pub const FIRST: Attempt = Attempt(0);

    pub fn next(self) -> Self {
        Attempt(self.0.saturating_add(1))
    }

    pub fn is_first(self) -> bool {
        self.0 == 0
    }

    /// 1-based number for logs and messages
    pub fn number(self) -> u16 {
        self.0 as u16 + 1
    }
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attempt {}", self.number())
    }
}

/// Outbound call description. The pipeline only ever borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Percent-encode `raw` as exactly one path segment.
///
/// `/`, `?`, `#` and `%` are escaped so an id can never change the route;
/// empty, `.` and `..` are rejected.
pub fn path_segment(raw: &str) -> Result<String, ClientError> {
    if raw.is_empty() || raw == "." || raw == ".." {
        return Err(ClientError::InvalidPath(raw.to_string()));
    }

    let mut url = Url::parse("http://segment.local/")?;
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidPath(raw.to_string()))?
        .pop_if_empty()
        .push(raw);

    Ok(url.path().trim_start_matches('/').to_string())
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    pub fn into_list<T: DeserializeOwned>(self, shape: ListShape) -> Result<Vec<T>, ClientError> {
        decode_list(self.body, shape)
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}
