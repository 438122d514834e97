use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use super::{ApiRequest, ApiResponse, Attempt, Navigator};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::session::SessionHandle;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Single dispatch entry point for the REST backend.
///
/// Attaches the session credential to every call and reacts to `401`
/// centrally: the session the request was sent under is ended and, where
/// the host can navigate, the user is sent to the login page once. The
/// rejection still reaches the caller.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    login_path: String,
    log_requests: bool,
    session: SessionHandle,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        session: SessionHandle,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        // Reject a malformed base URL up front rather than on first call
        Url::parse(&config.api.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(config.api.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            login_path: config.routes.login_path.clone(),
            log_requests: config.api.enable_request_logging,
            session,
            navigator,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        self.send_attempt(request, Attempt::FIRST).await
    }

    /// Dispatch `request` as the given attempt of its logical call.
    ///
    /// The request is never re-issued here; `attempt` only decides whether a
    /// `401` may still trigger the logout redirect.
    pub async fn send_attempt(&self, request: &ApiRequest, attempt: Attempt) -> Result<ApiResponse, ClientError> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "api_request",
            method = %request.method,
            path = %request.path,
            %request_id,
            attempt = attempt.number(),
        );

        self.dispatch(request, attempt, request_id).instrument(span).await
    }

    /// GET `path` and decode the body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(&ApiRequest::get(path)).await?.json()
    }

    async fn dispatch(&self, request: &ApiRequest, attempt: Attempt, request_id: Uuid) -> Result<ApiResponse, ClientError> {
        let url = self.url_for(request)?;
        let (headers, token) = self.headers_for(request, request_id).await?;

        let mut builder = self.http.request(request.method.clone(), url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        if self.log_requests {
            tracing::debug!("Dispatching {} {}", request.method, request.path);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::debug!("Transport failure: {}", e);
            ClientError::Network(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        let body = parse_body(&bytes);

        if status == StatusCode::UNAUTHORIZED {
            return Err(self.on_unauthorized(attempt, token.as_deref(), body).await);
        }

        if !status.is_success() {
            tracing::debug!("Backend returned {}", status);
            return Err(ClientError::from_status(status.as_u16(), body));
        }

        Ok(ApiResponse { status, headers, body })
    }

    /// `sent_token` is the credential the rejected request carried. A
    /// session begun while the request was in flight is left alone.
    async fn on_unauthorized(&self, attempt: Attempt, sent_token: Option<&str>, body: Value) -> ClientError {
        if !attempt.is_first() {
            tracing::debug!("401 on {}; surfacing without redirect", attempt);
            return ClientError::Unauthorized { attempt, body };
        }

        tracing::warn!("Backend rejected credentials; ending session");
        match self.session.end_if_current(sent_token).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("Rejected credential was already replaced; not redirecting");
                return ClientError::Unauthorized { attempt, body };
            }
            Err(e) => {
                // The in-memory credential is already gone; only persistence failed
                tracing::error!("Session could not be fully cleared: {}", e);
            }
        }

        if self.navigator.can_navigate() {
            tracing::info!("Redirecting to {}", self.login_path);
            self.navigator.navigate(&self.login_path);
        }

        ClientError::Unauthorized { attempt, body }
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, ClientError> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.base_url,
            request.path.trim_start_matches('/')
        ))?;

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Headers for one dispatch, plus the session token they carry
    async fn headers_for(
        &self,
        request: &ApiRequest,
        request_id: Uuid,
    ) -> Result<(HeaderMap, Option<String>), ClientError> {
        let mut headers = HeaderMap::new();

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ClientError::InvalidHeader(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::InvalidHeader(name.as_str().to_string()))?;
            headers.insert(name, value);
        }

        headers.insert(
            HeaderName::from_static(REQUEST_ID_HEADER),
            HeaderValue::from_str(&request_id.to_string())
                .map_err(|_| ClientError::InvalidHeader(REQUEST_ID_HEADER.to_string()))?,
        );

        // The active session always wins over a caller-supplied Authorization header
        let token = self.session.token().await;
        if let Some(token) = &token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::InvalidHeader(AUTHORIZATION.as_str().to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok((headers, token))
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}
