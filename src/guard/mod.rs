use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::ClientConfig;

/// Route guard settings: where to send users and which cookie marks them signed in
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub login_path: String,
    pub home_path: String,
    pub cookie_name: String,
    pub public_paths: Vec<String>,
}

impl GuardConfig {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            login_path: config.routes.login_path.clone(),
            home_path: config.routes.home_path.clone(),
            cookie_name: config.session.cookie_name.clone(),
            public_paths: config.routes.public_paths.clone(),
        }
    }

    /// Exact match, or a path below a public prefix
    pub fn is_public(&self, path: &str) -> bool {
        path == self.login_path
            || self.public_paths.iter().any(|p| {
                path == p || (path.starts_with(p.as_str()) && path[p.len()..].starts_with('/'))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

pub fn decide(config: &GuardConfig, path: &str, authenticated: bool) -> GuardDecision {
    if authenticated && path == config.login_path {
        GuardDecision::Redirect(config.home_path.clone())
    } else if !authenticated && !config.is_public(path) {
        GuardDecision::Redirect(config.login_path.clone())
    } else {
        GuardDecision::Allow
    }
}

/// Middleware redirecting signed-out navigations to login and signed-in ones away from it
pub async fn route_guard(State(config): State<Arc<GuardConfig>>, request: Request, next: Next) -> Response {
    let authenticated = cookie_value(request.headers(), &config.cookie_name).is_some();
    let path = request.uri().path().to_string();

    match decide(&config, &path, authenticated) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(to) => {
            tracing::debug!("Guard redirect {} -> {} (authenticated: {})", path, to, authenticated);
            Redirect::temporary(&to).into_response()
        }
    }
}

/// Wrap `router` with the route guard and request tracing
pub fn protect(router: Router, config: GuardConfig) -> Router {
    router
        .layer(middleware::from_fn_with_state(Arc::new(config), route_guard))
        .layer(TraceLayer::new_for_http())
}

/// Non-empty value of cookie `name` across all `Cookie` headers
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value)
}
