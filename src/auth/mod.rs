use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;
use crate::http::{ApiClient, ApiRequest};
use crate::lookup::OptionId;
use crate::session::Session;

pub const LOGIN_ENDPOINT: &str = "/Auth/login";

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Login payload as the backend returns it
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    token: String,
    #[serde(rename = "userId", alias = "user_id", alias = "id")]
    user_id: OptionId,
    #[serde(default)]
    role: String,
    #[serde(rename = "roleId", alias = "role_id", default)]
    role_id: i64,
}

impl From<LoginResponse> for Session {
    fn from(r: LoginResponse) -> Self {
        Session::new(r.token, r.user_id.to_string(), r.role, r.role_id)
    }
}

/// Session creation and destruction against the backend
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Authenticate and make the returned credential the active session
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ClientError> {
        let body = serde_json::to_value(credentials)?;
        let response = self.client.send(&ApiRequest::post(LOGIN_ENDPOINT, body)).await?;

        let session = parse_login(response.into_body())?;
        self.client.session().begin(session.clone()).await?;
        Ok(session)
    }

    /// End the active session. Returns whether one was active.
    pub async fn logout(&self) -> Result<bool, ClientError> {
        Ok(self.client.session().end().await?)
    }

    pub async fn whoami(&self) -> Option<Session> {
        self.client.session().current().await
    }
}

/// Accepts the payload bare or wrapped in `{ "data": ... }`
fn parse_login(body: Value) -> Result<Session, ClientError> {
    let payload = match body {
        Value::Object(mut map) if !map.contains_key("token") && !map.contains_key("accessToken") => {
            map.remove("data").unwrap_or(Value::Object(map))
        }
        other => other,
    };

    let response: LoginResponse = serde_json::from_value(payload)
        .map_err(|e| ClientError::Decode(format!("unexpected login response: {}", e)))?;
    Ok(response.into())
}
