mod common;

use anyhow::Result;
use serde_json::json;

use common::{FakeBackend, TestClient, VALID_TOKEN};
use workforce_client::http::ApiRequest;
use workforce_client::resources::{Collection, Resources};
use workforce_client::ClientError;

#[tokio::test]
async fn list_unwraps_items_envelope() -> Result<()> {
    let backend = FakeBackend::spawn().await?;
    let tc = TestClient::signed_in(&backend, VALID_TOKEN).await?;

    let clients = Resources::new(&tc.client).list(Collection::Client).await?;
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0]["name"], "Acme");
    Ok(())
}

#[tokio::test]
async fn list_accepts_bare_array() -> Result<()> {
    let backend = FakeBackend::spawn().await?;
    let tc = TestClient::signed_in(&backend, VALID_TOKEN).await?;

    let timesheets = Resources::new(&tc.client).list(Collection::Timesheet).await?;
    assert_eq!(timesheets, vec![json!({ "id": 10, "hours": 8 })]);
    Ok(())
}

#[tokio::test]
async fn get_missing_record_reports_backend_message() -> Result<()> {
    let backend = FakeBackend::spawn().await?;
    let mut tc = TestClient::signed_in(&backend, VALID_TOKEN).await?;
    let resources = Resources::new(&tc.client);

    let found = resources.get(Collection::Client, "1").await?;
    assert_eq!(found["id"], 1);

    let err = resources.get(Collection::Client, "99").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.error_code(), "NOT_FOUND");
    assert_eq!(err.to_string(), "HTTP 404: Client not found");

    assert!(tc.client.session().is_active().await);
    assert!(tc.drain_navigations().is_empty());
    Ok(())
}

#[tokio::test]
async fn record_id_cannot_escape_its_collection() -> Result<()> {
    let backend = FakeBackend::spawn().await?;
    let tc = TestClient::signed_in(&backend, VALID_TOKEN).await?;
    let resources = Resources::new(&tc.client);

    // Sent as the literal id "1?x=2", which the backend does not know
    let err = resources.get(Collection::Client, "1?x=2").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));

    let err = resources.delete(Collection::Client, "..").await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_PATH");
    assert_eq!(backend.authorization_seen().len(), 1, "rejected id never reaches the backend");
    Ok(())
}

#[tokio::test]
async fn delete_accepts_empty_body() -> Result<()> {
    let backend = FakeBackend::spawn().await?;
    let tc = TestClient::signed_in(&backend, VALID_TOKEN).await?;

    Resources::new(&tc.client).delete(Collection::Client, "1").await?;
    Ok(())
}

#[tokio::test]
async fn post_body_is_sent_as_json() -> Result<()> {
    let backend = FakeBackend::spawn().await?;
    let tc = TestClient::signed_in(&backend, VALID_TOKEN).await?;

    let res = tc
        .client
        .send(&ApiRequest::post("/echo", json!({ "hours": 7.5, "note": "standup" })))
        .await?;
    assert_eq!(res.body["received"]["note"], "standup");
    Ok(())
}

#[tokio::test]
async fn expired_token_on_collection_redirects_to_login() -> Result<()> {
    let backend = FakeBackend::spawn().await?;
    let mut tc = TestClient::signed_in(&backend, "expired").await?;

    let err = Resources::new(&tc.client).list(Collection::Client).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized { .. }));
    assert_eq!(tc.drain_navigations(), vec!["/login".to_string()]);

    // Session is gone, so the next call is also rejected and redirects again
    let err = Resources::new(&tc.client).list(Collection::Client).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(tc.drain_navigations(), vec!["/login".to_string()]);
    assert_eq!(backend.authorization_seen(), vec![Some("Bearer expired".to_string()), None]);
    Ok(())
}
