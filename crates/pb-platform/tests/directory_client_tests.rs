//! Graph Client Tests
//!
//! Login and Graph endpoints are both served by one wiremock server.

use pb_common::Secret;
use pb_config::GraphConfig;
use pb_platform::{DirectoryError, DirectoryProvider, GraphClient};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USERS_FILTER: &str =
    "identities/any(id:id/issuerAssignedId eq 'a@x.com' and id/issuer eq 'contoso.onmicrosoft.com')";
const EXTENSION_PATH: &str = "/v1.0/users/obj-1/extensions/com.policybridge.mfa";

fn client(server: &MockServer) -> GraphClient {
    GraphClient::new(
        reqwest::Client::new(),
        GraphConfig {
            tenant_id: "contoso".into(),
            client_id: "app-id".into(),
            client_secret: Secret::new("app-secret"),
            login_base_url: server.uri(),
            graph_base_url: server.uri(),
            ..Default::default()
        },
    )
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/contoso/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=app-id"))
        .and(body_string_contains("scope=https%3A%2F%2Fgraph.microsoft.com%2F.default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "graph-token",
            "token_type": "Bearer",
            "expires_in": 3599,
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_user_lookup(server: &MockServer, users: Value) {
    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .and(query_param("$filter", USERS_FILTER))
        .and(query_param("$top", "1"))
        .and(header("authorization", "Bearer graph-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": users })))
        .mount(server)
        .await;
}

fn existing_user() -> Value {
    json!([{
        "id": "obj-1",
        "displayName": "a@x.com",
        "accountEnabled": true,
        "identities": [{
            "signInType": "emailAddress",
            "issuer": "contoso.onmicrosoft.com",
            "issuerAssignedId": "a@x.com",
        }],
    }])
}

async fn request_body(server: &MockServer, request_path: &str) -> Value {
    let requests = server.received_requests().await.unwrap();
    let request = requests
        .iter()
        .find(|r| r.url.path() == request_path)
        .unwrap();
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn test_get_user_by_email() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_user_lookup(&server, existing_user()).await;

    let user = client(&server).get_user_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(user.id, "obj-1");
    assert_eq!(user.identifier, "a@x.com");
    assert!(user.verified);
}

#[tokio::test]
async fn test_unknown_user_is_none() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_user_lookup(&server, json!([])).await;

    let client = client(&server);
    assert!(client.get_user_by_email("a@x.com").await.unwrap().is_none());
    assert!(!client.user_exists("a@x.com").await.unwrap());
    assert!(!client.delete_user_by_email("a@x.com").await.unwrap());
}

#[tokio::test]
async fn test_filter_escapes_quotes() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .and(query_param(
            "$filter",
            "identities/any(id:id/issuerAssignedId eq 'o''neil@x.com' and id/issuer eq 'contoso.onmicrosoft.com')",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server).get_user_by_email("o'neil@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_user_body() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1.0/users"))
        .and(body_partial_json(json!({
            "accountEnabled": true,
            "mailNickname": "a",
            "identities": [{
                "signInType": "emailAddress",
                "issuer": "contoso.onmicrosoft.com",
                "issuerAssignedId": "a@x.com",
            }],
            "passwordProfile": {
                "forceChangePasswordNextSignIn": false,
                "password": "Pw1!",
            },
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "obj-new" })))
        .expect(1)
        .mount(&server)
        .await;

    let account = client(&server)
        .create_user("a@x.com", &Secret::new("Pw1!"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.identifier, "a@x.com");
    assert_eq!(account.account_id, "obj-new");
}

#[tokio::test]
async fn test_create_user_without_id_is_none() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1.0/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .mount(&server)
        .await;

    let result = client(&server).create_user("a@x.com", &Secret::new("Pw1!")).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_create_user_rejected() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/v1.0/users"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": "Request_BadRequest", "message": "password complexity" }
        })))
        .mount(&server)
        .await;

    let result = client(&server).create_user("a@x.com", &Secret::new("weak")).await;
    assert!(matches!(result, Err(DirectoryError::Api { status: 400, .. })));
}

#[tokio::test]
async fn test_delete_user() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_user_lookup(&server, existing_user()).await;

    Mock::given(method("DELETE"))
        .and(path("/v1.0/users/obj-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server).delete_user_by_email("a@x.com").await.unwrap());
}

#[tokio::test]
async fn test_enable_mfa_creates_extension() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_user_lookup(&server, existing_user()).await;

    Mock::given(method("GET"))
        .and(path(EXTENSION_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1.0/users/obj-1/extensions"))
        .and(body_partial_json(json!({
            "@odata.type": "#microsoft.graph.openTypeExtension",
            "extensionName": "com.policybridge.mfa",
            "mfaEnabled": true,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let status = client(&server).enable_mfa("a@x.com").await.unwrap();
    assert!(status.mfa_enabled);

    let body = request_body(&server, "/v1.0/users/obj-1/extensions").await;
    let secret = body["totpSecret"].as_str().unwrap();
    assert_eq!(secret.len(), 32);
    assert!(secret.chars().all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
}

#[tokio::test]
async fn test_enable_mfa_keeps_existing_secret() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_user_lookup(&server, existing_user()).await;

    Mock::given(method("GET"))
        .and(path(EXTENSION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "extensionName": "com.policybridge.mfa",
            "mfaEnabled": false,
            "totpSecret": "JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXP",
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(EXTENSION_PATH))
        .and(body_partial_json(json!({
            "mfaEnabled": true,
            "totpSecret": "JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXP",
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server).enable_mfa("a@x.com").await.unwrap().mfa_enabled);
}

#[tokio::test]
async fn test_disable_mfa_clears_secret() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_user_lookup(&server, existing_user()).await;

    Mock::given(method("GET"))
        .and(path(EXTENSION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mfaEnabled": true,
            "totpSecret": "JBSWY3DPEHPK3PXP",
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(EXTENSION_PATH))
        .and(body_partial_json(json!({ "mfaEnabled": false, "totpSecret": null })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let status = client(&server).disable_mfa("a@x.com").await.unwrap();
    assert!(!status.mfa_enabled);
}

#[tokio::test]
async fn test_disable_mfa_without_extension_writes_nothing() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_user_lookup(&server, existing_user()).await;

    Mock::given(method("GET"))
        .and(path(EXTENSION_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    assert!(!client(&server).disable_mfa("a@x.com").await.unwrap().mfa_enabled);
}

#[tokio::test]
async fn test_mfa_status() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_user_lookup(&server, existing_user()).await;

    Mock::given(method("GET"))
        .and(path(EXTENSION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "mfaEnabled": true })))
        .mount(&server)
        .await;

    assert!(client(&server).get_mfa_status("a@x.com").await.unwrap().mfa_enabled);
}

#[tokio::test]
async fn test_mfa_for_unknown_user() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_user_lookup(&server, json!([])).await;

    let result = client(&server).get_mfa_status("a@x.com").await;
    assert!(matches!(result, Err(DirectoryError::UserNotFound(_))));
}

#[tokio::test]
async fn test_missing_tenant_is_configuration_error() {
    let client = GraphClient::new(reqwest::Client::new(), GraphConfig::default());
    assert!(!client.is_configured());

    let result = client.get_user_by_email("a@x.com").await;
    assert!(matches!(result, Err(DirectoryError::Configuration(_))));
}
