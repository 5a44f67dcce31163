use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use firmdex_auth::{AuthClaims, Role};
use firmdex_core::{PrincipalId, TenantId};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = firmdex_api::app::build_app(jwt_secret).expect("bootstrap");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(
    jwt_secret: &str,
    sub: PrincipalId,
    role: Role,
    tenant_id: Option<TenantId>,
    superuser: bool,
) -> String {
    let now = Utc::now();
    let claims = AuthClaims {
        sub,
        role,
        tenant_id,
        superuser,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn company_payload(tag: u32) -> serde_json::Value {
    json!({
        "name": format!("Company {tag}"),
        "tax_id": format!("{:010}", tag),
        "statistical_number": "123456789",
        "national_court_register": format!("{:010}", 7_000_000 + tag),
        "email": format!("office{tag}@example.com"),
        "phone": "+48123456789",
    })
}

fn address_payload(kind: &str, name: &str) -> serde_json::Value {
    json!({
        "type": kind,
        "name": name,
        "street": "ul. Prosta 51",
        "city": "Warszawa",
        "postal_code": "00-838",
        "country": "poland",
    })
}

/// Create a company as a superuser and return its tenant id.
async fn create_company(
    client: &reqwest::Client,
    srv: &TestServer,
    su_token: &str,
    tag: u32,
) -> TenantId {
    let res = client
        .post(format!("{}/companies", srv.base_url))
        .bearer_auth(su_token)
        .json(&company_payload(tag))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().parse().unwrap()
}

/// Create a user through the API (runs the group synchronizer) and return a
/// token acting as that user.
async fn create_user(
    client: &reqwest::Client,
    srv: &TestServer,
    jwt_secret: &str,
    tenant: TenantId,
    username: &str,
    role: Role,
) -> (PrincipalId, String) {
    let creator = mint_jwt(jwt_secret, PrincipalId::new(), Role::Admin, Some(tenant), true);
    let res = client
        .post(format!("{}/users", srv.base_url))
        .bearer_auth(&creator)
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "role": role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    let id: PrincipalId = body["id"].as_str().unwrap().parse().unwrap();
    let token = mint_jwt(jwt_secret, id, role, Some(tenant), false);
    (id, token)
}

#[tokio::test]
async fn protected_endpoints_require_a_token() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    for path in ["/me", "/companies", "/addresses", "/users"] {
        let res = client
            .get(format!("{}{}", srv.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path {path}");
    }

    let res = client
        .get(format!("{}/healthz", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_tokens_are_rejected() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let now = Utc::now();
    let claims = AuthClaims {
        sub: PrincipalId::new(),
        role: Role::Admin,
        tenant_id: None,
        superuser: true,
        issued_at: now - ChronoDuration::hours(2),
        expires_at: now - ChronoDuration::hours(1),
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .unwrap();

    let res = client
        .get(format!("{}/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn company_owner_is_forced_to_the_creator() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let su = PrincipalId::new();
    let su_token = mint_jwt(jwt_secret, su, Role::Admin, None, true);

    let res = client
        .post(format!("{}/companies", srv.base_url))
        .bearer_auth(&su_token)
        .json(&company_payload(1))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["owner"].as_str().unwrap(), su.to_string());
}

#[tokio::test]
async fn address_tenant_is_forced_and_listings_are_isolated() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let su_token = mint_jwt(jwt_secret, PrincipalId::new(), Role::Admin, None, true);
    let t1 = create_company(&client, &srv, &su_token, 1).await;
    let t2 = create_company(&client, &srv, &su_token, 2).await;

    let (_, m1) = create_user(&client, &srv, jwt_secret, t1, "manager1", Role::Manager).await;
    let (_, m2) = create_user(&client, &srv, jwt_secret, t2, "manager2", Role::Manager).await;

    // Tenant comes from the token, not the payload.
    let res = client
        .post(format!("{}/addresses", srv.base_url))
        .bearer_auth(&m1)
        .json(&address_payload("billing", "HQ"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let a1: serde_json::Value = res.json().await.unwrap();
    assert_eq!(a1["company"].as_str().unwrap(), t1.to_string());
    let a1_id = a1["id"].as_str().unwrap();

    // Each manager lists only their own tenant's addresses.
    let res = client
        .get(format!("{}/addresses", srv.base_url))
        .bearer_auth(&m1)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let res = client
        .get(format!("{}/addresses", srv.base_url))
        .bearer_auth(&m2)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());

    // Cross-tenant detail access is indistinguishable from a missing object.
    let cross = client
        .get(format!("{}/addresses/{}", srv.base_url, a1_id))
        .bearer_auth(&m2)
        .send()
        .await
        .unwrap();
    assert_eq!(cross.status(), StatusCode::NOT_FOUND);
    let cross_body: serde_json::Value = cross.json().await.unwrap();

    let missing = client
        .get(format!(
            "{}/addresses/{}",
            srv.base_url,
            uuid::Uuid::now_v7()
        ))
        .bearer_auth(&m2)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let missing_body: serde_json::Value = missing.json().await.unwrap();
    assert_eq!(cross_body, missing_body);

    // The owner of the object still sees it.
    let own = client
        .get(format!("{}/addresses/{}", srv.base_url, a1_id))
        .bearer_auth(&m1)
        .send()
        .await
        .unwrap();
    assert_eq!(own.status(), StatusCode::OK);
}

#[tokio::test]
async fn second_billing_address_is_rejected() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let su_token = mint_jwt(jwt_secret, PrincipalId::new(), Role::Admin, None, true);
    let t1 = create_company(&client, &srv, &su_token, 1).await;
    let (_, m1) = create_user(&client, &srv, jwt_secret, t1, "manager1", Role::Manager).await;

    let res = client
        .post(format!("{}/addresses", srv.base_url))
        .bearer_auth(&m1)
        .json(&address_payload("billing", "HQ"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/addresses", srv.base_url))
        .bearer_auth(&m1)
        .json(&address_payload("billing", "Second"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Non-billing kinds are unrestricted.
    let res = client
        .post(format!("{}/addresses", srv.base_url))
        .bearer_auth(&m1)
        .json(&address_payload("warehouse", "North"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn role_grants_gate_mutations() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let su_token = mint_jwt(jwt_secret, PrincipalId::new(), Role::Admin, None, true);
    let t1 = create_company(&client, &srv, &su_token, 1).await;

    let (_, viewer) = create_user(&client, &srv, jwt_secret, t1, "viewer1", Role::Viewer).await;
    let (_, manager) = create_user(&client, &srv, jwt_secret, t1, "manager1", Role::Manager).await;

    // Viewers can read but not write.
    let res = client
        .get(format!("{}/addresses", srv.base_url))
        .bearer_auth(&viewer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/addresses", srv.base_url))
        .bearer_auth(&viewer)
        .json(&address_payload("office", "HQ"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Managers may not register companies.
    let res = client
        .post(format!("{}/companies", srv.base_url))
        .bearer_auth(&manager)
        .json(&company_payload(9))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // A principal without tenant affiliation gets no tenant-scoped writes,
    // even as superuser.
    let res = client
        .post(format!("{}/addresses", srv.base_url))
        .bearer_auth(&su_token)
        .json(&address_payload("office", "HQ"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_update_converges_permissions_through_sync() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let su_token = mint_jwt(jwt_secret, PrincipalId::new(), Role::Admin, None, true);
    let t1 = create_company(&client, &srv, &su_token, 1).await;
    let su_t1 = mint_jwt(jwt_secret, PrincipalId::new(), Role::Admin, Some(t1), true);

    let (user_id, token) = create_user(&client, &srv, jwt_secret, t1, "promotee", Role::Viewer).await;

    // Viewer group: address creation denied.
    let res = client
        .post(format!("{}/addresses", srv.base_url))
        .bearer_auth(&token)
        .json(&address_payload("office", "HQ"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Promote to manager; the update path synchronizes membership before
    // returning, so the very next request sees the new grants.
    let res = client
        .patch(format!("{}/users/{}", srv.base_url, user_id))
        .bearer_auth(&su_t1)
        .json(&json!({ "role": "manager" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/addresses", srv.base_url))
        .bearer_auth(&token)
        .json(&address_payload("office", "HQ"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Demote back: no residue of the manager grants.
    let res = client
        .patch(format!("{}/users/{}", srv.base_url, user_id))
        .bearer_auth(&su_t1)
        .json(&json!({ "role": "viewer" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/addresses", srv.base_url))
        .bearer_auth(&token)
        .json(&address_payload("office", "Annex"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_a_company_with_users_is_rejected() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let su = PrincipalId::new();
    let su_token = mint_jwt(jwt_secret, su, Role::Admin, None, true);
    let t1 = create_company(&client, &srv, &su_token, 1).await;
    create_user(&client, &srv, jwt_secret, t1, "worker1", Role::Worker).await;

    let su_t1 = mint_jwt(jwt_secret, su, Role::Admin, Some(t1), true);
    let res = client
        .delete(format!("{}/companies/{}", srv.base_url, t1))
        .bearer_auth(&su_t1)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "protected_reference");
}

#[tokio::test]
async fn me_reports_identity_and_profile() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let su_token = mint_jwt(jwt_secret, PrincipalId::new(), Role::Admin, None, true);
    let t1 = create_company(&client, &srv, &su_token, 1).await;
    let (user_id, token) = create_user(&client, &srv, jwt_secret, t1, "anna", Role::Worker).await;

    let res = client
        .get(format!("{}/me", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["principal"]["id"].as_str().unwrap(), user_id.to_string());
    assert_eq!(body["principal"]["role"], "worker");
    assert_eq!(body["profile"]["username"], "anna");
    assert_eq!(body["profile"]["company_name"], "Company 1");
}

#[tokio::test]
async fn rbac_audit_exposes_materialized_grants() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let su_token = mint_jwt(jwt_secret, PrincipalId::new(), Role::Admin, None, true);
    let t1 = create_company(&client, &srv, &su_token, 1).await;
    let (_, viewer) = create_user(&client, &srv, jwt_secret, t1, "viewer1", Role::Viewer).await;

    let res = client
        .get(format!("{}/rbac/roles", srv.base_url))
        .bearer_auth(&viewer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();

    let roles = body["roles"].as_array().unwrap();
    let manager = roles
        .iter()
        .find(|r| r["role"] == "manager")
        .expect("manager role listed");
    let grants: Vec<&str> = manager["grants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g.as_str().unwrap())
        .collect();
    assert!(grants.contains(&"add_address"));
    assert!(!grants.contains(&"add_company"));

    let res = client
        .get(format!("{}/rbac/report", srv.base_url))
        .bearer_auth(&viewer)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["report"]["grants"].as_array().unwrap().len() > 0);
    assert!(body["report"]["warnings"].as_array().unwrap().is_empty());
}
