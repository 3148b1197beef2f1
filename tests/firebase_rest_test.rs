//! Firebase REST request shapes
//!
//! Runs the real HTTP adapter against a wiremock server standing in for the
//! Identity Toolkit, Firestore and Storage endpoints. Each test pins the parts
//! of the request the hosted APIs insist on (method, path, query, body) and
//! checks how responses and failures come back through the service layer.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use servicefinder::backend::firebase::FirebaseClient;
use servicefinder::backend::{Backend, IdentityProvider, ObjectStore};
use servicefinder::config::{Config, Endpoints};
use servicefinder::logic::errors::ErrorType;
use servicefinder::services::api::{execute_request, ApiRequest, ApiResponse};
use servicefinder::services::Services;

const DOCUMENTS: &str = "/v1/projects/demo/databases/(default)/documents";

fn config_for(server: &MockServer) -> Config {
    let mut config = Config::demo();
    config.api_key = "test-key".to_string();
    config.endpoints = Endpoints::all_at(&server.uri());
    config
}

fn services_for(server: &MockServer) -> Services {
    let config = config_for(server);
    let backend = Backend::firebase(&config).expect("client builds");
    Services::new(backend, &config)
}

async fn mount_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "email": "ann@example.com",
            "password": "secret1",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "u1",
            "email": "ann@example.com",
            "displayName": "",
            "idToken": "id-token-1",
            "refreshToken": "refresh-1",
            "expiresIn": "3600"
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Test: sign-in posts the password grant and publishes the new user
#[tokio::test]
async fn test_sign_in_request_and_session() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;

    let client = FirebaseClient::new(&config_for(&server)).unwrap();
    let watcher = client.subscribe();

    let user = client.sign_in("ann@example.com", "secret1").await.unwrap();
    assert_eq!(user.uid, "u1");
    assert_eq!(user.display_name, None, "empty strings are dropped");
    assert_eq!(client.current_user().map(|u| u.uid), Some("u1".to_string()));
    assert_eq!(watcher.borrow().as_ref().map(|u| u.uid.clone()), Some("u1".to_string()));

    client.sign_out().await.unwrap();
    assert!(client.current_user().is_none());
    assert!(watcher.borrow().is_none());
}

/// Test: provider error codes become the short user-facing messages
#[tokio::test]
async fn test_wrong_password_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_PASSWORD" }
        })))
        .mount(&server)
        .await;

    let services = services_for(&server);
    let err = services
        .auth
        .sign_in("ann@example.com", "nope")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Incorrect password");
}

/// Test: listings are fetched with one runQuery, newest first, using the
/// signed-in user's token
#[tokio::test]
async fn test_fetch_listings_run_query() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{}:runQuery", DOCUMENTS)))
        .and(header("authorization", "Bearer id-token-1"))
        .and(body_partial_json(json!({
            "structuredQuery": {
                "from": [{ "collectionId": "services" }],
                "orderBy": [{ "field": { "fieldPath": "createdAt" }, "direction": "DESCENDING" }]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "document": {
                    "name": "projects/demo/databases/(default)/documents/services/abc",
                    "fields": {
                        "name": { "stringValue": "Joe's Plumbing" },
                        "category": { "stringValue": "plumbing" },
                        "city": { "stringValue": "Durban" },
                        "rating": { "integerValue": "5" },
                        "userId": { "stringValue": "u1" },
                        "createdAt": { "timestampValue": "2024-05-01T10:00:00Z" },
                        "reviews": { "arrayValue": { "values": [
                            { "mapValue": { "fields": { "rating": { "doubleValue": 4.0 } } } }
                        ] } }
                    }
                },
                "readTime": "2024-05-02T00:00:00Z"
            },
            { "readTime": "2024-05-02T00:00:00Z" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let services = services_for(&server);
    services.auth.sign_in("ann@example.com", "secret1").await.unwrap();

    let listings = services.listings.get_all().await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].id, "abc");
    assert_eq!(listings[0].rating, 5.0);
    assert_eq!(listings[0].reviews.len(), 1);
    assert!(listings[0].is_owned_by("u1"));
}

/// Test: a rating change patches only the rating and timestamp fields
#[tokio::test]
async fn test_update_rating_uses_update_mask() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path(format!("{}/services/abc", DOCUMENTS)))
        .and(query_param("updateMask.fieldPaths", "rating"))
        .and(query_param("updateMask.fieldPaths", "updatedAt"))
        .and(query_param("currentDocument.exists", "true"))
        .and(body_partial_json(json!({
            "fields": { "rating": { "doubleValue": 4.0 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo/databases/(default)/documents/services/abc"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let services = services_for(&server);
    services.listings.update_rating("abc", 4.0).await.unwrap();
}

/// Test: uploads return a tokenised download URL; deleting an object that is
/// already gone still counts as success
#[tokio::test]
async fn test_storage_upload_and_missing_delete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v0/b/demo.appspot.com/o"))
        .and(query_param("uploadType", "media"))
        .and(query_param("name", "services/van.png"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "services/van.png",
            "downloadTokens": "tok-1,tok-2"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v0/b/demo.appspot.com/o/services%2Fvan.png"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Not Found." }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = FirebaseClient::new(&config_for(&server)).unwrap();
    let url = client
        .upload("services/van.png", "image/png", vec![0x89, b'P', b'N', b'G'])
        .await
        .unwrap();
    assert_eq!(
        url,
        format!("{}/v0/b/demo.appspot.com/o/services%2Fvan.png?alt=media&token=tok-1", server.uri())
    );

    let raw = ObjectStore::delete(&client, &url).await.unwrap_err();
    assert!(raw.is_not_found());

    let services = services_for(&server);
    services.storage.delete_image(&url).await.unwrap();
}

/// Test: server failures reach the UI with a short message and a kind
#[tokio::test]
async fn test_server_error_classification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}:runQuery", DOCUMENTS)))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": { "code": 503, "message": "The service is currently unavailable.", "status": "UNAVAILABLE" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/services", DOCUMENTS)))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let services = services_for(&server);

    match execute_request(&services, ApiRequest::FetchListings).await {
        ApiResponse::Listings(Err(e)) => {
            assert_eq!(e.message, "Failed to fetch services");
            assert_eq!(e.kind, ErrorType::ServerError);
        }
        other => panic!("unexpected response: {:?}", other),
    }

    let created = services
        .listings
        .add(
            &servicefinder::api::NewListing {
                name: "Joe's Plumbing".into(),
                category: servicefinder::api::Category::Plumbing,
                description: "Reliable work at fair prices".into(),
                phone: "0821234567".into(),
                email: "joe@example.com".into(),
                city: "Durban".into(),
                image: None,
                rating: None,
            },
            "u1",
        )
        .await
        .unwrap_err();
    assert_eq!(created.to_string(), "Failed to add service");
    assert_eq!(
        servicefinder::logic::errors::classify_error(&created),
        ErrorType::Unauthorized
    );
}
