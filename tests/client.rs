//! HTTP adapter behaviour against the mock backend.

use serde_json::json;
use std::time::Duration;

use todocheck::assert::{LOCATION_RE, expect};
use todocheck::client::{
    ClientError, Method, RequestOptions, ResponseHandle, TodoClient, TodoUpdate,
};
use todocheck_testkit::{MockBackend, MockBehavior};

fn client() -> TodoClient {
    TodoClient::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn create_returns_location_and_body() {
    let backend = MockBackend::start().await.unwrap();
    let response = client()
        .create(&backend.url(), "Walk the dog")
        .resolve()
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    let location = response.location().unwrap();
    assert!(LOCATION_RE.is_match(location), "{location}");
    assert_eq!(response.body_field("title"), Some(&json!("Walk the dog")));
    assert_eq!(response.body_field("completed"), Some(&json!(false)));

    let stored = backend.items().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Walk the dog");
    assert_eq!(stored[0].url, location);
}

#[tokio::test]
async fn headers_are_lowercased() {
    let backend = MockBackend::start().await.unwrap();
    let response = client()
        .create(&backend.url(), "Walk the dog")
        .resolve()
        .await
        .unwrap();

    assert!(response.headers.contains_key("content-type"));
    assert!(response.headers.keys().all(|k| *k == k.to_ascii_lowercase()));
    assert_eq!(response.header("Content-Type"), response.header("content-type"));
}

#[tokio::test]
async fn missing_item_is_rejected_as_not_found() {
    let backend = MockBackend::start().await.unwrap();
    let error = client()
        .get(&format!("{}/4242", backend.url()))
        .resolve()
        .await
        .unwrap_err();

    assert!(error.is_not_found());
    assert_eq!(error.status(), Some(404));
    assert_eq!(error.to_string(), "Not Found (404)");
}

#[tokio::test]
async fn chained_get_sees_created_item() {
    let backend = MockBackend::start().await.unwrap();
    let client = client();

    let follow = client.clone();
    let item = client
        .create(&backend.url(), "Feed the cat")
        .and_then(move |created| match created.location() {
            Some(location) => follow.get(location),
            None => ResponseHandle::ready(Err(ClientError::MissingHeader("Location"))),
        });

    let outcome = expect(&item).body_field("title").to_equal("Feed the cat").await;
    assert!(outcome.is_passed(), "{outcome}");
}

#[tokio::test]
async fn put_and_patch_apply_partial_updates() {
    let backend = MockBackend::start().await.unwrap();
    let client = client();

    for method in [Method::Put, Method::Patch] {
        let created = client
            .create(&backend.url(), "Buy milk")
            .resolve()
            .await
            .unwrap();
        let location = created.location().unwrap().to_string();

        let updated = client
            .update(&location, method, &TodoUpdate::completed(true))
            .resolve()
            .await
            .unwrap();
        assert_eq!(updated.status, 200, "{method}");
        assert_eq!(updated.body_field("completed"), Some(&json!(true)), "{method}");
        assert_eq!(updated.body_field("title"), Some(&json!("Buy milk")), "{method}");
    }
}

#[tokio::test]
async fn delete_collection_empties_backend() {
    let backend = MockBackend::start().await.unwrap();
    let client = client();

    for title in ["one", "two", "three"] {
        client.create(&backend.url(), title).resolve().await.unwrap();
    }
    assert_eq!(backend.item_count().await, 3);

    let response = client.del(&backend.url()).resolve().await.unwrap();
    assert_eq!(response.status, 204);
    assert!(response.body.is_none());
    assert_eq!(backend.item_count().await, 0);
}

#[tokio::test]
async fn options_returns_wildcard_cors_headers() {
    let backend = MockBackend::start().await.unwrap();
    let response = client()
        .options(&backend.url(), "http://someplace.com")
        .resolve()
        .await
        .unwrap();

    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert!(response.header("access-control-allow-methods").is_some());
    assert!(response.header("access-control-allow-headers").is_some());
}

#[tokio::test]
async fn options_without_cors_is_rejected() {
    let backend = MockBackend::start_with(MockBehavior::default().with_cors(false))
        .await
        .unwrap();
    let error = client()
        .options(&backend.url(), "http://someplace.com")
        .resolve()
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(405));
}

#[tokio::test]
async fn slow_backend_times_out() {
    // Accepts connections but never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let silent = tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });

    let timeout = Duration::from_millis(200);
    let error = TodoClient::new(timeout)
        .unwrap()
        .get(&format!("http://{addr}/todos"))
        .resolve()
        .await
        .unwrap_err();

    assert!(
        matches!(error.as_ref(), ClientError::Timeout(t) if *t == timeout),
        "{error:?}"
    );
    assert_eq!(error.status(), None);
    silent.abort();
}

#[tokio::test]
async fn request_starts_without_being_awaited() {
    let backend = MockBackend::start().await.unwrap();
    let handle = client().request(
        Method::Post,
        &backend.url(),
        RequestOptions::new().with_body(json!({"title": "Water the plants"})),
    );

    // Nobody polls the handle; the request still reaches the backend
    for _ in 0..50 {
        if backend.item_count().await == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(backend.item_count().await, 1);
    assert!(handle.resolve().await.is_ok());
}
