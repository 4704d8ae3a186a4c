use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Json,
    routing::{get, post},
};
use http_body_util::BodyExt;
use serde_json::json;
use tower::util::ServiceExt;

use sporelay::{
    config::Config,
    management::{DEFAULT_USER, KvStore, MemoryStore, STATE_KEY_PREFIX, TokenManager},
    server::{AppState, build_router},
    types::Token,
};

const API_KEY: &str = "test-api-key-123";
const CLIENT_ID: &str = "test-client-id";

fn configured() -> Config {
    Config {
        api_key: Some(API_KEY.to_string()),
        client_id: Some(CLIENT_ID.to_string()),
        client_secret: Some("test-client-secret".to_string()),
        ..Config::default()
    }
}

fn app_with(config: Config) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let app = build_router(AppState {
        config: Arc::new(config),
        store: store.clone(),
    });
    (app, store)
}

/// Serves a stub upstream on an ephemeral port and returns its base URL.
async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn token_endpoint_ok() -> Router {
    Router::new().route(
        "/api/token",
        post(|| async {
            Json(json!({
                "access_token": "stub-access",
                "token_type": "Bearer",
                "scope": "user-read-currently-playing",
                "expires_in": 3600,
                "refresh_token": "stub-refresh",
            }))
        }),
    )
}

async fn body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn stored_token() -> Token {
    Token {
        access_token: "stub-access".to_string(),
        refresh_token: "stub-refresh".to_string(),
        scope: "user-read-currently-playing".to_string(),
        expires_in: 3600,
        obtained_at: 0,
    }
}

async fn initiate(app: &Router) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/setup")
                .header(header::HOST, "127.0.0.1:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

fn state_from_location(location: &str) -> String {
    location
        .split("state=")
        .nth(1)
        .expect("no state parameter in authorize URL")
        .split('&')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_initiate_redirects_into_the_authorization_server() {
    let (app, store) = app_with(configured());

    let res = initiate(&app).await;
    assert_eq!(res.status(), StatusCode::FOUND);

    let location = res
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    assert!(location.starts_with("https://accounts.spotify.com/authorize"));
    assert!(location.contains("response_type=code"));
    assert!(location.contains(CLIENT_ID));

    // The state in the URL matches a freshly stored pending entry
    let state = state_from_location(&location);
    assert!(state.len() >= 16);
    let key = format!("{}{}", STATE_KEY_PREFIX, state);
    assert_eq!(store.get(&key).await.unwrap(), Some("pending".to_string()));
}

#[tokio::test]
async fn test_initiate_twice_issues_independent_states() {
    let (app, store) = app_with(configured());

    let loc1 = initiate(&app).await;
    let loc2 = initiate(&app).await;

    let state1 = state_from_location(
        loc1.headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap(),
    );
    let state2 = state_from_location(
        loc2.headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap(),
    );

    assert_ne!(state1, state2);

    // Redeeming (deleting) one leaves the other pending
    store
        .delete(&format!("{}{}", STATE_KEY_PREFIX, state1))
        .await
        .unwrap();
    assert_eq!(
        store
            .get(&format!("{}{}", STATE_KEY_PREFIX, state2))
            .await
            .unwrap(),
        Some("pending".to_string())
    );
}

#[tokio::test]
async fn test_initiate_without_credentials_redirects_to_instructions() {
    let config = Config {
        api_key: Some(API_KEY.to_string()),
        ..Config::default()
    };
    let (app, store) = app_with(config);

    let res = initiate(&app).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "/credentials"
    );

    // Nothing was written
    assert_eq!(store.get("spotify_tokens").await.unwrap(), None);
}

#[tokio::test]
async fn test_callback_with_upstream_error_is_400() {
    let (app, _) = app_with(configured());

    let res = app
        .oneshot(
            Request::builder()
                .uri("/callback?error=access_denied")
                .header(header::HOST, "127.0.0.1:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(res).await.contains("access_denied"));
}

#[tokio::test]
async fn test_callback_with_missing_parameters_is_400() {
    let (app, _) = app_with(configured());

    for uri in ["/callback?code=abc", "/callback?state=abc", "/callback"] {
        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header(header::HOST, "127.0.0.1:8080")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "uri {}", uri);
        assert!(
            body_string(res)
                .await
                .contains("Missing authorization code or state")
        );
    }
}

#[tokio::test]
async fn test_callback_with_unknown_state_never_reaches_the_exchange() {
    let hit = Arc::new(AtomicBool::new(false));
    let hit_flag = hit.clone();
    let stub = Router::new().route(
        "/api/token",
        post(move || {
            let flag = hit_flag.clone();
            async move {
                flag.store(true, Ordering::SeqCst);
                Json(json!({"access_token": "never"}))
            }
        }),
    );
    let base = spawn_stub(stub).await;

    let mut config = configured();
    config.token_url = format!("{}/api/token", base);
    let (app, store) = app_with(config);

    let res = app
        .oneshot(
            Request::builder()
                .uri("/callback?code=abc&state=never-issued")
                .header(header::HOST, "127.0.0.1:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_string(res)
            .await
            .contains("Invalid or expired state parameter")
    );

    assert!(!hit.load(Ordering::SeqCst), "token exchange was reached");
    assert_eq!(store.get("spotify_tokens").await.unwrap(), None);
}

#[tokio::test]
async fn test_callback_success_stores_one_record_and_consumes_the_state() {
    let base = spawn_stub(token_endpoint_ok()).await;

    let mut config = configured();
    config.token_url = format!("{}/api/token", base);
    let (app, store) = app_with(config);

    // Real initiation so the redeemed state went through the whole flow
    let res = initiate(&app).await;
    let state = state_from_location(
        res.headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap(),
    );

    let res = app
        .oneshot(
            Request::builder()
                .uri(format!("/callback?code=test-code&state={}", state))
                .header(header::HOST, "127.0.0.1:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("Setup complete"));

    // Exactly one token record under the fixed key, holding the payload
    let record = store.get("spotify_tokens").await.unwrap().unwrap();
    assert!(record.contains("stub-access"));
    assert!(record.contains("stub-refresh"));

    // The consumed state entry is gone
    let key = format!("{}{}", STATE_KEY_PREFIX, state);
    assert_eq!(store.get(&key).await.unwrap(), None);
}

#[tokio::test]
async fn test_callback_exchange_failure_writes_and_deletes_nothing() {
    let stub = Router::new().route(
        "/api/token",
        post(|| async { (StatusCode::BAD_REQUEST, "invalid_grant") }),
    );
    let base = spawn_stub(stub).await;

    let mut config = configured();
    config.token_url = format!("{}/api/token", base);
    let (app, store) = app_with(config);

    // Seed a pending state directly
    let key = format!("{}{}", STATE_KEY_PREFIX, "seeded-state-0123456789");
    store
        .put(&key, "pending", Some(Duration::from_secs(600)))
        .await
        .unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/callback?code=stale-code&state=seeded-state-0123456789")
                .header(header::HOST, "127.0.0.1:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(res).await.contains("Token exchange failed"));

    // No token record was written and the state entry was not consumed
    assert_eq!(store.get("spotify_tokens").await.unwrap(), None);
    assert_eq!(store.get(&key).await.unwrap(), Some("pending".to_string()));
}

#[tokio::test]
async fn test_now_playing_without_token_record_is_401() {
    let (app, _) = app_with(configured());

    let res = app
        .oneshot(
            Request::builder()
                .uri("/now-playing")
                .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(res).await.contains("Setup incomplete"));
}

#[tokio::test]
async fn test_now_playing_relays_no_content_as_not_playing() {
    let stub = Router::new().route(
        "/me/player/currently-playing",
        get(|| async { StatusCode::NO_CONTENT }),
    );
    let base = spawn_stub(stub).await;

    let mut config = configured();
    config.api_url = base;
    let (app, store) = app_with(config);

    TokenManager::new(store)
        .save(DEFAULT_USER, &stored_token())
        .await
        .unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/now-playing")
                .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // A 204 upstream is a successful "nothing playing", not an error
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_string(res).await.contains("\"playing\":false"));
}

#[tokio::test]
async fn test_now_playing_normalizes_the_track_payload() {
    let stub = Router::new().route(
        "/me/player/currently-playing",
        get(|| async {
            Json(json!({
                "is_playing": true,
                "progress_ms": 12345,
                "item": {
                    "id": "t1",
                    "name": "Test Track",
                    "duration_ms": 200000,
                    "artists": [{"id": "a1", "name": "Test Artist"}],
                    "album": {"id": "al1", "name": "Test Album"},
                }
            }))
        }),
    );
    let base = spawn_stub(stub).await;

    let mut config = configured();
    config.api_url = base;
    let (app, store) = app_with(config);

    TokenManager::new(store)
        .save(DEFAULT_USER, &stored_token())
        .await
        .unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/now-playing")
                .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = body_string(res).await;
    assert!(body.contains("\"playing\":true"));
    assert!(body.contains("Test Track"));
    assert!(body.contains("Test Artist"));
    assert!(body.contains("Test Album"));
}

#[tokio::test]
async fn test_recent_relays_the_listening_history() {
    let stub = Router::new().route(
        "/me/player/recently-played",
        get(|| async {
            Json(json!({
                "items": [
                    {
                        "track": {
                            "id": "t1",
                            "name": "First Track",
                            "duration_ms": 180000,
                            "artists": [{"id": "a1", "name": "Artist One"}],
                            "album": {"id": "al1", "name": "Album One"},
                        },
                        "played_at": "2026-08-08T10:00:00Z",
                    },
                    {
                        "track": {
                            "id": "t2",
                            "name": "Second Track",
                            "duration_ms": 210000,
                            "artists": [{"id": "a2", "name": "Artist Two"}],
                            "album": {"id": "al2", "name": "Album Two"},
                        },
                        "played_at": "2026-08-08T09:55:00Z",
                    },
                ]
            }))
        }),
    );
    let base = spawn_stub(stub).await;

    let mut config = configured();
    config.api_url = base;
    let (app, store) = app_with(config);

    TokenManager::new(store)
        .save(DEFAULT_USER, &stored_token())
        .await
        .unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/recent")
                .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = body_string(res).await;
    assert!(body.contains("First Track"));
    assert!(body.contains("Second Track"));
    assert!(body.contains("2026-08-08T10:00:00Z"));
}

#[tokio::test]
async fn test_upstream_rejection_is_relayed_with_its_status() {
    let stub = Router::new().route(
        "/me/player/currently-playing",
        get(|| async { StatusCode::BAD_GATEWAY }),
    );
    let base = spawn_stub(stub).await;

    let mut config = configured();
    config.api_url = base;
    let (app, store) = app_with(config);

    TokenManager::new(store)
        .save(DEFAULT_USER, &stored_token())
        .await
        .unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/now-playing")
                .header(header::AUTHORIZATION, format!("Bearer {}", API_KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_health_reports_flags_and_never_secrets() {
    let (app, store) = app_with(configured());

    TokenManager::new(store)
        .save(DEFAULT_USER, &stored_token())
        .await
        .unwrap();

    let res = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body = body_string(res).await;
    assert!(body.contains("\"api_key_configured\":true"));
    assert!(body.contains("\"credentials_configured\":true"));
    assert!(body.contains("\"oauth_complete\":true"));

    // Flags only; no secret material
    assert!(!body.contains(API_KEY));
    assert!(!body.contains("test-client-secret"));
    assert!(!body.contains("stub-access"));
}
