use cinema_core::{ApiError, CinemaApi, FixedClock};
use cinema_shared::{CreateBookingRequest, Seat};
use cinema_store::app_config::{ApiConfig, BookingConfig, Config, StorageConfig};
use cinema_store::{MemoryTokenStorage, RootStore};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn config(base_url: &str) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
        },
        storage: StorageConfig {
            token_path: PathBuf::from("unused.json"),
        },
        booking: BookingConfig {
            default_payment_seconds: 180,
        },
    }
}

fn root(server: &MockServer, storage: Arc<MemoryTokenStorage>) -> RootStore {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()));
    RootStore::with_storage(&config(&server.uri()), storage, clock).unwrap()
}

fn movies_body() -> serde_json::Value {
    json!([{
        "id": 1,
        "title": "Дюна",
        "year": 2021,
        "rating": 8.0,
        "posterImage": "/static/dune.jpg",
        "lengthMinutes": 155,
        "description": "Фантастика"
    }])
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body()))
        .expect(1)
        .mount(&server)
        .await;

    let root = root(&server, Arc::new(MemoryTokenStorage::with_token("secret-token")));
    let movies = root.api().list_movies().await.unwrap();

    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].length_minutes, 155);
}

#[tokio::test]
async fn test_anonymous_requests_carry_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cinemas"))
        .and(|req: &Request| !req.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 3, "name": "ОКТЯБРЬ", "address": "Новый Арбат, 24" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let root = root(&server, Arc::new(MemoryTokenStorage::new()));
    let cinemas = root.cinemas.fetch_cinemas(false).await.unwrap();

    assert_eq!(cinemas[0].address, "Новый Арбат, 24");
}

#[tokio::test]
async fn test_create_booking_posts_seats() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/movieSessions/7/bookings"))
        .and(body_json(json!({ "seats": [{ "rowNumber": 2, "seatNumber": 5 }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "b-42" })))
        .expect(1)
        .mount(&server)
        .await;

    let root = root(&server, Arc::new(MemoryTokenStorage::with_token("t")));
    let request = CreateBookingRequest {
        seats: vec![Seat::new(2, 5)],
    };
    let created = root.api().create_booking(7, &request).await.unwrap();

    assert_eq!(created.id, "b-42");
}

#[tokio::test]
async fn test_pay_booking_ignores_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings/b-42/payments"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let root = root(&server, Arc::new(MemoryTokenStorage::with_token("t")));
    root.bookings.pay_booking("b-42").await.unwrap();
}

#[tokio::test]
async fn test_backend_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Неверный логин или пароль" })),
        )
        .mount(&server)
        .await;

    let root = root(&server, Arc::new(MemoryTokenStorage::new()));
    let err = root.account.login("moviefan", "Password1").await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Http {
            status: 400,
            message: Some("Неверный логин или пароль".to_string()),
        }
    );
    assert_eq!(
        root.account.status().await.error.as_deref(),
        Some("Неверный логин или пароль")
    );
}

#[tokio::test]
async fn test_login_persists_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "username": "moviefan", "password": "Password1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh-token" })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryTokenStorage::new());
    let root = root(&server, storage.clone());
    root.account.login("moviefan", "Password1").await.unwrap();

    assert_eq!(root.auth.token().await.as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me/bookings"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryTokenStorage::with_token("expired"));
    let root = root(&server, storage.clone());
    root.location.set("/my-bookings").await;

    let err = root.bookings.fetch_bookings(true).await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(!root.auth.is_authenticated().await);
    assert_eq!(storage.clear_count(), 1);
    assert_eq!(root.location.current().await, "/login");
    assert_eq!(root.location.redirect_count(), 1);
}

#[tokio::test]
async fn test_unauthorized_on_login_page_does_not_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryTokenStorage::with_token("expired"));
    let root = root(&server, storage.clone());
    root.location.set("/login").await;

    let err = root.api().list_movies().await.unwrap_err();

    assert_eq!(err, ApiError::Http { status: 401, message: None });
    assert_eq!(storage.clear_count(), 1);
    assert_eq!(root.location.current().await, "/login");
    assert_eq!(root.location.redirect_count(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let root = root(&server, Arc::new(MemoryTokenStorage::new()));
    let err = root.api().settings().await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert_eq!(err.user_message(), "Произошла ошибка");
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    // Nothing listens on port 1
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let root = RootStore::with_storage(
        &config("http://127.0.0.1:1"),
        Arc::new(MemoryTokenStorage::new()),
        clock,
    )
    .unwrap();
    let err = root.api().list_movies().await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_cancelled_fetch_resolves_to_cached_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movies_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let root = Arc::new(root(&server, Arc::new(MemoryTokenStorage::new())));
    let cached = root.movies.fetch_movies(false).await.unwrap();
    assert_eq!(cached.len(), 1);

    let pending = {
        let root = root.clone();
        tokio::spawn(async move { root.movies.fetch_movies(true).await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    root.movies.cancel().await;

    let result = pending.await.unwrap().unwrap();
    assert_eq!(result, cached);
    assert!(!root.movies.status().await.loading);
    assert_eq!(root.movies.status().await.error, None);
}
