pub mod playlist;

use crate::state::AppState;
use crate::{admin, spotify, submissions};
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::json;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/admin/login", post(admin::routes::login))
        .route("/admin/logout", post(admin::routes::logout))
        .route("/admin/me", get(admin::routes::me))
        .route(
            "/playlist/config",
            get(playlist::playlist_status).post(playlist::ensure_playlist_config),
        )
        .route("/admin/spotify/authorize", get(spotify::routes::authorize))
        .route("/admin/spotify/callback", get(spotify::routes::callback))
        .route("/spotify/search", get(spotify::routes::search))
        .route(
            "/songs",
            get(submissions::routes::list_songs).post(submissions::routes::create_song),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LinkStore;
    use crate::db::models::PlaylistLink;
    use crate::state::testing::test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use chrono::{Duration, Utc};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn json_body(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn login_cookie(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "/admin/login",
                json!({ "username": "admin", "password": "hunter2" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (state, _store) = test_state("http://127.0.0.1:9");
        let app = routes(state);

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_admin_login_rejects_bad_password() {
        let (state, _store) = test_state("http://127.0.0.1:9");
        let app = routes(state);

        let response = app
            .oneshot(json_request(
                "/admin/login",
                json!({ "username": "admin", "password": "wrong" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_admin_me_requires_session() {
        let (state, _store) = test_state("http://127.0.0.1:9");
        let app = routes(state);

        let response = app.clone().oneshot(get_request("/admin/me")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let cookie = login_cookie(&app).await;
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/me")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_authorize_uses_link_id_as_state() {
        let (state, store) = test_state("https://accounts.example.com");
        let app = routes(state);
        let cookie = login_cookie(&app).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/spotify/authorize")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let link = store.get_link().await.unwrap().unwrap();
        let authorize_url = body["authorize_url"].as_str().unwrap();
        assert!(authorize_url.starts_with("https://accounts.example.com/authorize?"));
        assert!(authorize_url.contains(&format!("state={}", link.id)));
    }

    #[tokio::test]
    async fn test_callback_error_redirects_without_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (state, _store) = test_state(&server.uri());
        let app = routes(state);

        let response = app
            .oneshot(get_request(
                "/admin/spotify/callback?error=access_denied&state=x",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "http://localhost:5173/admin?spotify_error=access_denied"
        );
    }

    #[tokio::test]
    async fn test_playlist_status_public() {
        let (state, store) = test_state("http://127.0.0.1:9");
        let app = routes(state);

        let response = app.clone().oneshot(get_request("/playlist/config")).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["exists"], false);
        assert_eq!(body["name"], "Crowdlist");

        store.ensure_link().await.unwrap();
        let response = app.oneshot(get_request("/playlist/config")).await.unwrap();
        let body = json_body(response).await;
        assert_eq!(body["exists"], true);
        assert_eq!(body["spotify_playlist_id"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_ensure_playlist_config_requires_admin() {
        let (state, store) = test_state("http://127.0.0.1:9");
        let app = routes(state);

        let response = app
            .oneshot(json_request("/playlist/config", json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(store.get_link().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_not_ready() {
        let (state, _store) = test_state("http://127.0.0.1:9");
        let app = routes(state);

        let response = app
            .oneshot(get_request("/spotify/search?q=daft"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_returns_spotify_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "daft"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tracks": { "items": [{ "id": "T1", "name": "One More Time" }] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (state, store) = test_state(&server.uri());
        let mut link = PlaylistLink::new();
        link.refresh_token = Some("refresh".to_string());
        link.access_token = Some("cached".to_string());
        link.access_token_expires_at = Some(Utc::now() + Duration::hours(1));
        store.put_link(link);

        let response = routes(state)
            .oneshot(get_request("/spotify/search?q=daft"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["tracks"]["items"][0]["id"], "T1");
    }

    #[tokio::test]
    async fn test_search_upstream_failure_is_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("revoked"))
            .mount(&server)
            .await;

        let (state, store) = test_state(&server.uri());
        let mut link = PlaylistLink::new();
        link.refresh_token = Some("refresh".to_string());
        store.put_link(link);

        let response = routes(state)
            .oneshot(get_request("/spotify/search?q=daft"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_post_song_succeeds_when_spotify_is_down() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/playlists/pl1/tracks"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let (state, store) = test_state(&server.uri());
        let mut link = PlaylistLink::new();
        link.refresh_token = Some("refresh".to_string());
        link.access_token = Some("cached".to_string());
        link.access_token_expires_at = Some(Utc::now() + Duration::hours(1));
        link.spotify_playlist_id = Some("pl1".to_string());
        store.put_link(link);

        let response = routes(state)
            .oneshot(json_request(
                "/songs",
                json!({
                    "spotify_track_id": "T1",
                    "spotify_track_uri": "spotify:track:T1",
                    "song": "One More Time",
                    "artist": "Daft Punk",
                    "user": "alice"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["title"], "One More Time");
        assert_eq!(body["submitter"], "alice");
        assert_eq!(store.submission_count(), 1);
    }
}
