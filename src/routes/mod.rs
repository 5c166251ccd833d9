pub mod auth;
mod error;
pub mod health;
pub mod loads;
pub mod predictions;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};
pub use error::{ApiError, ErrorResponse};

use crate::{AppState, config::LoadboardConfig, middleware};

/// Marketplace and forecast routes.
///
/// Routes that need a signed-in user sit behind `require_user`. The forecast
/// route joins them only when `forecasting.require_auth` is set.
pub fn get_api_routes(state: AppState, config: &LoadboardConfig) -> Router<AppState> {
    let mut public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/token", post(auth::token));

    let mut protected = Router::new()
        .route("/users/me", get(users::me))
        .route("/loads", post(loads::post))
        .route("/loads/", post(loads::post))
        .route("/loads/available", get(loads::available))
        .route("/loads/shipper/me", get(loads::shipper_loads))
        .route("/loads/my-active", get(loads::my_active))
        .route("/loads/{load_id}/accept", put(loads::accept));

    let forecast = Router::new().route(
        "/predictions/loads-forecast",
        get(predictions::loads_forecast),
    );
    if config.forecasting.require_auth {
        protected = protected.merge(forecast);
    } else {
        public = public.merge(forecast);
    }

    public.merge(protected.route_layer(axum::middleware::from_fn_with_state(
        state,
        middleware::require_user,
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        AppState,
        config::LoadboardConfig,
        db::{DbPool, memory::MemoryLoadRepo, memory::MemoryUserRepo, tests::FailingLoadRepo},
        models::{Load, LoadStatus},
    };

    const TEST_CONFIG: &str = r#"
[auth]
jwt_secret = "router-test-secret"
password_iterations = 10
"#;

    fn test_config(extra: &str) -> LoadboardConfig {
        LoadboardConfig::from_str(&format!("{TEST_CONFIG}{extra}"))
            .expect("Failed to parse test config")
    }

    fn test_app_with(config: LoadboardConfig, db: DbPool) -> Router {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let state = AppState::with_db(config.clone(), db);
        crate::build_app(&config, state)
    }

    fn test_app() -> Router {
        test_app_with(test_config(""), DbPool::in_memory())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn register(app: &Router, email: &str, role: &str) -> StatusCode {
        let (status, _) = send(
            app,
            json_request(
                "POST",
                "/auth/register",
                None,
                json!({
                    "email": email,
                    "password": "password123",
                    "role": role,
                    "company_name": "Acme Freight",
                }),
            ),
        )
        .await;
        status
    }

    async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
        let form = format!("username={}&password={password}", email.replace('@', "%40"));
        send(
            app,
            Request::builder()
                .method("POST")
                .uri("/auth/token")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
    }

    async fn register_and_login(app: &Router, email: &str, role: &str) -> String {
        assert_eq!(register(app, email, role).await, StatusCode::CREATED);
        let (status, body) = login(app, email, "password123").await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    async fn post_load(app: &Router, token: &str, origin: &str) -> (StatusCode, Value) {
        send(
            app,
            json_request(
                "POST",
                "/loads/",
                Some(token),
                json!({
                    "origin": origin,
                    "destination": "Delhi, India",
                    "weight": 12000.0,
                    "material_type": "Steel",
                }),
            ),
        )
        .await
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let app = test_app();

        assert_eq!(
            register(&app, "shipper@example.com", "shipper").await,
            StatusCode::CREATED
        );

        let (status, body) = login(&app, "shipper@example.com", "password123").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn test_register_response_body() {
        let app = test_app();
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/auth/register",
                None,
                json!({"email": "a@example.com", "password": "password123", "role": "loader"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"message": "User registered successfully"}));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let app = test_app();
        register(&app, "dup@example.com", "loader").await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/auth/register",
                None,
                json!({"email": "dup@example.com", "password": "password123", "role": "shipper"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Email already registered");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_register_validation_rejected() {
        let app = test_app();
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/auth/register",
                None,
                json!({"email": "not-an-email", "password": "password123", "role": "loader"}),
            ),
        )
        .await;

        assert!(status.is_client_error());
        assert_eq!(
            login(&app, "not-an-email", "password123").await.0,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_login_failures_share_message() {
        let app = test_app();
        register(&app, "loader@example.com", "loader").await;

        let (wrong_status, wrong_body) = login(&app, "loader@example.com", "nope-nope").await;
        let (unknown_status, unknown_body) = login(&app, "ghost@example.com", "password123").await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_body["detail"], "Incorrect email or password");
        assert_eq!(unknown_body["detail"], wrong_body["detail"]);
    }

    #[tokio::test]
    async fn test_users_me() {
        let app = test_app();
        let token = register_and_login(&app, "shipper@example.com", "shipper").await;

        let (status, body) = send(&app, get("/users/me", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "email": "shipper@example.com",
                "role": "shipper",
                "user_name": null,
                "company_name": "Acme Freight",
            })
        );
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = test_app();

        for uri in ["/users/me", "/loads/available", "/loads/shipper/me", "/loads/my-active"] {
            let response = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(
                response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
                "Bearer"
            );
        }

        let (status, body) = send(&app, get("/users/me", Some("garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Could not validate credentials");
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_rejected() {
        let config = test_config("");
        let app = test_app();
        let issuer = crate::auth::TokenIssuer::from_config(&config.auth);
        let token = issuer
            .issue("nobody@example.com", crate::models::Role::Loader)
            .unwrap();

        let (status, _) = send(&app, get("/users/me", Some(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_load_lifecycle() {
        let app = test_app();
        let shipper = register_and_login(&app, "shipper@example.com", "shipper").await;
        let loader = register_and_login(&app, "loader@example.com", "loader").await;

        let (status, body) = post_load(&app, &shipper, "Mumbai, India").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Load posted successfully");
        let load_id = body["load_id"].as_str().unwrap().to_string();

        let (status, available) = send(&app, get("/loads/available", Some(&loader))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(available.as_array().unwrap().len(), 1);
        assert_eq!(available[0]["status"], "stand by");
        assert_eq!(available[0]["shipper_id"], "shipper@example.com");

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/loads/{load_id}/accept"),
                Some(&loader),
                Value::Null,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Load accepted", "load_id": load_id}));

        let (_, available) = send(&app, get("/loads/available", Some(&loader))).await;
        assert!(available.as_array().unwrap().is_empty());

        let (status, active) = send(&app, get("/loads/my-active", Some(&loader))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(active[0]["id"], load_id);
        assert_eq!(active[0]["status"], "active");
        assert_eq!(active[0]["loader_id"], "loader@example.com");
        assert!(active[0]["accepted_at"].is_string());

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/loads/{load_id}/accept"),
                Some(&loader),
                Value::Null,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Load not available");
    }

    #[tokio::test]
    async fn test_shipper_loads_newest_first() {
        let app = test_app();
        let shipper = register_and_login(&app, "shipper@example.com", "shipper").await;
        let other = register_and_login(&app, "other@example.com", "shipper").await;

        post_load(&app, &shipper, "First").await;
        post_load(&app, &other, "Elsewhere").await;
        post_load(&app, &shipper, "Second").await;

        let (status, loads) = send(&app, get("/loads/shipper/me", Some(&shipper))).await;
        assert_eq!(status, StatusCode::OK);
        let origins: Vec<&str> = loads
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["origin"].as_str().unwrap())
            .collect();
        assert_eq!(origins, ["Second", "First"]);
    }

    #[tokio::test]
    async fn test_role_checks() {
        let app = test_app();
        let shipper = register_and_login(&app, "shipper@example.com", "shipper").await;
        let loader = register_and_login(&app, "loader@example.com", "loader").await;

        let (status, body) = post_load(&app, &loader, "Pune, India").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Only shippers can post loads");

        let (status, body) = send(&app, get("/loads/shipper/me", Some(&loader))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Only shippers can view their posted loads");

        let (status, body) = send(&app, get("/loads/my-active", Some(&shipper))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Only loaders can view their active loads");

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/loads/{}/accept", Uuid::new_v4()),
                Some(&shipper),
                Value::Null,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "Only loaders can accept loads");
    }

    #[tokio::test]
    async fn test_accept_unknown_load() {
        let app = test_app();
        let loader = register_and_login(&app, "loader@example.com", "loader").await;

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/loads/{}/accept", Uuid::new_v4()),
                Some(&loader),
                Value::Null,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Load not found");
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn test_post_load_rejects_invalid_weight() {
        let app = test_app();
        let shipper = register_and_login(&app, "shipper@example.com", "shipper").await;

        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/loads/",
                Some(&shipper),
                json!({"origin": "A", "destination": "B", "weight": -5.0}),
            ),
        )
        .await;
        assert!(status.is_client_error());

        let (_, loads) = send(&app, get("/loads/shipper/me", Some(&shipper))).await;
        assert!(loads.as_array().unwrap().is_empty());
    }

    fn staged_loads(days: i64) -> Arc<MemoryLoadRepo> {
        let repo = Arc::new(MemoryLoadRepo::new());
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap();
        for day in 0..days {
            repo.insert_raw(Load {
                id: Uuid::new_v4(),
                shipper_id: "shipper@example.com".to_string(),
                origin: "Mumbai, India".to_string(),
                destination: "Delhi, India".to_string(),
                weight: None,
                material_type: None,
                status: LoadStatus::StandBy,
                loader_id: None,
                posted_at: Some(start + Duration::days(day)),
                accepted_at: None,
            });
        }
        repo
    }

    #[tokio::test]
    async fn test_forecast_endpoint() {
        let db = DbPool::from_repos(Arc::new(MemoryUserRepo::new()), staged_loads(20));
        let app = test_app_with(test_config(""), db);

        let (status, body) = send(&app, get("/predictions/loads-forecast", None)).await;
        assert_eq!(status, StatusCode::OK);

        let points = body.as_array().unwrap();
        assert_eq!(points.len(), 7);
        assert_eq!(points[0]["date"], "2025-01-21");
        assert_eq!(points[6]["date"], "2025-01-27");
        for point in points {
            assert_eq!(point["predicted_loads"], 1);
        }
    }

    #[tokio::test]
    async fn test_forecast_without_data_is_404() {
        let app = test_app();
        let (status, body) = send(&app, get("/predictions/loads-forecast", None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["detail"],
            "No load data available to generate a forecast."
        );
    }

    #[tokio::test]
    async fn test_forecast_insufficient_history_is_400() {
        let db = DbPool::from_repos(Arc::new(MemoryUserRepo::new()), staged_loads(3));
        let app = test_app_with(test_config(""), db);

        let (status, body) = send(&app, get("/predictions/loads-forecast", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["detail"],
            "Not enough data to create a forecast. Need at least 15 days of data, but only have 3."
        );
    }

    #[tokio::test]
    async fn test_forecast_store_failure_is_500() {
        let db = DbPool::from_repos(Arc::new(MemoryUserRepo::new()), Arc::new(FailingLoadRepo));
        let app = test_app_with(test_config(""), db);

        let (status, body) = send(&app, get("/predictions/loads-forecast", None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("store offline"));
    }

    #[tokio::test]
    async fn test_forecast_can_require_auth() {
        let config = test_config("\n[forecasting]\nrequire_auth = true\n");
        let app = test_app_with(config, DbPool::in_memory());

        let (status, _) = send(&app, get("/predictions/loads-forecast", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = register_and_login(&app, "loader@example.com", "loader").await;
        let (status, _) = send(&app, get("/predictions/loads-forecast", Some(&token))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_id_echoed() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
    }
}
