//! End-to-end flows through the router: login, record entry, admin pages.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bloqueos::api::{AppState, SESSION_COOKIE_NAME};
use bloqueos::config::Config;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("bloqueos-web-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", db_path.display());
    // Cheap hashing keeps the suite fast.
    config.security.argon2_memory_cost_kib = 8;
    config.security.argon2_time_cost = 1;
    config.security.argon2_parallelism = 1;
    config
}

async fn spawn_app() -> (Arc<AppState>, Router) {
    let state = bloqueos::api::create_app_state_from_config(test_config(), None)
        .await
        .expect("failed to create app state");
    let router = bloqueos::api::router(state.clone())
        .await
        .expect("failed to build router");
    (state, router)
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

/// Minimal browser: remembers the session cookie between requests.
struct Client {
    app: Router,
    cookie: Option<String>,
}

impl Client {
    fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    async fn send(&mut self, request: axum::http::request::Builder, body: Body) -> TestResponse {
        let request = match &self.cookie {
            Some(cookie) => request.header(header::COOKIE, cookie),
            None => request,
        };

        let response = self
            .app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap().trim();
            if let Some(id) = pair.strip_prefix(&format!("{SESSION_COOKIE_NAME}=")) {
                self.cookie = if id.is_empty() {
                    None
                } else {
                    Some(pair.to_string())
                };
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri), Body::empty()).await
    }

    async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
            Body::from(form.to_string()),
        )
        .await
    }

    async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form("/login", &format!("username={username}&password={password}"))
            .await
    }
}

const VALID_RECORD: &str =
    "fecha=2024-03-15&departamento=Ventas&placa=ABC-123&barcode=7501234567890&pin=4321&motivo=Robo";

#[tokio::test]
async fn test_anonymous_requests_redirect_to_login() {
    let (_, app) = spawn_app().await;
    let mut client = Client::new(app);

    for uri in ["/", "/registro", "/admin", "/admin/graficos", "/admin/metrics"] {
        let response = client.get(uri).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.location.as_deref(), Some("/login"), "{uri}");
    }

    let response = client.post_form("/registro", VALID_RECORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_login_page_renders() {
    let (_, app) = spawn_app().await;
    let mut client = Client::new(app);

    let response = client.get("/login").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<form method=\"post\" action=\"/login\">"));
}

#[tokio::test]
async fn test_bad_credentials_rerender_login() {
    let (_, app) = spawn_app().await;
    let mut client = Client::new(app);

    let response = client.login("admin", "wrong").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Usuario o contraseña incorrectos"));
    assert!(response.body.contains("value=\"admin\""));

    let response = client.login("nadie", "admin123").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Usuario o contraseña incorrectos"));

    let response = client.get("/registro").await;
    assert_eq!(response.location.as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_admin_login_lands_on_admin_page() {
    let (_, app) = spawn_app().await;
    let mut client = Client::new(app);

    let response = client.login("admin", "admin123").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/"));

    let response = client.get("/").await;
    assert_eq!(response.location.as_deref(), Some("/admin"));

    let response = client.get("/admin").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Inicio de sesión exitoso"));
    assert!(response.body.contains("Total: 0"));

    // Flash messages are shown once.
    let response = client.get("/admin").await;
    assert!(!response.body.contains("Inicio de sesión exitoso"));
}

#[tokio::test]
async fn test_user_submits_record() {
    let (state, app) = spawn_app().await;
    let mut client = Client::new(app);

    client.login("usuario1", "password123").await;
    let response = client.get("/").await;
    assert_eq!(response.location.as_deref(), Some("/registro"));

    let response = client.get("/registro").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("name=\"barcode\""));

    let before = state.store().count_bloqueos().await.unwrap();
    let response = client.post_form("/registro", VALID_RECORD).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/registro"));
    assert_eq!(state.store().count_bloqueos().await.unwrap(), before + 1);

    let user = state
        .store()
        .get_user_by_username("usuario1")
        .await
        .unwrap()
        .unwrap();
    let entries = state.store().list_bloqueos().await.unwrap();
    let stored = &entries.last().unwrap().bloqueo;
    assert_eq!(stored.user_id, user.id);
    assert_eq!(stored.placa, "ABC-123");
    assert_eq!(stored.fecha.format("%Y-%m-%d").to_string(), "2024-03-15");

    let response = client.get("/registro").await;
    assert!(response.body.contains("Registro de bloqueo guardado exitosamente"));
    assert!(response.body.contains("<td>ABC-123</td>"));
}

#[tokio::test]
async fn test_invalid_record_is_not_stored() {
    let (state, app) = spawn_app().await;
    let mut client = Client::new(app);
    client.login("operador", "operador123").await;

    let response = client
        .post_form(
            "/registro",
            "fecha=15-03-2024&departamento=Ventas&placa=XYZ-9&barcode=1&pin=1&motivo=Prueba",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Error al guardar el registro"));
    assert!(response.body.contains("15-03-2024"));
    assert!(response.body.contains("value=\"XYZ-9\""));

    let response = client
        .post_form(
            "/registro",
            "fecha=2024-03-15&departamento=&placa=XYZ-9&barcode=1&pin=1&motivo=Prueba",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("departamento"));

    // "+12345-03-15", url-encoded.
    let response = client
        .post_form(
            "/registro",
            "fecha=%2B12345-03-15&departamento=Ventas&placa=XYZ-9&barcode=1&pin=1&motivo=Prueba",
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Error al guardar el registro"));

    assert_eq!(state.store().count_bloqueos().await.unwrap(), 0);
}

#[tokio::test]
async fn test_non_admin_cannot_open_admin_pages() {
    let (_, app) = spawn_app().await;
    let mut client = Client::new(app);
    client.login("usuario1", "password123").await;

    for uri in ["/admin", "/admin/graficos", "/admin/metrics"] {
        let response = client.get(uri).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.location.as_deref(), Some("/login"), "{uri}");
    }

    // Still logged in afterwards.
    let response = client.get("/registro").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_sees_every_record_and_charts() {
    let (_, app) = spawn_app().await;

    let mut usuario = Client::new(app.clone());
    usuario.login("usuario1", "password123").await;
    usuario.post_form("/registro", VALID_RECORD).await;

    let mut operador = Client::new(app.clone());
    operador.login("operador", "operador123").await;
    operador
        .post_form(
            "/registro",
            "fecha=2024-03-16&departamento=TI&placa=ABC-123&barcode=42&pin=99&motivo=Extravio",
        )
        .await;

    let mut admin = Client::new(app);
    admin.login("admin", "admin123").await;

    let response = admin.get("/admin").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Total: 2"));
    assert!(response.body.contains("<td>usuario1</td>"));
    assert!(response.body.contains("<td>operador</td>"));

    let response = admin.get("/admin/graficos").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("id=\"chart-data\""));
    assert!(response.body.contains("<tr><td>Ventas</td><td>1</td></tr>"));
    assert!(response.body.contains("<tr><td>2024-03-16</td><td>1</td></tr>"));
    assert!(response.body.contains("<tr><td>ABC-123</td><td>2</td></tr>"));

    // No recorder installed in tests.
    let response = admin.get("/admin/metrics").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let (_, app) = spawn_app().await;
    let mut client = Client::new(app);
    client.login("usuario1", "password123").await;

    let response = client.get("/logout").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/login"));

    let response = client.get("/login").await;
    assert!(response.body.contains("Has cerrado sesión correctamente"));

    let response = client.get("/registro").await;
    assert_eq!(response.location.as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_security_headers_present() {
    let (_, app) = spawn_app().await;

    let response = app
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-frame-options").unwrap(),
        "DENY"
    );
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}

async fn session_rows(state: &AppState) -> i64 {
    use sea_orm::{ConnectionTrait, DbBackend, Statement};

    let row = state
        .store()
        .conn
        .query_one(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT COUNT(*) AS n FROM tower_sessions",
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

#[tokio::test]
async fn test_expired_sessions_are_purged() {
    use std::collections::HashMap;
    use tower_sessions::session::{Id, Record};
    use tower_sessions::{ExpiredDeletion, SessionStore};

    let (state, app) = spawn_app().await;
    let store = bloqueos::api::session_store(&state).await.unwrap();

    // A live session from a real login.
    let mut client = Client::new(app);
    client.login("usuario1", "password123").await;
    assert_eq!(session_rows(&state).await, 1);

    let mut stale = Record {
        id: Id::default(),
        data: HashMap::new(),
        expiry_date: time::OffsetDateTime::now_utc() - time::Duration::minutes(5),
    };
    store.create(&mut stale).await.unwrap();
    assert_eq!(session_rows(&state).await, 2);

    store.delete_expired().await.unwrap();
    assert_eq!(session_rows(&state).await, 1);

    let response = client.get("/registro").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_csp_allows_configured_script_sources() {
    let mut config = test_config();
    config.server.script_sources = vec!["https://cdn.jsdelivr.net".to_string()];
    let state = bloqueos::api::create_app_state_from_config(config, None)
        .await
        .unwrap();
    let app = bloqueos::api::router(state).await.unwrap();

    let response = app
        .oneshot(Request::builder().uri("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let csp = response
        .headers()
        .get("content-security-policy")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(csp.contains("script-src 'self' https://cdn.jsdelivr.net;"));
}
