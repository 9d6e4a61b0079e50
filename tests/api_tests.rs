use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use registro_votantes::{
    AppState,
    auth::Claims,
    config::AppConfig,
    create_router,
    models::Voter,
    repository::{MockVoterRepository, RepositoryState},
};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub config: AppConfig,
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(MockVoterRepository::new()) as RepositoryState;
    let config = AppConfig::default();

    let state = AppState {
        repo,
        config: config.clone(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, config }
}

/// Logs in with the configured admin password and returns the issued token.
async fn admin_token(app: &TestApp, client: &reqwest::Client) -> String {
    let response = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({ "password": app.config.admin_password }))
        .send()
        .await
        .expect("login request");
    assert_eq!(response.status(), 200);
    response.json::<serde_json::Value>().await.unwrap()["token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Signs a token with an arbitrary role using the app's own secret, simulating
/// a credential that verifies but lacks the admin privilege.
fn forge_token(role: &str, secret: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        role: role.to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn voter_body(nombre: &str, cedula: &str) -> serde_json::Value {
    serde_json::json!({
        "nombre": nombre,
        "cedula": cedula,
        "telefono": "8095551234",
        "municipio": "Leon"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/", app.address))
        .send()
        .await
        .expect("req fail");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "registro-votantes-api");
}

#[tokio::test]
async fn test_login_password_handling() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Missing password: 400 with the message in the errors list.
    let response = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0], "Falta contraseña");

    // Wrong password: 401.
    let response = client
        .post(format!("{}/api/auth/login", app.address))
        .json(&serde_json::json!({ "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Correct password: a token comes back.
    let token = admin_token(&app, &client).await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_create_validates_before_touching_the_store() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/voters", app.address))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    let errors: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    assert_eq!(
        errors,
        vec![
            "Nombre inválido",
            "Cédula inválida",
            "Teléfono inválido",
            "Municipio inválido",
        ]
    );

    // Nothing was stored.
    let list: Vec<Voter> = client
        .get(format!("{}/api/voters", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_create_then_duplicate_conflicts() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/voters", app.address))
        .json(&voter_body("Ana Torres", "A1B2"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: Voter = response.json().await.unwrap();
    assert_eq!(created.cedula, "A1B2");

    let response = client
        .post(format!("{}/api/voters", app.address))
        .json(&voter_body("Otra Ana", "A1B2"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "La cédula ya existe");

    // list() contains exactly one record with that cedula.
    let list: Vec<Voter> = client
        .get(format!("{}/api/voters", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.iter().filter(|v| v.cedula == "A1B2").count(), 1);
}

#[tokio::test]
async fn test_exists_flips_after_create() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    // Missing cedula param: 400.
    let response = client
        .get(format!("{}/api/voters/exists", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/api/voters/exists", app.address))
        .query(&[("cedula", "X9Y8")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["exists"], false);

    client
        .post(format!("{}/api/voters", app.address))
        .json(&voter_body("Juan", "X9Y8"))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/api/voters/exists", app.address))
        .query(&[("cedula", "X9Y8")])
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["exists"], true);
}

#[tokio::test]
async fn test_list_search_and_municipio_filters() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    for (nombre, cedula, municipio) in [
        ("Maria Lopez", "F100", "Leon"),
        ("Pedro Gomez", "F200", "LEON"),
        ("maria del Carmen", "F300", "Managua"),
    ] {
        let response = client
            .post(format!("{}/api/voters", app.address))
            .json(&serde_json::json!({
                "nombre": nombre,
                "cedula": cedula,
                "telefono": "8095551234",
                "municipio": municipio
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    // Free-text search is case-insensitive across the four fields.
    let hits: Vec<Voter> = client
        .get(format!("{}/api/voters", app.address))
        .query(&[("q", "maria")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);

    // Municipality filter matches LEON and leon identically.
    for muni in ["Leon", "LEON", "leon"] {
        let hits: Vec<Voter> = client
            .get(format!("{}/api/voters", app.address))
            .query(&[("municipio", muni)])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(hits.len(), 2, "municipio={} should match 2 records", muni);
    }

    // Unfiltered list is newest first.
    let all: Vec<Voter> = client
        .get(format!("{}/api/voters", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].cedula, "F300");
    assert_eq!(all[2].cedula, "F100");
}

#[tokio::test]
async fn test_protected_routes_auth_ladder() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let created: Voter = client
        .post(format!("{}/api/voters", app.address))
        .json(&voter_body("Borrable", "D3L1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let delete_url = format!("{}/api/voters/{}", app.address, created.id);

    // No Authorization header: 401.
    let response = client.delete(&delete_url).send().await.unwrap();
    assert_eq!(response.status(), 401);

    // Garbage bearer token: 401.
    let response = client
        .delete(&delete_url)
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Valid signature but non-admin role: 403.
    let viewer = forge_token("viewer", &app.config.jwt_secret);
    let response = client
        .delete(&delete_url)
        .bearer_auth(viewer)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    // Valid admin token: the delete succeeds.
    let token = admin_token(&app, &client).await;
    let response = client
        .delete(&delete_url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);

    // And the record is gone from exists and list.
    let body: serde_json::Value = client
        .get(format!("{}/api/voters/exists", app.address))
        .query(&[("cedula", "D3L1")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["exists"], false);

    // Deleting again: 404.
    let response = client
        .delete(&delete_url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_update_semantics() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&app, &client).await;

    let first: Voter = client
        .post(format!("{}/api/voters", app.address))
        .json(&voter_body("Primera", "U100"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Voter = client
        .post(format!("{}/api/voters", app.address))
        .json(&voter_body("Segunda", "U200"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Update without auth: 401, validation never reached.
    let response = client
        .put(format!("{}/api/voters/{}", app.address, first.id))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Authenticated but invalid body: 400.
    let response = client
        .put(format!("{}/api/voters/{}", app.address, first.id))
        .bearer_auth(&token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Nonexistent id: 404, and no other record is altered.
    let response = client
        .put(format!("{}/api/voters/{}", app.address, 9999))
        .bearer_auth(&token)
        .json(&voter_body("Nadie", "U999"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Updating into another row's cedula: 409.
    let response = client
        .put(format!("{}/api/voters/{}", app.address, second.id))
        .bearer_auth(&token)
        .json(&voter_body("Segunda", "U100"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // Full-replace of the four fields; id and created_at survive, input is trimmed.
    let response = client
        .put(format!("{}/api/voters/{}", app.address, second.id))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "nombre": "  Segunda Actualizada  ",
            "cedula": "U201",
            "telefono": "8095559999",
            "municipio": "Rivas"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let updated: Voter = response.json().await.unwrap();
    assert_eq!(updated.id, second.id);
    assert_eq!(updated.created_at, second.created_at);
    assert_eq!(updated.nombre, "Segunda Actualizada");
    assert_eq!(updated.cedula, "U201");

    // The first record is untouched.
    let list: Vec<Voter> = client
        .get(format!("{}/api/voters", app.address))
        .query(&[("q", "U100")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].nombre, "Primera");
}
