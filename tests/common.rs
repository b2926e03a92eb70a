#![allow(dead_code)]

use chrono::Utc;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;

use stockdesk::cli::Cli;
use stockdesk::config::{extract, ConfigV1};
use stockdesk::render::Renderer;
use stockdesk::session::create_identity_provider;
use stockdesk::startup::{execute, Outcome};
use stockdesk::state::AppState;

pub const REALM: &str = "microservices-realm";

pub fn access_token(username: &str, roles: &[&str]) -> String {
    encode(
        &Header::default(),
        &json!({
            "sub": format!("{username}-id"),
            "preferred_username": username,
            "email": format!("{username}@example.com"),
            "exp": Utc::now().timestamp() + 3600,
            "realm_access": {"roles": roles},
        }),
        &EncodingKey::from_secret(b"integration-secret"),
    )
    .expect("Failed to encode JWT")
}

/// A Keycloak realm that hands out one user's token and accepts logouts.
pub struct FakeRealm {
    pub server: ServerGuard,
    pub token: Mock,
    pub logout: Mock,
}

pub async fn realm(username: &str, roles: &[&str]) -> FakeRealm {
    let mut server = Server::new_async().await;
    let token = server
        .mock(
            "POST",
            format!("/realms/{REALM}/protocol/openid-connect/token").as_str(),
        )
        .match_body(Matcher::UrlEncoded("username".into(), username.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": access_token(username, roles),
                "refresh_token": format!("{username}-refresh"),
                "expires_in": 3600
            })
            .to_string(),
        )
        .create_async()
        .await;
    let logout = server
        .mock(
            "POST",
            format!("/realms/{REALM}/protocol/openid-connect/logout").as_str(),
        )
        .with_status(204)
        .create_async()
        .await;
    FakeRealm {
        server,
        token,
        logout,
    }
}

pub fn test_config(identity_url: &str, api_url: &str, username: &str, on_load: &str) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
logging:
  level: "debug"
identity:
  url: "{identity_url}"
  realm: "{REALM}"
  client_id: "frontend-client"
  on_load: "{on_load}"
  username: "{username}"
  password: "secret"
  timeout_in_ms: 3000
api:
  base_url: "{api_url}"
  timeout_in_ms: 3000
"#
    );
    extract(&Figment::from(Yaml::string(&yaml))).expect("test config should load")
}

/// Build the state and run the startup handshake, as the binary does.
pub async fn start(config: ConfigV1) -> AppState {
    let provider = create_identity_provider(&config.identity).expect("provider");
    let state = AppState::new(config, provider).expect("state");
    state.session.initialize().await.expect("session init");
    state
}

pub async fn signed_in(realm: &FakeRealm, api: &ServerGuard, username: &str) -> AppState {
    start(test_config(
        &realm.server.url(),
        &api.url(),
        username,
        "login-required",
    ))
    .await
}

fn always(_prompt: &str) -> bool {
    true
}

/// Parse `args` as a command line and run it, answering yes to every prompt.
pub async fn run(state: &AppState, args: &[&str]) -> Outcome {
    let cli = <Cli as clap::Parser>::try_parse_from(
        std::iter::once("stockdesk").chain(args.iter().copied()),
    )
    .expect("valid command line");
    execute(state, cli.command, &always, Renderer::new(false))
        .await
        .expect("command should run")
}
