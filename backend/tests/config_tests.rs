//! Tests for ServerConfig loading from the environment.

mod support;

use alloggi_backend::config::ServerConfig;

const VARS: [&str; 5] = [
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "MEDIA_URL",
    "CORS_ALLOWED_ORIGINS",
];

fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
    VARS.iter().map(|name| (*name, None)).collect()
}

#[test]
fn test_defaults_without_environment() {
    let config = support::with_scoped_env(&cleared(), ServerConfig::from_env).unwrap();

    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.socket_addr().unwrap().port(), 8080);
    assert!(!config.is_production());
}

#[test]
fn test_values_from_environment() {
    let config = support::with_scoped_env(
        &[
            ("HOST", Some("127.0.0.1")),
            ("PORT", Some(" 9000 ")),
            ("ENVIRONMENT", Some("Production")),
            ("MEDIA_URL", Some("https://cdn.example/media")),
            (
                "CORS_ALLOWED_ORIGINS",
                Some("https://alloggi.example, https://admin.alloggi.example"),
            ),
        ],
        ServerConfig::from_env,
    )
    .unwrap();

    assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9000");
    assert!(config.is_production());
    assert_eq!(config.media_url, "https://cdn.example/media/");
    assert_eq!(
        config.cors_allowed_origins,
        vec!["https://alloggi.example", "https://admin.alloggi.example"]
    );
}

#[test]
fn test_invalid_port_is_an_error() {
    let mut env = cleared();
    env.push(("PORT", Some("eighty")));

    let err = support::with_scoped_env(&env, ServerConfig::from_env).unwrap_err();
    assert!(err.contains("PORT"));
}

#[test]
fn test_blank_values_fall_back_to_defaults() {
    let config = support::with_scoped_env(
        &[
            ("HOST", Some("  ")),
            ("PORT", None),
            ("ENVIRONMENT", Some("")),
            ("MEDIA_URL", None),
            ("CORS_ALLOWED_ORIGINS", Some(" ")),
        ],
        ServerConfig::from_env,
    )
    .unwrap();

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.environment, "development");
    assert!(config.cors_allowed_origins.is_empty());
}

#[test]
fn test_unparseable_host_is_reported_by_socket_addr() {
    let config = ServerConfig {
        host: "not a host".to_string(),
        ..ServerConfig::default()
    };
    assert!(config.socket_addr().is_err());
}
