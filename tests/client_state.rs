use lava::error::Error;
use lava::{ConnectionConfig, Lavalink};
use std::time::Duration;

#[test]
fn test_accessors_fail_before_connect() {
    let lavalink = Lavalink::new();

    assert!(matches!(lavalink.is_ssl(), Err(Error::NotConnected)));
    assert!(matches!(lavalink.host(), Err(Error::NotConnected)));
    assert!(matches!(lavalink.port(), Err(Error::NotConnected)));
    assert!(matches!(lavalink.session(), Err(Error::NotConnected)));
    assert!(matches!(lavalink.websocket(), Err(Error::NotConnected)));
    assert!(matches!(lavalink.status(), Err(Error::NotConnected)));
    assert!(matches!(lavalink.subscribe_status(), Err(Error::NotConnected)));
}

#[tokio::test]
async fn test_close_before_connect() {
    let mut lavalink = Lavalink::new();
    assert!(matches!(lavalink.close().await, Err(Error::NotConnected)));
}

#[test]
fn test_not_connected_message() {
    assert_eq!(Error::NotConnected.to_string(), "Lavalink::connect() was not called");
}

#[test]
fn test_websocket_url() {
    let config = ConnectionConfig::new("h", 80, "p", 1);
    assert_eq!(config.websocket_url(), "ws://h:80/v3/websocket");

    let config = config.with_ssl(true);
    assert_eq!(config.websocket_url(), "wss://h:80/v3/websocket");
}

#[test]
fn test_rest_base_url_matches_websocket_scheme() {
    let config = ConnectionConfig::new("lavalink.local", 2333, "p", 1);
    assert_eq!(config.rest_base_url(), "http://lavalink.local:2333/v3");

    let config = config.with_ssl(true);
    assert_eq!(config.rest_base_url(), "https://lavalink.local:2333/v3");
}

#[test]
fn test_headers() {
    let headers = ConnectionConfig::new("h", 80, "p", 1).headers().unwrap();

    assert_eq!(headers["authorization"], "p");
    assert_eq!(headers["user-id"], "1");
    assert_eq!(
        headers["client-name"],
        concat!("lava-rs/", env!("CARGO_PKG_VERSION"))
    );
    assert!(headers.get("resume-key").is_none());
    assert!(headers["authorization"].is_sensitive());
}

#[test]
fn test_headers_with_resume_key() {
    let headers = ConnectionConfig::new("h", 80, "p", 170114520432476160)
        .with_resume_key("my-key")
        .headers()
        .unwrap();

    assert_eq!(headers["user-id"], "170114520432476160");
    assert_eq!(headers["resume-key"], "my-key");
}

#[test]
fn test_invalid_header_value() {
    let result = ConnectionConfig::new("h", 80, "bad\npassword", 1).headers();
    assert!(matches!(result, Err(Error::InvalidHeader("Authorization"))));
}

#[test]
fn test_config_defaults_and_debug() {
    let config = ConnectionConfig::new("h", 80, "secret", 1).with_resume_key("also-secret");

    assert!(!config.ssl);
    assert!(!config.trace);
    assert_eq!(config.request_timeout, Duration::from_secs(10));

    let debug = format!("{config:?}");
    assert!(!debug.contains("secret"));
}
