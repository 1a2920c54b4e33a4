#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use echoscope_core::error::ErrorCode;
use echoscope_server::config::{self, parse_duration, parse_listen_addr, ServerConfig};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k| map.get(k).cloned()
}

fn write_temp(name: &str, contents: &str) -> String {
    let path = std::env::temp_dir().join(format!("echoscope-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn defaults_without_any_source() {
    let cfg = config::load_with(env(&[])).unwrap();
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.listen, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
    assert_eq!(cfg.shutdown_grace, Duration::from_secs(10));
}

#[test]
fn env_overrides_defaults() {
    let cfg = config::load_with(env(&[
        ("LISTEN_ADDR", ":9090"),
        ("SHUTDOWN_DEADLINE", "2s"),
    ]))
    .unwrap();
    assert_eq!(cfg.listen, "0.0.0.0:9090".parse::<SocketAddr>().unwrap());
    assert_eq!(cfg.shutdown_grace, Duration::from_secs(2));
}

#[test]
fn invalid_env_values_fall_back_to_default() {
    let cfg = config::load_with(env(&[
        ("LISTEN_ADDR", "not-an-address"),
        ("SHUTDOWN_DEADLINE", "ten seconds"),
    ]))
    .unwrap();
    assert_eq!(cfg, ServerConfig::default());
}

#[test]
fn file_values_apply_below_env() {
    let path = write_temp(
        "layered.yaml",
        r#"
server:
  listen: "127.0.0.1:7000"
  shutdown_deadline: "30s"
"#,
    );

    let cfg = config::load_with(env(&[("ECHOSCOPE_CONFIG", path.as_str())])).unwrap();
    assert_eq!(cfg.listen, "127.0.0.1:7000".parse::<SocketAddr>().unwrap());
    assert_eq!(cfg.shutdown_grace, Duration::from_secs(30));

    let cfg = config::load_with(env(&[
        ("ECHOSCOPE_CONFIG", path.as_str()),
        ("SHUTDOWN_DEADLINE", "500ms"),
    ]))
    .unwrap();
    assert_eq!(cfg.listen, "127.0.0.1:7000".parse::<SocketAddr>().unwrap());
    assert_eq!(cfg.shutdown_grace, Duration::from_millis(500));

    let _ = std::fs::remove_file(path);
}

#[test]
fn invalid_env_value_falls_back_to_file_value() {
    let path = write_temp("fallback.yaml", "server:\n  shutdown_deadline: \"3s\"\n");
    let cfg = config::load_with(env(&[
        ("ECHOSCOPE_CONFIG", path.as_str()),
        ("SHUTDOWN_DEADLINE", "-1s"),
    ]))
    .unwrap();
    assert_eq!(cfg.shutdown_grace, Duration::from_secs(3));
    let _ = std::fs::remove_file(path);
}

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
server:
  listen: ":8080"
  shutdown_deadlin: "5s" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn missing_config_file_is_fatal() {
    let err = config::load_with(env(&[("ECHOSCOPE_CONFIG", "/nonexistent/echoscope.yaml")]))
        .expect_err("must fail");
    assert_eq!(err.code(), ErrorCode::Config);
}

#[test]
fn ok_empty_config() {
    let cfg = config::load_from_str("").expect("must parse");
    assert!(cfg.server.listen.is_none());
    let cfg = config::load_from_str("server: {}\n").expect("must parse");
    assert!(cfg.server.shutdown_deadline.is_none());
}

#[test]
fn listen_address_forms() {
    assert_eq!(
        parse_listen_addr(":8080"),
        Some("0.0.0.0:8080".parse().unwrap())
    );
    assert_eq!(
        parse_listen_addr("localhost:3000"),
        Some("127.0.0.1:3000".parse().unwrap())
    );
    assert_eq!(
        parse_listen_addr("[::1]:8080"),
        Some("[::1]:8080".parse().unwrap())
    );
    assert_eq!(parse_listen_addr(":http"), None);
    assert_eq!(parse_listen_addr("example.com:80"), None);
}

#[test]
fn go_style_durations() {
    assert_eq!(parse_duration("0"), Some(Duration::ZERO));
    assert_eq!(parse_duration("10s"), Some(Duration::from_secs(10)));
    assert_eq!(parse_duration("300ms"), Some(Duration::from_millis(300)));
    assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
    assert_eq!(parse_duration("1.5h"), Some(Duration::from_secs(5400)));
    assert_eq!(parse_duration("250us"), Some(Duration::from_micros(250)));
    assert_eq!(parse_duration("250µs"), Some(Duration::from_micros(250)));
    assert_eq!(parse_duration("+2s"), Some(Duration::from_secs(2)));
    assert_eq!(parse_duration(".5s"), Some(Duration::from_millis(500)));
    assert_eq!(parse_duration("1m30.5s"), Some(Duration::from_millis(90_500)));
    assert_eq!(parse_duration("2h45m"), Some(Duration::from_secs(9900)));

    assert_eq!(parse_duration(""), None);
    assert_eq!(parse_duration("10"), None);
    assert_eq!(parse_duration("-1s"), None);
    assert_eq!(parse_duration("5d"), None);
    assert_eq!(parse_duration("s"), None);
    assert_eq!(parse_duration("1..5s"), None);
    // wider humantime forms stay rejected
    assert_eq!(parse_duration("1m 30s"), None);
    assert_eq!(parse_duration("10sec"), None);
    assert_eq!(parse_duration("3 hours"), None);
}
