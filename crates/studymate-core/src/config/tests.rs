use std::io::Write;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 11] = [
    "STUDYMATE_CHUNK_SIZE",
    "STUDYMATE_SUMMARY_CHARS",
    "STUDYMATE_MAX_FILE_SIZE",
    "STUDYMATE_TOP_K",
    "STUDYMATE_GATEWAY_BIND",
    "STUDYMATE_GATEWAY_PORT",
    "STUDYMATE_GATEWAY_TOKEN",
    "STUDYMATE_GATEWAY_RATE_LIMIT",
    "STUDYMATE_GATEWAY_MAX_BODY_SIZE",
    "STUDYMATE_GATEWAY_MAX_SESSIONS",
    "STUDYMATE_GATEWAY_SESSION_TTL",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn defaults_when_file_missing() {
    let config = Config::default();
    assert_eq!(config.document.chunk_size, 100);
    assert_eq!(config.document.summary_chars, 500);
    assert_eq!(config.document.max_file_size, 50 * 1024 * 1024);
    assert_eq!(config.retrieval.top_k, 3);
    assert_eq!(config.gateway.bind, "127.0.0.1");
    assert_eq!(config.gateway.port, 8090);
    assert!(config.gateway.auth_token.is_none());
    assert_eq!(config.gateway.max_sessions, 256);
    assert_eq!(config.gateway.session_ttl_secs, 3600);
    config.validate().unwrap();
}

#[test]
#[serial]
fn missing_file_loads_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.document.chunk_size, 100);
    assert_eq!(config.retrieval.top_k, 3);
}

#[test]
#[serial]
fn parse_valid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"
[document]
chunk_size = 250

[retrieval]
top_k = 5

[gateway]
port = 9000
auth_token = "secret"
"#
    )
    .unwrap();

    clear_env();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.document.chunk_size, 250);
    assert_eq!(config.document.summary_chars, 500);
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.auth_token.as_deref(), Some("secret"));
    assert_eq!(config.gateway.rate_limit, 120);
}

#[test]
#[serial]
fn malformed_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[document\nchunk_size = ").unwrap();
    clear_env();
    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse config file"));
}

#[test]
#[serial]
fn env_overrides() {
    clear_env();
    unsafe {
        std::env::set_var("STUDYMATE_CHUNK_SIZE", "64");
        std::env::set_var("STUDYMATE_TOP_K", "7");
        std::env::set_var("STUDYMATE_GATEWAY_TOKEN", "from-env");
        std::env::set_var("STUDYMATE_GATEWAY_SESSION_TTL", "60");
    }

    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.document.chunk_size, 64);
    assert_eq!(config.retrieval.top_k, 7);
    assert_eq!(config.gateway.auth_token.as_deref(), Some("from-env"));
    assert_eq!(config.gateway.session_ttl_secs, 60);
}

#[test]
#[serial]
fn env_override_invalid_ignored() {
    clear_env();
    unsafe {
        std::env::set_var("STUDYMATE_CHUNK_SIZE", "lots");
        std::env::set_var("STUDYMATE_GATEWAY_PORT", "99999");
    }

    let mut config = Config::default();
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.document.chunk_size, 100);
    assert_eq!(config.gateway.port, 8090);
}

#[derive(Clone, Default)]
struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
#[serial]
fn every_invalid_numeric_override_warns() {
    const NUMERIC_KEYS: [&str; 9] = [
        "STUDYMATE_CHUNK_SIZE",
        "STUDYMATE_SUMMARY_CHARS",
        "STUDYMATE_MAX_FILE_SIZE",
        "STUDYMATE_TOP_K",
        "STUDYMATE_GATEWAY_PORT",
        "STUDYMATE_GATEWAY_RATE_LIMIT",
        "STUDYMATE_GATEWAY_MAX_BODY_SIZE",
        "STUDYMATE_GATEWAY_MAX_SESSIONS",
        "STUDYMATE_GATEWAY_SESSION_TTL",
    ];

    clear_env();
    for key in NUMERIC_KEYS {
        unsafe { std::env::set_var(key, "not-a-number") };
    }

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();

    let mut config = Config::default();
    tracing::subscriber::with_default(subscriber, || config.apply_env_overrides());
    clear_env();

    let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    for key in NUMERIC_KEYS {
        assert!(
            output.contains(&format!("ignoring invalid {key} value: not-a-number")),
            "no warning for {key}: {output}"
        );
    }

    let defaults = Config::default();
    assert_eq!(config.document.chunk_size, defaults.document.chunk_size);
    assert_eq!(config.document.summary_chars, defaults.document.summary_chars);
    assert_eq!(config.document.max_file_size, defaults.document.max_file_size);
    assert_eq!(config.retrieval.top_k, defaults.retrieval.top_k);
    assert_eq!(config.gateway.port, defaults.gateway.port);
    assert_eq!(config.gateway.rate_limit, defaults.gateway.rate_limit);
    assert_eq!(config.gateway.max_body_size, defaults.gateway.max_body_size);
    assert_eq!(config.gateway.max_sessions, defaults.gateway.max_sessions);
    assert_eq!(
        config.gateway.session_ttl_secs,
        defaults.gateway.session_ttl_secs
    );
}

#[test]
fn validate_rejects_zero_values() {
    let mut config = Config::default();
    config.document.chunk_size = 0;
    assert!(config.validate().unwrap_err().to_string().contains("chunk_size"));

    let mut config = Config::default();
    config.retrieval.top_k = 0;
    assert!(config.validate().unwrap_err().to_string().contains("top_k"));

    let mut config = Config::default();
    config.document.summary_chars = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.gateway.max_sessions = 0;
    assert!(config.validate().is_err());
}

#[test]
fn shipped_config_matches_defaults() {
    let shipped: Config = toml::from_str(include_str!("../../../../config/default.toml")).unwrap();
    let defaults = Config::default();
    assert_eq!(shipped.document.chunk_size, defaults.document.chunk_size);
    assert_eq!(shipped.document.summary_chars, defaults.document.summary_chars);
    assert_eq!(shipped.document.max_file_size, defaults.document.max_file_size);
    assert_eq!(shipped.retrieval.top_k, defaults.retrieval.top_k);
    assert_eq!(shipped.gateway.port, defaults.gateway.port);
    assert_eq!(shipped.gateway.max_body_size, defaults.gateway.max_body_size);
    assert_eq!(shipped.gateway.session_ttl_secs, defaults.gateway.session_ttl_secs);
}
