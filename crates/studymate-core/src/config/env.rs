use std::str::FromStr;

use super::Config;

/// Parsed value of `key`, if set. Unparsable values are logged and ignored.
fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring invalid {key} value: {raw}");
            None
        }
    }
}

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_document();
        self.apply_env_overrides_gateway();
    }

    fn apply_env_overrides_document(&mut self) {
        if let Some(size) = parse_env("STUDYMATE_CHUNK_SIZE") {
            self.document.chunk_size = size;
        }
        if let Some(chars) = parse_env("STUDYMATE_SUMMARY_CHARS") {
            self.document.summary_chars = chars;
        }
        if let Some(bytes) = parse_env("STUDYMATE_MAX_FILE_SIZE") {
            self.document.max_file_size = bytes;
        }
        if let Some(k) = parse_env("STUDYMATE_TOP_K") {
            self.retrieval.top_k = k;
        }
    }

    fn apply_env_overrides_gateway(&mut self) {
        if let Ok(v) = std::env::var("STUDYMATE_GATEWAY_BIND") {
            self.gateway.bind = v;
        }
        if let Some(port) = parse_env("STUDYMATE_GATEWAY_PORT") {
            self.gateway.port = port;
        }
        if let Ok(v) = std::env::var("STUDYMATE_GATEWAY_TOKEN") {
            self.gateway.auth_token = Some(v);
        }
        if let Some(limit) = parse_env("STUDYMATE_GATEWAY_RATE_LIMIT") {
            self.gateway.rate_limit = limit;
        }
        if let Some(size) = parse_env("STUDYMATE_GATEWAY_MAX_BODY_SIZE") {
            self.gateway.max_body_size = size;
        }
        if let Some(n) = parse_env("STUDYMATE_GATEWAY_MAX_SESSIONS") {
            self.gateway.max_sessions = n;
        }
        if let Some(secs) = parse_env("STUDYMATE_GATEWAY_SESSION_TTL") {
            self.gateway.session_ttl_secs = secs;
        }
    }
}
