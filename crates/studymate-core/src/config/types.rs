use serde::{Deserialize, Serialize};

use studymate_document::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FILE_SIZE};

use crate::engine::DEFAULT_SUMMARY_CHARS;
use crate::resolver::DEFAULT_TOP_K;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub document: DocumentConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_summary_chars() -> usize {
    DEFAULT_SUMMARY_CHARS
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

/// Extraction, chunking and summary settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentConfig {
    /// Chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters of normalized text shown as the document summary.
    #[serde(default = "default_summary_chars")]
    pub summary_chars: usize,
    /// Largest file (or upload) accepted for extraction, in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            summary_chars: default_summary_chars(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Number of passages joined into an answer.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_gateway_bind() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    8090
}

fn default_gateway_rate_limit() -> u32 {
    120
}

fn default_gateway_max_body() -> usize {
    52_428_800
}

fn default_gateway_max_sessions() -> usize {
    256
}

fn default_gateway_session_ttl() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Requests per minute per client IP; `0` disables limiting.
    #[serde(default = "default_gateway_rate_limit")]
    pub rate_limit: u32,
    #[serde(default = "default_gateway_max_body")]
    pub max_body_size: usize,
    #[serde(default = "default_gateway_max_sessions")]
    pub max_sessions: usize,
    /// Idle seconds before a session is evicted.
    #[serde(default = "default_gateway_session_ttl")]
    pub session_ttl_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_gateway_bind(),
            port: default_gateway_port(),
            auth_token: None,
            rate_limit: default_gateway_rate_limit(),
            max_body_size: default_gateway_max_body(),
            max_sessions: default_gateway_max_sessions(),
            session_ttl_secs: default_gateway_session_ttl(),
        }
    }
}
