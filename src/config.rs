//! Runtime configuration loaded from environment variables

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::types::{DEFAULT_ROUND_SECONDS, MAX_ROUND_SECONDS, MIN_ROUND_SECONDS};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CONTENT_PATH: &str = "data/questions.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub addr: SocketAddr,
    /// JSON file holding the question sets
    pub content_path: PathBuf,
    /// Round duration used when a start request omits `duration_seconds`
    pub default_round_seconds: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            content_path: PathBuf::from(DEFAULT_CONTENT_PATH),
            default_round_seconds: DEFAULT_ROUND_SECONDS,
        }
    }
}

impl AppConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let addr = match std::env::var("RANKDASH_ADDR") {
            Ok(v) => v.trim().parse::<SocketAddr>().unwrap_or_else(|e| {
                tracing::warn!("Invalid RANKDASH_ADDR '{}': {}, using {}", v, e, defaults.addr);
                defaults.addr
            }),
            Err(_) => defaults.addr,
        };

        let content_path = std::env::var("RANKDASH_CONTENT_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.content_path);

        let default_round_seconds = match std::env::var("RANKDASH_DEFAULT_ROUND_SECONDS") {
            Ok(v) => match v.trim().parse::<u32>() {
                Ok(secs) => secs.clamp(MIN_ROUND_SECONDS, MAX_ROUND_SECONDS),
                Err(e) => {
                    tracing::warn!(
                        "Invalid RANKDASH_DEFAULT_ROUND_SECONDS '{}': {}, using {}",
                        v,
                        e,
                        DEFAULT_ROUND_SECONDS
                    );
                    DEFAULT_ROUND_SECONDS
                }
            },
            Err(_) => DEFAULT_ROUND_SECONDS,
        };

        Self {
            addr,
            content_path,
            default_round_seconds,
        }
    }
}
