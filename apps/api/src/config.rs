use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::llm_client::DEFAULT_GEMINI_BASE_URL;

/// Which `KeyValueStorage` implementation backs the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    File,
    Redis,
    Memory,
}

impl StorageBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => bail!("STORAGE_BACKEND must be one of file, redis, memory (got '{other}')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed, or if the redis
/// backend is selected without `REDIS_URL`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_addr: String,
    pub rust_log: String,
    pub storage_backend: StorageBackend,
    pub data_dir: PathBuf,
    pub redis_url: Option<String>,
    /// Build-time credential. Takes precedence over a key saved at runtime.
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage_backend = StorageBackend::parse(
            &std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "file".to_string()),
        )?;
        let redis_url = optional_env("REDIS_URL");
        if storage_backend == StorageBackend::Redis && redis_url.is_none() {
            bail!("Required environment variable 'REDIS_URL' is not set (STORAGE_BACKEND=redis)");
        }

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            storage_backend,
            data_dir: PathBuf::from(
                std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            ),
            redis_url,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Reads an env var, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(StorageBackend::parse("file").unwrap(), StorageBackend::File);
        assert_eq!(StorageBackend::parse(" Redis ").unwrap(), StorageBackend::Redis);
        assert_eq!(StorageBackend::parse("MEMORY").unwrap(), StorageBackend::Memory);
    }

    #[test]
    fn test_storage_backend_rejects_unknown() {
        let err = StorageBackend::parse("sqlite").unwrap_err();
        assert!(err.to_string().contains("sqlite"));
    }
}
