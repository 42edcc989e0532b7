use std::env;
use std::path::PathBuf;
use std::time::Duration;
use crate::error::{AppError, Result};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_OUTPUT_DIR: &str = "outputs";

#[derive(Debug, Clone, PartialEq)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Base URL of the backend API
    pub api_url: String,
    pub supabase: Option<SupabaseConfig>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub output_dir: PathBuf,
}

impl AppConfig {
    /// Load `.env` (if present) and read the environment
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(AppError::Config(format!("failed to read .env: {}", e)));
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("DT_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let supabase = match (lookup("SUPABASE_URL"), lookup("SUPABASE_KEY")) {
            (Some(url), Some(key)) => Some(SupabaseConfig {
                url: url.trim_end_matches('/').to_string(),
                key,
            }),
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "SUPABASE_URL and SUPABASE_KEY must be set together".into(),
                ))
            }
        };

        let poll_interval = Duration::from_secs(parse_secs(
            &lookup,
            "DT_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?);
        let request_timeout = Duration::from_secs(parse_secs(
            &lookup,
            "DT_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);

        let output_dir = lookup("DT_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Ok(Self {
            api_url,
            supabase,
            poll_interval,
            request_timeout,
            output_dir,
        })
    }
}

fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(0) => Err(AppError::Config(format!("{} must be greater than zero", key))),
            Ok(secs) => Ok(secs),
            Err(_) => Err(AppError::Config(format!("{} must be a number, got {:?}", key, raw))),
        },
    }
}
