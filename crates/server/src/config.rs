use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// Gemini API key, which the binary requires at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Path to the seed data file (default: `semi_data.json`).
    pub seed_data_path: PathBuf,
    /// Gemini API key. Optional here; the binary refuses to start
    /// without it, but tests never need one.
    pub gemini_api_key: Option<String>,
    /// Gemini `generateContent` endpoint. Overridable for testing
    /// against a stub.
    pub gemini_endpoint: String,
}

/// Default Gemini endpoint used when `GEMINI_ENDPOINT` is unset.
pub const DEFAULT_GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var          | Default                   |
    /// |------------------|---------------------------|
    /// | `HOST`           | `0.0.0.0`                 |
    /// | `PORT`           | `8000`                    |
    /// | `CORS_ORIGINS`   | `http://localhost:3000`   |
    /// | `SEED_DATA_PATH` | `semi_data.json`          |
    /// | `GOOGLE_API_KEY` | --                        |
    /// | `GEMINI_ENDPOINT`| Google's hosted endpoint  |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let seed_data_path =
            PathBuf::from(std::env::var("SEED_DATA_PATH").unwrap_or_else(|_| "semi_data.json".into()));

        let gemini_api_key = std::env::var("GOOGLE_API_KEY").ok();

        let gemini_endpoint =
            std::env::var("GEMINI_ENDPOINT").unwrap_or_else(|_| DEFAULT_GEMINI_ENDPOINT.into());

        Self {
            host,
            port,
            cors_origins,
            seed_data_path,
            gemini_api_key,
            gemini_endpoint,
        }
    }
}
