use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "https://asap-6.onrender.com",
    "https://asap-frontend.onrender.com",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_url: String,
    pub mongo_db: String,
    pub use_transactions: bool,
    pub jwt_secret: String,
    pub jwt_expires_secs: i64,
    pub cookie_expires_days: i64,
    pub backend_url: String,
    pub upload_dir: PathBuf,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => 5002,
        };

        let mongo_url = get("MONGO_URL").ok_or(ConfigError::Missing("MONGO_URL"))?;
        let mongo_db = get("MONGO_DB").unwrap_or_else(|| database_name_from_url(&mongo_url));

        let use_transactions = match get("MONGO_TRANSACTIONS") {
            Some(raw) => parse_bool(&raw)
                .ok_or(ConfigError::Invalid { key: "MONGO_TRANSACTIONS", value: raw })?,
            None => true,
        };

        let jwt_secret = get("JWT_SEC").ok_or(ConfigError::Missing("JWT_SEC"))?;
        let jwt_expires_secs = match get("JWT_EXPIRES") {
            Some(raw) => parse_duration_secs(&raw)
                .ok_or(ConfigError::Invalid { key: "JWT_EXPIRES", value: raw })?,
            None => 7 * 24 * 60 * 60,
        };

        let cookie_expires_days = match get("COOKIE_EXPIRES_DAYS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or(ConfigError::Invalid { key: "COOKIE_EXPIRES_DAYS", value: raw })?,
            None => 30,
        };

        let backend_url = get("BACKEND_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let upload_dir = PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "upload".to_string()));

        let cors_origins = match get("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            host,
            port,
            mongo_url,
            mongo_db,
            use_transactions,
            jwt_secret,
            jwt_expires_secs,
            cookie_expires_days,
            backend_url,
            upload_dir,
            cors_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `mongodb://host:27017/asap?retryWrites=true` -> `asap`
fn database_name_from_url(url: &str) -> String {
    url.split("://")
        .nth(1)
        .and_then(|rest| rest.split_once('/'))
        .map(|(_, path)| path.split('?').next().unwrap_or_default())
        .filter(|name| !name.is_empty())
        .unwrap_or("asap")
        .to_string()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Accepts plain seconds (`3600`) or a number with a unit suffix (`90m`, `12h`, `7d`).
pub fn parse_duration_secs(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return (secs > 0).then_some(secs);
    }

    let (last, _) = raw.char_indices().last()?;
    let (number, unit) = raw.split_at(last);
    let value = number.trim().parse::<i64>().ok().filter(|v| *v > 0)?;
    let multiplier = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };

    value.checked_mul(multiplier)
}
