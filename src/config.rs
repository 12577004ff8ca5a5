use std::{env, path::PathBuf, str::FromStr};

use crate::audit::DEFAULT_AUDIT_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "postgres" => Ok(Self::Postgres),
            other => Err(anyhow::anyhow!("unknown STORE_BACKEND {other:?}")),
        }
    }
}

/// Where the record slots live. Shared by the server and the seed binary.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub quota_bytes: Option<usize>,
}

impl StoreSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        let backend = match env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::File,
        };
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let database_url = env::var("DATABASE_URL").ok();
        let quota_bytes = env::var("STORE_QUOTA_BYTES")
            .ok()
            .and_then(|q| q.parse::<usize>().ok());

        Ok(Self {
            backend,
            data_dir,
            database_url,
            quota_bytes,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreSettings,
    pub export_dir: Option<PathBuf>,
    pub audit_limit: usize,
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password_hash: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let store = StoreSettings::from_env()?;
        // An empty EXPORT_DIR turns receipt export off.
        let export_dir = match env::var("EXPORT_DIR") {
            Ok(dir) if dir.trim().is_empty() => None,
            Ok(dir) => Some(PathBuf::from(dir)),
            Err(_) => Some(PathBuf::from("./exports")),
        };
        let audit_limit = env::var("AUDIT_LIMIT")
            .ok()
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(DEFAULT_AUDIT_LIMIT);
        let jwt_secret = env::var("JWT_SECRET")?;
        let admin_email =
            env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
        let admin_password_hash = env::var("ADMIN_PASSWORD_HASH")?;

        Ok(Self {
            host,
            port,
            store,
            export_dir,
            audit_limit,
            jwt_secret,
            admin_email,
            admin_password_hash,
        })
    }
}
