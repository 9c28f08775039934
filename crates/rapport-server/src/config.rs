use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

use rapport_db::DEFAULT_READER_POOL_SIZE;

/// JWT secrets that must never reach production.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub db_readers: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("RAPPORT_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("RAPPORT_JWT_SECRET is unset or still a placeholder; set it in .env or the environment");
        }

        let port = match lookup("RAPPORT_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid RAPPORT_PORT '{}'", raw))?,
            None => 3000,
        };

        let db_readers = match lookup("RAPPORT_DB_READERS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid RAPPORT_DB_READERS '{}'", raw))?,
            None => DEFAULT_READER_POOL_SIZE,
        };

        let db_path: PathBuf = lookup("RAPPORT_DB_PATH")
            .unwrap_or_else(|| "rapport.db".into())
            .into();

        let host = lookup("RAPPORT_HOST").unwrap_or_else(|| {
            info!("RAPPORT_HOST not set, using default: 0.0.0.0");
            "0.0.0.0".into()
        });

        Ok(Self {
            host,
            port,
            jwt_secret,
            db_path,
            db_readers,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = load(&[("RAPPORT_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.db_path, PathBuf::from("rapport.db"));
        assert_eq!(config.db_readers, DEFAULT_READER_POOL_SIZE);
        assert_eq!(config.addr().unwrap().port(), 3000);
    }

    #[test]
    fn overrides_apply() {
        let config = load(&[
            ("RAPPORT_JWT_SECRET", "s3cret"),
            ("RAPPORT_HOST", "127.0.0.1"),
            ("RAPPORT_PORT", "8080"),
            ("RAPPORT_DB_PATH", "/tmp/likes.db"),
            ("RAPPORT_DB_READERS", "0"),
        ])
        .unwrap();
        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.db_path, PathBuf::from("/tmp/likes.db"));
        assert_eq!(config.db_readers, 0);
    }

    #[test]
    fn missing_or_placeholder_secret_refused() {
        assert!(load(&[]).is_err());
        assert!(load(&[("RAPPORT_JWT_SECRET", "")]).is_err());
        assert!(load(&[("RAPPORT_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn bad_port_refused() {
        let err = load(&[("RAPPORT_JWT_SECRET", "s3cret"), ("RAPPORT_PORT", "http")]).err().unwrap();
        assert!(err.to_string().contains("RAPPORT_PORT"));
    }
}
