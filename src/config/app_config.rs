use std::{env, path::PathBuf};

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Empty means any origin is accepted.
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Prefix used to build public file URLs, e.g. `http://localhost:5000`.
    pub public_base_url: String,
    pub max_file_size: usize,
    pub max_files: usize,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::ConfigError(format!("Invalid {} value", name)))
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = parse_var("PORT", "5000")?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::ConfigError("JWT_SECRET not set".to_string()))?;
        if jwt_secret.is_empty() {
            return Err(AppError::ConfigError("JWT_SECRET is empty".to_string()));
        }

        Ok(Self {
            server: ServerConfig {
                max_body_size: parse_var("MAX_BODY_SIZE", "52428800")?,
                host,
                port,
            },
            database: DatabaseConfig {
                url: env::var("DB_URL")?,
                max_connections: parse_var("DB_MAX_CONNECTIONS", "20")?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(
                    &env::var("FRONTEND_URL").unwrap_or_else(|_| "*".to_string()),
                ),
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_days: parse_var("JWT_TTL_DAYS", "7")?,
            },
            upload: UploadConfig {
                dir: PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string())),
                public_base_url: env::var("PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| format!("http://localhost:{}", port))
                    .trim_end_matches('/')
                    .to_string(),
                max_file_size: parse_var("UPLOAD_MAX_FILE_SIZE", "5242880")?,
                max_files: parse_var("UPLOAD_MAX_FILES", "10")?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != "*")
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_origins("*").is_empty());
        assert!(parse_origins(" , ").is_empty());
    }

    #[test]
    fn test_server_address() {
        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                max_body_size: 1024,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/market".to_string(),
                max_connections: 5,
            },
            cors: CorsConfig {
                allowed_origins: Vec::new(),
            },
            auth: AuthConfig {
                jwt_secret: "secret".to_string(),
                token_ttl_days: 7,
            },
            upload: UploadConfig {
                dir: PathBuf::from("uploads"),
                public_base_url: "http://localhost:5000".to_string(),
                max_file_size: 1024,
                max_files: 10,
            },
        };

        assert_eq!(config.server_address(), "127.0.0.1:5000");
    }
}
