//! Server configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// HTTP server settings.
///
/// # Environment Variables
/// - `HOST` (default `0.0.0.0`)
/// - `PORT` (default `8080`)
/// - `ENVIRONMENT` (default `development`), reported by the status endpoint
/// - `MEDIA_URL` (default `/media/`), prefix for uploaded image paths
/// - `CORS_ALLOWED_ORIGINS`: comma-separated origins; unset or empty allows any origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub media_url: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            media_url: "/media/".to_string(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// # Errors
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| format!("PORT must be a valid port number, got '{}'", raw))?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            host: non_empty_var("HOST").unwrap_or(defaults.host),
            port,
            environment: non_empty_var("ENVIRONMENT").unwrap_or(defaults.environment),
            media_url: non_empty_var("MEDIA_URL")
                .map(|url| with_trailing_slash(&url))
                .unwrap_or(defaults.media_url),
            cors_allowed_origins: non_empty_var("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_blanks() {
        assert_eq!(
            parse_origins(" https://a.example ,, https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_media_url_gets_trailing_slash() {
        assert_eq!(with_trailing_slash("/uploads"), "/uploads/");
        assert_eq!(with_trailing_slash("https://cdn.example/m/"), "https://cdn.example/m/");
    }

    #[test]
    fn test_default_socket_addr() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }
}
