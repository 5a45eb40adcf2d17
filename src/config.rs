//! Server settings read from the environment.

use std::env;

const DEFAULT_DATABASE_URL: &str = "app.db";
const DEFAULT_ADDRESS: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Settings used to start the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Master key (32+ bytes) for the session and flash cookies. A random key is
    /// generated at startup when unset, which invalidates carts on restart.
    pub secret_key: Option<String>,
    /// Cookie domain; the session cookie is scoped to `.{domain}` when set.
    pub domain: Option<String>,
    pub templates_dir: String,
    pub cookie_secure: bool,
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match non_empty("PORT").map(|value| value.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(_)) => {
                log::warn!("PORT is not a valid port number, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        };

        let cookie_secure = non_empty("COOKIE_SECURE")
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            database_url: non_empty("DATABASE_URL").unwrap_or(DEFAULT_DATABASE_URL.to_string()),
            address: non_empty("ADDRESS").unwrap_or(DEFAULT_ADDRESS.to_string()),
            port,
            secret_key: non_empty("SECRET_KEY"),
            domain: non_empty("DOMAIN"),
            templates_dir: non_empty("TEMPLATES_DIR").unwrap_or(DEFAULT_TEMPLATES_DIR.to_string()),
            cookie_secure,
        }
    }

    /// Glob used to load every Tera template.
    pub fn templates_glob(&self) -> String {
        format!("{}/**/*", self.templates_dir.trim_end_matches('/'))
    }
}
