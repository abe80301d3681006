use std::{env, fmt::Display, str::FromStr};

use log::{info, warn};

/// Runtime settings, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub client_id: String,
    pub client_secret: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub mail_from: String,
    pub mail_domain: String,
    pub api_url: String,
    /// `NODE_ENV=development`, selects the relay address prefix.
    pub development: bool,
    /// `ENVIRONMENT=dev`, allows cross-origin calls from a local front end.
    pub cors_enabled: bool,
    pub photo_dir: String,
    pub photo_max_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            workers: num_cpus::get(),
            database_url: String::new(),
            database_max_connections: 10,
            jwt_secret: String::new(),
            access_token_ttl_minutes: 60,
            refresh_token_ttl_days: 30,
            client_id: String::new(),
            client_secret: String::new(),
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_secure: false,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            mail_from: "VeloMatchr <no-reply@velomatchr.com>".to_string(),
            mail_domain: "velomatchr.com".to_string(),
            api_url: "http://localhost:5000".to_string(),
            development: false,
            cors_enabled: false,
            photo_dir: "public/images-profiles".to_string(),
            photo_max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Loads the configuration. Panics on missing required values, startup cannot
    /// continue without them.
    pub fn load() -> Self {
        let defaults = Config::default();

        let jwt_secret = env::var("SECRET").expect("SECRET must be set");
        if jwt_secret.is_empty() {
            panic!("SECRET cannot be empty");
        }

        Self {
            host: try_load("HOST", &defaults.host),
            port: try_load("PORT", &defaults.port.to_string()),
            workers: try_load("WORKERS", &defaults.workers.to_string()),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            database_max_connections: try_load(
                "DATABASE_MAX_CONNECTIONS",
                &defaults.database_max_connections.to_string(),
            ),
            jwt_secret,
            access_token_ttl_minutes: try_load(
                "ACCESS_TOKEN_TTL_MINUTES",
                &defaults.access_token_ttl_minutes.to_string(),
            ),
            refresh_token_ttl_days: try_load(
                "REFRESH_TOKEN_TTL_DAYS",
                &defaults.refresh_token_ttl_days.to_string(),
            ),
            client_id: env::var("CLIENT_ID").unwrap_or_default(),
            client_secret: env::var("CLIENT_SECRET").unwrap_or_default(),
            smtp_host: try_load("SMTP_HOST", &defaults.smtp_host),
            smtp_port: try_load("SMTP_PORT", &defaults.smtp_port.to_string()),
            smtp_secure: try_load("SMTP_SECURE", "false"),
            smtp_user: env::var("SMTP_USER").unwrap_or_default(),
            smtp_pass: env::var("SMTP_PASS").unwrap_or_default(),
            mail_from: try_load("MAIL_FROM", &defaults.mail_from),
            mail_domain: try_load("MAIL_DOMAIN", &defaults.mail_domain),
            api_url: try_load::<String>("REACT_APP_API_URL", &defaults.api_url)
                .trim_end_matches('/')
                .to_string(),
            development: is_development(&env::var("NODE_ENV").unwrap_or_default()),
            cors_enabled: is_dev_environment(&env::var("ENVIRONMENT").unwrap_or_default()),
            photo_dir: try_load("PHOTO_DIR", &defaults.photo_dir),
            photo_max_bytes: try_load("PHOTO_MAX_BYTES", &defaults.photo_max_bytes.to_string()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Local part prefix of relay addresses, `dev-buddy-` outside production.
    pub fn proxy_prefix(&self) -> &'static str {
        if self.development {
            "dev-buddy-"
        } else {
            "buddy-"
        }
    }

    pub fn client_credentials_enabled(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

fn is_development(node_env: &str) -> bool {
    node_env == "development"
}

fn is_dev_environment(environment: &str) -> bool {
    environment == "dev"
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_prefix_follows_environment() {
        let mut config = Config::default();
        assert_eq!(config.proxy_prefix(), "buddy-");
        config.development = true;
        assert_eq!(config.proxy_prefix(), "dev-buddy-");
    }

    #[test]
    fn node_env_and_environment_are_independent() {
        assert!(!is_development("production"));
        assert!(is_dev_environment("dev"));

        assert!(is_development("development"));
        assert!(!is_dev_environment("production"));
        assert!(!is_dev_environment("development"));
    }

    #[test]
    fn client_credentials_need_both_halves() {
        let mut config = Config::default();
        assert!(!config.client_credentials_enabled());
        config.client_id = "frontend".to_string();
        assert!(!config.client_credentials_enabled());
        config.client_secret = "s3cret".to_string();
        assert!(config.client_credentials_enabled());
    }
}
