use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => AppEnv::Development,
            _ => AppEnv::Production,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,

    pub jwt_secret: String,

    pub insight: InsightConfig,

    pub app_env: AppEnv,
}

impl Config {
    /// Read the process environment once at startup. Nothing downstream
    /// touches `std::env`.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed("PORT", 5000)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),

            jwt_secret: required("JWT_SECRET")?,

            insight: InsightConfig {
                api_key: env::var("INSIGHT_API_KEY")
                    .or_else(|_| env::var("GROK_API_KEY"))
                    .unwrap_or_default(),
                api_url: env::var("INSIGHT_API_URL")
                    .unwrap_or_else(|_| "https://api.x.ai/v1/chat/completions".into()),
                model: env::var("INSIGHT_MODEL").unwrap_or_else(|_| "grok-beta".into()),
                timeout_secs: parsed("INSIGHT_TIMEOUT_SECS", 30)?,
            },

            app_env: AppEnv::parse(&env::var("APP_ENV").unwrap_or_default()),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.app_env == AppEnv::Development
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("{name} must be set"))
}

fn parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number")),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        database_url: "memory://".into(),
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec![],
        jwt_secret: "secret".into(),
        insight: InsightConfig {
            api_key: String::new(),
            api_url: "http://127.0.0.1:9/".into(),
            model: "test".into(),
            timeout_secs: 1,
        },
        app_env: AppEnv::Production,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_env_defaults_to_production() {
        assert_eq!(AppEnv::parse(""), AppEnv::Production);
        assert_eq!(AppEnv::parse("staging"), AppEnv::Production);
        assert_eq!(AppEnv::parse("Development"), AppEnv::Development);
        assert_eq!(AppEnv::parse("dev"), AppEnv::Development);
    }

    #[test]
    fn cors_list_skips_blanks() {
        assert_eq!(
            split_list("http://a.test, ,http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
