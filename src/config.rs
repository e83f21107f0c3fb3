use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:9000";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub http_timeout: Option<Duration>,
    pub download_dir: PathBuf,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            api_token: None,
            http_timeout: None,
            download_dir: PathBuf::from("."),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into()).filter(|t: &String| !t.trim().is_empty());
        self
    }

    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let api_base_url =
            env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        Url::parse(&api_base_url)
            .map_err(|e| Error::Config(format!("Invalid value for API_BASE_URL: {}", e)))?;

        let http_timeout = match env::var("HTTP_TIMEOUT_SECS").ok() {
            Some(_) => Some(Duration::from_secs(get_env_parse("HTTP_TIMEOUT_SECS")?)),
            None => None,
        };

        Ok(Self {
            api_base_url,
            api_token: env::var("API_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            http_timeout,
            download_dir: env::var("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
