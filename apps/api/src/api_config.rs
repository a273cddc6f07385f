use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use hookforge_application::RateLimitRule;
use hookforge_core::AppError;
use hookforge_domain::{DEFAULT_SAMPLING_TEMPERATURE, SamplingTemperature};
use hookforge_infrastructure::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use ipnet::IpNet;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitStoreConfig {
    InMemory,
    Redis,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub redis_url: Option<String>,
    pub rate_limit_store: RateLimitStoreConfig,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_ms: i64,
    pub rate_limit_max_retries: u32,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub generation_temperature: SamplingTemperature,
    pub generation_timeout_seconds: u64,
    pub generation_max_attempts: u8,
    pub pro_token_hashes: Vec<String>,
    pub trusted_proxies: Vec<IpNet>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let frontend_url = env
            .optional("FRONTEND_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_owned());
        Url::parse(&frontend_url)
            .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

        let gemini_base_url = env
            .optional("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_owned());
        Url::parse(&gemini_base_url)
            .map_err(|error| AppError::Validation(format!("invalid GEMINI_BASE_URL: {error}")))?;

        let redis_url = env.optional("REDIS_URL");
        let rate_limit_store = match env
            .optional("RATE_LIMIT_STORE")
            .unwrap_or_else(|| "memory".to_owned())
            .as_str()
        {
            "memory" => RateLimitStoreConfig::InMemory,
            "redis" => {
                if redis_url.is_none() {
                    return Err(AppError::Validation(
                        "REDIS_URL is required when RATE_LIMIT_STORE=redis".to_owned(),
                    ));
                }
                RateLimitStoreConfig::Redis
            }
            other => {
                return Err(AppError::Validation(format!(
                    "RATE_LIMIT_STORE must be either 'memory' or 'redis', got '{other}'"
                )));
            }
        };

        let generation_temperature = SamplingTemperature::new(
            env.parsed("GENERATION_TEMPERATURE", DEFAULT_SAMPLING_TEMPERATURE)?,
        )?;

        let trusted_proxies = env
            .list("TRUSTED_PROXIES")
            .into_iter()
            .map(|value| {
                IpNet::from_str(&value)
                    .or_else(|_| IpAddr::from_str(&value).map(IpNet::from))
                    .map_err(|error| {
                        AppError::Validation(format!(
                            "invalid TRUSTED_PROXIES entry '{value}': {error}"
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            api_host: env
                .optional("API_HOST")
                .unwrap_or_else(|| "127.0.0.1".to_owned()),
            api_port: env.parsed("API_PORT", 3001)?,
            frontend_url,
            redis_url,
            rate_limit_store,
            rate_limit_max_requests: env.parsed("RATE_LIMIT_MAX_REQUESTS", 5)?,
            rate_limit_window_ms: env.parsed("RATE_LIMIT_WINDOW_MS", 60_000)?,
            rate_limit_max_retries: env.parsed("RATE_LIMIT_MAX_RETRIES", 5)?,
            gemini_api_key: env.required_non_empty("GEMINI_API_KEY")?,
            gemini_model: env
                .optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_owned()),
            gemini_base_url,
            generation_temperature,
            generation_timeout_seconds: env.parsed("GENERATION_TIMEOUT_SECONDS", 30)?,
            generation_max_attempts: env.parsed("GENERATION_MAX_ATTEMPTS", 2)?,
            pro_token_hashes: env.list("PRO_TOKEN_HASHES"),
            trusted_proxies,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn rate_limit_rule(&self) -> Result<RateLimitRule, AppError> {
        RateLimitRule::new(self.rate_limit_max_requests, self.rate_limit_window_ms)?
            .with_max_retries(self.rate_limit_max_retries)
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required_non_empty(&self, name: &str) -> Result<String, AppError> {
        self.optional(name)
            .ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }

    fn parsed<T>(&self, name: &str, default: T) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(value) => value
                .trim()
                .parse::<T>()
                .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
            None => Ok(default),
        }
    }

    fn list(&self, name: &str) -> Vec<String> {
        self.optional(name)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(ToOwned::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}
