use std::{env, net::SocketAddr, time::Duration};

use ipnet::IpNet;

use thiserror::Error;

use crate::logging::LogFormat;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_WEB_URL: &str = "https://github.com";
pub const DEFAULT_BASE_URL: &str = "https://mcp-git.onrender.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub github_api_url: String,
    pub github_web_url: String,
    pub github_timeout: Duration,
    pub environment: String,
    pub base_url: String,
    pub bind_addr: String,
    pub bind_port: u16,
    pub api_token: Option<String>,
    pub allowed_cidr: Option<IpNet>,
    pub trusted_proxies: Vec<IpNet>,
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_TOKEN is required and must not be empty")]
    MissingGithubToken,
    #[error("PORT must be a valid u16")]
    InvalidPort,
    #[error("MCP_ALLOWED_CIDR must be a valid CIDR range")]
    InvalidAllowedCidr,
    #[error("MCP_TRUSTED_PROXIES must be a comma-separated list of CIDR ranges")]
    InvalidTrustedProxy,
    #[error("GITHUB_TIMEOUT_SECS must be a positive integer")]
    InvalidTimeout,
    #[error("LOG_FORMAT must be one of: compact, json")]
    InvalidLogFormat,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let github_token =
            non_empty_var("GITHUB_TOKEN").ok_or(ConfigError::MissingGithubToken)?;

        let github_api_url = non_empty_var("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let github_web_url = non_empty_var("GITHUB_WEB_URL")
            .unwrap_or_else(|| DEFAULT_GITHUB_WEB_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let github_timeout = non_empty_var("GITHUB_TIMEOUT_SECS")
            .map(|value| {
                value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or(ConfigError::InvalidTimeout)
            })
            .transpose()?
            .unwrap_or(Duration::from_secs(30));

        let environment =
            non_empty_var("ENVIRONMENT").unwrap_or_else(|| "production".to_string());
        let base_url = non_empty_var("BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let bind_port = env::var("PORT")
            .ok()
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(10000);

        let api_token = non_empty_var("MCP_API_TOKEN");
        let allowed_cidr = non_empty_var("MCP_ALLOWED_CIDR")
            .map(|value| {
                value
                    .parse::<IpNet>()
                    .map_err(|_| ConfigError::InvalidAllowedCidr)
            })
            .transpose()?;
        let trusted_proxies = non_empty_var("MCP_TRUSTED_PROXIES")
            .map(|value| parse_cidr_list(&value))
            .transpose()?
            .unwrap_or_default();

        let log_format = non_empty_var("LOG_FORMAT")
            .map(|value| value.parse::<LogFormat>().map_err(|_| ConfigError::InvalidLogFormat))
            .transpose()?
            .unwrap_or_default();

        let config = Self {
            github_token,
            github_api_url,
            github_web_url,
            github_timeout,
            environment,
            base_url,
            bind_addr,
            bind_port,
            api_token,
            allowed_cidr,
            trusted_proxies,
            log_format,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_cidr_list(value: &str) -> Result<Vec<IpNet>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<IpNet>()
                .map_err(|_| ConfigError::InvalidTrustedProxy)
        })
        .collect()
}
