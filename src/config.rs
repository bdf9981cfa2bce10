use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use crate::error::{AppError, Result};

pub const DEFAULT_FIRECRAWL_BASE_URL: &str = "https://api.firecrawl.dev";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub firecrawl_api_key: String,
    pub firecrawl_base_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        // Provider credentials
        let firecrawl_api_key = required("FIRECRAWL_API_KEY")?;
        let openai_api_key = required("OPENAI_API_KEY")?;

        let firecrawl_base_url = env::var("FIRECRAWL_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_FIRECRAWL_BASE_URL.to_string());
        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string());
        let openai_model = env::var("OPENAI_MODEL")
            .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string());
        let output_dir = env::var("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR));

        // Load server configuration with defaults
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let server_addr = parse_addr(&host, &port)?;

        Ok(Config {
            server_addr,
            firecrawl_api_key,
            firecrawl_base_url: trim_base(firecrawl_base_url),
            openai_api_key,
            openai_base_url: trim_base(openai_base_url),
            openai_model,
            output_dir,
        })
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|e| AppError::ConfigError(format!("{}: {}", name, e)))
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

pub(crate) fn parse_addr(host: &str, port: &str) -> Result<SocketAddr> {
    let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
    let ip = IpAddr::from_str(host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;
    Ok(SocketAddr::new(ip, port))
}
