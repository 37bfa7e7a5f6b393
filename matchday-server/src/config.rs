use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_PORT: u16 = 10000;
const DEFAULT_POOL_SIZE: u32 = 15;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub addr: SocketAddr,
    pub pool_size: u32,
    pub template_dir: String,
    pub static_dir: String,
}

fn parse_or<T: FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError> where F: Fn(&str) -> Option<String> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host: IpAddr = parse_or("HOST", lookup("HOST"), IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port: u16 = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let pool_size: u32 = parse_or("DB_POOL_SIZE", lookup("DB_POOL_SIZE"), DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::Invalid { name: "DB_POOL_SIZE", value: "0".into() });
        }
        Ok(Config {
            database_url,
            addr: SocketAddr::new(host, port),
            pool_size,
            template_dir: lookup("TEMPLATE_DIR").unwrap_or_else(|| "./templates".into()),
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "./static".into()),
        })
    }
}
