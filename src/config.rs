use std::{env, net::SocketAddr};

use anyhow::{Context, Result};

const DEFAULT_SESSION_DAYS: i64 = 90;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub secret_key: String,
    pub host: [u8; 4],
    pub port: u16,
    pub session_days: i64,
}

impl Config {
    /// Reads the configuration from the environment. Call `dotenvy::dotenv()`
    /// first if a `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let secret_key = env::var("SECRET_KEY").context("SECRET_KEY must be set")?;
        let host = match env::var("HOST") {
            Ok(host) => parse_host(&host).context("HOST must be an IPv4 address")?,
            Err(_) => [127, 0, 0, 1],
        };
        let port = match env::var("PORT") {
            Ok(port) => port.parse().context("PORT must be a number")?,
            Err(_) => 3001,
        };
        let session_days = match env::var("SESSION_DAYS") {
            Ok(days) => parse_session_days(&days)
                .context("SESSION_DAYS must be a positive number of days")?,
            Err(_) => DEFAULT_SESSION_DAYS,
        };

        Ok(Self {
            database_url,
            secret_key,
            host,
            port,
            session_days,
        })
    }

    pub fn new(database_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            secret_key: secret_key.into(),
            host: [127, 0, 0, 1],
            port: 3001,
            session_days: DEFAULT_SESSION_DAYS,
        }
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

fn parse_host(host: &str) -> Result<[u8; 4]> {
    let addr: std::net::Ipv4Addr = host.parse()?;
    Ok(addr.octets())
}

fn parse_session_days(days: &str) -> Result<i64> {
    let days: i64 = days.trim().parse()?;
    anyhow::ensure!(days > 0, "{days} is not a positive number");
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_uses_host_and_port() {
        let mut config = Config::new("sqlite::memory:", "secret");
        config.host = parse_host("0.0.0.0").unwrap();
        config.port = 8080;
        assert_eq!(config.address().to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn rejects_hostnames() {
        assert!(parse_host("localhost").is_err());
    }

    #[test]
    fn session_days_must_be_a_positive_number() {
        assert_eq!(parse_session_days("30").unwrap(), 30);
        assert_eq!(parse_session_days(" 7 ").unwrap(), 7);
        assert!(parse_session_days("ninety").is_err());
        assert!(parse_session_days("").is_err());
        assert!(parse_session_days("0").is_err());
        assert!(parse_session_days("-5").is_err());
    }
}
