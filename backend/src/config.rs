//! Server configuration.
//!
//! Read from the environment (a `.env` file is loaded first when present).
//! Analysis thresholds are request parameters and never come from here.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::error::{ServerError, ServerResult};

pub const HOST_VAR: &str = "SALESTREND_HOST";
pub const PORT_VAR: &str = "SALESTREND_PORT";
pub const MAX_UPLOAD_VAR: &str = "SALESTREND_MAX_UPLOAD_MB";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default upload limit, in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Request body limit in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load from `SALESTREND_*` variables, falling back to defaults.
    pub fn from_env() -> ServerResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_VAR) {
            config.host = parse_var(HOST_VAR, &host)?;
        }
        if let Some(port) = lookup(PORT_VAR) {
            config.port = parse_var(PORT_VAR, &port)?;
        }
        if let Some(mb) = lookup(MAX_UPLOAD_VAR) {
            let limit: usize = parse_var(MAX_UPLOAD_VAR, &mb)?;
            config.max_upload_bytes = limit
                .checked_mul(1024 * 1024)
                .ok_or_else(|| ServerError::Config(format!("{}='{}' is too large", MAX_UPLOAD_VAR, mb)))?;
        }

        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> ServerResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| ServerError::Config(format!("{}='{}' is not valid", name, raw)))
}
