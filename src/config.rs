//! Server configuration.
//!
//! The bind address comes from `RESOURCEFUL_ADDR` and the request body cap
//! from `RESOURCEFUL_BODY_LIMIT` (bytes). Log verbosity belongs to the
//! subscriber the binary installs (`RUST_LOG`).

use std::net::SocketAddr;

use crate::error::Error;

pub const ADDR_VAR: &str = "RESOURCEFUL_ADDR";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const BODY_LIMIT_VAR: &str = "RESOURCEFUL_BODY_LIMIT";
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Settings for [`Server`](crate::Server).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    /// Largest request body the server buffers; bigger ones get `413`.
    pub body_limit: usize,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_owned());
        let body_limit = match lookup(BODY_LIMIT_VAR) {
            Some(limit) => limit.trim().parse().map_err(|e| {
                Error::configuration(format!("invalid {BODY_LIMIT_VAR} `{limit}`: {e}"))
            })?,
            None => DEFAULT_BODY_LIMIT,
        };
        Ok(Self { addr: parse_addr(&addr)?, body_limit })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

pub(crate) fn parse_addr(addr: &str) -> Result<SocketAddr, Error> {
    addr.parse()
        .map_err(|e| Error::configuration(format!("invalid socket address `{addr}`: {e}")))
}
