//! Cross-field validation of parsed options.
//!
//! `clap` enforces types and enumerations; the rules here depend on more than
//! one flag and run before any connection is attempted.

use std::net::Ipv6Addr;

use crate::config::types::{Config, ExportMode};
use crate::error_handling::ConfigError;

impl Config {
    /// Checks the option combinations an export run depends on.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_name.trim().is_empty() {
            return Err(ConfigError::MissingDatabase);
        }
        if self.db_host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        self.host_and_port()?;
        if self.db_user.trim().is_empty() {
            return Err(ConfigError::MissingUser);
        }

        let has_table = !self.table.trim().is_empty();
        match self.model {
            ExportMode::Schema if !has_table => Err(ConfigError::MissingSchemaTable),
            ExportMode::Data if !self.chunk && self.input.is_none() => {
                Err(ConfigError::MissingQueryFile)
            }
            ExportMode::Data if !has_table => Err(ConfigError::MissingTable),
            _ => Ok(()),
        }
    }

    /// Splits `--db-host` into host and port, defaulting the port per dialect.
    /// IPv6 addresses take the bracketed form, `[::1]` or `[::1]:5432`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHost`] when the port part is not a number
    /// or an IPv6 address is not bracketed.
    pub fn host_and_port(&self) -> Result<(String, u16), ConfigError> {
        let raw = self.db_host.trim();
        let invalid = || ConfigError::InvalidHost(raw.to_string());

        let (host, port) = match raw.strip_prefix('[') {
            Some(bracketed) => {
                let (host, rest) = bracketed.split_once(']').ok_or_else(invalid)?;
                if host.parse::<Ipv6Addr>().is_err() {
                    return Err(invalid());
                }
                match rest {
                    "" => (host, None),
                    _ => (host, Some(rest.strip_prefix(':').ok_or_else(invalid)?)),
                }
            }
            None => match raw.split_once(':') {
                // a second colon means an unbracketed IPv6 address
                Some((_, port)) if port.contains(':') => return Err(invalid()),
                Some((host, port)) => (host, Some(port)),
                None => (raw, None),
            },
        };

        if host.is_empty() {
            return Err(invalid());
        }
        let port = match port {
            Some(port) => port.parse::<u16>().map_err(|_| invalid())?,
            None => self.db_type.default_port(),
        };
        Ok((host.to_string(), port))
    }
}
