//! Connection Configuration
//!
//! Connection settings for one remote host. The password lives in memory
//! only: it is zeroized on drop, redacted in `Debug` output, and never
//! serialized. Persistence always goes through [`RedactedConfig`].
//!
//! [`RedactedConfig`]: crate::models::RedactedConfig

use std::fmt;

use zeroize::Zeroizing;

use crate::models::saved_process::{RedactedConfig, REDACTED_PASSWORD};

/// Connection settings for a single remote host
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Hostname or IP address
    pub host: String,
    /// SSH port
    pub port: u16,
    /// Login user
    pub username: String,
    /// Credential used for auth challenges and prompt auto-responses
    password: Zeroizing<String>,
    /// Human-readable label for this host ("staging", "build-01", ...)
    pub host_name: String,
}

impl ConnectionConfig {
    /// Create a new connection configuration
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        host_name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: Zeroizing::new(password.into()),
            host_name: host_name.into(),
        }
    }

    /// Rebuild a full config from a persisted (redacted) record plus a
    /// freshly supplied credential.
    pub fn from_redacted(redacted: &RedactedConfig, password: impl Into<String>) -> Self {
        Self::new(
            redacted.host.clone(),
            redacted.port,
            redacted.username.clone(),
            password,
            redacted.host_name.clone(),
        )
    }

    /// Borrow the credential. Callers must never log or persist it.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Produce the persistable form with the credential replaced by a
    /// placeholder.
    pub fn redacted(&self) -> RedactedConfig {
        RedactedConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: REDACTED_PASSWORD.to_string(),
            host_name: self.host_name.clone(),
        }
    }

    /// `user@host:port` label for log lines and session naming
    pub fn endpoint(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &REDACTED_PASSWORD)
            .field("host_name", &self.host_name)
            .finish()
    }
}
