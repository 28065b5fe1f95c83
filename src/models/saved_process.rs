//! Saved Process Model
//!
//! A saved process is a named, reusable command set bound to a host. This is
//! the only shape that touches disk, so its config is redacted by
//! construction: the password field holds a fixed placeholder and nothing
//! else, ever.
//!
//! ## Security Note
//!
//! `RedactedConfig` derives `Serialize`, `ConnectionConfig` deliberately does
//! not. Any new persisted type that references a host must go through
//! `ConnectionConfig::redacted()`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ConnectionConfig;

/// Placeholder stored wherever a credential would otherwise appear
pub const REDACTED_PASSWORD: &str = "********";

/// Persistable connection settings with the credential replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactedConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Always [`REDACTED_PASSWORD`]; kept as a field so old records parse
    pub password: String,
    #[serde(rename = "hostName")]
    pub host_name: String,
}

/// A named, reusable command set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedProcess {
    pub id: String,
    pub name: String,
    #[serde(rename = "redactedConfig")]
    pub config: RedactedConfig,
    pub commands: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl SavedProcess {
    /// Create a new saved process from a live config and a command list.
    /// The config is redacted here; the caller keeps the credential.
    pub fn new(name: impl Into<String>, config: &ConnectionConfig, commands: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            config: config.redacted(),
            commands,
            created_at: Utc::now(),
        }
    }
}
