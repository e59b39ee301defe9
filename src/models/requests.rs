//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::error::{CacheError, Result};

/// Request body for the PUT operation (PUT /put)
///
/// Length limits are enforced by the cache itself; this only checks shape.
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: String,
}

impl PutRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }
}

/// Query string for key-addressed operations (`?key=...`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyQuery {
    #[serde(default)]
    pub key: Option<String>,
}

impl KeyQuery {
    /// Returns the key, rejecting a missing or empty parameter.
    pub fn require_key(self) -> Result<String> {
        match self.key {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(CacheError::InvalidRequest(
                "Key parameter is required".to_string(),
            )),
        }
    }
}
