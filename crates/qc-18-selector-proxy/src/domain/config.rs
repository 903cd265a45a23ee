//! Proxy configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use qc_18_selector_proxy::domain::ProxyConfig;
//!
//! let config = ProxyConfig::default()
//!     .with_self_admin(true)
//!     .with_max_calldata_size(4096);
//! config.validate()?;
//! ```

use crate::domain::admin::AdminPolicy;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable toggling the self-admin path.
pub const ENV_ALLOW_SELF_ADMIN: &str = "QC_PROXY_ALLOW_SELF_ADMIN";

/// Environment variable bounding calldata size.
pub const ENV_MAX_CALLDATA_SIZE: &str = "QC_PROXY_MAX_CALLDATA_SIZE";

/// Upper bound accepted for `max_calldata_size` (16 MB).
pub const CALLDATA_SIZE_CEILING: usize = 16 * 1024 * 1024;

/// Proxy configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Accept the proxy's own address as admin-equivalent. Off by default.
    pub allow_self_admin: bool,
    /// Largest accepted calldata, selector included.
    pub max_calldata_size: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allow_self_admin: false,
            max_calldata_size: 128 * 1024, // 128 KB
        }
    }
}

impl ProxyConfig {
    /// Validate bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_calldata_size < 4 {
            return Err(ConfigError::InvalidValue {
                field: "max_calldata_size",
                reason: "must fit at least a selector (4 bytes)".to_string(),
            });
        }
        if self.max_calldata_size > CALLDATA_SIZE_CEILING {
            return Err(ConfigError::InvalidValue {
                field: "max_calldata_size",
                reason: format!("must not exceed {CALLDATA_SIZE_CEILING} bytes"),
            });
        }
        Ok(())
    }

    /// Builder-style method to toggle the self-admin path
    #[must_use]
    pub fn with_self_admin(mut self, allow: bool) -> Self {
        self.allow_self_admin = allow;
        self
    }

    /// Builder-style method to set the calldata bound
    #[must_use]
    pub fn with_max_calldata_size(mut self, size: usize) -> Self {
        self.max_calldata_size = size;
        self
    }

    /// Authorization policy implied by this configuration.
    #[must_use]
    pub fn admin_policy(&self) -> AdminPolicy {
        if self.allow_self_admin {
            AdminPolicy::AdminOrSelf
        } else {
            AdminPolicy::AdminOnly
        }
    }

    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_ALLOW_SELF_ADMIN) {
            config.allow_self_admin = match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Env {
                        var: ENV_ALLOW_SELF_ADMIN,
                        value: raw,
                    })
                }
            };
        }

        if let Some(raw) = lookup(ENV_MAX_CALLDATA_SIZE) {
            config.max_calldata_size = raw.trim().parse().map_err(|_| ConfigError::Env {
                var: ENV_MAX_CALLDATA_SIZE,
                value: raw.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert!(!config.allow_self_admin);
        assert_eq!(config.admin_policy(), AdminPolicy::AdminOnly);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_self_admin_policy() {
        let config = ProxyConfig::default().with_self_admin(true);
        assert_eq!(config.admin_policy(), AdminPolicy::AdminOrSelf);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(ProxyConfig::default()
            .with_max_calldata_size(3)
            .validate()
            .is_err());
        assert!(ProxyConfig::default()
            .with_max_calldata_size(CALLDATA_SIZE_CEILING + 1)
            .validate()
            .is_err());
        assert!(ProxyConfig::default()
            .with_max_calldata_size(4)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_from_vars() {
        let config = ProxyConfig::from_vars(vars(&[
            (ENV_ALLOW_SELF_ADMIN, "true"),
            (ENV_MAX_CALLDATA_SIZE, "1024"),
        ]))
        .unwrap();
        assert!(config.allow_self_admin);
        assert_eq!(config.max_calldata_size, 1024);

        let config = ProxyConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, ProxyConfig::default());
    }

    #[test]
    fn test_from_vars_rejects_garbage() {
        let err = ProxyConfig::from_vars(vars(&[(ENV_ALLOW_SELF_ADMIN, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { .. }));

        let err = ProxyConfig::from_vars(vars(&[(ENV_MAX_CALLDATA_SIZE, "big")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { .. }));

        let err = ProxyConfig::from_vars(vars(&[(ENV_MAX_CALLDATA_SIZE, "2")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_config_serde() {
        let config = ProxyConfig::default().with_self_admin(true);
        let json = serde_json::to_string(&config).unwrap();
        let back: ProxyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
