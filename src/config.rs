use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::access::Role;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub api_keys: Vec<ApiKeyConfig>,
    pub tenants: Vec<TenantConfig>,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiKeyConfig {
    pub key: String,
    pub name: String,
    pub role: Role,
    pub enabled: bool,
}

/// A company partition in the multi-tenant data model, selected per request
/// via the X-Tenant header.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TenantConfig {
    pub slug: String,
    pub name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PricingConfig {
    #[serde(default = "default_handling_rate")]
    pub handling_rate: f64,
    #[serde(default = "default_urgent_rate")]
    pub urgent_rate: f64,
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: f64,
    #[serde(default)]
    pub max_weight_lbs: Option<f64>,
}

fn default_handling_rate() -> f64 {
    0.15
}

fn default_urgent_rate() -> f64 {
    0.25
}

fn default_exchange_rate() -> f64 {
    320.0
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            handling_rate: default_handling_rate(),
            urgent_rate: default_urgent_rate(),
            exchange_rate: default_exchange_rate(),
            max_weight_lbs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

fn default_database_url() -> String {
    "sqlite:./data/packfy.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "/metrics".to_string(),
        }
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("PACKFY").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    // Validate at least one API key is usable
    if !cfg.api_keys.iter().any(|k| k.enabled) {
        anyhow::bail!("At least one enabled API key must be configured");
    }

    for key in &cfg.api_keys {
        if key.name.is_empty() {
            anyhow::bail!("API key name cannot be empty");
        }
        if key.key.is_empty() {
            anyhow::bail!("API key '{}' has an empty secret", key.name);
        }
    }

    // Validate tenants
    if !cfg.tenants.iter().any(|t| t.enabled) {
        anyhow::bail!("At least one enabled tenant must be configured");
    }

    let mut slugs = HashSet::new();
    for tenant in &cfg.tenants {
        if tenant.slug.is_empty() {
            anyhow::bail!("Tenant slug cannot be empty");
        }
        if !slugs.insert(tenant.slug.as_str()) {
            anyhow::bail!("Duplicate tenant slug: {}", tenant.slug);
        }
    }

    // Validate pricing rates
    if cfg.pricing.handling_rate < 0.0 {
        anyhow::bail!("Handling rate must be non-negative");
    }
    if cfg.pricing.urgent_rate < 0.0 {
        anyhow::bail!("Urgent rate must be non-negative");
    }
    if cfg.pricing.exchange_rate <= 0.0 {
        anyhow::bail!("Exchange rate must be positive");
    }
    if let Some(max) = cfg.pricing.max_weight_lbs {
        if max <= 0.0 {
            anyhow::bail!("Maximum weight must be positive when set");
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn test_validate_config_requires_enabled_api_key() {
        let mut cfg = create_test_config();
        for key in &mut cfg.api_keys {
            key.enabled = false;
        }

        let result = validate_config(&cfg);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("At least one enabled API key"));
    }

    #[test]
    fn test_validate_config_requires_enabled_tenant() {
        let mut cfg = create_test_config();
        cfg.tenants[0].enabled = false;

        let result = validate_config(&cfg);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("At least one enabled tenant"));
    }

    #[test]
    fn test_validate_config_rejects_duplicate_tenant_slugs() {
        let mut cfg = create_test_config();
        cfg.tenants.push(cfg.tenants[0].clone());

        let result = validate_config(&cfg);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Duplicate tenant slug"));
    }

    #[test]
    fn test_validate_config_rejects_negative_rates() {
        let mut cfg = create_test_config();
        cfg.pricing.handling_rate = -0.1;
        assert!(validate_config(&cfg).is_err());

        let mut cfg = create_test_config();
        cfg.pricing.exchange_rate = 0.0;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn test_pricing_defaults() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.handling_rate, 0.15);
        assert_eq!(pricing.urgent_rate, 0.25);
        assert_eq!(pricing.exchange_rate, 320.0);
        assert!(pricing.max_weight_lbs.is_none());
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&create_test_config()).is_ok());
    }

    pub(crate) fn create_test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                log_level: "info".to_string(),
                log_format: "json".to_string(),
            },
            api_keys: vec![
                ApiKeyConfig {
                    key: "pk-owner-001".to_string(),
                    name: "owner".to_string(),
                    role: Role::Owner,
                    enabled: true,
                },
                ApiKeyConfig {
                    key: "pk-miami-001".to_string(),
                    name: "miami-desk".to_string(),
                    role: Role::MiamiOperator,
                    enabled: true,
                },
            ],
            tenants: vec![TenantConfig {
                slug: "miami-express".to_string(),
                name: "Miami Express".to_string(),
                enabled: true,
            }],
            pricing: PricingConfig::default(),
            storage: StorageConfig {
                database_url: "sqlite::memory:".to_string(),
            },
            metrics: MetricsConfig::default(),
        }
    }
}
