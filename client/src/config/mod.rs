//! Configuration management for the Vida FitPro client
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: VF__)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub nutrition: NutritionConfig,
    #[serde(default)]
    pub water: WaterConfig,
}

/// Remote backend gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the managed backend (identity + record storage)
    pub url: String,
    /// Public API key sent with every request
    pub anon_key: String,
}

/// Daily nutrition targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionConfig {
    pub calorie_target: f64,
    pub protein_target_g: f64,
    pub carbs_target_g: f64,
    pub fat_target_g: f64,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            calorie_target: 2200.0,
            protein_target_g: 165.0,
            carbs_target_g: 275.0,
            fat_target_g: 85.0,
        }
    }
}

/// Daily hydration target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterConfig {
    pub target_glasses: u32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self { target_glasses: 8 }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: "development-anon-key".to_string(),
            },
            nutrition: NutritionConfig::default(),
            water: WaterConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with VF__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (VF__ prefix)
            // e.g., VF__GATEWAY__URL=https://api.example.com sets gateway.url
            .add_source(config::Environment::with_prefix("VF").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
