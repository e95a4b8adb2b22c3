//! Node configuration: TOML file plus environment-variable overrides.
//!
//! Bootstrap values (house policy, VRF public key, API settings) come from
//! here; after bootstrap the house policy and VRF key are mutated through
//! the admin entry points, not by re-reading the file.

use crate::errors::ConfigError;
use crate::vrf::PUBLIC_KEY_LENGTH;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Top-level node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub house: HouseSettings,
    #[serde(default)]
    pub vrf: VrfSettings,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            house: HouseSettings::default(),
            vrf: VrfSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub listen_address: String,
    pub port: u16,
    /// Bearer token required on /admin routes.
    pub admin_token: String,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0".to_string(),
            port: 8080,
            admin_token: "change-me".to_string(),
            cors_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseSettings {
    pub treasury: String,
    /// Reserve seeded at bootstrap, in smallest currency units.
    pub initial_balance: u64,
    /// Win fee in basis points. Deliberately not clamped to 10_000.
    pub fee_bp: u64,
    pub min_stake: u64,
    pub max_stake: u64,
}

impl Default for HouseSettings {
    fn default() -> Self {
        Self {
            treasury: "house-treasury".to_string(),
            initial_balance: 1_000_000,
            fee_bp: 200,
            min_stake: 100,
            max_stake: 50_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VrfSettings {
    /// Hex-encoded sr25519 public key the oracle's proofs must verify under.
    pub public_key: String,
}

impl Default for VrfSettings {
    fn default() -> Self {
        Self {
            public_key: String::new(),
        }
    }
}

impl VrfSettings {
    pub fn decode_public_key(&self) -> Result<[u8; PUBLIC_KEY_LENGTH], ConfigError> {
        decode_public_key(&self.public_key)
    }
}

/// Parse a hex VRF public key into its fixed-size byte form.
pub fn decode_public_key(hex_key: &str) -> Result<[u8; PUBLIC_KEY_LENGTH], ConfigError> {
    let bytes = hex::decode(hex_key).map_err(|e| ConfigError::InvalidValue {
        field: "vrf.public_key".to_string(),
        value: hex_key.to_string(),
        reason: format!("not valid hex: {}", e),
    })?;
    bytes
        .try_into()
        .map_err(|_| ConfigError::InvalidValue {
            field: "vrf.public_key".to_string(),
            value: hex_key.to_string(),
            reason: format!("must be {} bytes", PUBLIC_KEY_LENGTH),
        })
}

/// Configuration loader with environment variable support.
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables.
    pub fn load(&self) -> Result<NodeConfig, ConfigError> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            NodeConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> Result<NodeConfig, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to parse TOML: {}", e)))
    }

    fn apply_env_overrides(&self, config: &mut NodeConfig) -> Result<(), ConfigError> {
        if let Ok(addr) = env::var("DICEHOUSE_API_ADDRESS") {
            config.api.listen_address = addr;
        }
        if let Ok(port) = env::var("DICEHOUSE_API_PORT") {
            config.api.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "DICEHOUSE_API_PORT".to_string(),
                value: port,
                reason: "invalid port number".to_string(),
            })?;
        }
        if let Ok(token) = env::var("DICEHOUSE_ADMIN_TOKEN") {
            config.api.admin_token = token;
        }
        if let Ok(treasury) = env::var("DICEHOUSE_TREASURY") {
            config.house.treasury = treasury;
        }
        if let Ok(key) = env::var("DICEHOUSE_VRF_PUBLIC_KEY") {
            config.vrf.public_key = key;
        }

        Ok(())
    }

    /// Validate the final configuration.
    ///
    /// `house.fee_bp` is left unchecked on purpose; see DESIGN.md.
    pub fn validate(&self, config: &NodeConfig) -> Result<(), ConfigError> {
        if config.api.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.port".to_string(),
                value: "0".to_string(),
                reason: "port cannot be zero".to_string(),
            });
        }
        if config.api.admin_token.is_empty() {
            return Err(ConfigError::MissingRequired("api.admin_token".to_string()));
        }
        if config.house.treasury.is_empty() {
            return Err(ConfigError::MissingRequired("house.treasury".to_string()));
        }
        if config.house.min_stake > config.house.max_stake {
            return Err(ConfigError::InvalidValue {
                field: "house.min_stake".to_string(),
                value: config.house.min_stake.to_string(),
                reason: "min_stake exceeds max_stake".to_string(),
            });
        }
        if config.vrf.public_key.is_empty() {
            return Err(ConfigError::MissingRequired("vrf.public_key".to_string()));
        }
        config.vrf.decode_public_key()?;

        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, config: &NodeConfig, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)
            .map_err(|e| ConfigError::SaveFailed(format!("failed to serialize config: {}", e)))?;

        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::SaveFailed(format!("failed to write {}: {}", path, e)))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a sample configuration file at `path`.
pub fn generate_sample_config(path: &str) -> Result<(), ConfigError> {
    let config = NodeConfig::default();
    ConfigLoader::new().save(&config, path)
}
