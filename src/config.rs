//! Service configuration.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. An optional config file (TOML, JSON or YAML)
//! 3. `PAYDESK__SECTION__KEY` environment variables
//!
//! CLI flags in `main.rs` override the result.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use uuid::Uuid;

use crate::engine::EngineConfig;
use crate::ids::UserId;
use crate::stores::{OtpPolicy, WalletSettings};

const ENV_PREFIX: &str = "PAYDESK";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub logging: LoggingConfig,
    pub otp: OtpSettings,
    pub identity: IdentitySettings,
    pub wallet: WalletConfig,
    /// Load demo transfers and employees at startup.
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Prefix every API route is mounted under.
    pub api_prefix: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_prefix: "/api".to_string(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error. `RUST_LOG` takes precedence.
    pub level: String,
    /// json or pretty
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpSettings {
    /// Issue this code for every OTP instead of a random one.
    pub fixed_code: Option<String>,
    pub length: u32,
    pub ttl_secs: i64,
    pub max_attempts: u32,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            fixed_code: Some("123456".to_string()),
            length: 6,
            ttl_secs: 600,
            max_attempts: 5,
        }
    }
}

/// The mock identity every request is attributed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    pub user_id: UserId,
    pub business_id: Uuid,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            user_id: UserId(Uuid::from_u128(0x7b1e_4c2a_9f00_4d1b_8e3a_0000_0000_0001)),
            business_id: Uuid::from_u128(0x7b1e_4c2a_9f00_4d1b_8e3a_0000_0000_0b01),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub currency: String,
    /// Bank hosting the virtual accounts of user wallets.
    pub bank_name: String,
    pub business_bank_name: String,
    pub auto_assign_virtual_account: bool,
    pub checkout_base_url: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        let wallet = WalletSettings::default();
        Self {
            currency: wallet.currency,
            bank_name: wallet.bank_name,
            business_bank_name: wallet.business_bank_name,
            auto_assign_virtual_account: wallet.auto_assign_virtual_account,
            checkout_base_url: EngineConfig::default().checkout_base_url,
        }
    }
}

/// Values stay strings until deserialized, so codes such as `012345`
/// keep their leading zeros; numeric fields are converted on demand.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

impl AppConfig {
    /// Loads configuration from the optional file and the environment.
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        Self::load_with(config_path, environment())
    }

    fn load_with(config_path: Option<&str>, env: config::Environment) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }
        builder = builder.add_source(env);
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            otp: OtpPolicy {
                fixed_code: self.otp.fixed_code.clone().filter(|code| !code.is_empty()),
                length: self.otp.length,
                ttl: chrono::Duration::seconds(self.otp.ttl_secs),
                max_attempts: self.otp.max_attempts,
            },
            wallet: WalletSettings {
                currency: self.wallet.currency.clone(),
                bank_name: self.wallet.bank_name.clone(),
                business_bank_name: self.wallet.business_bank_name.clone(),
                auto_assign_virtual_account: self.wallet.auto_assign_virtual_account,
            },
            checkout_base_url: self.wallet.checkout_base_url.trim_end_matches('/').to_string(),
        }
    }
}
