use serde::Deserialize;
use std::{error::Error, fs};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommonConfig {
    pub project_name: String,
    pub database_url: String,
    #[serde(default)]
    pub apply_schema: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub server_address: String,
    pub log_level: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            server_address: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Order pricing knobs. Amounts are whole naira, the tax rate is in basis points.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingConfig {
    pub currency: String,
    pub tax_rate_bps: u32,
    pub free_shipping_threshold: u64,
    pub flat_shipping_fee: u64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: "NGN".to_string(),
            tax_rate_bps: 750,
            free_shipping_threshold: 50_000,
            flat_shipping_fee: 2_500,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    #[serde(default)]
    pub secret_key: String,
    pub callback_url: String,
    #[serde(default = "default_payment_timeout")]
    pub timeout_secs: u64,
}

fn default_payment_timeout() -> u64 {
    15
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.paystack.co".to_string(),
            secret_key: String::new(),
            callback_url: "http://localhost:3000/checkout/callback".to_string(),
            timeout_secs: default_payment_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub identity_header: String,
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_header: "x-user-email".to_string(),
            admin_emails: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub common: CommonConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let contents = fs::read_to_string(config_path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let config = serde_yml::from_str(contents)?;
        Ok(config)
    }

    /// Secrets and deployment specific values may come from the environment
    /// instead of the composed config file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.common.database_url = url;
        }
        if let Some(address) = lookup("SERVER_ADDRESS") {
            self.backend.server_address = address;
        }
        if let Some(key) = lookup("PAYSTACK_SECRET_KEY") {
            self.payment.secret_key = key;
        }
        if let Some(base_url) = lookup("PAYSTACK_BASE_URL") {
            self.payment.base_url = base_url;
        }
        if let Some(emails) = lookup("ADMIN_EMAILS") {
            self.auth.admin_emails = emails
                .split(',')
                .map(str::trim)
                .filter(|email| !email.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
}
