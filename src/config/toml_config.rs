use crate::domain::ports::GatewaySettings;
use crate::utils::error::{PlanError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TIMEOUT_SECONDS: u64 = 300;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanConfig {
    pub gateway: Option<GatewayConfig>,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    #[serde(default = "default_save_path")]
    pub save_path: String,
    #[serde(default = "default_advance_path")]
    pub advance_path: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_separator")]
    pub thousands_separator: char,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            thousands_separator: default_separator(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub verbose: bool,
}

fn default_save_path() -> String {
    "/payments".to_string()
}

fn default_advance_path() -> String {
    "/stage/advance".to_string()
}

fn default_separator() -> char {
    '.'
}

impl PlanConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PlanError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` references such as `${GATEWAY_TOKEN}` with environment
    /// values. Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PlanError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn require_gateway(&self) -> Result<&GatewayConfig> {
        validation::validate_required_field("gateway", &self.gateway)
    }
}

impl GatewayConfig {
    fn validate_config(&self) -> Result<()> {
        validation::validate_url("gateway.base_url", &self.base_url)?;
        validation::validate_endpoint_path("gateway.save_path", &self.save_path)?;
        validation::validate_endpoint_path("gateway.advance_path", &self.advance_path)?;

        if let Some(timeout) = self.timeout_seconds {
            validation::validate_range("gateway.timeout_seconds", timeout, 1, MAX_TIMEOUT_SECONDS)?;
        }

        if let Some(headers) = &self.headers {
            for name in headers.keys() {
                validation::validate_non_empty_string("gateway.headers", name)?;
            }
        }

        Ok(())
    }
}

impl GatewaySettings for GatewayConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn save_path(&self) -> &str {
        &self.save_path
    }

    fn advance_path(&self) -> &str {
        &self.advance_path
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn headers(&self) -> Option<&HashMap<String, String>> {
        self.headers.as_ref()
    }
}

impl Validate for PlanConfig {
    fn validate(&self) -> Result<()> {
        if let Some(gateway) = &self.gateway {
            gateway.validate_config()?;
        }

        if self.display.thousands_separator.is_ascii_digit() {
            return Err(PlanError::InvalidConfigValueError {
                field: "display.thousands_separator".to_string(),
                value: self.display.thousands_separator.to_string(),
                reason: "Separator cannot be a digit".to_string(),
            });
        }

        Ok(())
    }
}
