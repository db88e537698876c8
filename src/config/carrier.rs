use crate::utils::error::{PortingError, Result};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Operator-supplied carrier configuration: endpoints, both uControl
/// credential scopes, OneVoice signing material and the static port-order
/// metadata attached to every LNP payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    pub ucontrol: UControlConfig,
    pub rate_center: RateCenterConfig,
    pub onevoice: OneVoiceConfig,
    pub port_order: PortOrderMetadata,
    pub http: Option<HttpConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UControlConfig {
    pub base_url: String,
    /// 911-scoped account. Checked first during classification.
    pub emergency: CredentialPair,
    /// Ordinary (non-911) account.
    pub ordinary: CredentialPair,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialPair {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCenterConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneVoiceConfig {
    pub endpoint: String,
    pub application_name: String,
    pub security_id: String,
    pub private_key_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
}

/// End-user/account/address metadata carried on every port-request payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortOrderMetadata {
    pub end_user_name: String,
    pub existing_account_num: String,
    pub local_service_provider: String,
    pub loa_date: NaiveDate,
    pub requested_due_date: NaiveDate,
    pub address: ServiceAddress,
    pub customer: CustomerTag,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceAddress {
    pub street_number: String,
    pub street_name: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerTag {
    pub transaction_id: String,
    pub customer_id: String,
}

impl CarrierConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PortingError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| PortingError::ConfigValidationError {
            field: "carrier_config".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        let seconds = self
            .http
            .as_ref()
            .and_then(|http| http.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);
        Duration::from_secs(seconds)
    }
}

// Credentials are normally referenced as ${VAR} so they never live in the
// file itself. Unset variables are left as-is and caught by validation.
fn substitute_env_vars(content: &str) -> String {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").expect("valid substitution pattern");
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}

impl Validate for CarrierConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("ucontrol.base_url", &self.ucontrol.base_url)?;
        validation::validate_non_empty_string(
            "ucontrol.emergency.username",
            &self.ucontrol.emergency.username,
        )?;
        validation::validate_non_empty_string(
            "ucontrol.emergency.password",
            &self.ucontrol.emergency.password,
        )?;
        validation::validate_non_empty_string(
            "ucontrol.ordinary.username",
            &self.ucontrol.ordinary.username,
        )?;
        validation::validate_non_empty_string(
            "ucontrol.ordinary.password",
            &self.ucontrol.ordinary.password,
        )?;
        validation::validate_url("rate_center.base_url", &self.rate_center.base_url)?;
        validation::validate_url("onevoice.endpoint", &self.onevoice.endpoint)?;
        validation::validate_non_empty_string(
            "onevoice.application_name",
            &self.onevoice.application_name,
        )?;
        validation::validate_non_empty_string("onevoice.security_id", &self.onevoice.security_id)?;
        validation::validate_path("onevoice.private_key_path", &self.onevoice.private_key_path)?;
        validation::validate_non_empty_string(
            "port_order.end_user_name",
            &self.port_order.end_user_name,
        )?;
        validation::validate_non_empty_string(
            "port_order.local_service_provider",
            &self.port_order.local_service_provider,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[ucontrol]
base_url = "https://api.thinktel.ca/rest.svc"

[ucontrol.emergency]
username = "ops-911"
password = "secret-911"

[ucontrol.ordinary]
username = "ops"
password = "secret"

[rate_center]
base_url = "https://localcallingguide.com"

[onevoice]
endpoint = "https://onevoice.example.com/api/v1/orders_lnp/"
application_name = "PortingBatch"
security_id = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee"
private_key_path = "onevoice-certs/private.key"

[port_order]
end_user_name = "Acme Corp"
existing_account_num = "555-111-222"
local_service_provider = "AB12"
loa_date = "2023-09-15"
requested_due_date = "2023-10-10"

[port_order.address]
street_number = "456"
street_name = "Main St"
city = "Montreal"
region = "QC"
postal_code = "H3A1A1"

[port_order.customer]
transaction_id = "trans123"
customer_id = "cust456"

[http]
timeout_seconds = 10
"#;

    #[test]
    fn test_parses_full_config() {
        let config = CarrierConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.ucontrol.emergency.username, "ops-911");
        assert_eq!(config.ucontrol.ordinary.username, "ops");
        assert_eq!(config.onevoice.application_name, "PortingBatch");
        assert_eq!(
            config.port_order.loa_date,
            NaiveDate::from_ymd_opt(2023, 9, 15).unwrap()
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_defaults_when_absent() {
        let trimmed = SAMPLE.replace("[http]\ntimeout_seconds = 10", "");
        let config = CarrierConfig::from_toml_str(&trimmed).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LNP_PORTER_TEST_PASSWORD", "from-env");
        let templated = SAMPLE.replace("secret-911", "${LNP_PORTER_TEST_PASSWORD}");
        let config = CarrierConfig::from_toml_str(&templated).unwrap();
        assert_eq!(config.ucontrol.emergency.password, "from-env");
    }

    #[test]
    fn test_unset_env_var_left_as_placeholder() {
        let templated = SAMPLE.replace("secret-911", "${LNP_PORTER_UNSET_VAR}");
        let config = CarrierConfig::from_toml_str(&templated).unwrap();
        // Left as the raw placeholder; still non-empty, so it parses, but the
        // operator sees the unexpanded value in any auth failure.
        assert_eq!(
            config.ucontrol.emergency.password,
            "${LNP_PORTER_UNSET_VAR}"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let broken = SAMPLE.replace("https://onevoice.example.com/api/v1/orders_lnp/", "not-a-url");
        let config = CarrierConfig::from_toml_str(&broken).unwrap();
        assert!(config.validate().is_err());
    }
}
