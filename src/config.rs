use std::env;
use std::string::String;

/// Default RFC trace level passed to the connector when neither the
/// environment nor the secret specifies one.
pub const DEFAULT_TRACE_LEVEL: &str = "0";

pub struct Config {
    pub ext_company: String,
    pub ext_product: String,
    pub ext_user_name: String,
    pub secret_id: String,
    pub trace_level: String,
    pub rfc_timeout_secs: u64,
    pub rfc_endpoint: Option<String>,
}

impl Config {
    pub fn load_from_env() -> Result<Config, String> {
        let conf = Config {
            ext_company: env::var("EXT_COMPANY")
                .map_err(|e| format!("EXT_COMPANY not set - {}", e))?,
            ext_product: env::var("EXT_PRODUCT")
                .map_err(|e| format!("EXT_PRODUCT not set - {}", e))?,
            ext_user_name: env::var("EXT_USER_NAME")
                .map_err(|e| format!("EXT_USER_NAME not set - {}", e))?,
            secret_id: env::var("SAP_SECRET_ID")
                .map_err(|e| format!("SAP_SECRET_ID not set - {}", e))?,
            trace_level: env::var("TRACE_LEVEL").unwrap_or(DEFAULT_TRACE_LEVEL.to_string()),
            rfc_timeout_secs: env::var("RFC_TIMEOUT_SECS")
                .unwrap_or("30".to_string())
                .parse::<u64>()
                .map_err(|e| format!("Error parsing RFC_TIMEOUT_SECS to u64 - {}", e))?,
            rfc_endpoint: env::var("SAP_RFC_ENDPOINT").ok().filter(|s| !s.trim().is_empty()),
        };

        Ok(conf)
    }
}
