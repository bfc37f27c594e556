use std::fmt;

use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueError;
use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;

use crate::config;

/// Connection parameters for one SAP application server, stored as a JSON
/// secret. `sid` is required; older secrets that relied on a hardcoded
/// system id must be migrated before use. `trace` is optional and falls
/// back to the environment-configured level.
#[derive(Clone, Deserialize)]
pub struct SapCredential {
    pub sid: String,
    pub ashost: String,
    pub sysnr: String,
    pub client: String,
    pub user: String,
    pub passwd: String,
    #[serde(default)]
    pub trace: Option<String>,
}

impl SapCredential {
    /// Fills in the RFC trace level when the secret does not carry one.
    pub fn with_trace_fallback(mut self, trace_level: &str) -> Self {
        if self.trace.is_none() {
            self.trace = Some(trace_level.to_string());
        }
        self
    }

    pub fn trace_level(&self) -> &str {
        self.trace.as_deref().unwrap_or(config::DEFAULT_TRACE_LEVEL)
    }
}

impl fmt::Debug for SapCredential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SapCredential")
            .field("sid", &self.sid)
            .field("ashost", &self.ashost)
            .field("sysnr", &self.sysnr)
            .field("client", &self.client)
            .field("user", &self.user)
            .field("passwd", &"***")
            .field("trace", &self.trace)
            .finish()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SecretError {
    #[error("Failed to access AWS Secrets Manager. Please make sure the lambda function has permissions to access the {secret_id} secret. Error: {error:?}")]
    FailedToAccessSecretsManager {
        secret_id: String,
        error: GetSecretValueError,
    },
    #[error("Didn't find the {secret_id} secret in AWS secretsmanager")]
    MissingSecret { secret_id: String },
    #[error("Secret {secret_id} is not a valid SAP credential - {error}")]
    MalformedSecret {
        secret_id: String,
        error: serde_json::Error,
    },
}

pub async fn get_sap_credential(
    client: &SecretsClient,
    secret_id: &str,
) -> Result<SapCredential, SecretError> {
    let response = client
        .get_secret_value()
        .set_secret_id(Some(secret_id.to_string()))
        .send()
        .await
        .map_err(|error| SecretError::FailedToAccessSecretsManager {
            secret_id: secret_id.to_string(),
            error: error.into_service_error(),
        })?;
    let secret = response.secret_string.ok_or(SecretError::MissingSecret {
        secret_id: secret_id.to_string(),
    })?;
    serde_json::from_str(&secret).map_err(|error| SecretError::MalformedSecret {
        secret_id: secret_id.to_string(),
        error,
    })
}
