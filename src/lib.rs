use aws_config::SdkConfig;
use aws_sdk_secretsmanager::Client as SecretsClient;
use lambda_runtime::{Error as LambdaError, LambdaEvent};
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::ccms::CcmsClient;
use crate::config::Config;
use crate::error::Error;
use crate::events::MteRef;
use crate::rfc::{DynRfcConnector, RfcConnection};
use crate::secrets::SapCredential;

pub mod bapi;
pub mod ccms;
pub mod config;
pub mod error;
pub mod events;
pub mod rfc;
pub mod secrets;
pub mod xmi;

pub fn set_up_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

/// Per-process collaborators: the secret store client and the RFC
/// connector. Connections themselves are opened fresh per invocation.
#[derive(Clone)]
pub struct Clients {
    pub secrets: SecretsClient,
    pub connector: DynRfcConnector,
}

impl Clients {
    pub fn new(sdk_config: &SdkConfig, connector: DynRfcConnector) -> Self {
        Clients {
            secrets: SecretsClient::new(sdk_config),
            connector,
        }
    }
}

/// Lambda handler. Polls one MTE and logs the outcome. Domain failures
/// are logged and swallowed so a bad MTE or a transient SAP error never
/// fails the invocation.
pub async fn function_handler(
    clients: &Clients,
    config: &Config,
    evt: LambdaEvent<MteRef>,
) -> Result<(), LambdaError> {
    let mte = evt.payload;
    info!(mte = %mte, "handling CCMS poll invocation");

    if let Err(e) = poll_mte(clients, config, &mte).await {
        error!(mte = %mte, error = %e, "failed to retrieve MTE value");
    }

    info!(mte = %mte, "invocation complete");
    Ok(())
}

async fn poll_mte(clients: &Clients, config: &Config, mte: &MteRef) -> Result<(), Error> {
    let credential = secrets::get_sap_credential(&clients.secrets, &config.secret_id)
        .await?
        .with_trace_fallback(&config.trace_level);
    let conn = clients.connector.connect(&credential).await?;

    let outcome = run_xmi_session(conn.as_ref(), config, &credential, mte).await;

    // One logoff per established connection, on every exit path. Its own
    // failure must not mask the primary error.
    if let Err(e) = xmi::logoff(conn.as_ref(), xmi::INTERFACE).await {
        warn!(error = %e, "XMI logoff failed");
    }

    let value = outcome?;
    info!(mte = %mte, value = %value, "current MTE value");
    Ok(())
}

async fn run_xmi_session(
    conn: &dyn RfcConnection,
    config: &Config,
    credential: &SapCredential,
    mte: &MteRef,
) -> Result<String, Error> {
    xmi::logon(
        conn,
        &config.ext_company,
        &config.ext_product,
        xmi::INTERFACE,
        xmi::VERSION,
    )
    .await?;

    CcmsClient::new(conn)
        .get_current_value(&credential.sid, mte, &config.ext_user_name)
        .await
}
