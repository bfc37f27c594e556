use std::sync::Arc;
use std::time::Duration;

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use sap_ccms_poller::config::Config;
use sap_ccms_poller::events::MteRef;
use sap_ccms_poller::rfc::soap::SoapRfcConnector;
use sap_ccms_poller::Clients;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    sap_ccms_poller::set_up_logging();

    info!(
        "Initializing {} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::load_from_env()?;
    let aws_config = aws_config::load_defaults(BehaviorVersion::v2023_11_09()).await;
    let connector = Arc::new(SoapRfcConnector::new(
        Duration::from_secs(config.rfc_timeout_secs),
        config.rfc_endpoint.clone(),
    ));
    let clients = Clients::new(&aws_config, connector);

    run(service_fn(|request: LambdaEvent<MteRef>| {
        sap_ccms_poller::function_handler(&clients, &config, request)
    }))
    .await
}
