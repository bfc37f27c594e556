//! Local runner: polls a single MTE through the same handler path as the
//! Lambda entry point, against a directly reachable SAP system.

use std::sync::Arc;
use std::time::Duration;

use aws_config::BehaviorVersion;
use clap::Parser;
use lambda_runtime::{Context, Error, LambdaEvent};
use sap_ccms_poller::config::Config;
use sap_ccms_poller::events::MteRef;
use sap_ccms_poller::rfc::soap::SoapRfcConnector;
use sap_ccms_poller::Clients;

#[derive(Debug, Parser)]
#[command(about = "Poll one CCMS monitoring tree element and log its current value")]
struct Args {
    /// Monitoring context, e.g. vhcalabaci_ABA_00
    #[arg(long)]
    context_name: String,

    /// Monitored object within the context, e.g. Dialog
    #[arg(long)]
    object_name: String,

    /// Element name, e.g. ResponseTimeDialog
    #[arg(long)]
    mte_name: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    sap_ccms_poller::set_up_logging();

    let args = Args::parse();
    let config = Config::load_from_env()?;
    let aws_config = aws_config::load_defaults(BehaviorVersion::v2023_11_09()).await;
    let connector = Arc::new(SoapRfcConnector::new(
        Duration::from_secs(config.rfc_timeout_secs),
        config.rfc_endpoint.clone(),
    ));
    let clients = Clients::new(&aws_config, connector);

    let event = LambdaEvent::new(
        MteRef {
            context_name: args.context_name,
            object_name: args.object_name,
            mte_name: args.mte_name,
        },
        Context::default(),
    );

    sap_ccms_poller::function_handler(&clients, &config, event).await
}
