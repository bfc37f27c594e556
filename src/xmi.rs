//! Logon/logoff against SAP's XMI external monitoring interface. CCMS
//! BAPIs are only usable inside an XMI session.

use tracing::debug;

use crate::bapi;
use crate::error::Error;
use crate::rfc::{RfcConnection, RfcParams};

pub const INTERFACE: &str = "XAL";
pub const VERSION: &str = "1.0";

pub async fn logon(
    conn: &dyn RfcConnection,
    company: &str,
    product: &str,
    interface: &str,
    version: &str,
) -> Result<(), Error> {
    debug!(interface, version, "logging on to XMI interface");
    let res = conn
        .call(
            "BAPI_XMI_LOGON",
            RfcParams::new()
                .field("EXTCOMPANY", company)
                .field("EXTPRODUCT", product)
                .field("INTERFACE", interface)
                .field("VERSION", version),
        )
        .await?;
    bapi::check_return("BAPI_XMI_LOGON", &res)
}

pub async fn logoff(conn: &dyn RfcConnection, interface: &str) -> Result<(), Error> {
    debug!(interface, "logging off XMI interface");
    let res = conn
        .call("BAPI_XMI_LOGOFF", RfcParams::new().field("INTERFACE", interface))
        .await?;
    bapi::check_return("BAPI_XMI_LOGOFF", &res)
}
