//! Shared BAPI call conventions.

use tracing::error;

use crate::error::Error;
use crate::rfc::RfcStructure;

/// RETURN.TYPE value signalling a failed call.
pub const RETURN_TYPE_ERROR: &str = "E";

/// Inspects the RETURN substructure of a BAPI result. Must pass before
/// any payload field of the result is read.
pub fn check_return(function: &str, res: &RfcStructure) -> Result<(), Error> {
    let ret = res.structure("RETURN")?;
    if ret.field("TYPE")? == RETURN_TYPE_ERROR {
        let message = ret.opt_field("MESSAGE").unwrap_or_default().to_string();
        error!(function, %message, "BAPI returned an error");
        return Err(Error::Bapi {
            function: function.to_string(),
            message,
        });
    }
    Ok(())
}
