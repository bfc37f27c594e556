//! Error taxonomy for one poll invocation. Everything here is logged and
//! swallowed at the handler boundary; nothing propagates to the Lambda
//! runtime.

use crate::rfc::RfcError;
use crate::secrets::SecretError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Secret missing or malformed. Fatal before any SAP work happens.
    #[error("configuration error - {0}")]
    Configuration(#[from] SecretError),

    /// The RFC session could not be established or the transport failed.
    #[error("connection error - {0}")]
    Connection(RfcError),

    /// A SAP-side call returned an error-type status.
    #[error("BAPI error in {function} - {message}")]
    Bapi { function: String, message: String },

    /// The MTE resolved to a class code outside the known four.
    #[error("unsupported MTE class {0}")]
    UnsupportedMteClass(String),

    /// A call succeeded but the response record was missing expected
    /// fields.
    #[error("malformed BAPI response - {0}")]
    MalformedResponse(RfcError),
}

impl From<RfcError> for Error {
    fn from(e: RfcError) -> Self {
        match e {
            RfcError::Connect(_) | RfcError::Transport(_) | RfcError::Timeout(_) => {
                Error::Connection(e)
            }
            RfcError::MissingField(_) | RfcError::Malformed(_) => Error::MalformedResponse(e),
        }
    }
}
