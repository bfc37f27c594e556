//! CCMS monitoring tree access: TID lookup and class-dispatched value
//! retrieval.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::bapi;
use crate::error::Error;
use crate::events::MteRef;
use crate::rfc::{RfcConnection, RfcError, RfcParams, RfcStructure};

/// Closed set of monitoring element classes this poller can read,
/// keyed by the numeric MTCLASS code carried in the TID.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum MteClass {
    Performance,
    Log,
    Status,
    Text,
}

impl FromStr for MteClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "100" => Ok(MteClass::Performance),
            "101" => Ok(MteClass::Log),
            "102" => Ok(MteClass::Status),
            "111" => Ok(MteClass::Text),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for MteClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

type Extractor = fn(&RfcStructure) -> Result<String, RfcError>;

impl MteClass {
    /// The retrieval BAPI and the response field holding the value, per
    /// class. The match is the whole dispatch table.
    pub fn retrieval(self) -> (&'static str, Extractor) {
        match self {
            MteClass::Performance => ("BAPI_SYSTEM_MTE_GETPERFCURVAL", |res| {
                Ok(res.structure("CURRENT_VALUE")?.field("ALRELEVVAL")?.to_string())
            }),
            MteClass::Log => ("BAPI_SYSTEM_MTE_GETMLCURVAL", |res| {
                Ok(res.field("XMI_MSG_EXT")?.to_string())
            }),
            MteClass::Status => ("BAPI_SYSTEM_MTE_GETSMVALUE", |res| {
                Ok(res.field("VALUE")?.to_string())
            }),
            MteClass::Text => ("BAPI_SYSTEM_MTE_GETTXTPROP", |res| {
                Ok(res.structure("PROPERTIES")?.field("TEXT")?.to_string())
            }),
        }
    }
}

pub struct CcmsClient<'a> {
    conn: &'a dyn RfcConnection,
}

impl<'a> CcmsClient<'a> {
    pub fn new(conn: &'a dyn RfcConnection) -> Self {
        CcmsClient { conn }
    }

    /// Resolves an MTE by name to its TID record. The TID is consumed
    /// immediately by the retrieval call and never persisted.
    pub async fn get_tid(
        &self,
        sid: &str,
        mte: &MteRef,
        external_user_name: &str,
    ) -> Result<RfcStructure, Error> {
        let res = self
            .conn
            .call(
                "BAPI_SYSTEM_MTE_GETTIDBYNAME",
                RfcParams::new()
                    .field("SYSTEM_ID", sid)
                    .field("CONTEXT_NAME", &mte.context_name)
                    .field("OBJECT_NAME", &mte.object_name)
                    .field("MTE_NAME", &mte.mte_name)
                    .field("EXTERNAL_USER_NAME", external_user_name),
            )
            .await?;
        bapi::check_return("BAPI_SYSTEM_MTE_GETTIDBYNAME", &res)?;
        Ok(res.structure("TID")?.clone())
    }

    /// Fetches the current value of an MTE: TID lookup, then exactly one
    /// class-dispatched retrieval call with the whole TID passed back.
    pub async fn get_current_value(
        &self,
        sid: &str,
        mte: &MteRef,
        external_user_name: &str,
    ) -> Result<String, Error> {
        let tid = self.get_tid(sid, mte, external_user_name).await?;
        let class_code = tid.field("MTCLASS")?;
        let class = class_code
            .parse::<MteClass>()
            .map_err(Error::UnsupportedMteClass)?;

        let (function, extract) = class.retrieval();
        debug!(%class, function, mte = %mte, "dispatching value retrieval");
        let res = self
            .conn
            .call(
                function,
                RfcParams::new()
                    .field("EXTERNAL_USER_NAME", external_user_name)
                    .structure("TID", tid),
            )
            .await?;
        bapi::check_return(function, &res)?;
        Ok(extract(&res)?)
    }
}
