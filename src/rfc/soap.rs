//! RFC connector over SAP's ICF SOAP gateway (`/sap/bc/soap/rfc`).
//!
//! Function modules are invoked as SOAP calls against the application
//! server's ICM HTTP port. The RFC wire protocol itself stays on the SAP
//! side; this module only builds request envelopes and reads result
//! records back out of the response XML.

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::StatusCode;
use tracing::debug;

use crate::rfc::{RfcConnection, RfcConnector, RfcError, RfcParams, RfcStructure, RfcValue};
use crate::secrets::SapCredential;

const RFC_NAMESPACE: &str = "urn:sap-com:document:sap:rfc:functions";

/// Function module used to verify the session before any BAPI work.
const PING_FUNCTION: &str = "RFC_PING";

pub struct SoapRfcConnector {
    timeout: Duration,
    endpoint: Option<String>,
}

impl SoapRfcConnector {
    /// `endpoint` overrides the URL derived from the credential's
    /// ashost/sysnr, for systems reached through a gateway or proxy.
    pub fn new(timeout: Duration, endpoint: Option<String>) -> Self {
        SoapRfcConnector { timeout, endpoint }
    }

    fn endpoint_for(&self, credential: &SapCredential) -> String {
        match &self.endpoint {
            Some(url) => url.clone(),
            // ICM serves HTTP on port 80<sysnr> by default.
            None => format!(
                "http://{}:80{}/sap/bc/soap/rfc",
                credential.ashost, credential.sysnr
            ),
        }
    }
}

#[async_trait]
impl RfcConnector for SoapRfcConnector {
    async fn connect(
        &self,
        credential: &SapCredential,
    ) -> Result<Box<dyn RfcConnection>, RfcError> {
        // Cookie store is per-connection so the ICF session context is
        // owned by exactly one invocation.
        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| RfcError::Connect(format!("failed to build HTTP client - {}", e)))?;

        let conn = SoapRfcConnection {
            http,
            endpoint: self.endpoint_for(credential),
            sap_client: credential.client.clone(),
            user: credential.user.clone(),
            passwd: credential.passwd.clone(),
        };
        debug!(
            endpoint = %conn.endpoint,
            sid = %credential.sid,
            trace = %credential.trace_level(),
            "opening RFC session"
        );

        // Session establishment: a failed ping means host unreachable or
        // bad credentials, surfaced as a connect failure.
        conn.call(PING_FUNCTION, RfcParams::new())
            .await
            .map_err(|e| match e {
                RfcError::Connect(m) => RfcError::Connect(m),
                other => RfcError::Connect(other.to_string()),
            })?;

        Ok(Box::new(conn))
    }
}

#[derive(Debug)]
struct SoapRfcConnection {
    http: reqwest::Client,
    endpoint: String,
    sap_client: String,
    user: String,
    passwd: String,
}

#[async_trait]
impl RfcConnection for SoapRfcConnection {
    async fn call(&self, function: &str, params: RfcParams) -> Result<RfcStructure, RfcError> {
        debug!(function, "invoking RFC function");
        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("sap-client", self.sap_client.as_str())])
            .basic_auth(&self.user, Some(&self.passwd))
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", "")
            .body(build_envelope(function, &params))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RfcError::Timeout(format!("{} - {}", function, e))
                } else if e.is_connect() {
                    RfcError::Connect(format!("{} - {}", function, e))
                } else {
                    RfcError::Transport(format!("{} - {}", function, e))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RfcError::Transport(format!("{} - {}", function, e)))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RfcError::Connect(format!(
                "authentication failed for {} - HTTP {}",
                function, status
            )));
        }
        if !status.is_success() {
            // SOAP faults come back as HTTP 500 with a Fault body.
            return match parse_response(function, &text) {
                Err(e @ RfcError::Transport(_)) => Err(e),
                _ => Err(RfcError::Transport(format!(
                    "{} failed - HTTP {}",
                    function, status
                ))),
            };
        }

        parse_response(function, &text)
    }
}

fn build_envelope(function: &str, params: &RfcParams) -> String {
    let mut body = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    body.push_str(
        r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/"><SOAP-ENV:Body>"#,
    );
    body.push_str(&format!(r#"<urn:{} xmlns:urn="{}">"#, function, RFC_NAMESPACE));
    for (name, value) in params.iter() {
        write_value(&mut body, name, value);
    }
    body.push_str(&format!("</urn:{}>", function));
    body.push_str("</SOAP-ENV:Body></SOAP-ENV:Envelope>");
    body
}

fn write_value(out: &mut String, name: &str, value: &RfcValue) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    match value {
        RfcValue::Field(v) => out.push_str(&escape(v.as_str())),
        RfcValue::Structure(s) => {
            for (n, v) in s.iter() {
                write_value(out, n, v);
            }
        }
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Extracts the function result record from a SOAP response body.
fn parse_response(function: &str, xml: &str) -> Result<RfcStructure, RfcError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    loop {
        match reader
            .read_event()
            .map_err(|e| RfcError::Malformed(e.to_string()))?
        {
            Event::Start(e) => {
                let name = local_name(&e);
                match name.as_str() {
                    "Envelope" | "Header" | "Body" => continue,
                    "Fault" => {
                        let fault = match read_value(&mut reader)? {
                            RfcValue::Structure(s) => s,
                            RfcValue::Field(_) => RfcStructure::new(),
                        };
                        let message = fault
                            .opt_field("faultstring")
                            .unwrap_or("SOAP fault")
                            .to_string();
                        return Err(RfcError::Transport(format!(
                            "{} failed - {}",
                            function, message
                        )));
                    }
                    _ if name.ends_with(".Response") => {
                        return match read_value(&mut reader)? {
                            RfcValue::Structure(s) => Ok(s),
                            RfcValue::Field(_) => Ok(RfcStructure::new()),
                        }
                    }
                    _ => {
                        return Err(RfcError::Malformed(format!(
                            "unexpected element {} in response for {}",
                            name, function
                        )))
                    }
                }
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                if matches!(name.as_str(), "Envelope" | "Header" | "Body") {
                    continue;
                }
                if name.ends_with(".Response") {
                    return Ok(RfcStructure::new());
                }
                return Err(RfcError::Malformed(format!(
                    "unexpected element {} in response for {}",
                    name, function
                )));
            }
            Event::Eof => {
                return Err(RfcError::Malformed(format!(
                    "no response payload for {}",
                    function
                )))
            }
            _ => continue,
        }
    }
}

/// Reads the content of the current element up to its closing tag.
/// Elements with child elements become structures, otherwise scalars.
fn read_value(reader: &mut Reader<&[u8]>) -> Result<RfcValue, RfcError> {
    let mut children = RfcStructure::new();
    let mut text = String::new();
    loop {
        match reader
            .read_event()
            .map_err(|e| RfcError::Malformed(e.to_string()))?
        {
            Event::Start(e) => {
                let name = local_name(&e);
                let value = read_value(reader)?;
                children.insert(name, value);
            }
            Event::Empty(e) => {
                children.insert(local_name(&e), RfcValue::Field(String::new()));
            }
            Event::Text(t) => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| RfcError::Malformed(e.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::CData(t) => {
                text.push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Event::End(_) => break,
            Event::Eof => return Err(RfcError::Malformed("unexpected end of document".to_string())),
            _ => continue,
        }
    }
    if children.is_empty() {
        Ok(RfcValue::Field(text))
    } else {
        Ok(RfcValue::Structure(children))
    }
}
