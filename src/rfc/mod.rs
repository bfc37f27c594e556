//! Transport seam for SAP RFC calls.
//!
//! The handler only ever talks to [`RfcConnector`]/[`RfcConnection`] trait
//! objects; the shipped implementation lives in [`soap`], tests substitute
//! fakes.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::secrets::SapCredential;

pub mod soap;

#[derive(thiserror::Error, Debug)]
pub enum RfcError {
    #[error("failed to connect to SAP application server - {0}")]
    Connect(String),
    #[error("RFC transport error - {0}")]
    Transport(String),
    #[error("RFC call timed out - {0}")]
    Timeout(String),
    #[error("field {0} missing from RFC response")]
    MissingField(String),
    #[error("malformed RFC response - {0}")]
    Malformed(String),
}

/// A single value in an RFC parameter or result record: either a scalar
/// field or a nested structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RfcValue {
    Field(String),
    Structure(RfcStructure),
}

/// A named record of RFC values, as returned by a function module call.
/// Accessors fail fast on missing or mistyped members so malformed
/// responses surface as errors instead of late field-access faults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RfcStructure(BTreeMap<String, RfcValue>);

impl RfcStructure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: RfcValue) {
        self.0.insert(name.into(), value);
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, RfcValue::Field(value.into()));
        self
    }

    pub fn with_structure(mut self, name: impl Into<String>, value: RfcStructure) -> Self {
        self.insert(name, RfcValue::Structure(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&RfcValue> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RfcValue)> {
        self.0.iter()
    }

    /// Scalar field accessor.
    pub fn field(&self, name: &str) -> Result<&str, RfcError> {
        match self.0.get(name) {
            Some(RfcValue::Field(v)) => Ok(v),
            Some(RfcValue::Structure(_)) => Err(RfcError::Malformed(format!(
                "{} is a structure, expected a scalar field",
                name
            ))),
            None => Err(RfcError::MissingField(name.to_string())),
        }
    }

    pub fn opt_field(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(RfcValue::Field(v)) => Some(v),
            _ => None,
        }
    }

    /// Nested structure accessor.
    pub fn structure(&self, name: &str) -> Result<&RfcStructure, RfcError> {
        match self.0.get(name) {
            Some(RfcValue::Structure(s)) => Ok(s),
            Some(RfcValue::Field(_)) => Err(RfcError::Malformed(format!(
                "{} is a scalar field, expected a structure",
                name
            ))),
            None => Err(RfcError::MissingField(name.to_string())),
        }
    }
}

/// Ordered named parameters for one RFC call.
#[derive(Debug, Clone, Default)]
pub struct RfcParams(Vec<(String, RfcValue)>);

impl RfcParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((name.into(), RfcValue::Field(value.into())));
        self
    }

    pub fn structure(mut self, name: impl Into<String>, value: RfcStructure) -> Self {
        self.0.push((name.into(), RfcValue::Structure(value)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&RfcValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, RfcValue)> {
        self.0.iter()
    }
}

/// An established, exclusively-owned session with one SAP application
/// server. Dropped at the end of the invocation; never pooled or shared.
#[async_trait]
pub trait RfcConnection: Send + Sync + std::fmt::Debug {
    async fn call(&self, function: &str, params: RfcParams) -> Result<RfcStructure, RfcError>;
}

/// Opens [`RfcConnection`]s from a credential record.
#[async_trait]
pub trait RfcConnector: Send + Sync {
    async fn connect(&self, credential: &SapCredential)
        -> Result<Box<dyn RfcConnection>, RfcError>;
}

pub type DynRfcConnector = Arc<dyn RfcConnector>;
