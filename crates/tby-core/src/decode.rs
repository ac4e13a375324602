//! Configuration decoding: YAML `tunnels` list → [`Tunnels`].
//!
//! Each record is a mapping whose `type` field selects the concrete kind
//! (see [`TunnelKind`]). Decoding is all-or-nothing: the first bad record
//! fails the whole document, unless [`RecordPolicy::Skip`] is chosen, in
//! which case records that are not mappings or carry an unknown `type` are
//! dropped with a warning.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use strum::Display;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{Forward, Tunnel, TunnelKind, Tunnels};

/// What to do with records that cannot be matched to a tunnel kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordPolicy {
    /// Fail the whole decode.
    #[default]
    Fail,
    /// Drop the record and keep going.
    Skip,
}

/// Top-level document, with tunnel records still untyped.
#[derive(Debug, Default, Deserialize)]
pub struct Document {
    #[serde(default)]
    tunnels: Option<Vec<Value>>,
    #[serde(skip)]
    blank: bool,
}

impl Document {
    /// Parse the document structure without decoding the tunnel records.
    ///
    /// An empty document, a missing `tunnels` key and `tunnels: null` all
    /// yield an empty record list.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        if text.trim().is_empty() {
            return Ok(Self::blank());
        }
        let value: Value = serde_yaml::from_str(text)?;
        if value.is_null() {
            return Ok(Self::blank());
        }
        Ok(serde_yaml::from_value(value)?)
    }

    fn blank() -> Self {
        Self {
            tunnels: None,
            blank: true,
        }
    }

    /// True for an empty (or null) document, which has no keys at all.
    pub fn is_blank(&self) -> bool {
        self.blank
    }

    pub fn decode(self, policy: RecordPolicy) -> Result<Tunnels, CoreError> {
        decode_records(self.tunnels.unwrap_or_default(), policy)
    }
}

/// Parse and decode a whole configuration document.
pub fn decode(text: &str, policy: RecordPolicy) -> Result<Tunnels, CoreError> {
    Document::parse(text)?.decode(policy)
}

/// Decode untyped records in declaration order.
pub fn decode_records(records: Vec<Value>, policy: RecordPolicy) -> Result<Tunnels, CoreError> {
    let mut tunnels = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        match decode_record(index, record) {
            Ok(tunnel) => {
                debug!(index, name = %tunnel.name(), kind = %tunnel.kind(), "decoded tunnel");
                tunnels.push(tunnel);
            }
            Err(err) if policy == RecordPolicy::Skip && err.is_skippable_record() => {
                warn!(index, error = %err, "skipping tunnel record");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(Tunnels::new(tunnels))
}

/// Decode a single record found at `index`.
pub fn decode_record(index: usize, record: Value) -> Result<Tunnel, CoreError> {
    if !record.is_mapping() {
        return Err(CoreError::NotAMapping { index });
    }

    let kind = match record.get("type") {
        Some(Value::String(raw)) => {
            raw.parse::<TunnelKind>()
                .map_err(|_| CoreError::InvalidTunnelType {
                    index,
                    found: raw.clone(),
                })?
        }
        Some(other) => {
            return Err(CoreError::InvalidTunnelType {
                index,
                found: format!("{other:?}"),
            });
        }
        None => {
            return Err(CoreError::InvalidTunnelType {
                index,
                found: "<missing>".into(),
            });
        }
    };

    let tunnel = kind
        .decode(record)
        .map_err(|source| CoreError::InvalidRecord { index, source })?;

    if tunnel.remote_port() == 0 {
        return Err(CoreError::MissingPort {
            index,
            field: "remote_port",
        });
    }
    if tunnel.local_port() == 0 {
        return Err(CoreError::MissingPort {
            index,
            field: "local_port",
        });
    }

    Ok(tunnel)
}
