//! Pipeline record envelope.

use std::collections::BTreeMap;

/// One record moving through the hosting pipeline.
///
/// The transcoder treats `position` and `metadata` as opaque: a conversion
/// replaces the payload and carries the rest of the envelope over
/// untouched, so the host can still correlate each output with its source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    /// Opaque position token assigned by the source connector.
    pub position: Vec<u8>,

    /// Key/value metadata attached by the pipeline.
    pub metadata: BTreeMap<String, String>,

    /// The record payload: wire-format bytes in one of the three supported
    /// representations.
    pub payload: Vec<u8>,
}

impl Record {
    /// Build a record from a payload alone, with an empty envelope.
    pub fn from_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            ..Self::default()
        }
    }
}
