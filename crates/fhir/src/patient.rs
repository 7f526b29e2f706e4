//! FHIR Patient wire model and translation helpers.
//!
//! Responsibilities:
//! - Define the JSON wire model for the Patient resource shape PRX consumes
//! - Translate between the wire model and the canonical [`PatientRecord`]
//! - Surface the failing field path on schema mismatches
//!
//! Parsing is lenient by design: real FHIR resources carry many keys this
//! model does not consume (`resourceType`, `meta`, extensions), so unknown
//! keys are ignored rather than rejected, and every field is optional. The
//! minimal payload `{"id":"456"}` is a valid patient.

use crate::{FhirError, FhirResult};
use prx_types::{Address, HumanName, PatientRecord};
use serde::{Deserialize, Serialize};

/// Patient resource operations.
///
/// Zero-sized namespace for the parse/render pair. All methods are
/// associated functions; no state is held between calls.
pub struct Patient;

impl Patient {
    /// Parse a FHIR Patient JSON document into the canonical pivot model.
    ///
    /// Uses `serde_path_to_error` so a mismatch reports a best-effort path
    /// (e.g. `name[0].family`) to the failing field.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Schema`] if the bytes are not valid JSON or any
    /// field has an unexpected type.
    pub fn parse(json: &[u8]) -> FhirResult<PatientRecord> {
        let mut deserializer = serde_json::Deserializer::from_slice(json);

        let wire: PatientWire = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| {
                let path = err.path().to_string();
                FhirError::Schema {
                    path: if path.is_empty() || path == "." {
                        "<root>".to_string()
                    } else {
                        path
                    },
                    source: err.into_inner(),
                }
            })?;

        Ok(wire_to_domain(wire))
    }

    /// Render the canonical pivot model as FHIR Patient JSON bytes.
    ///
    /// All name and address entries are rendered; the first-entry rule is a
    /// property of the HL7 codecs, not of the FHIR shape.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Serialise`] if serialisation fails.
    pub fn render(record: &PatientRecord) -> FhirResult<Vec<u8>> {
        let wire = domain_to_wire(record);
        serde_json::to_vec(&wire).map_err(FhirError::Serialise)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

/// Wire representation of the Patient resource shape.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
struct PatientWire {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<NameWire>,

    #[serde(default, rename = "birthDate", skip_serializing_if = "String::is_empty")]
    pub birth_date: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gender: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address: Vec<AddressWire>,
}

/// Wire representation of a human name entry.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
struct NameWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub family: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
}

/// Wire representation of an address entry.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
struct AddressWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,

    #[serde(default, rename = "postalCode", skip_serializing_if = "String::is_empty")]
    pub postal_code: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: PatientWire) -> PatientRecord {
    PatientRecord {
        id: wire.id,
        names: wire
            .name
            .into_iter()
            .map(|n| HumanName {
                family: n.family,
                given: n.given,
            })
            .collect(),
        birth_date: wire.birth_date,
        gender: wire.gender,
        addresses: wire
            .address
            .into_iter()
            .map(|a| Address {
                lines: a.line,
                city: a.city,
                state: a.state,
                postal_code: a.postal_code,
                country: a.country,
            })
            .collect(),
    }
}

fn domain_to_wire(record: &PatientRecord) -> PatientWire {
    PatientWire {
        id: record.id.clone(),
        name: record
            .names
            .iter()
            .map(|n| NameWire {
                family: n.family.clone(),
                given: n.given.clone(),
            })
            .collect(),
        birth_date: record.birth_date.clone(),
        gender: record.gender.clone(),
        address: record
            .addresses
            .iter()
            .map(|a| AddressWire {
                line: a.lines.clone(),
                city: a.city.clone(),
                state: a.state.clone(),
                postal_code: a.postal_code.clone(),
                country: a.country.clone(),
            })
            .collect(),
    }
}
