//! HL7 v3 wire/boundary support.
//!
//! This crate translates between namespaced HL7 v3 patient XML documents and
//! the canonical [`prx_types::PatientRecord`] pivot model.
//!
//! The v3 address shape has no country field, so a round trip through this
//! format always drops `country` from the pivot.

use prx_types::{Address, HumanName, PatientRecord};
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

/// Namespace of the patient document root element.
pub const HL7V3_NAMESPACE: &str = "urn:hl7-org:v3";

const ROOT_ELEMENT: &str = "Patient";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Errors returned by the `hl7v3` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum Hl7v3Error {
    #[error("document is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("malformed XML: {0}")]
    Malformed(#[from] quick_xml::Error),

    #[error("invalid patient document: {0}")]
    InvalidDocument(#[from] quick_xml::DeError),

    #[error("document has no root element")]
    MissingRoot,

    #[error("unexpected root element {0:?} (expected \"Patient\")")]
    UnexpectedRoot(String),

    #[error("failed to serialise patient document: {0}")]
    Serialise(#[from] quick_xml::SeError),

    #[error("patient gender is empty; an administrative gender code is required")]
    EmptyGender,

    #[error("patient gender {0:?} has no administrative gender code")]
    UnmappedGender(String),
}

/// Wire representation of the HL7 v3 patient document.
///
/// Every child element is optional on the way in; missing elements read as
/// empty rather than failing the decode.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PatientDocument {
    #[serde(default, rename = "@xmlns", skip_serializing_if = "String::is_empty")]
    pub xmlns: String,

    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: NameElement,

    #[serde(default, rename = "administrativeGenderCode")]
    pub gender: GenderCodeElement,

    #[serde(default, rename = "birthTime")]
    pub birth_time: TimestampElement,

    #[serde(default)]
    pub addr: AddressElement,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct NameElement {
    #[serde(default)]
    pub given: String,

    #[serde(default)]
    pub family: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct GenderCodeElement {
    #[serde(default)]
    pub code: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct TimestampElement {
    #[serde(default)]
    pub value: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AddressElement {
    #[serde(default, rename = "streetAddressLine")]
    pub street: String,

    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub state: String,

    #[serde(default, rename = "postalCode")]
    pub postal_code: String,
}

/// Map an HL7 v3 administrative gender code to the pivot gender value.
///
/// The bijection covers only `M`, `F` and `U`; any other code maps to the
/// empty string.
pub fn gender_from_code(code: &str) -> &'static str {
    match code {
        "M" => "male",
        "F" => "female",
        "U" => "unknown",
        _ => "",
    }
}

/// Map a pivot gender value to its HL7 v3 administrative gender code.
///
/// Defined only for the three pivot values; anything else is a mapping
/// error rather than a silently emitted code.
fn gender_to_code(gender: &str) -> Result<&'static str, Hl7v3Error> {
    match gender {
        "male" => Ok("M"),
        "female" => Ok("F"),
        "unknown" => Ok("U"),
        "" => Err(Hl7v3Error::EmptyGender),
        other => Err(Hl7v3Error::UnmappedGender(other.to_string())),
    }
}

/// Find the local name of the document's root element.
///
/// The serde deserializer accepts any root element name for plain structs,
/// so the root is checked explicitly before the structural decode.
fn root_element_name(xml: &str) -> Result<String, Hl7v3Error> {
    let mut reader = quick_xml::Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(start) | Event::Empty(start) => {
                return Ok(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
            }
            Event::Eof => return Err(Hl7v3Error::MissingRoot),
            _ => {}
        }
    }
}

/// Decode an HL7 v3 patient XML document.
///
/// # Errors
///
/// Fails on invalid UTF-8, malformed XML, or a root element other than
/// `Patient`. Missing child elements are not errors; they read as empty.
pub fn read_patient_xml(xml: &[u8]) -> Result<PatientDocument, Hl7v3Error> {
    let text = std::str::from_utf8(xml)?;

    let root = root_element_name(text)?;
    if root != ROOT_ELEMENT {
        return Err(Hl7v3Error::UnexpectedRoot(root));
    }

    Ok(quick_xml::de::from_str(text)?)
}

/// Render the canonical pivot model as an HL7 v3 patient XML document.
///
/// Only the first name and first address entries are rendered, and the
/// pivot's `country` has no target element. The birth date is compacted to
/// the v3 timestamp form (`YYYYMMDD` plus a `000000` time-of-day).
///
/// # Errors
///
/// Returns [`Hl7v3Error::EmptyGender`] or [`Hl7v3Error::UnmappedGender`]
/// when the pivot gender cannot be rendered as a gender code.
pub fn write_patient_xml(record: &PatientRecord) -> Result<String, Hl7v3Error> {
    let code = gender_to_code(&record.gender)?;

    let name = record.primary_name();
    let address = record.primary_address();

    let document = PatientDocument {
        xmlns: HL7V3_NAMESPACE.to_string(),
        id: record.id.clone(),
        name: NameElement {
            given: name
                .and_then(|n| n.given.first())
                .cloned()
                .unwrap_or_default(),
            family: name
                .and_then(|n| n.family.first())
                .cloned()
                .unwrap_or_default(),
        },
        gender: GenderCodeElement {
            code: code.to_string(),
        },
        birth_time: TimestampElement {
            value: format!("{}000000", record.birth_date.replace('-', "")),
        },
        addr: AddressElement {
            street: address
                .and_then(|a| a.lines.first())
                .cloned()
                .unwrap_or_default(),
            city: address.map(|a| a.city.clone()).unwrap_or_default(),
            state: address.map(|a| a.state.clone()).unwrap_or_default(),
            postal_code: address.map(|a| a.postal_code.clone()).unwrap_or_default(),
        },
    };

    let body = quick_xml::se::to_string_with_root(ROOT_ELEMENT, &document)?;
    Ok(format!("{XML_DECLARATION}\n{body}"))
}

/// Reformat a v3 birth timestamp (`YYYYMMDD...`) to the pivot's
/// `YYYY-MM-DD`. Values shorter than eight characters yield an empty date;
/// anything beyond the date portion (the time of day) is discarded.
fn reformat_birth_time(value: &str) -> String {
    match (value.get(0..4), value.get(4..6), value.get(6..8)) {
        (Some(year), Some(month), Some(day)) => format!("{year}-{month}-{day}"),
        _ => String::new(),
    }
}

impl PatientDocument {
    /// Convert the decoded document into the canonical pivot model.
    ///
    /// Unknown gender codes and short birth timestamps degrade to empty
    /// pivot fields; nothing in this direction fails.
    pub fn into_patient(self) -> PatientRecord {
        let mut names = Vec::new();
        let mut name = HumanName::default();
        if !self.name.family.is_empty() {
            name.family.push(self.name.family);
        }
        if !self.name.given.is_empty() {
            name.given.push(self.name.given);
        }
        if !name.family.is_empty() || !name.given.is_empty() {
            names.push(name);
        }

        let mut addresses = Vec::new();
        let addr = self.addr;
        let has_address = !addr.street.is_empty()
            || !addr.city.is_empty()
            || !addr.state.is_empty()
            || !addr.postal_code.is_empty();
        if has_address {
            let lines = if addr.street.is_empty() {
                Vec::new()
            } else {
                vec![addr.street]
            };
            addresses.push(Address {
                lines,
                city: addr.city,
                state: addr.state,
                postal_code: addr.postal_code,
                country: String::new(),
            });
        }

        PatientRecord {
            id: self.id,
            names,
            birth_date: reformat_birth_time(&self.birth_time.value),
            gender: gender_from_code(&self.gender.code).to_string(),
            addresses,
        }
    }
}
