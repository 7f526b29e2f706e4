//! Conversion routing.
//!
//! Every supported conversion is one variant of [`ConversionPath`]: a
//! closed set of (input, output) pairs resolved once at configuration time.
//! Dispatch never re-evaluates format strings: an unsupported pair cannot
//! be represented, so a resolved path is valid by construction.

use crate::config::Format;
use crate::{TranscodeError, TranscodeResult};
use serde::{Deserialize, Serialize};

/// JSON envelope wrapping HL7 v2 text when it travels as a JSON payload.
#[derive(Debug, Deserialize, Serialize)]
struct Hl7Envelope {
    hl7: String,
}

/// A permitted (input format, output format) pair.
///
/// `hl7 -> hl7v3` and `hl7v3 -> hl7` would transit the pivot model just as
/// well, but the supported set is deliberately restricted to these four
/// pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversionPath {
    FhirToHl7v2,
    FhirToHl7v3,
    Hl7v2ToFhir,
    Hl7v3ToFhir,
}

impl ConversionPath {
    /// Resolve a format pair against the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`TranscodeError::UnsupportedConversion`] for every pair
    /// outside the allow-list.
    pub fn resolve(input: Format, output: Format) -> TranscodeResult<Self> {
        match (input, output) {
            (Format::Fhir, Format::Hl7v2) => Ok(Self::FhirToHl7v2),
            (Format::Fhir, Format::Hl7v3) => Ok(Self::FhirToHl7v3),
            (Format::Hl7v2, Format::Fhir) => Ok(Self::Hl7v2ToFhir),
            (Format::Hl7v3, Format::Fhir) => Ok(Self::Hl7v3ToFhir),
            (input, output) => Err(TranscodeError::UnsupportedConversion { input, output }),
        }
    }

    /// Apply the conversion to one payload.
    ///
    /// The input is decoded per the path's input format, pivoted through
    /// the canonical patient model, and re-encoded per the output format.
    /// Pure: no logging, no I/O, no state shared between calls.
    pub fn convert(self, payload: &[u8]) -> TranscodeResult<Vec<u8>> {
        match self {
            Self::FhirToHl7v2 => {
                let record = fhir::Patient::parse(payload)?;
                let text = hl7v2::build_message(&record);
                wrap_hl7_envelope(text)
            }
            Self::FhirToHl7v3 => {
                let record = fhir::Patient::parse(payload)?;
                Ok(hl7v3::write_patient_xml(&record)?.into_bytes())
            }
            Self::Hl7v2ToFhir => {
                let text = unwrap_hl7_payload(payload)?;
                let record = hl7v2::parse_message(&text)?.into_patient();
                Ok(fhir::Patient::render(&record)?)
            }
            Self::Hl7v3ToFhir => {
                let record = hl7v3::read_patient_xml(payload)?.into_patient();
                Ok(fhir::Patient::render(&record)?)
            }
        }
    }
}

/// Wrap built HL7 v2 text in its JSON envelope (`{"hl7": "<text>"}`).
fn wrap_hl7_envelope(text: String) -> TranscodeResult<Vec<u8>> {
    serde_json::to_vec(&Hl7Envelope { hl7: text }).map_err(TranscodeError::WrapEnvelope)
}

/// Recover HL7 v2 text from an incoming payload.
///
/// A payload beginning with the raw `MSH|` header prefix is unwrapped HL7
/// text; anything else is expected to be the JSON envelope.
fn unwrap_hl7_payload(payload: &[u8]) -> TranscodeResult<String> {
    let text = std::str::from_utf8(payload)?;
    if text.starts_with(hl7v2::MSH_PREFIX) {
        return Ok(text.to_string());
    }

    let envelope: Hl7Envelope =
        serde_json::from_str(text).map_err(TranscodeError::InvalidEnvelope)?;
    Ok(envelope.hl7)
}
