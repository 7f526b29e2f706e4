//! Transcoder configuration.
//!
//! Configuration is resolved once, before any record is processed: the two
//! format strings supplied by the hosting pipeline are parsed and checked
//! against the conversion allow-list here, so a misconfigured pair is
//! rejected up front rather than per record. The resolved
//! [`ConversionPath`] is then handed to the batch transcoder; nothing
//! re-reads configuration while records flow.

use crate::router::ConversionPath;
use crate::{TranscodeError, TranscodeResult};
use std::fmt;
use std::str::FromStr;

/// A wire format the transcoder can read or write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// FHIR Patient JSON resource.
    Fhir,
    /// HL7 v2 pipe-delimited message (configured as `hl7`).
    Hl7v2,
    /// HL7 v3 XML patient document.
    Hl7v3,
}

impl FromStr for Format {
    type Err = TranscodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fhir" => Ok(Format::Fhir),
            "hl7" => Ok(Format::Hl7v2),
            "hl7v3" => Ok(Format::Hl7v3),
            other => Err(TranscodeError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Fhir => "fhir",
            Format::Hl7v2 => "hl7",
            Format::Hl7v3 => "hl7v3",
        };
        write!(f, "{name}")
    }
}

/// Validated transcoder configuration.
#[derive(Clone, Copy, Debug)]
pub struct TranscoderConfig {
    path: ConversionPath,
}

impl TranscoderConfig {
    /// Parse and validate an input/output format pair.
    ///
    /// # Errors
    ///
    /// Returns [`TranscodeError::UnknownFormat`] for a format string outside
    /// `{fhir, hl7, hl7v3}` and [`TranscodeError::UnsupportedConversion`]
    /// for a pair outside the allow-list.
    pub fn new(input_type: &str, output_type: &str) -> TranscodeResult<Self> {
        let input = input_type.parse()?;
        let output = output_type.parse()?;
        let path = ConversionPath::resolve(input, output)?;
        Ok(Self { path })
    }

    /// The conversion path this configuration resolved to.
    pub fn path(&self) -> ConversionPath {
        self.path
    }
}
