//! # PRX Core
//!
//! Conversion routing and batch transcoding for the patient record
//! transcoder. This crate decides which conversions are permitted, drives
//! the boundary crates (`fhir`, `hl7v2`, `hl7v3`) through the canonical
//! pivot model, and applies a configured conversion to whole batches of
//! pipeline records.
//!
//! **No host concerns**: accepting configuration from the pipeline,
//! logging, and persistence of transcoded output belong to the caller. All
//! conversion functions here are pure: bytes in, bytes or error out.

pub mod config;
pub mod record;
pub mod router;
pub mod transcoder;

pub use config::{Format, TranscoderConfig};
pub use record::Record;
pub use router::ConversionPath;
pub use transcoder::BatchTranscoder;

use fhir::FhirError;
use hl7v2::Hl7v2Error;
use hl7v3::Hl7v3Error;

/// Errors produced while configuring or applying a conversion.
///
/// Boundary-crate errors fold in transparently so their messages survive
/// unchanged; [`TranscodeError::kind`] classifies every variant into the
/// three-way taxonomy the hosting pipeline reports on.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("unknown format type {0:?} (expected fhir, hl7 or hl7v3)")]
    UnknownFormat(String),

    #[error("unsupported conversion: {input} -> {output}")]
    UnsupportedConversion { input: Format, output: Format },

    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("invalid HL7 envelope: {0}")]
    InvalidEnvelope(#[source] serde_json::Error),

    #[error("failed to serialise HL7 envelope: {0}")]
    WrapEnvelope(#[source] serde_json::Error),

    #[error(transparent)]
    Fhir(#[from] FhirError),

    #[error(transparent)]
    Hl7v2(#[from] Hl7v2Error),

    #[error(transparent)]
    Hl7v3(#[from] Hl7v3Error),
}

/// Coarse error classification: malformed input, rejected configuration, or
/// a pivot value that cannot be rendered into the target format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Configuration,
    Mapping,
}

impl TranscodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscodeError::UnknownFormat(_) | TranscodeError::UnsupportedConversion { .. } => {
                ErrorKind::Configuration
            }
            TranscodeError::Hl7v3(Hl7v3Error::EmptyGender | Hl7v3Error::UnmappedGender(_)) => {
                ErrorKind::Mapping
            }
            _ => ErrorKind::Format,
        }
    }
}

/// Type alias for Results that can fail with a [`TranscodeError`].
pub type TranscodeResult<T> = Result<T, TranscodeError>;
