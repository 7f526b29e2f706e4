//! FHIR wire/boundary support.
//!
//! This crate translates between the FHIR Patient JSON wire shape and the
//! canonical [`prx_types::PatientRecord`] pivot model. It handles
//! serialisation/deserialisation and wire/domain translation only; which
//! conversions are permitted is the router's concern in `prx-core`.
//!
//! Full FHIR resource conformance is deliberately not validated: unknown
//! keys are ignored and every modelled field is optional at parse time.

pub mod patient;

pub use patient::Patient;

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("patient schema mismatch at {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialise patient: {0}")]
    Serialise(#[source] serde_json::Error),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
