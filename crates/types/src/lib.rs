//! Canonical patient model shared by every wire-format crate.
//!
//! Every supported conversion pivots through [`PatientRecord`]: wire formats
//! parse into it and build from it, and no codec talks to another codec
//! directly. The model is a pure data holder with no behaviour beyond field
//! access; translation logic lives in the boundary crates (`fhir`, `hl7v2`,
//! `hl7v3`).

/// Canonical in-memory patient representation.
///
/// Codecs consume only the first entry of `names` and `addresses`. That is a
/// documented simplification of the codecs, not of this model: the sequences
/// remain ordered and unbounded so a richer codec could consume more.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientRecord {
    /// Patient identifier. Required by every conversion; the codecs that
    /// mandate it validate it, the model does not.
    pub id: String,

    /// Ordered names; index 0 is the primary name.
    pub names: Vec<HumanName>,

    /// Date of birth in `YYYY-MM-DD` form, or empty when unknown.
    pub birth_date: String,

    /// One of `male`, `female`, `unknown`, or empty if unmapped.
    ///
    /// Held as a string rather than an enum: the HL7 v2 codec passes this
    /// value through verbatim in both directions, so the pivot must carry
    /// arbitrary inbound values unchanged. The M/F/U code bijection is the
    /// HL7 v3 codec's concern.
    pub gender: String,

    /// Ordered addresses; index 0 is the primary address.
    pub addresses: Vec<Address>,
}

/// A single human name entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HumanName {
    /// Family name components (surname).
    pub family: Vec<String>,

    /// Given name components (first name, middle names).
    pub given: Vec<String>,
}

/// A single postal address entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    /// Street address lines.
    pub lines: Vec<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl PatientRecord {
    /// The first name entry, if any. This is the entry every codec consumes.
    pub fn primary_name(&self) -> Option<&HumanName> {
        self.names.first()
    }

    /// The first address entry, if any. This is the entry every codec consumes.
    pub fn primary_address(&self) -> Option<&Address> {
        self.addresses.first()
    }
}
