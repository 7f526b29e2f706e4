//! HL7 v2 wire/boundary support.
//!
//! This crate translates between pipe-delimited HL7 v2 patient-admission
//! messages and the canonical [`prx_types::PatientRecord`] pivot model.
//!
//! Two protocol notes fixed by the wire contract:
//! - Segments are separated by a single `\n`, not the HL7-standard `\r`.
//! - HL7 v2 carries exactly one name and one address per message, so the
//!   mapping is lossy whenever the pivot holds more than one entry:
//!   information beyond index 0 is dropped on the way out, and only one
//!   entry is ever produced on the way in.

use chrono::Utc;
use prx_types::{Address, HumanName, PatientRecord};

/// Literal prefix every HL7 v2 message starts with; also used by callers to
/// distinguish raw HL7 text from its JSON envelope.
pub const MSH_PREFIX: &str = "MSH|";

const SEGMENT_SEPARATOR: char = '\n';
const FIELD_SEPARATOR: char = '|';
const COMPONENT_SEPARATOR: char = '^';

/// Errors returned by the `hl7v2` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum Hl7v2Error {
    #[error("message does not begin with an MSH header segment")]
    MissingMshHeader,

    #[error("PID segment has no patient identifier (PID-3)")]
    MissingPatientId,

    #[error("message contains no PID segment")]
    MissingPidSegment,
}

/// A parsed two-segment HL7 v2 patient-admission message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hl7v2Message {
    pub header: MshSegment,
    pub patient: PidSegment,
}

/// MSH (message header) segment fields PRX consumes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MshSegment {
    pub sending_application: String,
    pub sending_facility: String,
    pub date_time: String,
    pub message_type: String,
    pub control_id: String,
}

/// PID (patient identification) segment fields PRX consumes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PidSegment {
    pub id: String,
    pub last_name: String,
    pub first_name: String,
    pub birth_date: String,
    pub gender: String,
    pub address: PidAddress,
}

/// Positional components of the PID-11 address field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PidAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Read a positional field, treating anything past the populated slice as
/// absent. Only the fields documented as mandatory turn absence into an
/// error; everything else reads as empty.
fn field<'a>(fields: &[&'a str], index: usize) -> &'a str {
    fields.get(index).copied().unwrap_or("")
}

/// Parse a pipe-delimited HL7 v2 message.
///
/// Segments with a leading tag other than `MSH` or `PID` are ignored as a
/// forward-compatible no-op.
///
/// # Errors
///
/// - [`Hl7v2Error::MissingMshHeader`] if the text does not begin with `MSH|`.
/// - [`Hl7v2Error::MissingPatientId`] if a PID segment has an empty PID-3.
/// - [`Hl7v2Error::MissingPidSegment`] if no PID segment is present.
pub fn parse_message(text: &str) -> Result<Hl7v2Message, Hl7v2Error> {
    if !text.starts_with(MSH_PREFIX) {
        return Err(Hl7v2Error::MissingMshHeader);
    }

    let mut message = Hl7v2Message::default();
    let mut saw_pid = false;

    for segment in text.split(SEGMENT_SEPARATOR) {
        let fields: Vec<&str> = segment.split(FIELD_SEPARATOR).collect();

        match field(&fields, 0) {
            "MSH" => {
                message.header = MshSegment {
                    sending_application: field(&fields, 2).to_string(),
                    sending_facility: field(&fields, 3).to_string(),
                    date_time: field(&fields, 6).to_string(),
                    message_type: field(&fields, 8).to_string(),
                    control_id: field(&fields, 9).to_string(),
                };
            }
            "PID" => {
                let id = field(&fields, 3);
                if id.is_empty() {
                    return Err(Hl7v2Error::MissingPatientId);
                }
                saw_pid = true;

                let name: Vec<&str> = field(&fields, 5).split(COMPONENT_SEPARATOR).collect();
                let address: Vec<&str> = field(&fields, 11).split(COMPONENT_SEPARATOR).collect();

                message.patient = PidSegment {
                    id: id.to_string(),
                    last_name: field(&name, 0).to_string(),
                    first_name: field(&name, 1).to_string(),
                    birth_date: field(&fields, 7).to_string(),
                    gender: field(&fields, 8).to_string(),
                    address: PidAddress {
                        street: field(&address, 0).to_string(),
                        city: field(&address, 1).to_string(),
                        state: field(&address, 2).to_string(),
                        postal_code: field(&address, 3).to_string(),
                        country: field(&address, 4).to_string(),
                    },
                };
            }
            _ => {}
        }
    }

    if !saw_pid {
        return Err(Hl7v2Error::MissingPidSegment);
    }

    Ok(message)
}

/// Build a two-segment HL7 v2 message from the canonical pivot model.
///
/// The current UTC timestamp (`YYYYMMDDHHMMSS`) serves as both the message
/// date/time and the control id. Building never fails: absent pivot data
/// degrades to empty fields so the positional layout keeps its field count.
/// Callers routing through the transcoder are responsible for supplying a
/// valid record; mandatory pivot fields are not re-validated here.
pub fn build_message(record: &PatientRecord) -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();

    let name = record.primary_name();
    let family = name
        .and_then(|n| n.family.first())
        .map(String::as_str)
        .unwrap_or_default();
    let given = name
        .and_then(|n| n.given.first())
        .map(String::as_str)
        .unwrap_or_default();

    let address = record.primary_address();
    let street = address
        .and_then(|a| a.lines.first())
        .map(String::as_str)
        .unwrap_or_default();
    let (city, state, postal_code, country) = address
        .map(|a| {
            (
                a.city.as_str(),
                a.state.as_str(),
                a.postal_code.as_str(),
                a.country.as_str(),
            )
        })
        .unwrap_or_default();

    let msh = format!("MSH|^~\\&|FHIR_CONVERTER|FACILITY|{timestamp}||ADT^A01|{timestamp}|P|2.5|");
    let pid = format!(
        "PID|1||{id}||{family}^{given}||{birth_date}|{gender}|||{street}^{city}^{state}^{postal_code}^{country}||||||{id}",
        id = record.id,
        birth_date = record.birth_date,
        gender = record.gender,
    );

    format!("{msh}{SEGMENT_SEPARATOR}{pid}")
}

impl Hl7v2Message {
    /// Convert the parsed message into the canonical pivot model.
    ///
    /// At most one name and one address entry are produced, and empty
    /// components are not fabricated into the pivot sequences. The gender
    /// field passes through verbatim.
    pub fn into_patient(self) -> PatientRecord {
        let pid = self.patient;

        let mut names = Vec::new();
        let mut name = HumanName::default();
        if !pid.last_name.is_empty() {
            name.family.push(pid.last_name);
        }
        if !pid.first_name.is_empty() {
            name.given.push(pid.first_name);
        }
        if !name.family.is_empty() || !name.given.is_empty() {
            names.push(name);
        }

        let mut addresses = Vec::new();
        let addr = pid.address;
        let has_address = !addr.street.is_empty()
            || !addr.city.is_empty()
            || !addr.state.is_empty()
            || !addr.postal_code.is_empty()
            || !addr.country.is_empty();
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
                country: addr.country,
            });
        }

        PatientRecord {
            id: pid.id,
            names,
            birth_date: pid.birth_date,
            gender: pid.gender,
            addresses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "MSH|^~\\&|FHIR_CONVERTER|FACILITY|HL7_PARSER|FACILITY|20230815120000||ADT^A01|123|P|2.5|\nPID|1||123||Smith^John||1990-01-01|male|||123 Main St^Springfield^IL^62701^USA||||||123";

    fn sample_record() -> PatientRecord {
        PatientRecord {
            id: "123".into(),
            names: vec![HumanName {
                family: vec!["Smith".into()],
                given: vec!["John".into()],
            }],
            birth_date: "1990-01-01".into(),
            gender: "male".into(),
            addresses: vec![Address {
                lines: vec!["123 Main St".into()],
                city: "Springfield".into(),
                state: "IL".into(),
                postal_code: "62701".into(),
                country: "USA".into(),
            }],
        }
    }

    #[test]
    fn parses_canonical_message() {
        let message = parse_message(CANONICAL).expect("parse message");

        assert_eq!(message.header.sending_application, "FHIR_CONVERTER");
        assert_eq!(message.header.sending_facility, "FACILITY");
        assert_eq!(message.header.date_time, "20230815120000");
        assert_eq!(message.header.message_type, "ADT^A01");
        assert_eq!(message.header.control_id, "123");

        assert_eq!(message.patient.id, "123");
        assert_eq!(message.patient.last_name, "Smith");
        assert_eq!(message.patient.first_name, "John");
        assert_eq!(message.patient.birth_date, "1990-01-01");
        assert_eq!(message.patient.gender, "male");
        assert_eq!(message.patient.address.street, "123 Main St");
        assert_eq!(message.patient.address.city, "Springfield");
        assert_eq!(message.patient.address.state, "IL");
        assert_eq!(message.patient.address.postal_code, "62701");
        assert_eq!(message.patient.address.country, "USA");
    }

    #[test]
    fn rejects_text_without_msh_prefix() {
        let err = parse_message("INVALID|HL7|MESSAGE").expect_err("should reject");
        assert!(matches!(err, Hl7v2Error::MissingMshHeader));
    }

    #[test]
    fn rejects_message_without_pid_segment() {
        let err = parse_message("MSH|^~\\&|APP|FAC|||TS||ADT^A01|1|P|2.5|")
            .expect_err("should reject");
        assert!(matches!(err, Hl7v2Error::MissingPidSegment));
    }

    #[test]
    fn rejects_pid_with_empty_patient_id() {
        let err = parse_message("MSH|^~\\&|APP|FAC|\nPID|1||")
            .expect_err("should reject");
        assert!(matches!(err, Hl7v2Error::MissingPatientId));
    }

    #[test]
    fn ignores_unknown_segment_tags() {
        let input = format!("{CANONICAL}\nEVN|A01|20230815120000");
        let message = parse_message(&input).expect("parse with EVN segment");
        assert_eq!(message.patient.id, "123");
    }

    #[test]
    fn short_segments_read_as_absent_optional_fields() {
        let message = parse_message("MSH|^~\\&\nPID|1||123").expect("parse short segments");

        assert_eq!(message.header.sending_application, "");
        assert_eq!(message.header.control_id, "");
        assert_eq!(message.patient.id, "123");
        assert_eq!(message.patient.last_name, "");
        assert_eq!(message.patient.birth_date, "");
        assert_eq!(message.patient.address.street, "");
    }

    #[test]
    fn partial_address_fills_leading_components_only() {
        let message = parse_message("MSH|^~\\&\nPID|1||123||||||||6 High St^Leeds")
            .expect("parse partial address");

        assert_eq!(message.patient.address.street, "6 High St");
        assert_eq!(message.patient.address.city, "Leeds");
        assert_eq!(message.patient.address.state, "");
        assert_eq!(message.patient.address.country, "");
    }

    #[test]
    fn builds_two_segments_with_msh_first() {
        let text = build_message(&sample_record());

        assert!(text.starts_with("MSH|"));
        let segments: Vec<&str> = text.split('\n').collect();
        assert_eq!(segments.len(), 2);
        assert!(segments[1].starts_with("PID|"));
    }

    #[test]
    fn built_pid_fields_sit_at_fixed_positions() {
        let text = build_message(&sample_record());
        let pid = text.split('\n').nth(1).expect("PID segment");
        let fields: Vec<&str> = pid.split('|').collect();

        assert_eq!(fields[3], "123");
        assert_eq!(fields[5], "Smith^John");
        assert_eq!(fields[7], "1990-01-01");
        assert_eq!(fields[8], "male");
        assert_eq!(fields[11], "123 Main St^Springfield^IL^62701^USA");
        assert_eq!(fields[17], "123");
    }

    #[test]
    fn built_header_timestamp_is_fourteen_digits() {
        let text = build_message(&sample_record());
        let msh = text.split('\n').next().expect("MSH segment");
        let fields: Vec<&str> = msh.split('|').collect();

        assert_eq!(fields[4].len(), 14);
        assert!(fields[4].bytes().all(|b| b.is_ascii_digit()));
        // The same timestamp doubles as the control id.
        assert_eq!(fields[4], fields[7]);
    }

    #[test]
    fn build_degrades_missing_data_to_empty_fields() {
        let record = PatientRecord {
            id: "456".into(),
            ..PatientRecord::default()
        };

        let text = build_message(&record);
        let pid = text.split('\n').nth(1).expect("PID segment");
        let fields: Vec<&str> = pid.split('|').collect();

        assert_eq!(fields[3], "456");
        assert_eq!(fields[5], "^");
        assert_eq!(fields[11], "^^^^");
        assert_eq!(fields.len(), 18);
    }

    #[test]
    fn round_trip_preserves_consumed_fields() {
        let record = sample_record();
        let reparsed = parse_message(&build_message(&record))
            .expect("reparse built message")
            .into_patient();

        assert_eq!(reparsed.id, record.id);
        assert_eq!(reparsed.names, record.names);
        assert_eq!(reparsed.birth_date, record.birth_date);
        assert_eq!(reparsed.gender, record.gender);
        assert_eq!(reparsed.addresses, record.addresses);
    }

    #[test]
    fn round_trip_drops_entries_beyond_the_first() {
        let mut record = sample_record();
        record.names.push(HumanName {
            family: vec!["Smythe".into()],
            given: vec!["Jonathan".into()],
        });
        record.addresses.push(Address {
            city: "Shelbyville".into(),
            ..Address::default()
        });

        let reparsed = parse_message(&build_message(&record))
            .expect("reparse built message")
            .into_patient();

        assert_eq!(reparsed.names.len(), 1);
        assert_eq!(reparsed.addresses.len(), 1);
        assert_eq!(reparsed.names[0].family, vec!["Smith"]);
        assert_eq!(reparsed.addresses[0].city, "Springfield");
    }

    #[test]
    fn into_patient_skips_fabricated_empty_entries() {
        let message = parse_message("MSH|^~\\&\nPID|1||123").expect("parse");
        let record = message.into_patient();

        assert!(record.names.is_empty());
        assert!(record.addresses.is_empty());
    }
}
