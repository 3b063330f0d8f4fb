//! HL7 code system OIDs and value conversions.

pub const LOINC_OID: &str = "2.16.840.1.113883.6.1";
pub const LOINC_URI: &str = "http://loinc.org";

const CODE_SYSTEMS: [(&str, &str); 8] = [
    (LOINC_OID, LOINC_URI),
    ("2.16.840.1.113883.6.96", "http://snomed.info/sct"),
    ("2.16.840.1.113883.6.88", "http://www.nlm.nih.gov/research/umls/rxnorm"),
    ("2.16.840.1.113883.6.90", "http://hl7.org/fhir/sid/icd-10-cm"),
    ("2.16.840.1.113883.6.103", "http://hl7.org/fhir/sid/icd-9-cm"),
    ("2.16.840.1.113883.6.12", "http://www.ama-assn.org/go/cpt"),
    ("2.16.840.1.113883.6.8", "http://unitsofmeasure.org"),
    ("2.16.840.1.113883.5.4", "http://terminology.hl7.org/CodeSystem/v3-ActCode"),
];

/// Maps a CDA `codeSystem` OID to a FHIR system URI, `urn:oid:` otherwise.
pub fn code_system_uri(oid: &str) -> String {
    CODE_SYSTEMS
        .iter()
        .find(|(known, _)| *known == oid)
        .map_or_else(|| format!("urn:oid:{oid}"), |(_, uri)| (*uri).to_string())
}

/// Maps an `ActStatus` code to an observation status.
pub fn observation_status(status: Option<&str>) -> &'static str {
    match status {
        None | Some("completed") => "final",
        Some("active") => "preliminary",
        Some("aborted" | "cancelled") => "cancelled",
        Some("nullified") => "entered-in-error",
        Some(_) => "unknown",
    }
}

pub fn administrative_gender(code: Option<&str>) -> &'static str {
    match code {
        Some("M") => "male",
        Some("F") => "female",
        Some("UN") => "other",
        _ => "unknown",
    }
}

/// Converts an HL7 `TS` value (`YYYYMMDD[HHMM[SS]][+ZZZZ]`) to FHIR date/dateTime.
///
/// Values that do not start with a four digit year are returned unchanged.
pub fn hl7_timestamp(value: &str) -> String {
    let (stamp, zone) = match value.find(['+', '-']) {
        Some(idx) => value.split_at(idx),
        None => (value, ""),
    };
    let stamp = stamp.split('.').next().unwrap_or(stamp);
    if stamp.len() < 4 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }

    let part = |range: std::ops::Range<usize>| stamp.get(range);
    let mut out = stamp[..4].to_string();
    for (range, sep) in [(4..6, '-'), (6..8, '-')] {
        match part(range) {
            Some(piece) => {
                out.push(sep);
                out.push_str(piece);
            }
            None => return out,
        }
    }
    let Some(hours) = part(8..10) else {
        return out;
    };
    let minutes = part(10..12).unwrap_or("00");
    let seconds = part(12..14).unwrap_or("00");
    out.push_str(&format!("T{hours}:{minutes}:{seconds}"));
    if let Some((hh, mm)) = zone_offset(zone) {
        out.push_str(&format!("{hh}:{mm}"));
    }
    out
}

/// Splits a `+HHMM`/`-HHMM` suffix into `+HH` and `MM`; anything else is dropped.
fn zone_offset(zone: &str) -> Option<(&str, &str)> {
    let digits = zone.strip_prefix(['+', '-'])?;
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((zone.get(..3)?, zone.get(3..)?))
}
