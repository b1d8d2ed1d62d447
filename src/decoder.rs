//! Schema-driven decoding of classified payloads.
//!
//! Every bucket's payload is the concatenation of its data blocks. Units of
//! the bucket are decoded in profile order, each one consuming its bytes off
//! the front of the stream left by the previous one.
//!
//! Payloads are not length-checked against the profile. A payload that runs
//! dry leaves the remaining units undecoded and a payload that is too long
//! leaves trailing digits. Both are logged and reported on the
//! [`DecodedBucket`] rather than treated as errors.

use crate::codec::{self, DataType, Decoded, DecodedValue};
use crate::profile::{Capture, Class, Classified, EnumEntry, Profile, UnitDescriptor};
use crate::{Error, Result};
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::iter;

/// A decoded unit, keyed by the unit id of its descriptor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedUnit {
    pub id: String,
    pub value: DecodedValue,
    pub hex_chunk: String,
    pub data_type: DataType,
    pub enums: Option<Vec<EnumEntry>>,
    pub label: Option<String>,
}

impl DecodedUnit {
    fn new(id: String, decoded: Decoded) -> Self {
        DecodedUnit {
            id,
            value: decoded.value,
            hex_chunk: decoded.hex_chunk,
            data_type: decoded.data_type,
            enums: decoded.enums,
            label: decoded.label,
        }
    }
}

/// Decoded units of one bucket, in profile order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedBucket {
    units: Vec<DecodedUnit>,
    /// Hex digits left over after decoding stopped.
    pub trailing: String,
    /// Ids of units that were not decoded because the payload ran out.
    pub undecoded: Vec<String>,
}

impl DecodedBucket {
    /// A later unit with the same id replaces the earlier one in place.
    fn insert(&mut self, unit: DecodedUnit) {
        match self.units.iter_mut().find(|existing| existing.id == unit.id) {
            Some(existing) => *existing = unit,
            None => self.units.push(unit),
        }
    }

    pub fn get(&self, id: &str) -> Option<&DecodedUnit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecodedUnit> {
        self.units.iter()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// True if the payload matched the profile exactly.
    pub fn is_complete(&self) -> bool {
        self.trailing.is_empty() && self.undecoded.is_empty()
    }

    pub fn into_map(self) -> HashMap<String, DecodedUnit> {
        self.units
            .into_iter()
            .map(|unit| (unit.id.clone(), unit))
            .collect()
    }
}

impl<'a> IntoIterator for &'a DecodedBucket {
    type Item = &'a DecodedUnit;
    type IntoIter = std::slice::Iter<'a, DecodedUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

/// Decodes `units` in order against one bucket payload.
///
/// # Errors
///
/// * [`Error::UnsupportedType`] or [`Error::InvalidHexDigit`] from the
///   codec abort the bucket.
pub fn decode_bucket<'u, I>(units: I, payload: &str) -> Result<DecodedBucket>
where
    I: IntoIterator<Item = &'u UnitDescriptor>,
{
    let mut bucket = DecodedBucket::default();
    let mut stream = payload.trim();
    let mut units = units.into_iter();

    while let Some(unit) = units.next() {
        let decoded = if stream.is_empty() {
            None
        } else {
            let enums = unit.enums.as_deref();
            match codec::decode(&unit.data_type, stream, Some(unit.scale), enums) {
                Ok(decoded) => Some(decoded),
                Err(Error::StreamExhausted { .. }) => None,
                Err(err) => return Err(err),
            }
        };
        let Some((decoded, rest)) = decoded else {
            bucket.undecoded = iter::once(unit)
                .chain(units.by_ref())
                .map(|unit| unit.id.clone())
                .collect();
            break;
        };
        trace!(
            "{} {} <- {} = {}",
            unit.data_type,
            unit.id,
            decoded.hex_chunk,
            decoded.value
        );
        bucket.insert(DecodedUnit::new(unit.id.clone(), decoded));
        stream = rest;
    }

    if !bucket.undecoded.is_empty() {
        warn!(
            "Payload exhausted, {} units not decoded: {}",
            bucket.undecoded.len(),
            bucket.undecoded.join(", ")
        );
    }
    if !stream.is_empty() {
        warn!("{} hex digits left undecoded: {stream}", stream.len());
    }
    bucket.trailing = stream.to_string();
    Ok(bucket)
}

/// Decodes every bucket of `payloads` against `profile`.
pub fn decode_profile(
    profile: &Profile,
    payloads: &Classified<String>,
) -> Result<Classified<DecodedBucket>> {
    Classified::try_from_fn(|class: Class| {
        let payload = payloads.get(class);
        debug!("Decoding {class} bucket ({} hex digits)", payload.len());
        decode_bucket(profile.units_of(class), payload)
    })
}

/// Decodes a parsed capture.
pub fn decode_capture(capture: &Capture) -> Result<Classified<DecodedBucket>> {
    decode_profile(&capture.profile, &capture.payloads())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::PROFILE;
    use assert_matches::assert_matches;

    fn payloads(setting: &str, monitor: &str, alarm: &str) -> Classified<String> {
        Classified {
            setting: setting.into(),
            monitor: monitor.into(),
            alarm: alarm.into(),
        }
    }

    #[test]
    fn decode_all_buckets() {
        let profile = Profile::parse(PROFILE).unwrap();
        let decoded = decode_profile(
            &profile,
            &payloads("0A03E8", "00054A6F6500000004D2", "01"),
        )
        .unwrap();

        let mode = decoded.setting.get("MODE").unwrap();
        assert_eq!(mode.value, DecodedValue::Int(10));
        assert_eq!(mode.label.as_deref(), Some("PCV"));
        assert_eq!(mode.hex_chunk, "0A");
        assert_eq!(
            decoded.setting.get("VT").unwrap().value,
            DecodedValue::Float(100.0)
        );

        let ids: Vec<_> = decoded.monitor.iter().map(|unit| unit.id.as_str()).collect();
        assert_eq!(ids, ["PEEP", "NAME", "MV"]);
        assert_eq!(
            decoded.monitor.get("PEEP").unwrap().value,
            DecodedValue::Int(5)
        );
        assert_eq!(
            decoded.monitor.get("NAME").unwrap().value,
            DecodedValue::Text("Joe".into())
        );
        assert_eq!(
            decoded.monitor.get("MV").unwrap().value,
            DecodedValue::Float(123.4)
        );

        assert_eq!(
            decoded.alarm.get("APNEA").unwrap().value,
            DecodedValue::Bool(true)
        );
        assert!(decoded.iter().all(|(_, bucket)| bucket.is_complete()));
    }

    #[test]
    fn exhausted_payload_is_reported() {
        let profile = Profile::parse(PROFILE).unwrap();
        let bucket = decode_bucket(profile.units_of(Class::Monitor), "0005").unwrap();
        assert_eq!(bucket.len(), 1);
        assert_eq!(bucket.undecoded, ["NAME", "MV"]);
        assert!(bucket.trailing.is_empty());

        let bucket =
            decode_bucket(profile.units_of(Class::Monitor), "00054A6F6500000004").unwrap();
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.undecoded, ["MV"]);
        assert_eq!(bucket.trailing, "000004");
        assert!(!bucket.is_complete());
    }

    #[test]
    fn trailing_payload_is_reported() {
        let profile = Profile::parse(PROFILE).unwrap();
        let bucket = decode_bucket(profile.units_of(Class::Alarm), "00FF").unwrap();
        assert_eq!(
            bucket.get("APNEA").unwrap().value,
            DecodedValue::Bool(false)
        );
        assert_eq!(bucket.trailing, "FF");
        assert!(bucket.undecoded.is_empty());
    }

    #[test]
    fn unsupported_type_aborts_bucket() {
        let profile = Profile::parse(
            r#"<profile>
                 <unit class="alarm" ID="A" type="BOOL"/>
                 <unit class="alarm" ID="B" type="FLOAT"/>
               </profile>"#,
        )
        .unwrap();
        assert_matches!(
            decode_bucket(profile.units_of(Class::Alarm), "0100000000"),
            Err(Error::UnsupportedType(tag)) if tag == "FLOAT"
        );
        assert_matches!(
            decode_profile(&profile, &payloads("", "", "0100000000")),
            Err(Error::UnsupportedType(..))
        );
    }

    #[test]
    fn flags_follow_the_unit_scale() {
        let profile = Profile::parse(
            r#"<profile>
                 <unit class="alarm" ID="A" type="BOOL"/>
                 <unit class="alarm" ID="B" type="BOOL" scale="0"/>
                 <unit class="alarm" ID="C" type="BOOL" scale="E+2"/>
               </profile>"#,
        )
        .unwrap();
        let bucket = decode_bucket(profile.units_of(Class::Alarm), "010100").unwrap();
        assert_eq!(bucket.get("A").unwrap().value, DecodedValue::Float(0.1));
        assert_eq!(bucket.get("B").unwrap().value, DecodedValue::Bool(true));
        assert_eq!(bucket.get("C").unwrap().value, DecodedValue::Float(0.0));
    }

    #[test]
    fn duplicate_ids_keep_the_last_value() {
        let profile = Profile::parse(
            r#"<profile>
                 <unit class="setting" ID="X" type="UWORD" scale="0"/>
                 <unit class="setting" ID="Y" type="UWORD" scale="0"/>
                 <unit class="setting" ID="X" type="UWORD" scale="0"/>
               </profile>"#,
        )
        .unwrap();
        let bucket = decode_bucket(profile.units_of(Class::Setting), "000100020003").unwrap();
        let map = bucket.clone().into_map();
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.get("X").unwrap().value, DecodedValue::Int(3));
        assert_eq!(map["Y"].value, DecodedValue::Int(2));
    }

    #[test]
    fn decode_from_capture() {
        let text = format!(
            "{PROFILE}\n\n\n\
             <data class=\"setting\" crc=\"0\" msgID=\"1\">0A</data>\n\n\n\
             <data class=\"setting\" crc=\"0\" msgID=\"2\">03E8</data>\n\n\n\
             <data class=\"alarm\" crc=\"0\" msgID=\"3\">01</data>"
        );
        let capture = Capture::parse(&text).unwrap();
        let decoded = decode_capture(&capture).unwrap();
        assert_eq!(
            decoded.setting.get("VT").unwrap().value,
            DecodedValue::Float(100.0)
        );
        assert!(decoded.monitor.is_empty());
        assert_eq!(decoded.monitor.undecoded, ["PEEP", "NAME", "MV"]);
    }
}
