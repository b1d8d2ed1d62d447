//! Scalar codec for schema-driven payloads.
//!
//! Payloads are strings of hex digits. [`decode`] takes one value of the
//! declared type off the front of the stream and hands back the rest, so
//! that many units can be streamed off one shared payload. Multi-byte
//! values are big-endian.

use crate::profile::EnumEntry;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Type tags a profile may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum DataType {
    Word,
    UWord,
    Int,
    UInt,
    Bool,
    Enum,
    Text,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Word => "WORD",
            DataType::UWord => "UWORD",
            DataType::Int => "INT",
            DataType::UInt => "UINT",
            DataType::Bool => "BOOL",
            DataType::Enum => "ENUM",
            DataType::Text => "TEXT",
        }
    }

    /// Width in bytes, `None` for NUL-terminated text.
    pub fn width(&self) -> Option<usize> {
        match self {
            DataType::Word | DataType::UWord => Some(2),
            DataType::Int | DataType::UInt => Some(4),
            DataType::Bool | DataType::Enum => Some(1),
            DataType::Text => None,
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "WORD" => Ok(DataType::Word),
            "UWORD" => Ok(DataType::UWord),
            "INT" => Ok(DataType::Int),
            "UINT" => Ok(DataType::UInt),
            "BOOL" => Ok(DataType::Bool),
            "ENUM" => Ok(DataType::Enum),
            "TEXT" => Ok(DataType::Text),
            _ => Err(Error::UnsupportedType(s.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum DecodedValue {
    Int(i64),
    /// A numeric value divided by its unit's scale.
    Float(f64),
    Bool(bool),
    Text(String),
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Int(value) => write!(f, "{value}"),
            DecodedValue::Float(value) => write!(f, "{value}"),
            DecodedValue::Bool(value) => write!(f, "{value}"),
            DecodedValue::Text(value) => write!(f, "{value}"),
        }
    }
}

/// Result of decoding one scalar.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Decoded {
    pub value: DecodedValue,
    /// The hex digits consumed, including a text terminator.
    pub hex_chunk: String,
    pub data_type: DataType,
    /// The enumeration table consulted, for `ENUM` values.
    pub enums: Option<Vec<EnumEntry>>,
    /// Label of the enum entry matching the raw byte.
    pub label: Option<String>,
}

/// Maps a hex error at `offset` digits into `stream` to the offending
/// character of the stream itself rather than the raw byte.
fn hex_error(stream: &str, offset: usize, err: hex::FromHexError) -> Error {
    match err {
        hex::FromHexError::InvalidHexCharacter { index, .. } => {
            let offset = offset + index;
            let digit = stream
                .get(offset..)
                .and_then(|rest| rest.chars().next())
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            Error::InvalidHexDigit { digit, offset }
        }
        err => Error::InvalidHex(err),
    }
}

fn take<const N: usize>(hex: &str, data_type: DataType) -> Result<[u8; N]> {
    let needed = N * 2;
    if hex.len() < needed {
        return Err(Error::StreamExhausted {
            data_type: data_type.as_str(),
            needed,
            available: hex.len(),
        });
    }
    let mut bytes = [0; N];
    hex::decode_to_slice(&hex.as_bytes()[..needed], &mut bytes)
        .map_err(|err| hex_error(hex, 0, err))?;
    Ok(bytes)
}

/// Reads characters up to and including a NUL byte or the end of the stream.
/// Returns the text and the number of hex digits consumed.
fn take_text(hex: &str) -> Result<(String, usize)> {
    let mut text = String::new();
    let mut consumed = 0;
    for pair in hex.as_bytes().chunks_exact(2) {
        let mut byte = [0; 1];
        hex::decode_to_slice(pair, &mut byte).map_err(|err| hex_error(hex, consumed, err))?;
        consumed += 2;
        if byte[0] == 0 {
            break;
        }
        text.push(char::from(byte[0]));
    }
    Ok((text, consumed))
}

/// Decodes one value of the type named by `type_tag` from the front of `hex`.
///
/// Returns the decoded value and the remaining stream.
///
/// # Errors
///
/// * [`Error::UnsupportedType`] for an unknown type tag.
/// * [`Error::StreamExhausted`] if a fixed-width value is incomplete.
/// * [`Error::InvalidHexDigit`] if the consumed digits are not hex.
pub fn decode<'a>(
    type_tag: &str,
    hex: &'a str,
    scale: Option<i64>,
    enums: Option<&[EnumEntry]>,
) -> Result<(Decoded, &'a str)> {
    decode_value(type_tag.parse()?, hex, scale, enums)
}

/// Like [`decode`] for an already parsed type.
pub fn decode_value<'a>(
    data_type: DataType,
    hex: &'a str,
    scale: Option<i64>,
    enums: Option<&[EnumEntry]>,
) -> Result<(Decoded, &'a str)> {
    let (value, consumed) = match data_type {
        DataType::Word => (
            DecodedValue::Int(i16::from_be_bytes(take(hex, data_type)?).into()),
            4,
        ),
        DataType::UWord => (
            DecodedValue::Int(u16::from_be_bytes(take(hex, data_type)?).into()),
            4,
        ),
        DataType::Int => (
            DecodedValue::Int(i32::from_be_bytes(take(hex, data_type)?).into()),
            8,
        ),
        DataType::UInt => (
            DecodedValue::Int(u32::from_be_bytes(take(hex, data_type)?).into()),
            8,
        ),
        DataType::Bool => {
            let [byte] = take::<1>(hex, data_type)?;
            (DecodedValue::Bool(byte != 0), 2)
        }
        DataType::Enum => {
            let [byte] = take::<1>(hex, data_type)?;
            (DecodedValue::Int(byte.into()), 2)
        }
        DataType::Text => {
            let (text, consumed) = take_text(hex)?;
            (DecodedValue::Text(text), consumed)
        }
    };
    let (hex_chunk, rest) = hex.split_at(consumed);

    let (enums, label) = match (data_type, &value) {
        (DataType::Enum, DecodedValue::Int(raw)) => {
            let label = enums
                .unwrap_or_default()
                .iter()
                .find(|entry| entry.raw() == u64::try_from(*raw).ok())
                .map(|entry| entry.label.clone());
            (enums.map(<[EnumEntry]>::to_vec), label)
        }
        _ => (None, None),
    };

    let value = match (value, scale) {
        (DecodedValue::Int(raw), Some(scale)) if scale != 0 && scale != 1 => {
            DecodedValue::Float(raw as f64 / scale as f64)
        }
        (DecodedValue::Bool(flag), Some(scale)) if scale != 0 && scale != 1 => {
            DecodedValue::Float(f64::from(u8::from(flag)) / scale as f64)
        }
        (value, _) => value,
    };

    Ok((
        Decoded {
            value,
            hex_chunk: hex_chunk.to_string(),
            data_type,
            enums,
            label,
        },
        rest,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn value(type_tag: &str, hex: &str) -> DecodedValue {
        decode(type_tag, hex, None, None).unwrap().0.value
    }

    #[test]
    fn fixed_width_integers() {
        let (decoded, rest) = decode("UWORD", "00FF1234", None, None).unwrap();
        assert_eq!(decoded.value, DecodedValue::Int(255));
        assert_eq!(decoded.hex_chunk, "00FF");
        assert_eq!(decoded.data_type, DataType::UWord);
        assert_eq!(rest, "1234");

        assert_eq!(value("WORD", "FFFE"), DecodedValue::Int(-2));
        assert_eq!(value("UWORD", "FFFE"), DecodedValue::Int(65534));
        assert_eq!(value("INT", "FFFFFFFF"), DecodedValue::Int(-1));
        assert_eq!(value("UINT", "FFFFFFFF"), DecodedValue::Int(4_294_967_295));
        assert_eq!(value("INT", "00010000"), DecodedValue::Int(65536));
        assert_eq!(value("UWORD", "00ff"), DecodedValue::Int(255));
    }

    #[test]
    fn bool_and_enum() {
        assert_eq!(value("BOOL", "01"), DecodedValue::Bool(true));
        assert_eq!(value("BOOL", "80"), DecodedValue::Bool(true));
        assert_eq!(value("BOOL", "00"), DecodedValue::Bool(false));

        let table = [
            EnumEntry {
                value: "01".into(),
                label: "VCV".into(),
            },
            EnumEntry {
                value: "0A".into(),
                label: "PCV".into(),
            },
        ];
        let (decoded, rest) = decode("ENUM", "0AFF", None, Some(&table)).unwrap();
        assert_eq!(decoded.value, DecodedValue::Int(10));
        assert_eq!(decoded.label.as_deref(), Some("PCV"));
        assert_eq!(decoded.enums.as_deref(), Some(&table[..]));
        assert_eq!(rest, "FF");

        let (decoded, _) = decode("ENUM", "07", None, Some(&table)).unwrap();
        assert_eq!(decoded.label, None);
    }

    #[test]
    fn text_until_nul() {
        let (decoded, rest) = decode("TEXT", "48656C6C6F000102", None, None).unwrap();
        assert_eq!(decoded.value, DecodedValue::Text("Hello".into()));
        assert_eq!(decoded.hex_chunk, "48656C6C6F00");
        assert_eq!(rest, "0102");

        let (decoded, rest) = decode("TEXT", "4869", None, None).unwrap();
        assert_eq!(decoded.value, DecodedValue::Text("Hi".into()));
        assert_eq!(rest, "");

        let (decoded, rest) = decode("TEXT", "", None, None).unwrap();
        assert_eq!(decoded.value, DecodedValue::Text(String::new()));
        assert_eq!(rest, "");
    }

    #[test]
    fn scaling() {
        let scaled = |scale| decode("WORD", "FF9C", Some(scale), None).unwrap().0.value;
        assert_eq!(scaled(10), DecodedValue::Float(-10.0));
        assert_eq!(scaled(20), DecodedValue::Float(-5.0));
        assert_eq!(scaled(1), DecodedValue::Int(-100));
        assert_eq!(scaled(0), DecodedValue::Int(-100));

        // Flags scale as 0 or 1, text never does.
        let flag = |hex, scale| decode("BOOL", hex, scale, None).unwrap().0.value;
        assert_eq!(flag("01", Some(10)), DecodedValue::Float(0.1));
        assert_eq!(flag("80", Some(20)), DecodedValue::Float(0.05));
        assert_eq!(flag("00", Some(10)), DecodedValue::Float(0.0));
        assert_eq!(flag("01", Some(1)), DecodedValue::Bool(true));
        assert_eq!(flag("01", Some(0)), DecodedValue::Bool(true));
        assert_eq!(flag("00", None), DecodedValue::Bool(false));
        let (decoded, _) = decode("TEXT", "4100", Some(10), None).unwrap();
        assert_eq!(decoded.value, DecodedValue::Text("A".into()));
    }

    #[test]
    fn errors() {
        assert_matches!(
            decode("FLOAT", "00000000", None, None),
            Err(Error::UnsupportedType(tag)) if tag == "FLOAT"
        );
        assert_matches!(
            decode("UINT", "00FF", None, None),
            Err(Error::StreamExhausted {
                data_type: "UINT",
                needed: 8,
                available: 4
            })
        );
        assert_matches!(decode("WORD", "", None, None), Err(Error::StreamExhausted { .. }));
        assert_matches!(
            decode("WORD", "ZZ00", None, None),
            Err(Error::InvalidHexDigit {
                digit: 'Z',
                offset: 0
            })
        );
        assert_matches!(
            decode("TEXT", "41G1", None, None),
            Err(Error::InvalidHexDigit {
                digit: 'G',
                offset: 2
            })
        );
    }

    #[test]
    fn non_ascii_digits_are_reported_as_written() {
        assert_matches!(
            decode("WORD", "00é", None, None),
            Err(Error::InvalidHexDigit {
                digit: 'é',
                offset: 2
            })
        );
        assert_matches!(
            decode("TEXT", "4142µ0", None, None),
            Err(Error::InvalidHexDigit {
                digit: 'µ',
                offset: 4
            })
        );
    }
}
