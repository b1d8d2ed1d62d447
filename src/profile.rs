//! Self-describing device profiles.
//!
//! A capture from a schema-driven device is a sequence of XML packages
//! separated by blank-line triples: one `<profile>` describing every unit,
//! followed by `<data>` blocks carrying hex payloads.
//!
//! ```xml
//! <profile model="V500" profileVersion="3" voxpVersion="1" textEncoding="ASCII">
//!   <unit class="monitor" ID="PEEP" type="WORD" scale="E+1" label="PEEP"/>
//!   <unit class="setting" ID="MODE" type="ENUM" label="Mode">
//!     <enum value="01" label="VCV"/>
//!     <enum value="02" label="PCV"/>
//!   </unit>
//! </profile>
//! ```

use crate::{Error, Result};
use log::warn;
use std::fmt;
use std::str::FromStr;

/// Separator between packages of a capture.
pub const PACKAGE_SEPARATOR: &str = "\n\n\n";

/// Scale attribute assumed when a unit does not declare one.
pub const DEFAULT_SCALE: &str = "1";

/// Classification bucket of units and data blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Class {
    Setting,
    Monitor,
    Alarm,
}

impl Class {
    pub const ALL: [Class; 3] = [Class::Setting, Class::Monitor, Class::Alarm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Class::Setting => "setting",
            Class::Monitor => "monitor",
            Class::Alarm => "alarm",
        }
    }
}

impl FromStr for Class {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "setting" => Ok(Class::Setting),
            "monitor" => Ok(Class::Monitor),
            "alarm" => Ok(Class::Alarm),
            _ => Err(format!("Unknown class '{s}'")),
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per classification bucket.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Classified<T> {
    pub setting: T,
    pub monitor: T,
    pub alarm: T,
}

impl<T> Classified<T> {
    pub fn get(&self, class: Class) -> &T {
        match class {
            Class::Setting => &self.setting,
            Class::Monitor => &self.monitor,
            Class::Alarm => &self.alarm,
        }
    }

    pub fn get_mut(&mut self, class: Class) -> &mut T {
        match class {
            Class::Setting => &mut self.setting,
            Class::Monitor => &mut self.monitor,
            Class::Alarm => &mut self.alarm,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Class, &T)> {
        Class::ALL.into_iter().map(move |class| (class, self.get(class)))
    }

    /// Builds a value per bucket, stopping at the first error.
    pub fn try_from_fn<F>(mut f: F) -> Result<Self>
    where
        F: FnMut(Class) -> Result<T>,
    {
        Ok(Classified {
            setting: f(Class::Setting)?,
            monitor: f(Class::Monitor)?,
            alarm: f(Class::Alarm)?,
        })
    }
}

/// Converts a unit's `scale` attribute into the divisor used by the codec.
///
/// `"E+<n>"` and a bare integer `"<n>"` both give `n * 10`; anything else,
/// including a missing attribute, gives `0`, which disables scaling.
pub fn convert_scale(scale: Option<&str>) -> i64 {
    let Some(scale) = scale else {
        return 0;
    };
    let digits = scale.strip_prefix("E+").unwrap_or(scale);
    digits.trim().parse::<i64>().map_or(0, |n| n.saturating_mul(10))
}

/// One `<enum>` child of an `ENUM` unit, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumEntry {
    /// Raw value as written in the profile (hex digits).
    pub value: String,
    pub label: String,
}

impl EnumEntry {
    /// The raw value parsed as hex, as the device writes it.
    pub fn raw(&self) -> Option<u64> {
        u64::from_str_radix(self.value.trim(), 16).ok()
    }
}

/// Declaration of one unit of a schema-driven payload.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnitDescriptor {
    /// Bucket the unit belongs to; `None` for an unrecognised class.
    pub class: Option<Class>,
    pub id: String,
    /// Declared type tag, e.g. `WORD` or `TEXT`.
    pub data_type: String,
    pub scale: i64,
    pub label: Option<String>,
    pub range: Option<String>,
    /// Enumeration table, present only for `ENUM` units.
    pub enums: Option<Vec<EnumEntry>>,
}

impl UnitDescriptor {
    fn from_node(unit: roxmltree::Node<'_, '_>) -> Self {
        let class = unit.attribute("class").and_then(|class| match class.parse() {
            Ok(class) => Some(class),
            Err(err) => {
                warn!("Unit {:?}: {err}", unit.attribute("ID"));
                None
            }
        });
        let data_type = unit.attribute("type").unwrap_or_default().to_string();
        let enums = (data_type == "ENUM").then(|| {
            unit.descendants()
                .skip(1)
                .filter(|node| node.has_tag_name("enum"))
                .map(|node| EnumEntry {
                    value: node.attribute("value").unwrap_or_default().to_string(),
                    label: node.attribute("label").unwrap_or_default().to_string(),
                })
                .collect()
        });

        UnitDescriptor {
            class,
            id: unit.attribute("ID").unwrap_or_default().to_string(),
            data_type,
            scale: convert_scale(Some(unit.attribute("scale").unwrap_or(DEFAULT_SCALE))),
            label: unit.attribute("label").map(str::to_string),
            range: unit.attribute("range").map(str::to_string),
            enums,
        }
    }
}

/// A parsed `<profile>` document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Profile {
    pub model: Option<String>,
    pub profile_version: Option<String>,
    pub voxp_version: Option<String>,
    pub text_encoding: Option<String>,
    /// Every unit in document order.
    pub units: Vec<UnitDescriptor>,
}

impl Profile {
    /// Parses profile markup.
    ///
    /// # Errors
    ///
    /// * [`Error::SchemaParse`] if the markup is not well-formed XML.
    pub fn parse(text: &str) -> Result<Self> {
        let document = roxmltree::Document::parse(text)?;
        let root = document.root_element();
        let attribute = |name: &str| root.attribute(name).map(str::to_string);

        let units = root
            .descendants()
            .skip(1)
            .filter(|node| node.has_tag_name("unit"))
            .map(UnitDescriptor::from_node)
            .collect();

        Ok(Profile {
            model: attribute("model"),
            profile_version: attribute("profileVersion"),
            voxp_version: attribute("voxpVersion"),
            text_encoding: attribute("textEncoding"),
            units,
        })
    }

    /// Units of one bucket in declaration order.
    pub fn units_of(&self, class: Class) -> impl Iterator<Item = &UnitDescriptor> {
        self.units
            .iter()
            .filter(move |unit| unit.class == Some(class))
    }
}

/// A `<data>` package: one chunk of a bucket's hex payload.
///
/// CRC and message id are carried along but not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DataBlock {
    pub class: Option<Class>,
    pub crc: Option<String>,
    pub msg_id: Option<String>,
    pub payload: String,
}

impl DataBlock {
    /// # Errors
    ///
    /// * [`Error::SchemaParse`] if the markup is not well-formed XML.
    pub fn parse(text: &str) -> Result<Self> {
        let document = roxmltree::Document::parse(text)?;
        let root = document.root_element();
        let class = root.attribute("class").and_then(|class| class.parse().ok());
        if class.is_none() {
            warn!(
                "Data block msgID={:?} has unknown class {:?}",
                root.attribute("msgID"),
                root.attribute("class")
            );
        }
        Ok(DataBlock {
            class,
            crc: root.attribute("crc").map(str::to_string),
            msg_id: root.attribute("msgID").map(str::to_string),
            payload: root.text().unwrap_or_default().trim().to_string(),
        })
    }
}

/// A profile together with the data blocks captured after it.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Capture {
    pub profile: Profile,
    pub blocks: Vec<DataBlock>,
}

impl Capture {
    /// Splits a capture into packages and parses them.
    ///
    /// The first package starting with `<profile` is the profile; every other
    /// package is a data block.
    ///
    /// # Errors
    ///
    /// * [`Error::MissingProfile`] if no package is a profile.
    /// * [`Error::SchemaParse`] if any package is malformed.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.replace("\r\n", "\n");
        let mut packages: Vec<&str> = text
            .split(PACKAGE_SEPARATOR)
            .map(str::trim)
            .filter(|package| !package.is_empty())
            .collect();

        let position = packages
            .iter()
            .position(|package| package.starts_with("<profile"))
            .ok_or(Error::MissingProfile)?;
        let profile = Profile::parse(packages.remove(position))?;
        let blocks = packages
            .into_iter()
            .map(DataBlock::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Capture { profile, blocks })
    }

    /// Concatenates block payloads per bucket, in block order.
    pub fn payloads(&self) -> Classified<String> {
        let mut payloads = Classified::<String>::default();
        for block in &self.blocks {
            if let Some(class) = block.class {
                payloads.get_mut(class).push_str(&block.payload);
            }
        }
        payloads
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert_matches::assert_matches;

    pub(crate) const PROFILE: &str = r#"<profile model="V500" profileVersion="3" voxpVersion="1" textEncoding="ASCII">
  <units>
    <unit class="setting" ID="MODE" type="ENUM" scale="0" label="Mode">
      <enum value="01" label="VCV"/>
      <enum value="0A" label="PCV"/>
    </unit>
    <unit class="setting" ID="VT" type="UWORD" scale="E+1" label="Tidal volume" range="20-2000"/>
    <unit class="monitor" ID="PEEP" type="WORD" scale="0" label="PEEP"/>
    <unit class="monitor" ID="NAME" type="TEXT" scale="0" label="Patient"/>
    <unit class="monitor" ID="MV" type="UINT" label="Minute volume"/>
    <unit class="alarm" ID="APNEA" type="BOOL" scale="0" label="Apnea"/>
    <unit class="service" ID="HOURS" type="UINT" label="Hours"/>
  </units>
</profile>"#;

    #[test]
    fn scale_conversion() {
        assert_eq!(convert_scale(Some("E+2")), 20);
        assert_eq!(convert_scale(Some("2")), 20);
        assert_eq!(convert_scale(Some("1")), 10);
        assert_eq!(convert_scale(Some("0")), 0);
        assert_eq!(convert_scale(Some("E-2")), 0);
        assert_eq!(convert_scale(Some("0.1")), 0);
        assert_eq!(convert_scale(Some("garbage")), 0);
        assert_eq!(convert_scale(None), 0);
    }

    #[test]
    fn parse_profile_units() {
        let profile = Profile::parse(PROFILE).unwrap();
        assert_eq!(profile.model.as_deref(), Some("V500"));
        assert_eq!(profile.profile_version.as_deref(), Some("3"));
        assert_eq!(profile.voxp_version.as_deref(), Some("1"));
        assert_eq!(profile.text_encoding.as_deref(), Some("ASCII"));

        let ids: Vec<_> = profile.units.iter().map(|unit| unit.id.as_str()).collect();
        assert_eq!(ids, ["MODE", "VT", "PEEP", "NAME", "MV", "APNEA", "HOURS"]);

        let mode = &profile.units[0];
        assert_eq!(mode.class, Some(Class::Setting));
        assert_eq!(
            mode.enums.as_deref(),
            Some(
                &[
                    EnumEntry {
                        value: "01".into(),
                        label: "VCV".into()
                    },
                    EnumEntry {
                        value: "0A".into(),
                        label: "PCV".into()
                    },
                ][..]
            )
        );
        assert_eq!(mode.enums.as_ref().unwrap()[1].raw(), Some(10));

        let vt = &profile.units[1];
        assert_eq!(vt.scale, 10);
        assert_eq!(vt.range.as_deref(), Some("20-2000"));
        assert_eq!(vt.enums, None);

        // A missing scale reads as "1".
        assert_eq!(profile.units[4].scale, 10);
        assert_eq!(profile.units[6].class, None);
    }

    #[test]
    fn units_by_class() {
        let profile = Profile::parse(PROFILE).unwrap();
        let monitor: Vec<_> = profile
            .units_of(Class::Monitor)
            .map(|unit| unit.id.as_str())
            .collect();
        assert_eq!(monitor, ["PEEP", "NAME", "MV"]);
        assert_eq!(profile.units_of(Class::Alarm).count(), 1);
    }

    #[test]
    fn malformed_profile() {
        assert_matches!(
            Profile::parse("<profile><unit ID=\"A\"></profile>"),
            Err(Error::SchemaParse(..))
        );
    }

    #[test]
    fn parse_data_block() {
        let block =
            DataBlock::parse(r#"<data class="monitor" crc="1A2B" msgID="7"> 0001FFFE </data>"#)
                .unwrap();
        assert_eq!(block.class, Some(Class::Monitor));
        assert_eq!(block.crc.as_deref(), Some("1A2B"));
        assert_eq!(block.msg_id.as_deref(), Some("7"));
        assert_eq!(block.payload, "0001FFFE");
    }

    #[test]
    fn capture_split_and_concatenation() {
        let capture = format!(
            "<data class=\"monitor\" crc=\"0\" msgID=\"1\">AB</data>\r\n\r\n\r\n{PROFILE}\n\n\n\
             <data class=\"monitor\" crc=\"0\" msgID=\"2\">CD</data>\n\n\n\
             <data class=\"alarm\" crc=\"0\" msgID=\"3\">01</data>\n\n\n"
        );
        let capture = Capture::parse(&capture).unwrap();
        assert_eq!(capture.profile.units.len(), 7);
        assert_eq!(capture.blocks.len(), 3);

        let payloads = capture.payloads();
        assert_eq!(payloads.monitor, "ABCD");
        assert_eq!(payloads.alarm, "01");
        assert_eq!(payloads.setting, "");
    }

    #[test]
    fn capture_without_profile() {
        assert_matches!(
            Capture::parse("<data class=\"alarm\">00</data>"),
            Err(Error::MissingProfile)
        );
    }
}
