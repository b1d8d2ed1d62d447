//! Decoders for bedside patient-monitor telemetry.
//!
//! Two device protocols are supported:
//!
//! 1.  **Fixed layout**: every field sits at a known byte offset. See
//!     [`protocol::Frame::decode`]. The decoded parameters can then be
//!     labelled by a [`rules::RuleSet`], which rewrites value words with the
//!     clinical meaning of their parameter code.
//!
//! 2.  **Schema driven**: a `<profile>` document declares the type, scale and
//!     enumeration of every unit, and hex payloads of `<data>` blocks are
//!     decoded against it. See [`profile::Capture`] and [`decoder`].
//!
//! ## Features
//!
//! - `serde` (default): derives `Serialize` on decoded records and enables
//!   loading rule sets from YAML with [`rules::RuleSet::from_yaml_str`].
//!
//! The library logs through the [`log`] facade and never installs a logger.
//!
//! ## Quick Start
//!
//! ```
//! use bedside_lib::{protocol::Frame, rules::RuleSet};
//!
//! fn main() -> Result<(), bedside_lib::Error> {
//!     // Header, status block announcing one parameter, and the parameter
//!     // itself with parameter code 58.
//!     let mut bytes = vec![0u8; 66 + 57];
//!     bytes[64] = 1;
//!     bytes[67] = 58;
//!
//!     let mut frame = Frame::decode(&bytes)?;
//!     RuleSet::bedside_defaults().tag_frame(&mut frame);
//!     assert_eq!(frame.parameters[0].par_udp.par_val[0], "HR");
//!     Ok(())
//! }
//! ```
//!
//! Decoding a schema-driven capture:
//!
//! ```
//! use bedside_lib::{codec::DecodedValue, decoder, profile::Capture};
//!
//! fn main() -> Result<(), bedside_lib::Error> {
//!     let capture = Capture::parse(concat!(
//!         r#"<profile><unit class="monitor" ID="HR" type="UWORD" scale="0"/></profile>"#,
//!         "\n\n\n",
//!         r#"<data class="monitor" crc="0" msgID="1">0048</data>"#,
//!     ))?;
//!     let decoded = decoder::decode_capture(&capture)?;
//!     assert_eq!(decoded.monitor.get("HR").map(|unit| &unit.value), Some(&DecodedValue::Int(72)));
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;
pub mod decoder;
mod error;
pub mod path;
pub mod profile;
pub mod protocol;
pub mod rules;

pub use error::{Error, Result};
