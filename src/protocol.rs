//! Fixed-layout bedside monitor protocol.
//!
//! A frame is a 60 byte [`Header`], a 6 byte [`StatusBlock`] and
//! `number_of_parameters` consecutive 57 byte [`Parameter`] records. All
//! multi-byte integers are little-endian.
//!
//! ```text
//! [0, 60)   header
//! [60, 66)  status block
//! [66, ..)  parameters, 57 bytes each
//! ```

use crate::path::{indexed, indexed_mut, Field, FieldMut, Navigate, Segment, Slot, Value};
use crate::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};
use std::fmt;

pub const HEADER_LEN: usize = 60;
pub const STATUS_LEN: usize = 6;
pub const PARAMETERS_OFFSET: usize = HEADER_LEN + STATUS_LEN;
pub const PARAMETER_LEN: usize = 57;

const PARAMETER_UPDATE_LEN: usize = 10;
const EXTENDED_PARAMETER_UPDATE_LEN: usize = 14;
const SETUP_AND_LIMITS_LEN: usize = 18;
const PARAMETER_MESSAGES_LEN: usize = 10;

// Offsets inside a parameter record. The 52 byte body is padded to a
// 2 byte boundary before and after the three classification bytes.
const EXT_OFFSET: usize = PARAMETER_UPDATE_LEN;
const SETUP_OFFSET: usize = EXT_OFFSET + EXTENDED_PARAMETER_UPDATE_LEN;
const MESSAGES_OFFSET: usize = SETUP_OFFSET + SETUP_AND_LIMITS_LEN;
const LEADING_PAD_OFFSET: usize = MESSAGES_OFFSET + PARAMETER_MESSAGES_LEN;
const PAR_TYPE_OFFSET: usize = 53;
const PARCODE_OFFSET: usize = 54;
const POS_OFFSET: usize = 55;
const TRAILING_PAD_OFFSET: usize = 56;

fn check_len(bytes: &[u8], record: &'static str, expected: usize) -> Result<()> {
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(Error::RecordLength {
            record,
            expected,
            actual: bytes.len(),
        })
    }
}

fn array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

fn read_i16s<const N: usize>(bytes: &[u8]) -> [i16; N] {
    let mut out = [0; N];
    LittleEndian::read_i16_into(&bytes[..N * 2], &mut out);
    out
}

fn read_values<const N: usize>(bytes: &[u8]) -> [ParValue; N] {
    read_i16s::<N>(bytes).map(ParValue::from)
}

fn write_values(values: &[ParValue], buf: &mut [u8]) {
    let raw: Vec<i16> = values.iter().map(|value| value.raw).collect();
    LittleEndian::write_i16_into(&raw, &mut buf[..raw.len() * 2]);
}

/// Frame header: addressing and control words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Header {
    pub dst_addr: [u8; 6],
    pub src_addr: [u8; 6],
    pub func_code: i16,
    pub sub_code: i16,
    pub version: i16,
    pub seq_num: i16,
    pub req_res: i16,
    pub proc_id: i16,
    pub oln: [u8; 32],
    pub return_status: i16,
    pub data_count: i16,
}

impl TryFrom<&[u8]> for Header {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != HEADER_LEN {
            return Err(Error::MalformedHeader(bytes.len()));
        }
        let [func_code, sub_code, version, seq_num, req_res, proc_id] = read_i16s::<6>(&bytes[12..24]);
        Ok(Header {
            dst_addr: array(&bytes[0..6]),
            src_addr: array(&bytes[6..12]),
            func_code,
            sub_code,
            version,
            seq_num,
            req_res,
            proc_id,
            oln: array(&bytes[24..56]),
            return_status: LittleEndian::read_i16(&bytes[56..58]),
            data_count: LittleEndian::read_i16(&bytes[58..60]),
        })
    }
}

impl Header {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0; HEADER_LEN];
        buf[0..6].copy_from_slice(&self.dst_addr);
        buf[6..12].copy_from_slice(&self.src_addr);
        LittleEndian::write_i16_into(
            &[
                self.func_code,
                self.sub_code,
                self.version,
                self.seq_num,
                self.req_res,
                self.proc_id,
            ],
            &mut buf[12..24],
        );
        buf[24..56].copy_from_slice(&self.oln);
        LittleEndian::write_i16(&mut buf[56..58], self.return_status);
        LittleEndian::write_i16(&mut buf[58..60], self.data_count);
        buf
    }
}

/// Alarm state and the authoritative parameter count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatusBlock {
    pub alarm_state: u8,
    pub alarm_level: u8,
    pub audio_alarm_level: u8,
    pub patient_admission: u8,
    pub number_of_parameters: u8,
    pub graph_status_msg: u8,
}

impl TryFrom<&[u8]> for StatusBlock {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, "status block", STATUS_LEN)?;
        Ok(StatusBlock {
            alarm_state: bytes[0],
            alarm_level: bytes[1],
            audio_alarm_level: bytes[2],
            patient_admission: bytes[3],
            number_of_parameters: bytes[4],
            graph_status_msg: bytes[5],
        })
    }
}

impl StatusBlock {
    pub fn to_bytes(&self) -> [u8; STATUS_LEN] {
        [
            self.alarm_state,
            self.alarm_level,
            self.audio_alarm_level,
            self.patient_admission,
            self.number_of_parameters,
            self.graph_status_msg,
        ]
    }

    /// Total frame length implied by `number_of_parameters`.
    pub fn frame_len(&self) -> usize {
        PARAMETERS_OFFSET + usize::from(self.number_of_parameters) * PARAMETER_LEN
    }
}

/// A parameter value word together with the label a rule may attach to it.
///
/// The raw word is kept after labelling so that the record still encodes
/// back to the bytes it was decoded from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParValue {
    pub raw: i16,
    pub label: Option<String>,
}

impl ParValue {
    /// The label if one was assigned, otherwise the raw word.
    pub fn value(&self) -> Value {
        match &self.label {
            Some(label) => Value::Text(label.clone()),
            None => Value::from(self.raw),
        }
    }
}

impl From<i16> for ParValue {
    fn from(raw: i16) -> Self {
        ParValue { raw, label: None }
    }
}

impl PartialEq<&str> for ParValue {
    fn eq(&self, other: &&str) -> bool {
        self.label.as_deref() == Some(*other)
    }
}

impl PartialEq<i16> for ParValue {
    fn eq(&self, other: &i16) -> bool {
        self.label.is_none() && self.raw == *other
    }
}

impl fmt::Display for ParValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label}"),
            None => write!(f, "{}", self.raw),
        }
    }
}

impl Slot for ParValue {
    fn assign(&mut self, value: Value) -> Result<()> {
        const EXPECTED: &str = "a label or a 16 bit value word";
        match value {
            Value::Text(label) => self.label = Some(label),
            Value::Int(raw) => {
                self.raw = i16::try_from(raw).map_err(|_| Error::ValueRejected {
                    value: Value::Int(raw),
                    expected: EXPECTED,
                })?;
                self.label = None;
            }
            value @ Value::Float(_) => {
                return Err(Error::ValueRejected {
                    value,
                    expected: EXPECTED,
                })
            }
        }
        Ok(())
    }
}

/// Current values of a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParameterUpdate {
    pub par_func_code: u8,
    pub parcode: u8,
    pub par_status: u16,
    pub par_val: [ParValue; 3],
}

impl TryFrom<&[u8]> for ParameterUpdate {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, "parameter update", PARAMETER_UPDATE_LEN)?;
        Ok(ParameterUpdate {
            par_func_code: bytes[0],
            parcode: bytes[1],
            par_status: LittleEndian::read_u16(&bytes[2..4]),
            par_val: read_values(&bytes[4..10]),
        })
    }
}

impl ParameterUpdate {
    pub fn to_bytes(&self) -> [u8; PARAMETER_UPDATE_LEN] {
        let mut buf = [0; PARAMETER_UPDATE_LEN];
        buf[0] = self.par_func_code;
        buf[1] = self.parcode;
        LittleEndian::write_u16(&mut buf[2..4], self.par_status);
        write_values(&self.par_val, &mut buf[4..10]);
        buf
    }
}

impl Navigate for ParameterUpdate {
    fn field(&self, segment: &Segment) -> Option<Field<'_>> {
        let value = match (segment.name.as_str(), segment.index) {
            ("par_func_code", None) => self.par_func_code.into(),
            ("parcode", None) => self.parcode.into(),
            ("par_status", None) => self.par_status.into(),
            ("par_val", _) => indexed(&self.par_val, segment)?.value(),
            _ => return None,
        };
        Some(Field::Value(value))
    }

    fn field_mut(&mut self, segment: &Segment) -> Option<FieldMut<'_>> {
        match segment.name.as_str() {
            "par_val" => Some(FieldMut::Slot(indexed_mut(&mut self.par_val, segment)?)),
            _ => self.field(segment).map(|_| FieldMut::ReadOnly),
        }
    }
}

/// Additional value words of a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExtendedParameterUpdate {
    pub par_func_code: u8,
    pub par_code: u8,
    pub par_val: [ParValue; 6],
}

impl TryFrom<&[u8]> for ExtendedParameterUpdate {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, "extended parameter update", EXTENDED_PARAMETER_UPDATE_LEN)?;
        Ok(ExtendedParameterUpdate {
            par_func_code: bytes[0],
            par_code: bytes[1],
            par_val: read_values(&bytes[2..14]),
        })
    }
}

impl ExtendedParameterUpdate {
    pub fn to_bytes(&self) -> [u8; EXTENDED_PARAMETER_UPDATE_LEN] {
        let mut buf = [0; EXTENDED_PARAMETER_UPDATE_LEN];
        buf[0] = self.par_func_code;
        buf[1] = self.par_code;
        write_values(&self.par_val, &mut buf[2..14]);
        buf
    }
}

impl Navigate for ExtendedParameterUpdate {
    fn field(&self, segment: &Segment) -> Option<Field<'_>> {
        let value = match (segment.name.as_str(), segment.index) {
            ("par_func_code", None) => self.par_func_code.into(),
            ("par_code", None) => self.par_code.into(),
            ("par_val", _) => indexed(&self.par_val, segment)?.value(),
            _ => return None,
        };
        Some(Field::Value(value))
    }

    fn field_mut(&mut self, segment: &Segment) -> Option<FieldMut<'_>> {
        match segment.name.as_str() {
            "par_val" => Some(FieldMut::Slot(indexed_mut(&mut self.par_val, segment)?)),
            _ => self.field(segment).map(|_| FieldMut::ReadOnly),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LimitValues {
    pub lo_limit: i16,
    pub hi_limit: i16,
}

impl Navigate for LimitValues {
    fn field(&self, segment: &Segment) -> Option<Field<'_>> {
        let value = match (segment.name.as_str(), segment.index) {
            ("lo_limit", None) => self.lo_limit,
            ("hi_limit", None) => self.hi_limit,
            _ => return None,
        };
        Some(Field::Value(value.into()))
    }

    fn field_mut(&mut self, segment: &Segment) -> Option<FieldMut<'_>> {
        self.field(segment).map(|_| FieldMut::ReadOnly)
    }
}

/// Alarm setup and the three limit pairs of a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SetupAndLimits {
    pub par_func_code: u8,
    pub parcode: u8,
    pub flag: [u8; 2],
    pub limit_values: [LimitValues; 3],
    pub extra_limit: i16,
}

impl TryFrom<&[u8]> for SetupAndLimits {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, "setup and limits", SETUP_AND_LIMITS_LEN)?;
        let limits: [i16; 6] = read_i16s(&bytes[4..16]);
        Ok(SetupAndLimits {
            par_func_code: bytes[0],
            parcode: bytes[1],
            flag: [bytes[2], bytes[3]],
            limit_values: [0, 1, 2].map(|i| LimitValues {
                lo_limit: limits[i * 2],
                hi_limit: limits[i * 2 + 1],
            }),
            extra_limit: LittleEndian::read_i16(&bytes[16..18]),
        })
    }
}

impl SetupAndLimits {
    pub fn to_bytes(&self) -> [u8; SETUP_AND_LIMITS_LEN] {
        let mut buf = [0; SETUP_AND_LIMITS_LEN];
        buf[0] = self.par_func_code;
        buf[1] = self.parcode;
        buf[2..4].copy_from_slice(&self.flag);
        let limits: Vec<i16> = self
            .limit_values
            .iter()
            .flat_map(|limit| [limit.lo_limit, limit.hi_limit])
            .collect();
        LittleEndian::write_i16_into(&limits, &mut buf[4..16]);
        LittleEndian::write_i16(&mut buf[16..18], self.extra_limit);
        buf
    }
}

impl Navigate for SetupAndLimits {
    fn field(&self, segment: &Segment) -> Option<Field<'_>> {
        let value = match (segment.name.as_str(), segment.index) {
            ("par_func_code", None) => self.par_func_code.into(),
            ("parcode", None) => self.parcode.into(),
            ("flag", _) => (*indexed(&self.flag, segment)?).into(),
            ("limit_values", _) => {
                return Some(Field::Record(indexed(&self.limit_values, segment)?))
            }
            ("extra_limit", None) => self.extra_limit.into(),
            _ => return None,
        };
        Some(Field::Value(value))
    }

    fn field_mut(&mut self, segment: &Segment) -> Option<FieldMut<'_>> {
        match segment.name.as_str() {
            "limit_values" => Some(FieldMut::Record(indexed_mut(
                &mut self.limit_values,
                segment,
            )?)),
            _ => self.field(segment).map(|_| FieldMut::ReadOnly),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParameterMessage {
    pub attribute: u8,
    pub msg_index: u8,
}

impl Navigate for ParameterMessage {
    fn field(&self, segment: &Segment) -> Option<Field<'_>> {
        let value = match (segment.name.as_str(), segment.index) {
            ("attribute", None) => self.attribute,
            ("msg_index", None) => self.msg_index,
            _ => return None,
        };
        Some(Field::Value(value.into()))
    }

    fn field_mut(&mut self, segment: &Segment) -> Option<FieldMut<'_>> {
        self.field(segment).map(|_| FieldMut::ReadOnly)
    }
}

/// Message attributes shown next to a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParameterMessages {
    pub par_func_code: u8,
    pub parcode: u8,
    pub messages: [ParameterMessage; 3],
    pub value: u16,
}

impl TryFrom<&[u8]> for ParameterMessages {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, "parameter messages", PARAMETER_MESSAGES_LEN)?;
        Ok(ParameterMessages {
            par_func_code: bytes[0],
            parcode: bytes[1],
            messages: [0, 1, 2].map(|i| ParameterMessage {
                attribute: bytes[2 + i * 2],
                msg_index: bytes[3 + i * 2],
            }),
            value: LittleEndian::read_u16(&bytes[8..10]),
        })
    }
}

impl ParameterMessages {
    pub fn to_bytes(&self) -> [u8; PARAMETER_MESSAGES_LEN] {
        let mut buf = [0; PARAMETER_MESSAGES_LEN];
        buf[0] = self.par_func_code;
        buf[1] = self.parcode;
        for (i, message) in self.messages.iter().enumerate() {
            buf[2 + i * 2] = message.attribute;
            buf[3 + i * 2] = message.msg_index;
        }
        LittleEndian::write_u16(&mut buf[8..10], self.value);
        buf
    }
}

impl Navigate for ParameterMessages {
    fn field(&self, segment: &Segment) -> Option<Field<'_>> {
        let value = match (segment.name.as_str(), segment.index) {
            ("par_func_code", None) => self.par_func_code.into(),
            ("parcode", None) => self.parcode.into(),
            ("messages", _) => return Some(Field::Record(indexed(&self.messages, segment)?)),
            ("value", None) => self.value.into(),
            _ => return None,
        };
        Some(Field::Value(value))
    }

    fn field_mut(&mut self, segment: &Segment) -> Option<FieldMut<'_>> {
        match segment.name.as_str() {
            "messages" => Some(FieldMut::Record(indexed_mut(&mut self.messages, segment)?)),
            _ => self.field(segment).map(|_| FieldMut::ReadOnly),
        }
    }
}

/// One 57 byte parameter record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Parameter {
    pub par_udp: ParameterUpdate,
    pub ext_par_udp: ExtendedParameterUpdate,
    pub setup_n_lin: SetupAndLimits,
    pub par_mssg_s: ParameterMessages,
    pub par_type: u8,
    pub parcode: u8,
    pub pos: u8,
    #[cfg_attr(feature = "serde", serde(skip))]
    padding: [u8; 2],
}

impl TryFrom<&[u8]> for Parameter {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        check_len(bytes, "parameter", PARAMETER_LEN)?;
        Ok(Parameter {
            par_udp: ParameterUpdate::try_from(&bytes[..EXT_OFFSET])?,
            ext_par_udp: ExtendedParameterUpdate::try_from(&bytes[EXT_OFFSET..SETUP_OFFSET])?,
            setup_n_lin: SetupAndLimits::try_from(&bytes[SETUP_OFFSET..MESSAGES_OFFSET])?,
            par_mssg_s: ParameterMessages::try_from(&bytes[MESSAGES_OFFSET..LEADING_PAD_OFFSET])?,
            par_type: bytes[PAR_TYPE_OFFSET],
            parcode: bytes[PARCODE_OFFSET],
            pos: bytes[POS_OFFSET],
            padding: [bytes[LEADING_PAD_OFFSET], bytes[TRAILING_PAD_OFFSET]],
        })
    }
}

impl Parameter {
    pub fn to_bytes(&self) -> [u8; PARAMETER_LEN] {
        let mut buf = [0; PARAMETER_LEN];
        buf[..EXT_OFFSET].copy_from_slice(&self.par_udp.to_bytes());
        buf[EXT_OFFSET..SETUP_OFFSET].copy_from_slice(&self.ext_par_udp.to_bytes());
        buf[SETUP_OFFSET..MESSAGES_OFFSET].copy_from_slice(&self.setup_n_lin.to_bytes());
        buf[MESSAGES_OFFSET..LEADING_PAD_OFFSET].copy_from_slice(&self.par_mssg_s.to_bytes());
        buf[LEADING_PAD_OFFSET] = self.padding[0];
        buf[PAR_TYPE_OFFSET] = self.par_type;
        buf[PARCODE_OFFSET] = self.parcode;
        buf[POS_OFFSET] = self.pos;
        buf[TRAILING_PAD_OFFSET] = self.padding[1];
        buf
    }
}

impl Navigate for Parameter {
    fn field(&self, segment: &Segment) -> Option<Field<'_>> {
        let field = match (segment.name.as_str(), segment.index) {
            ("par_udp", None) => Field::Record(&self.par_udp),
            ("ext_par_udp", None) => Field::Record(&self.ext_par_udp),
            ("setup_n_lin", None) => Field::Record(&self.setup_n_lin),
            ("par_mssg_s", None) => Field::Record(&self.par_mssg_s),
            ("par_type", None) => Field::Value(self.par_type.into()),
            ("parcode", None) => Field::Value(self.parcode.into()),
            ("pos", None) => Field::Value(self.pos.into()),
            _ => return None,
        };
        Some(field)
    }

    fn field_mut(&mut self, segment: &Segment) -> Option<FieldMut<'_>> {
        let field = match (segment.name.as_str(), segment.index) {
            ("par_udp", None) => FieldMut::Record(&mut self.par_udp),
            ("ext_par_udp", None) => FieldMut::Record(&mut self.ext_par_udp),
            ("setup_n_lin", None) => FieldMut::Record(&mut self.setup_n_lin),
            ("par_mssg_s", None) => FieldMut::Record(&mut self.par_mssg_s),
            ("par_type" | "parcode" | "pos", None) => FieldMut::ReadOnly,
            _ => return None,
        };
        Some(field)
    }
}

/// A fully decoded fixed-layout frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Frame {
    pub header: Header,
    pub status: StatusBlock,
    pub parameters: Vec<Parameter>,
}

impl Frame {
    /// Decodes a frame from a raw buffer.
    ///
    /// Bytes beyond the last declared parameter are ignored.
    ///
    /// # Errors
    ///
    /// * [`Error::TruncatedBuffer`] if the buffer does not hold the header,
    ///   the status block and every declared parameter.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < PARAMETERS_OFFSET {
            return Err(Error::TruncatedBuffer {
                required: PARAMETERS_OFFSET,
                actual: bytes.len(),
            });
        }
        let header = Header::try_from(&bytes[..HEADER_LEN])?;
        let status = StatusBlock::try_from(&bytes[HEADER_LEN..PARAMETERS_OFFSET])?;

        let required = status.frame_len();
        if bytes.len() < required {
            return Err(Error::TruncatedBuffer {
                required,
                actual: bytes.len(),
            });
        }
        debug!(
            "Decoding {} parameters ({} trailing bytes ignored)",
            status.number_of_parameters,
            bytes.len() - required
        );

        let parameters = bytes[PARAMETERS_OFFSET..required]
            .chunks_exact(PARAMETER_LEN)
            .map(Parameter::try_from)
            .inspect(|parameter| {
                if let Ok(parameter) = parameter {
                    trace!(
                        "Parameter parcode={} par_type={} pos={}",
                        parameter.par_udp.parcode,
                        parameter.par_type,
                        parameter.pos
                    );
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Frame {
            header,
            status,
            parameters,
        })
    }

    /// Encodes the frame; the inverse of [`Frame::decode`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PARAMETERS_OFFSET + self.parameters.len() * PARAMETER_LEN);
        buf.extend_from_slice(&self.header.to_bytes());
        buf.extend_from_slice(&self.status.to_bytes());
        for parameter in &self.parameters {
            buf.extend_from_slice(&parameter.to_bytes());
        }
        buf
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Frame::decode(bytes)
    }
}
