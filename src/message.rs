// AccelLog — Phone Messages
//
// Key/value dictionaries exchanged with the phone application.  A serialized
// dictionary is a tuple count followed by one record per tuple:
//
//   count: u8
//   key: u32 LE | type: u8 | length: u16 LE | value[length]
//
// Integer values are little-endian.  The messages the watch sends are
// described by `OutboundMessage`.

use core::fmt;

use heapless::Vec;

use crate::config::*;
use crate::events::Sample;

/// Maximum number of tuples in one dictionary.
pub const MAX_TUPLES: usize = 8;

/// Largest byte/string payload a tuple can carry (bounded by the inbox).
pub const MAX_VALUE_LEN: usize = INBOX_SIZE;

const HEADER_LEN: usize = 1;
const TUPLE_HEADER_LEN: usize = 4 + 1 + 2;

/// Logging records that fit one outbox next to the type and tag tuples.
pub const LOG_RECORDS_PER_MESSAGE: usize =
    (OUTBOX_SIZE - HEADER_LEN - 2 * (TUPLE_HEADER_LEN + 2) - TUPLE_HEADER_LEN) / Sample::RECORD_SIZE;

const TYPE_BYTES: u8 = 0;
const TYPE_CSTRING: u8 = 1;
const TYPE_UINT: u8 = 2;
const TYPE_INT: u8 = 3;

// ---------------------------------------------------------------------------
// Result codes
// ---------------------------------------------------------------------------

/// Outcome of a phone-link operation, reported to the sent/failed/dropped
/// callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMessageResult {
    SendTimeout,
    SendRejected,
    NotConnected,
    Busy,
    InvalidArgs,
    BufferOverflow,
    Closed,
    InternalError,
}

impl fmt::Display for AppMessageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SendTimeout => "send timed out",
            Self::SendRejected => "send rejected by peer",
            Self::NotConnected => "phone not connected",
            Self::Busy => "outbox busy",
            Self::InvalidArgs => "invalid arguments",
            Self::BufferOverflow => "message exceeds buffer size",
            Self::Closed => "channel closed",
            Self::InternalError => "internal error",
        };
        f.write_str(text)
    }
}

impl std::error::Error for AppMessageResult {}

/// Failure while building or parsing a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictionaryError {
    NotEnoughStorage,
    Malformed,
}

impl fmt::Display for DictionaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughStorage => f.write_str("not enough storage for dictionary"),
            Self::Malformed => f.write_str("malformed dictionary"),
        }
    }
}

impl std::error::Error for DictionaryError {}

impl From<DictionaryError> for AppMessageResult {
    fn from(e: DictionaryError) -> Self {
        match e {
            DictionaryError::NotEnoughStorage => Self::BufferOverflow,
            DictionaryError::Malformed => Self::InvalidArgs,
        }
    }
}

// ---------------------------------------------------------------------------
// Tuples
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bytes(Vec<u8, MAX_VALUE_LEN>),
    CString(Vec<u8, MAX_VALUE_LEN>),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Int8(i8),
    Int16(i16),
    Int32(i32),
}

impl Value {
    fn type_code(&self) -> u8 {
        match self {
            Self::Bytes(_) => TYPE_BYTES,
            Self::CString(_) => TYPE_CSTRING,
            Self::Uint8(_) | Self::Uint16(_) | Self::Uint32(_) => TYPE_UINT,
            Self::Int8(_) | Self::Int16(_) | Self::Int32(_) => TYPE_INT,
        }
    }

    fn encoded_len(&self) -> usize {
        match self {
            Self::Bytes(b) | Self::CString(b) => b.len(),
            Self::Uint8(_) | Self::Int8(_) => 1,
            Self::Uint16(_) | Self::Int16(_) => 2,
            Self::Uint32(_) | Self::Int32(_) => 4,
        }
    }

    fn write_to(&self, out: &mut [u8]) {
        match self {
            Self::Bytes(b) | Self::CString(b) => out.copy_from_slice(b),
            Self::Uint8(v) => out[0] = *v,
            Self::Int8(v) => out.copy_from_slice(&v.to_le_bytes()),
            Self::Uint16(v) => out.copy_from_slice(&v.to_le_bytes()),
            Self::Int16(v) => out.copy_from_slice(&v.to_le_bytes()),
            Self::Uint32(v) => out.copy_from_slice(&v.to_le_bytes()),
            Self::Int32(v) => out.copy_from_slice(&v.to_le_bytes()),
        }
    }

    fn read_from(type_code: u8, raw: &[u8]) -> Result<Self, DictionaryError> {
        let bytes = || Vec::from_slice(raw).map_err(|_| DictionaryError::NotEnoughStorage);
        let value = match (type_code, raw.len()) {
            (TYPE_BYTES, _) => Self::Bytes(bytes()?),
            (TYPE_CSTRING, _) => Self::CString(bytes()?),
            (TYPE_UINT, 1) => Self::Uint8(raw[0]),
            (TYPE_UINT, 2) => Self::Uint16(u16::from_le_bytes([raw[0], raw[1]])),
            (TYPE_UINT, 4) => Self::Uint32(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            (TYPE_INT, 1) => Self::Int8(raw[0] as i8),
            (TYPE_INT, 2) => Self::Int16(i16::from_le_bytes([raw[0], raw[1]])),
            (TYPE_INT, 4) => Self::Int32(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            _ => return Err(DictionaryError::Malformed),
        };
        Ok(value)
    }

    /// Integer view of the value, if it is an integer of any width.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Self::Uint8(v) => Some(i32::from(v)),
            Self::Uint16(v) => Some(i32::from(v)),
            Self::Uint32(v) => i32::try_from(v).ok(),
            Self::Int8(v) => Some(i32::from(v)),
            Self::Int16(v) => Some(i32::from(v)),
            Self::Int32(v) => Some(v),
            Self::Bytes(_) | Self::CString(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    pub key: u32,
    pub value: Value,
}

// ---------------------------------------------------------------------------
// Dictionary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    tuples: Vec<Tuple, MAX_TUPLES>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self { tuples: Vec::new() }
    }

    pub fn write(&mut self, key: u32, value: Value) -> Result<(), DictionaryError> {
        self.tuples
            .push(Tuple { key, value })
            .map_err(|_| DictionaryError::NotEnoughStorage)
    }

    pub fn write_int16(&mut self, key: u32, value: i16) -> Result<(), DictionaryError> {
        self.write(key, Value::Int16(value))
    }

    pub fn find(&self, key: u32) -> Option<&Value> {
        self.tuples.iter().find(|t| t.key == key).map(|t| &t.value)
    }

    pub fn tuples(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn serialized_size(&self) -> usize {
        HEADER_LEN
            + self
                .tuples
                .iter()
                .map(|t| TUPLE_HEADER_LEN + t.value.encoded_len())
                .sum::<usize>()
    }

    /// Serialize into `out`, returning the number of bytes written.
    pub fn serialize(&self, out: &mut [u8]) -> Result<usize, DictionaryError> {
        let size = self.serialized_size();
        if size > out.len() {
            return Err(DictionaryError::NotEnoughStorage);
        }

        out[0] = self.tuples.len() as u8;
        let mut pos = HEADER_LEN;
        for tuple in &self.tuples {
            let len = tuple.value.encoded_len();
            out[pos..pos + 4].copy_from_slice(&tuple.key.to_le_bytes());
            out[pos + 4] = tuple.value.type_code();
            out[pos + 5..pos + 7].copy_from_slice(&(len as u16).to_le_bytes());
            pos += TUPLE_HEADER_LEN;
            tuple.value.write_to(&mut out[pos..pos + len]);
            pos += len;
        }
        Ok(pos)
    }

    pub fn deserialize(raw: &[u8]) -> Result<Self, DictionaryError> {
        let (&count, mut rest) = raw.split_first().ok_or(DictionaryError::Malformed)?;
        let mut dict = Self::new();

        for _ in 0..count {
            if rest.len() < TUPLE_HEADER_LEN {
                return Err(DictionaryError::Malformed);
            }
            let key = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]);
            let type_code = rest[4];
            let len = usize::from(u16::from_le_bytes([rest[5], rest[6]]));
            rest = &rest[TUPLE_HEADER_LEN..];
            if rest.len() < len {
                return Err(DictionaryError::Malformed);
            }
            let value = Value::read_from(type_code, &rest[..len])?;
            dict.write(key, value)?;
            rest = &rest[len..];
        }

        if !rest.is_empty() {
            return Err(DictionaryError::Malformed);
        }
        Ok(dict)
    }
}

// ---------------------------------------------------------------------------
// Outbound messages
// ---------------------------------------------------------------------------

/// Messages the watch sends to the phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundMessage<'a> {
    /// One-shot snapshot of the current accelerometer reading.
    SelectSample { x: i16, y: i16, z: i16 },
    /// Logging started.
    StartLogging { sampling_rate: i16, battery_percent: i16 },
    /// Logging stopped.
    StopLogging { battery_percent: i16 },
    /// Whole logging records of the session with `tag`, oldest first.
    LogRecords { tag: i16, records: &'a [u8] },
    /// Every record of the finished session with `tag` has been sent.
    LogFinished { tag: i16 },
}

impl OutboundMessage<'_> {
    pub fn message_type(&self) -> i16 {
        match self {
            Self::SelectSample { .. } => MSG_TYPE_SELECT_SAMPLE,
            Self::StartLogging { .. } => MSG_TYPE_START_LOGGING,
            Self::StopLogging { .. } => MSG_TYPE_STOP_LOGGING,
            Self::LogRecords { .. } => MSG_TYPE_LOG_RECORDS,
            Self::LogFinished { .. } => MSG_TYPE_LOG_FINISHED,
        }
    }

    pub fn to_dictionary(&self) -> Result<Dictionary, DictionaryError> {
        let mut dict = Dictionary::new();
        dict.write_int16(MSG_KEY_TYPE, self.message_type())?;
        match *self {
            Self::SelectSample { x, y, z } => {
                dict.write_int16(MSG_KEY_FIELD_1, x)?;
                dict.write_int16(MSG_KEY_FIELD_2, y)?;
                dict.write_int16(MSG_KEY_FIELD_3, z)?;
            }
            Self::StartLogging { sampling_rate, battery_percent } => {
                dict.write_int16(MSG_KEY_FIELD_1, sampling_rate)?;
                dict.write_int16(MSG_KEY_FIELD_2, battery_percent)?;
            }
            Self::StopLogging { battery_percent } => {
                dict.write_int16(MSG_KEY_FIELD_1, battery_percent)?;
            }
            Self::LogRecords { tag, records } => {
                dict.write_int16(MSG_KEY_FIELD_1, tag)?;
                let records = Vec::from_slice(records).map_err(|_| DictionaryError::NotEnoughStorage)?;
                dict.write(MSG_KEY_RECORDS, Value::Bytes(records))?;
            }
            Self::LogFinished { tag } => {
                dict.write_int16(MSG_KEY_FIELD_1, tag)?;
            }
        }
        Ok(dict)
    }
}
