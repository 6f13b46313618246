//! AMF0 reader for script data
//!
//! Reads the subset of AMF0 that appears in RTMP/FLV data messages:
//!
//! ```text
//! 0x00 - Number (IEEE 754 double)
//! 0x01 - Boolean
//! 0x02 - String (UTF-8, 16-bit length prefix)
//! 0x03 - Object (key-value pairs until 0x000009)
//! 0x05 - Null
//! 0x06 - Undefined
//! 0x08 - ECMA Array (associative array)
//! 0x0A - Strict Array (dense array)
//! 0x0B - Date (double + timezone)
//! 0x0C - Long String (UTF-8, 32-bit length prefix)
//! 0x0D - Unsupported
//! 0x0F - XML Document
//! 0x10 - Typed Object (class name + properties)
//! ```
//!
//! References (0x07) and AMF3 switches (0x11) never carry cue text and are
//! rejected.

use std::collections::HashMap;

use bytes::{Buf, Bytes};

use crate::error::ScriptError;

const MARKER_NUMBER: u8 = 0x00;
const MARKER_BOOLEAN: u8 = 0x01;
const MARKER_STRING: u8 = 0x02;
const MARKER_OBJECT: u8 = 0x03;
const MARKER_NULL: u8 = 0x05;
const MARKER_UNDEFINED: u8 = 0x06;
const MARKER_ECMA_ARRAY: u8 = 0x08;
const MARKER_OBJECT_END: u8 = 0x09;
const MARKER_STRICT_ARRAY: u8 = 0x0A;
const MARKER_DATE: u8 = 0x0B;
const MARKER_LONG_STRING: u8 = 0x0C;
const MARKER_UNSUPPORTED: u8 = 0x0D;
const MARKER_XML_DOCUMENT: u8 = 0x0F;
const MARKER_TYPED_OBJECT: u8 = 0x10;

/// Maximum nesting depth for objects/arrays
const MAX_NESTING_DEPTH: usize = 64;

/// Script data value
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Null,
    Undefined,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Object, ECMA array, or typed object properties
    Object(HashMap<String, ScriptValue>),
    Array(Vec<ScriptValue>),
    /// Milliseconds since Unix epoch
    Date(f64),
}

impl ScriptValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, ScriptValue>> {
        match self {
            ScriptValue::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Property of an object value
    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        self.as_object()?.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }
}

/// Sequential AMF0 reader over one message body
pub struct ScriptReader {
    buf: Bytes,
    depth: usize,
}

impl ScriptReader {
    pub fn new(buf: Bytes) -> Self {
        Self { buf, depth: 0 }
    }

    /// Read the next top-level value, `None` once the body is exhausted
    pub fn next_value(&mut self) -> Result<Option<ScriptValue>, ScriptError> {
        if !self.buf.has_remaining() {
            return Ok(None);
        }
        self.read_value().map(Some)
    }

    fn read_value(&mut self) -> Result<ScriptValue, ScriptError> {
        if self.buf.is_empty() {
            return Err(ScriptError::UnexpectedEof);
        }

        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ScriptError::NestingTooDeep);
        }

        let marker = self.buf.get_u8();
        let result = self.read_marked(marker);
        self.depth -= 1;
        result
    }

    fn read_marked(&mut self, marker: u8) -> Result<ScriptValue, ScriptError> {
        match marker {
            MARKER_NUMBER => Ok(ScriptValue::Number(self.read_f64()?)),
            MARKER_BOOLEAN => {
                self.need(1)?;
                Ok(ScriptValue::Boolean(self.buf.get_u8() != 0))
            }
            MARKER_STRING => Ok(ScriptValue::String(self.read_utf8()?)),
            MARKER_LONG_STRING | MARKER_XML_DOCUMENT => {
                Ok(ScriptValue::String(self.read_utf8_long()?))
            }
            MARKER_OBJECT => Ok(ScriptValue::Object(self.read_properties()?)),
            MARKER_TYPED_OBJECT => {
                let _class_name = self.read_utf8()?;
                Ok(ScriptValue::Object(self.read_properties()?))
            }
            MARKER_ECMA_ARRAY => {
                self.need(4)?;
                // Count hint, not always accurate
                let _count = self.buf.get_u32();
                Ok(ScriptValue::Object(self.read_properties()?))
            }
            MARKER_STRICT_ARRAY => {
                self.need(4)?;
                let count = self.buf.get_u32() as usize;
                let mut elements = Vec::with_capacity(count.min(1024));
                for _ in 0..count {
                    elements.push(self.read_value()?);
                }
                Ok(ScriptValue::Array(elements))
            }
            MARKER_DATE => {
                let millis = self.read_f64()?;
                self.need(2)?;
                let _timezone = self.buf.get_i16();
                Ok(ScriptValue::Date(millis))
            }
            MARKER_NULL => Ok(ScriptValue::Null),
            MARKER_UNDEFINED | MARKER_UNSUPPORTED => Ok(ScriptValue::Undefined),
            other => Err(ScriptError::UnknownMarker(other)),
        }
    }

    /// Key-value pairs up to the empty key + object end marker
    fn read_properties(&mut self) -> Result<HashMap<String, ScriptValue>, ScriptError> {
        let mut properties = HashMap::new();

        loop {
            let key = self.read_utf8()?;
            if key.is_empty() {
                // Some encoders omit the end marker; treat the empty key as the end
                if self.buf.has_remaining() && self.buf[0] == MARKER_OBJECT_END {
                    self.buf.advance(1);
                }
                break;
            }

            let value = self.read_value()?;
            properties.insert(key, value);
        }

        Ok(properties)
    }

    fn need(&self, n: usize) -> Result<(), ScriptError> {
        if self.buf.remaining() < n {
            Err(ScriptError::UnexpectedEof)
        } else {
            Ok(())
        }
    }

    fn read_f64(&mut self) -> Result<f64, ScriptError> {
        self.need(8)?;
        Ok(self.buf.get_f64())
    }

    fn read_utf8(&mut self) -> Result<String, ScriptError> {
        self.need(2)?;
        let len = self.buf.get_u16() as usize;
        self.read_utf8_bytes(len)
    }

    fn read_utf8_long(&mut self) -> Result<String, ScriptError> {
        self.need(4)?;
        let len = self.buf.get_u32() as usize;
        self.read_utf8_bytes(len)
    }

    fn read_utf8_bytes(&mut self, len: usize) -> Result<String, ScriptError> {
        self.need(len)?;
        let bytes = self.buf.copy_to_bytes(len);
        String::from_utf8(bytes.to_vec()).map_err(|_| ScriptError::InvalidUtf8)
    }
}
