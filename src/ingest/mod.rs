//! Cue ingestion from RTMP/FLV script data
//!
//! Players that consume RTMP or HTTP-FLV surface timed metadata as script
//! data messages (type 18) rather than timed-text cues. This module pulls the
//! cue text out of those messages so it can go through the same decoder.
//!
//! Recognized handlers:
//!
//! ```text
//! onTextData  { text: "<cue>" , ... }
//! onCuePoint  { name: "...", parameters: { text: "<cue>" } }
//! @setDataFrame wrapping either of the above
//! ```
//!
//! Every other handler (`onMetaData`, `onFI`, ...) carries no cue.

pub mod amf0;

use bytes::Bytes;

use crate::error::ScriptError;

pub use amf0::{ScriptReader, ScriptValue};

const SET_DATA_FRAME: &str = "@setDataFrame";
const ON_TEXT_DATA: &str = "onTextData";
const ON_CUE_POINT: &str = "onCuePoint";

/// Extract cue text from one script data body
///
/// Returns `Ok(None)` for well-formed messages that carry no cue.
pub fn extract_cue(body: Bytes) -> Result<Option<String>, ScriptError> {
    let mut reader = ScriptReader::new(body);

    let mut handler = read_handler(&mut reader)?;
    if handler == SET_DATA_FRAME {
        handler = read_handler(&mut reader)?;
    }

    let text = match handler.as_str() {
        ON_TEXT_DATA => match reader.next_value()? {
            Some(ScriptValue::String(text)) => Some(text),
            Some(arg) => arg.get_str("text").map(str::to_string),
            None => None,
        },
        ON_CUE_POINT => reader.next_value()?.and_then(|arg| {
            arg.get("parameters")
                .and_then(|p| p.get_str("text"))
                .or_else(|| arg.get_str("name"))
                .map(str::to_string)
        }),
        _ => None,
    };

    Ok(text)
}

fn read_handler(reader: &mut ScriptReader) -> Result<String, ScriptError> {
    match reader.next_value()? {
        Some(ScriptValue::String(name)) => Ok(name),
        _ => Err(ScriptError::NotAHandler),
    }
}
