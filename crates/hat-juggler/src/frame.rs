//! Wire frames.
//!
//! Every frame is a JSON object `{"type": ..., "payload": ...}`:
//!
//! - `DATA` carries a JSON Patch for the receiver's mirror of the sender's
//!   value
//! - `MESSAGE` carries any JSON value for the application
//!
//! Any other shape is a protocol violation.

use hat_json_patch::{from_json_patch, to_json_patch, Patch};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::JugglerError;

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Data(Patch),
    Message(Value),
}

/// On-the-wire shape. Patch operations go through the hand-written codec.
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
enum WireFrame {
    #[serde(rename = "DATA")]
    Data(Value),
    #[serde(rename = "MESSAGE")]
    Message(Option<Value>),
}

impl Frame {
    pub fn to_value(&self) -> Value {
        let wire = match self {
            Frame::Data(patch) => WireFrame::Data(to_json_patch(patch)),
            Frame::Message(payload) => WireFrame::Message(Some(payload.clone())),
        };
        serde_json::to_value(wire).unwrap_or(Value::Null)
    }

    pub fn encode(&self) -> String {
        self.to_value().to_string()
    }

    pub fn from_value(value: Value) -> Result<Self, JugglerError> {
        let wire: WireFrame =
            serde_json::from_value(value).map_err(|e| JugglerError::Protocol(e.to_string()))?;
        match wire {
            WireFrame::Data(payload) => from_json_patch(&payload)
                .map(Frame::Data)
                .map_err(|e| JugglerError::Protocol(format!("bad DATA payload: {e}"))),
            WireFrame::Message(payload) => Ok(Frame::Message(payload.unwrap_or(Value::Null))),
        }
    }

    /// Parses a text frame. Anything that is not a well-formed frame is a
    /// [`JugglerError::Protocol`].
    pub fn decode(text: &str) -> Result<Self, JugglerError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| JugglerError::Protocol(e.to_string()))?;
        Self::from_value(value)
    }
}
