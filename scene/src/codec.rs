//! JSON wire codec for the playhouse protocol.
//!
//! Every message is a JSON object discriminated by its `t` field:
//!
//! - client → server: one of the five [`Action`] shapes
//! - server → one client, once, on connect: `{"t":"initState","s":<Document>}`
//! - server → every client: the accepted action text, verbatim
//! - server → sender only: `{"t":"rejected","code":..,"message":..}`
//!
//! Decoding reads the discriminator first so an unknown `t` is reported as
//! [`CodecError::UnknownTag`] rather than lumped in with malformed payloads.

#[cfg(test)]
#[path = "codec_test.rs"]
mod codec_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{ACTION_TAGS, Action};
use crate::model::Document;

/// Discriminator of the initial snapshot message.
pub const INIT_STATE_TAG: &str = "initState";

/// Discriminator of the sender-only rejection notice.
pub const REJECTED_TAG: &str = "rejected";

/// Error returned by the decode and encode functions.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("message has no string `t` discriminator")]
    MissingTag,
    #[error("unknown message type: {0}")]
    UnknownTag(String),
}

impl crate::ErrorCode for CodecError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "E_MALFORMED",
            Self::MissingTag => "E_MISSING_TAG",
            Self::UnknownTag(_) => "E_UNKNOWN_TAG",
        }
    }
}

/// Snapshot sent exactly once to a session before any action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitMsg {
    pub s: Document,
}

/// Notice that the sender's action was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejected {
    pub code: String,
    pub message: String,
}

/// Server-originated messages that are not actions.
#[derive(Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "camelCase")]
enum Notice {
    InitState(InitMsg),
    Rejected(Rejected),
}

/// Anything the server may send to a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMsg {
    Init(InitMsg),
    Action(Action),
    Rejected(Rejected),
}

fn tag_of(value: &Value) -> Result<&str, CodecError> {
    value.get("t").and_then(Value::as_str).ok_or(CodecError::MissingTag)
}

/// Decode a client → server action.
///
/// # Errors
///
/// Returns [`CodecError::UnknownTag`] for a `t` that is not an action,
/// [`CodecError::MissingTag`] when there is no `t`, and
/// [`CodecError::Malformed`] for invalid JSON or bad fields.
pub fn decode_action(text: &str) -> Result<Action, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let tag = tag_of(&value)?;
    if !ACTION_TAGS.contains(&tag) {
        return Err(CodecError::UnknownTag(tag.to_owned()));
    }
    Ok(serde_json::from_value(value)?)
}

/// Encode an action for the wire.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if serialization fails.
pub fn encode_action(action: &Action) -> Result<String, CodecError> {
    Ok(serde_json::to_string(action)?)
}

/// Decode any server → client message.
///
/// # Errors
///
/// Same taxonomy as [`decode_action`].
pub fn decode_server_msg(text: &str) -> Result<ServerMsg, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let tag = tag_of(&value)?;
    if ACTION_TAGS.contains(&tag) {
        return Ok(ServerMsg::Action(serde_json::from_value(value)?));
    }
    if tag != INIT_STATE_TAG && tag != REJECTED_TAG {
        return Err(CodecError::UnknownTag(tag.to_owned()));
    }
    match serde_json::from_value(value)? {
        Notice::InitState(init) => Ok(ServerMsg::Init(init)),
        Notice::Rejected(rejected) => Ok(ServerMsg::Rejected(rejected)),
    }
}

/// Encode a server → client message.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if serialization fails.
pub fn encode_server_msg(msg: &ServerMsg) -> Result<String, CodecError> {
    let text = match msg {
        ServerMsg::Init(init) => serde_json::to_string(&Notice::InitState(init.clone()))?,
        ServerMsg::Action(action) => serde_json::to_string(action)?,
        ServerMsg::Rejected(rejected) => serde_json::to_string(&Notice::Rejected(rejected.clone()))?,
    };
    Ok(text)
}

/// Build the `initState` message for a document snapshot.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if serialization fails.
pub fn encode_init(doc: &Document) -> Result<String, CodecError> {
    encode_server_msg(&ServerMsg::Init(InitMsg { s: doc.clone() }))
}

/// Build a rejection notice from any coded error.
///
/// # Errors
///
/// Returns [`CodecError::Malformed`] if serialization fails.
pub fn encode_rejected(err: &(impl crate::ErrorCode + ?Sized)) -> Result<String, CodecError> {
    let rejected = Rejected { code: err.error_code().to_owned(), message: err.to_string() };
    encode_server_msg(&ServerMsg::Rejected(rejected))
}
