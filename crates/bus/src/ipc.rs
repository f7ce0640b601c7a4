//! Text framing for messages crossing the host/client IPC channel.
//!
//! A frame is `__bwv:` followed by a JSON array whose first element is the
//! message type and whose remaining elements are positional arguments.
//! Batch bytes travel base64-encoded.

use crate::{ClientMessage, HostMessage};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use core_types::ComponentId;
use serde_json::{Value, json};
use std::fmt;

pub const MESSAGE_PREFIX: &str = "__bwv:";

#[derive(Debug)]
pub enum IpcError {
    Json(serde_json::Error),
    Base64(base64::DecodeError),
    UnsupportedMessage(String),
    BadArguments {
        message_type: String,
        reason: &'static str,
    },
}

impl fmt::Display for IpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpcError::Json(err) => write!(f, "malformed IPC payload: {err}"),
            IpcError::Base64(err) => write!(f, "malformed base64 batch: {err}"),
            IpcError::UnsupportedMessage(ty) => write!(f, "unsupported IPC message type '{ty}'"),
            IpcError::BadArguments {
                message_type,
                reason,
            } => write!(f, "bad arguments for {message_type}: {reason}"),
        }
    }
}

impl std::error::Error for IpcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IpcError::Json(err) => Some(err),
            IpcError::Base64(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for IpcError {
    fn from(err: serde_json::Error) -> Self {
        IpcError::Json(err)
    }
}

impl From<base64::DecodeError> for IpcError {
    fn from(err: base64::DecodeError) -> Self {
        IpcError::Base64(err)
    }
}

fn frame(message_type: &str, args: Vec<Value>) -> String {
    let mut items = Vec::with_capacity(args.len() + 1);
    items.push(Value::String(message_type.to_string()));
    items.extend(args);
    format!("{MESSAGE_PREFIX}{}", Value::Array(items))
}

/// Split a frame into its message type and arguments. Frames without the
/// prefix are not IPC traffic and yield `None`.
pub fn parse_frame(text: &str) -> Result<Option<(String, Vec<Value>)>, IpcError> {
    let Some(body) = text.strip_prefix(MESSAGE_PREFIX) else {
        return Ok(None);
    };
    let mut items: Vec<Value> = serde_json::from_str(body)?;
    if items.is_empty() {
        return Err(IpcError::BadArguments {
            message_type: String::new(),
            reason: "empty message array",
        });
    }
    let message_type = match items.remove(0) {
        Value::String(ty) => ty,
        _ => {
            return Err(IpcError::BadArguments {
                message_type: String::new(),
                reason: "message type must be a string",
            });
        }
    };
    Ok(Some((message_type, items)))
}

struct Args<'a> {
    message_type: &'a str,
    values: &'a [Value],
}

impl Args<'_> {
    fn bad(&self, reason: &'static str) -> IpcError {
        IpcError::BadArguments {
            message_type: self.message_type.to_string(),
            reason,
        }
    }

    fn u64(&self, index: usize, reason: &'static str) -> Result<u64, IpcError> {
        self.values
            .get(index)
            .and_then(Value::as_u64)
            .ok_or_else(|| self.bad(reason))
    }

    fn str(&self, index: usize, reason: &'static str) -> Result<&str, IpcError> {
        self.values
            .get(index)
            .and_then(Value::as_str)
            .ok_or_else(|| self.bad(reason))
    }
}

pub fn decode_host_message(text: &str) -> Result<Option<HostMessage>, IpcError> {
    let Some((message_type, values)) = parse_frame(text)? else {
        return Ok(None);
    };
    let args = Args {
        message_type: &message_type,
        values: &values,
    };
    let message = match message_type.as_str() {
        "AttachToDocument" => {
            let component_id = args.u64(0, "component id must be an integer")?;
            let component_id = u32::try_from(component_id)
                .map_err(|_| args.bad("component id out of range"))?;
            HostMessage::AttachToDocument {
                component_id: ComponentId(component_id),
                selector: args.str(1, "selector must be a string")?.to_string(),
            }
        }
        "RenderBatch" => HostMessage::RenderBatch {
            batch_id: args.u64(0, "batch id must be an integer")?,
            bytes: STANDARD.decode(args.str(1, "batch must be a base64 string")?)?,
        },
        "NotifyUnhandledException" => HostMessage::NotifyUnhandledException {
            message: args.str(0, "message must be a string")?.to_string(),
            stack: values.get(1).and_then(Value::as_str).map(str::to_string),
        },
        _ => return Err(IpcError::UnsupportedMessage(message_type.clone())),
    };
    log::trace!(target: "bus.ipc", "received {message_type}");
    Ok(Some(message))
}

pub fn encode_host_message(message: &HostMessage) -> String {
    match message {
        HostMessage::AttachToDocument {
            component_id,
            selector,
        } => frame("AttachToDocument", vec![json!(component_id.0), json!(selector)]),
        HostMessage::RenderBatch { batch_id, bytes } => frame(
            "RenderBatch",
            vec![json!(batch_id), json!(STANDARD.encode(bytes))],
        ),
        HostMessage::NotifyUnhandledException { message, stack } => {
            frame("NotifyUnhandledException", vec![json!(message), json!(stack)])
        }
    }
}

pub fn encode_client_message(message: &ClientMessage) -> Result<String, IpcError> {
    Ok(match message {
        ClientMessage::OnRenderCompleted { batch_id, error } => {
            frame("OnRenderCompleted", vec![json!(batch_id), json!(error)])
        }
        ClientMessage::DispatchBrowserEvent { descriptor, args } => frame(
            "DispatchBrowserEvent",
            vec![serde_json::to_value(descriptor)?, args.clone()],
        ),
    })
}
