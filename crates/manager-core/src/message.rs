//! Incoming manager packets
//!
//! The server speaks in packets: blocks of `Key: Value` lines ended by an
//! empty line. A packet whose first meaningful key is `Response` answers a
//! pending action; one whose key is `Event` is unsolicited.

use crate::error::{ManagerError, Result};

/// Outcome reported in a response packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// The action was accepted
    Success,
    /// The action was rejected
    Error,
}

/// A response packet answering a previously sent action
#[derive(Debug, Clone)]
pub struct ManagerResponse {
    /// Success or Error
    pub status: ResponseStatus,
    /// Correlation ID echoed back by the server, if any
    pub action_id: Option<String>,
    /// Human-readable detail supplied by the server, if any
    pub message: Option<String>,
    /// All key/value pairs of the packet, in wire order
    pub fields: Vec<(String, String)>,
}

impl ManagerResponse {
    /// The server-supplied reason string, or a placeholder when absent
    pub fn reason(&self) -> &str {
        self.message.as_deref().unwrap_or("no reason given")
    }
}

/// An unsolicited event packet
#[derive(Debug, Clone)]
pub struct ManagerEvent {
    /// Event name, e.g. `OriginateResponse`
    pub name: String,
    /// All key/value pairs of the packet, in wire order
    pub fields: Vec<(String, String)>,
}

/// Any packet read off the wire
#[derive(Debug, Clone)]
pub enum Packet {
    /// Answer to a pending action
    Response(ManagerResponse),
    /// Unsolicited event
    Event(ManagerEvent),
}

impl Packet {
    /// Parse one packet from its already-split lines (no trailing CR/LF,
    /// no terminating empty line).
    ///
    /// Lines without a `:` separator are tolerated and skipped; servers
    /// occasionally emit free-form text inside a packet.
    pub fn parse(lines: &[String]) -> Result<Packet> {
        let mut fields = Vec::with_capacity(lines.len());
        for line in lines {
            if let Some((key, value)) = line.split_once(':') {
                fields.push((key.trim().to_string(), value.trim().to_string()));
            } else {
                tracing::trace!(line = %line, "skipping keyless line in packet");
            }
        }

        if let Some(name) = lookup(&fields, "Event") {
            return Ok(Packet::Event(ManagerEvent {
                name: name.to_string(),
                fields,
            }));
        }

        let Some(raw_status) = lookup(&fields, "Response") else {
            return Err(ManagerError::protocol(
                "packet is neither a response nor an event",
            ));
        };
        let status = match raw_status {
            "Success" => ResponseStatus::Success,
            "Error" => ResponseStatus::Error,
            other => {
                return Err(ManagerError::protocol(format!(
                    "unknown response status: {other}"
                )))
            }
        };
        let action_id = lookup(&fields, "ActionID").map(str::to_string);
        let message = lookup(&fields, "Message").map(str::to_string);
        Ok(Packet::Response(ManagerResponse {
            status,
            action_id,
            message,
            fields,
        }))
    }
}

fn lookup<'a>(fields: &'a [(String, String)], key: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}
