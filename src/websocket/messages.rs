//! WebSocket Message Types
//!
//! Messages exchanged with site pages listening for content changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{ChangeEvent, ChangeOrigin};

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected { connection_id: String },
    /// The stored document changed; clients should reload it
    ContentUpdated {
        origin: ChangeOrigin,
        at: DateTime<Utc>,
    },
    /// Pong response to ping
    Pong,
    Error { message: String },
}

impl From<ChangeEvent> for ServerMessage {
    fn from(event: ChangeEvent) -> Self {
        ServerMessage::ContentUpdated {
            origin: event.origin,
            at: event.at,
        }
    }
}

impl ServerMessage {
    /// Sent when this connection missed events; content may have changed
    pub fn missed_updates() -> Self {
        ServerMessage::ContentUpdated {
            origin: ChangeOrigin::Saved,
            at: Utc::now(),
        }
    }
}
