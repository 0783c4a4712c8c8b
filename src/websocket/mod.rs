//! WebSocket change notifications
//!
//! Site pages connect to `/ws` and reload the document when told to:
//!
//! ```text
//! ContentStore ──ChangeEvent──► broadcast ──► each connection ──► {"type":"content_updated",...}
//! ```
//!
//! Events are sent for saves made through this server, for another
//! process rewriting the local entry, and for remote row changes.
//!
//! ## Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8090/ws');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'content_updated') reloadContent();
//! };
//! ```

mod handler;
mod messages;

pub use handler::websocket_handler;
pub use messages::{ClientMessage, ServerMessage};
