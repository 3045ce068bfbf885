//! Application layer of the realtime notification client.
//!
//! # What lives here?
//!
//! - **`transport`** – Contracts for the external collaborators: the
//!   signaling transport, the factory that creates it, and the credential it
//!   consumes.  Only traits and plain option structs; no implementation.
//!
//! - **`event_bus`** – The per-client registry mapping each public event kind
//!   to its listeners, with add / remove / publish as the only operations.
//!
//! - **`router`** – Subscribes once to each low-level transport event and
//!   republishes the translated public event on the bus.
//!
//! - **`session`** – `ChatClient`: owns the transport binding, the started
//!   flag, and the bus; exposes start / stop / on / off.

pub mod event_bus;
pub mod router;
pub mod session;
pub mod transport;
