//! Domain layer: the public event vocabulary.
//!
//! Everything here is an immutable value type.  No I/O, no async.

pub mod connection;
pub mod events;
