//! Infrastructure layer for the realtime notification client.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `chat_realtime_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`config`** – TOML configuration file for the replay tool: log level,
//!   gateway endpoint, API version, and passthrough transport options.
//!
//! - **`loopback`** – An in-process `SignalingTransport` whose events are
//!   raised by the host program.  Used by tests and by the replay tool in
//!   place of a real signaling connection.
//!
//! - **`replay`** – Reads a JSON-lines file of raw transport events and
//!   raises them on a loopback transport.

pub mod config;
pub mod loopback;
pub mod replay;
