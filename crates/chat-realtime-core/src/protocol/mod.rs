//! Signaling protocol vocabulary and its translation to public events.

pub mod signals;
pub mod translate;
