//! Wire-level primitives for the SLIM protocol.
//!
//! This crate owns the bytes: the handshake banner, the length-prefixed
//! chunk grammar, and nothing about what an instruction means once decoded.
//! Higher layers (`slim-engine`, `slimd`) build on top of [`wire::Value`]
//! and never hand-roll framing of their own.

pub mod wire;

pub use wire::{Value, WireError, HANDSHAKE_BANNER};
