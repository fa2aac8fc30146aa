//! Shared helpers for core integration tests

#![allow(dead_code)]

pub mod transport;

pub use transport::{ScriptedTransport, Step};
