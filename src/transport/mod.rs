//! Transport implementations.
//!
//! This module provides concrete implementations of the domain-level
//! `Transport` trait. The HTTP transport is hidden behind a feature
//! flag and exposed only through constructor functions.
//!
//! Domain code must not depend on transport-specific types.

mod memory;

#[cfg(feature = "transport_hyper")]
mod hyper;

pub use memory::{
    bind_memory_server, create_memory_transport, create_memory_transport_with_hub, MemoryHub,
};

#[cfg(feature = "transport_hyper")]
pub use self::hyper::{create_transport as create_hyper_transport, serve};
